use chrono::NaiveDate;

/// Format a float as Brazilian reais, two decimals, comma separator: R$ 1234,56
pub fn money(val: f64) -> String {
    let rounded = format!("{:.2}", val);
    // -0.001 rounds to "-0.00"
    let rounded = if rounded == "-0.00" { "0.00".to_string() } else { rounded };
    format!("R$ {}", rounded.replace('.', ","))
}

/// Render a stored `YYYY-MM-DD` date as dd/mm/yyyy. Unparsable input is shown as-is.
pub fn display_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%d/%m/%Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Human-readable file size.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
