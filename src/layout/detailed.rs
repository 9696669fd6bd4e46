use super::{
    Align, Canvas, Rendered, ReportInput, Rgb, Sheet, BODY_SIZE, LEFT, MIN_CONTENT_H, TITLE_SIZE,
};
use crate::fmt::money;
use crate::models::Expense;

const TITLE: &str = "Comprovantes da Viagem";
const EMPTY: &str = "Nenhuma despesa registrada.";
const SUBTITLE_SIZE: f32 = 10.0;
const STRIP_SIZE: f32 = 14.0;
/// Distance from a label baseline to the top of its image box.
const LABEL_GAP: f32 = 10.0;
/// Space kept free at the bottom of each slot.
const SLOT_GAP: f32 = 4.0;

fn label(seq: usize, expense: &Expense) -> String {
    format!("Despesa {seq}: {} - {}", expense.category.label(), money(expense.amount))
}

/// One expense per page: label on top, receipt fitted to the rest of the page.
pub(super) fn one_per_page<C: Canvas>(mut sheet: Sheet<'_, C>, input: &ReportInput<'_>) -> Rendered {
    let center = sheet.page_width() / 2.0;
    let mut y = sheet.frame.top;
    sheet.write(TITLE, center, y, TITLE_SIZE, Rgb::BLACK, Align::Center);
    y += 7.0;
    sheet.write(
        &format!("Destino: {}", input.trip.destination),
        center,
        y,
        SUBTITLE_SIZE,
        Rgb::BLACK,
        Align::Center,
    );
    y += 13.0;

    if input.expenses.is_empty() {
        sheet.write(EMPTY, center, y, BODY_SIZE, Rgb::BLACK, Align::Center);
        return sheet.finish(y);
    }

    let last = input.expenses.len() - 1;
    for (i, expense) in input.expenses.iter().enumerate() {
        if i > 0 {
            y = sheet.new_page();
        }
        sheet.write(&label(i + 1, expense), LEFT, y, BODY_SIZE, Rgb::BLACK, Align::Left);
        let top = y + LABEL_GAP;
        let max_h = sheet.bottom_for(i == last, top, MIN_CONTENT_H) - top;
        y = sheet.receipt(expense, i + 1, top, max_h);
    }
    sheet.finish(y)
}

/// Two expenses per page: the area under the title strip is split into two
/// equal slots, expense `i` going to page `i / 2`, slot `i % 2`. The last
/// page's slots shrink to keep room for a last-page footer.
pub(super) fn two_per_page<C: Canvas>(mut sheet: Sheet<'_, C>, input: &ReportInput<'_>) -> Rendered {
    let strip = format!("{TITLE} - {}", input.trip.destination);
    let top = sheet.frame.top;
    let region_top = title_strip(&mut sheet, &strip, top);

    if input.expenses.is_empty() {
        let center = sheet.page_width() / 2.0;
        let y = region_top + 8.0;
        sheet.write(EMPTY, center, y, BODY_SIZE, Rgb::BLACK, Align::Center);
        return sheet.finish(y);
    }

    let last_page = (input.expenses.len() - 1) / 2;
    let mut cursor = region_top;
    let mut slot_h = 0.0;
    for (i, expense) in input.expenses.iter().enumerate() {
        let slot = i % 2;
        if slot == 0 {
            if i > 0 {
                let top = sheet.new_page();
                title_strip(&mut sheet, &strip, top);
            }
            let bottom = sheet.bottom_for(i / 2 == last_page, region_top, 2.0 * MIN_CONTENT_H);
            slot_h = (bottom - region_top) / 2.0;
        }
        let slot_top = region_top + slot as f32 * slot_h;
        if slot == 1 {
            let right = sheet.page_width() - LEFT;
            sheet.canvas.set_draw_color(Rgb::SLATE);
            sheet.canvas.dashed_line(LEFT, slot_top, right, slot_top);
        }
        let baseline = slot_top + 6.0;
        sheet.write(&label(i + 1, expense), LEFT, baseline, BODY_SIZE, Rgb::BLACK, Align::Left);
        let top = baseline + LABEL_GAP;
        let max_h = slot_top + slot_h - SLOT_GAP - top;
        cursor = sheet.receipt(expense, i + 1, top, max_h);
    }
    sheet.finish(cursor)
}

/// Draw the per-page title strip; returns the top of the slot region.
fn title_strip<C: Canvas>(sheet: &mut Sheet<'_, C>, strip: &str, top: f32) -> f32 {
    let center = sheet.page_width() / 2.0;
    sheet.write(strip, center, top, STRIP_SIZE, Rgb::BLACK, Align::Center);
    top + 6.0
}

#[cfg(test)]
mod tests {
    use super::super::recorder::Recorder;
    use super::super::tests::trip;
    use super::super::{render, DetailedLayout, LayoutOptions, ReportKind, BRANDING_PADDING};
    use super::*;
    use crate::models::{Branding, ExpenseCategory};
    use crate::receipt::fixtures;

    fn with_receipt(id: i64, receipt: Option<String>) -> Expense {
        Expense {
            id,
            category: ExpenseCategory::Food,
            amount: 25.5,
            receipt,
        }
    }

    fn detailed(expenses: &[Expense], layout: DetailedLayout) -> (Recorder, Rendered) {
        let trip = trip();
        let branding = Branding::default();
        let input = ReportInput { trip: &trip, expenses, branding: &branding };
        let mut rec = Recorder::a4();
        let options = LayoutOptions { detailed: layout, ..Default::default() };
        let out = render(&mut rec, ReportKind::Detailed, &input, options);
        (rec, out)
    }

    #[test]
    fn test_one_per_page_layout() {
        let expenses = vec![
            with_receipt(1, Some(fixtures::jpeg_data_uri(400, 800))),
            with_receipt(2, None),
            with_receipt(3, Some(fixtures::png_data_uri(800, 200))),
        ];
        let (rec, out) = detailed(&expenses, DetailedLayout::OnePerPage);
        assert_eq!(out.pages, 3);
        assert_eq!(out.receipt_errors, 0);

        assert!(rec.texts(0).contains(&"Despesa 1: Alimentação - R$ 25,50".to_string()));
        let (x, y, w, h) = rec.images(0)[0];
        assert!(h <= 277.0 - y + 1e-3);
        assert!((w / h - 0.5).abs() < 1e-4);
        assert!((x - (210.0 - w) / 2.0).abs() < 1e-3);

        assert!(rec.texts(1).contains(&"Sem comprovante anexado.".to_string()));
        assert!(rec.images(1).is_empty());

        let (_, _, w, _) = rec.images(2)[0];
        assert!((w - 180.0).abs() < 1e-3, "wide receipt is bounded by width");
    }

    #[test]
    fn test_invalid_receipt_does_not_stop_later_expenses() {
        let expenses = vec![
            with_receipt(1, Some(fixtures::png_data_uri(100, 100))),
            with_receipt(2, Some("data:image/jpeg;base64,não é uma imagem".to_string())),
            with_receipt(3, Some(fixtures::png_data_uri(100, 100))),
        ];
        let (rec, out) = detailed(&expenses, DetailedLayout::OnePerPage);
        assert_eq!(out.pages, 3);
        assert_eq!(out.receipt_errors, 1);
        assert!(rec.texts(1).contains(&"Despesa 2: Alimentação - R$ 25,50".to_string()));
        assert!(rec.texts(1).contains(&"Erro ao carregar a imagem do comprovante.".to_string()));
        assert_eq!(rec.color_of("Erro ao carregar"), Some(Rgb::RED));
        assert_eq!(rec.images(0).len(), 1);
        assert_eq!(rec.images(2).len(), 1);
        assert!(rec.texts(2).contains(&"Despesa 3: Alimentação - R$ 25,50".to_string()));
    }

    #[test]
    fn test_corrupt_image_bytes_are_recoverable() {
        let mut bytes = fixtures::png(10, 10);
        bytes.truncate(20);
        let b64 = {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD.encode(bytes)
        };
        let expenses = vec![with_receipt(1, Some(b64)), with_receipt(2, None)];
        let (rec, out) = detailed(&expenses, DetailedLayout::TwoPerPage);
        assert_eq!(out.pages, 1);
        assert_eq!(out.receipt_errors, 1);
        assert!(rec.texts(0).contains(&"Erro ao carregar a imagem do comprovante.".to_string()));
        assert!(rec.texts(0).contains(&"Despesa 2: Alimentação - R$ 25,50".to_string()));
    }

    #[test]
    fn test_empty_detailed_report() {
        for layout in [DetailedLayout::OnePerPage, DetailedLayout::TwoPerPage] {
            let (rec, out) = detailed(&[], layout);
            assert_eq!(out.pages, 1);
            assert!(rec.texts(0).contains(&"Nenhuma despesa registrada.".to_string()));
        }
    }

    #[test]
    fn test_two_per_page_slot_assignment() {
        for n in 1..=7usize {
            let expenses: Vec<Expense> = (0..n)
                .map(|i| with_receipt(i as i64, Some(fixtures::png_data_uri(300, 400))))
                .collect();
            let (rec, out) = detailed(&expenses, DetailedLayout::TwoPerPage);
            assert_eq!(out.pages, n.div_ceil(2), "n = {n}");

            let region_top = 20.0 + 6.0;
            let slot_h = (277.0 - region_top) / 2.0;
            for i in 0..n {
                let page = i / 2;
                let slot = i % 2;
                let want = format!("Despesa {}: Alimentação - R$ 25,50", i + 1);
                let (_, y) = rec
                    .text_ops(page)
                    .into_iter()
                    .find(|(t, _)| *t == want)
                    .unwrap_or_else(|| panic!("expense {} missing from page {page}", i + 1));
                let slot_top = region_top + slot as f32 * slot_h;
                assert!(y > slot_top && y < slot_top + slot_h, "expense {} not in slot {slot}", i + 1);

                let (_, iy, _, ih) = rec.images(page)[slot];
                assert!(iy >= slot_top && iy + ih <= slot_top + slot_h + 1e-3);
            }
        }
    }

    #[test]
    fn test_two_per_page_divider_only_on_full_pages() {
        let expenses: Vec<Expense> = (0..3).map(|i| with_receipt(i, None)).collect();
        let (rec, out) = detailed(&expenses, DetailedLayout::TwoPerPage);
        assert_eq!(out.pages, 2);
        assert_eq!(rec.dashed_lines(0).len(), 1);
        assert!(rec.dashed_lines(1).is_empty());
        assert!(rec.texts(1)[0].starts_with("Comprovantes da Viagem - Recife"));
    }

    fn with_footer(
        expenses: &[Expense],
        layout: DetailedLayout,
        footer: String,
    ) -> (Recorder, Rendered) {
        let trip = trip();
        let branding = Branding { header: None, footer: Some(footer) };
        let input = ReportInput { trip: &trip, expenses, branding: &branding };
        let mut rec = Recorder::a4();
        let options = LayoutOptions { detailed: layout, ..Default::default() };
        let out = render(&mut rec, ReportKind::Detailed, &input, options);
        (rec, out)
    }

    #[test]
    fn test_two_per_page_footer_shares_last_page() {
        // 420x40 footer is 20mm tall at full page width.
        for n in 1..=6usize {
            let expenses: Vec<Expense> = (0..n)
                .map(|i| with_receipt(i as i64, Some(fixtures::png_data_uri(300, 400))))
                .collect();
            let (rec, out) =
                with_footer(&expenses, DetailedLayout::TwoPerPage, fixtures::png_data_uri(420, 40));
            assert_eq!(out.pages, n.div_ceil(2), "n = {n}");

            let last = out.pages - 1;
            let want = format!("Despesa {n}: Alimentação - R$ 25,50");
            assert!(rec.texts(last).contains(&want), "n = {n}");
            let images = rec.images(last);
            let footer = images.last().copied().unwrap();
            assert!((footer.1 - 277.0).abs() < 1e-3, "footer sits at the bottom edge");
            for (_, y, _, h) in &images[..images.len() - 1] {
                assert!(y + h <= 277.0 - BRANDING_PADDING + 1e-3, "receipt overlaps the footer band");
            }
            for page in 0..last {
                assert_eq!(rec.images(page).len(), 2, "no footer before the last page");
            }
        }
    }

    #[test]
    fn test_one_per_page_footer_shares_last_page() {
        let expenses: Vec<Expense> = (0..4)
            .map(|i| with_receipt(i, Some(fixtures::jpeg_data_uri(400, 800))))
            .collect();
        let (rec, out) =
            with_footer(&expenses, DetailedLayout::OnePerPage, fixtures::png_data_uri(420, 40));
        assert_eq!(out.pages, 4);
        assert!(rec.texts(3).contains(&"Despesa 4: Alimentação - R$ 25,50".to_string()));
        let images = rec.images(3);
        assert_eq!(images.len(), 2);
        let (_, y, _, h) = images[0];
        assert!(y + h <= 297.0 - 20.0 - BRANDING_PADDING + 1e-3);
    }

    #[test]
    fn test_no_room_for_receipt_is_not_a_receipt_error() {
        // A 220mm header still leaves the minimum content height, but the
        // two-per-page slots are then too short for any receipt box.
        let trip = trip();
        let branding = Branding { header: Some(fixtures::png_data_uri(420, 440)), footer: None };
        let expenses = vec![with_receipt(1, Some(fixtures::png_data_uri(100, 100)))];
        let input = ReportInput { trip: &trip, expenses: &expenses, branding: &branding };
        let mut rec = Recorder::a4();
        let options = LayoutOptions { detailed: DetailedLayout::TwoPerPage, ..Default::default() };
        let out = render(&mut rec, ReportKind::Detailed, &input, options);
        assert_eq!(out.receipt_errors, 0);
        assert!(rec.texts(0).contains(&"Comprovante omitido: sem espaço na página.".to_string()));
    }
}
