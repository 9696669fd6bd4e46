use super::{
    expense_line, Align, Canvas, Rendered, ReportInput, Rgb, Sheet, BODY_SIZE, LEFT, TITLE_SIZE,
};
use crate::fmt::{display_date, money};
use crate::models::Totals;

const TITLE: &str = "Relatório de Despesas de Viagem";
const META_STEP: f32 = 8.0;
const FIGURE_SIZE: f32 = 14.0;
const LIST_SIZE: f32 = 11.0;
const LIST_INDENT: f32 = 20.0;
const LIST_STEP: f32 = 7.0;

/// Baseline for the next line: `y`, or the top of a fresh page once `y` has
/// run past the content bottom.
fn line_at<C: Canvas>(sheet: &mut Sheet<'_, C>, y: f32) -> f32 {
    if y > sheet.frame.bottom {
        sheet.new_page()
    } else {
        y
    }
}

pub(super) fn layout<C: Canvas>(mut sheet: Sheet<'_, C>, input: &ReportInput<'_>) -> Rendered {
    let trip = input.trip;
    let center = sheet.page_width() / 2.0;
    let mut y = sheet.frame.top;

    sheet.write(TITLE, center, y, TITLE_SIZE, Rgb::BLACK, Align::Center);
    y += 20.0;

    let mut meta = vec![
        format!("Destino: {}", trip.destination),
        format!("Participantes: {}", trip.participants),
        format!("Data de Início: {}", display_date(&trip.date)),
    ];
    if let Some(v) = &trip.vehicle {
        meta.push(format!("Veículo: {} ({})", v.model, v.plate));
    }
    for line in &meta {
        y = line_at(&mut sheet, y);
        sheet.write(line, LEFT, y, BODY_SIZE, Rgb::BLACK, Align::Left);
        y += META_STEP;
    }
    y += 6.0;

    let totals = Totals::of(trip, input.expenses);
    let method = trip
        .budget_method
        .map(|m| format!(" ({})", m.label()))
        .unwrap_or_default();
    let balance_color = if totals.in_budget() { Rgb::GREEN } else { Rgb::RED };
    let figures = [
        (format!("Aporte Inicial: {}{method}", money(totals.budget)), Rgb::BLACK),
        (format!("Total de Despesas: {}", money(totals.total)), Rgb::ORANGE),
        (format!("Saldo Final: {}", money(totals.balance)), balance_color),
    ];
    for (line, color) in &figures {
        y = line_at(&mut sheet, y);
        sheet.write(line, LEFT, y, FIGURE_SIZE, *color, Align::Left);
        y += META_STEP;
    }
    y += 7.0;

    y = line_at(&mut sheet, y);
    if input.expenses.is_empty() {
        sheet.write("Nenhuma despesa registrada.", LEFT, y, BODY_SIZE, Rgb::BLACK, Align::Left);
        y += META_STEP;
        return sheet.finish(y);
    }

    sheet.write("Lista de Despesas", LEFT, y, FIGURE_SIZE, Rgb::BLACK, Align::Left);
    y += 10.0;
    for (i, expense) in input.expenses.iter().enumerate() {
        y = line_at(&mut sheet, y);
        let line = expense_line(i + 1, expense);
        sheet.write(&line, LIST_INDENT, y, LIST_SIZE, Rgb::BLACK, Align::Left);
        y += LIST_STEP;
    }
    sheet.finish(y)
}
