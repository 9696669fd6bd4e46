use std::path::Path;

use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::open_state;
use crate::error::{Result, TripError};
use crate::fmt::money;
use crate::models::{ExpenseCategory, Totals};
use crate::receipt::load_image_file;

pub fn add(category: ExpenseCategory, amount: f64, receipt: Option<&str>) -> Result<()> {
    let (_settings, store, mut state) = open_state()?;
    let receipt = receipt.map(|p| load_image_file(Path::new(p))).transpose()?;
    let expense = state.add_expense(category, amount, receipt)?;
    let line = format!(
        "Added {} {}{}",
        expense.category.label(),
        money(expense.amount),
        if expense.receipt.is_some() { " with receipt" } else { "" }
    );
    state.save(&store);
    println!("{line}");
    Ok(())
}

pub fn list() -> Result<()> {
    let (_settings, _store, state) = open_state()?;
    let trip = state.current_trip.as_ref().ok_or(TripError::NoActiveTrip)?;
    let mut table = Table::new();
    table.set_header(vec!["#", "ID", "Category", "Amount", "Receipt"]);
    for (i, e) in state.current_expenses.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(e.id),
            Cell::new(e.category.label()),
            Cell::new(money(e.amount)).set_alignment(CellAlignment::Right),
            Cell::new(if e.receipt.is_some() { "yes" } else { "-" }),
        ]);
    }
    let totals = Totals::of(trip, &state.current_expenses);
    println!("Expenses: {}\n{table}", trip.destination);
    for category in ExpenseCategory::ALL {
        let subtotal: f64 = state
            .current_expenses
            .iter()
            .filter(|e| e.category == category)
            .map(|e| e.amount)
            .sum();
        if subtotal > 0.0 {
            println!("  {:<16} {}", category.label(), money(subtotal));
        }
    }
    println!("Total: {}", money(totals.total));
    Ok(())
}
