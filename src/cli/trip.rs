use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::open_state;
use crate::error::{Result, TripError};
use crate::fmt::{display_date, money};
use crate::models::{BudgetMethod, Expense, Totals, Trip};

pub struct StartArgs {
    pub destination: String,
    pub participants: String,
    pub date: Option<String>,
    pub budget: f64,
    pub method: Option<BudgetMethod>,
    pub vehicle: Option<i64>,
}

fn validate_date(date: Option<String>) -> Result<String> {
    match date {
        Some(d) => {
            chrono::NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                .map_err(|_| TripError::InvalidDate(d.clone()))?;
            Ok(d)
        }
        None => Ok(chrono::Local::now().format("%Y-%m-%d").to_string()),
    }
}

pub fn start(args: StartArgs) -> Result<()> {
    let (_settings, store, mut state) = open_state()?;

    let destination = args.destination.trim().to_string();
    let participants = args.participants.trim().to_string();
    if destination.is_empty() || participants.is_empty() {
        return Err(TripError::Other("destination and participants are required".to_string()));
    }
    let vehicle = match args.vehicle {
        Some(id) => Some(state.find_vehicle(id)?.clone()),
        None => None,
    };
    let trip = Trip {
        destination,
        participants,
        date: validate_date(args.date)?,
        budget: args.budget,
        budget_method: args.method,
        vehicle,
    };
    let label = format!("{} ({})", trip.destination, display_date(&trip.date));
    state.start_trip(trip)?;
    state.save(&store);
    println!("Started trip to {label}");
    Ok(())
}

/// Trip header, financial panel and expense table, shared by `status` and `show`.
fn print_trip(trip: &Trip, expenses: &[Expense]) {
    println!("{}", trip.destination.bold());
    println!("Participants: {}", trip.participants);
    println!("Start date:   {}", display_date(&trip.date));
    if let Some(v) = &trip.vehicle {
        println!("Vehicle:      {} ({})", v.model, v.plate);
    }

    let totals = Totals::of(trip, expenses);
    let method = trip
        .budget_method
        .map(|m| format!(" [{}]", m.label()))
        .unwrap_or_default();
    let balance = money(totals.balance);
    let balance = if totals.in_budget() {
        balance.green().bold()
    } else {
        balance.red().bold()
    };
    println!();
    println!("Budget:   {}{method}", money(totals.budget).blue());
    println!("Expenses: {}", money(totals.total).yellow());
    println!("Balance:  {balance}");
    println!();

    if expenses.is_empty() {
        println!("No expenses recorded.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["#", "Category", "Amount", "Receipt"]);
    for (i, e) in expenses.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(e.category.label()),
            Cell::new(money(e.amount)).set_alignment(CellAlignment::Right),
            Cell::new(if e.receipt.is_some() { "yes" } else { "-" }),
        ]);
    }
    println!("{table}");
}

pub fn status() -> Result<()> {
    let (_settings, _store, state) = open_state()?;
    let trip = state.current_trip.as_ref().ok_or(TripError::NoActiveTrip)?;
    print_trip(trip, &state.current_expenses);
    Ok(())
}

pub fn end() -> Result<()> {
    let (_settings, store, mut state) = open_state()?;
    let record = state.end_trip()?;
    state.save(&store);
    println!(
        "Ended trip to {} ({} expenses, total {}). Archived as trip {}.",
        record.trip.destination,
        record.expenses.len(),
        money(record.total),
        record.id
    );
    Ok(())
}

pub fn history() -> Result<()> {
    let (_settings, _store, state) = open_state()?;
    if state.trip_history.is_empty() {
        println!("No archived trips.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["ID", "Destination", "Date", "Expenses", "Total"]);
    for r in state.trip_history.iter().rev() {
        table.add_row(vec![
            Cell::new(r.id),
            Cell::new(&r.trip.destination),
            Cell::new(display_date(&r.trip.date)),
            Cell::new(r.expenses.len()),
            Cell::new(money(r.total)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("Trip history\n{table}");
    Ok(())
}

pub fn show(id: i64) -> Result<()> {
    let (_settings, _store, state) = open_state()?;
    let record = state.find_trip(id)?;
    print_trip(&record.trip, &record.expenses);
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let (_settings, store, mut state) = open_state()?;
    let record = state.delete_trip(id)?;
    state.save(&store);
    println!("Deleted trip {} to {}", record.id, record.trip.destination);
    Ok(())
}
