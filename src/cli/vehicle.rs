use comfy_table::{Cell, Table};

use crate::cli::open_state;
use crate::error::Result;

pub fn add(model: &str, plate: &str) -> Result<()> {
    let (_settings, store, mut state) = open_state()?;
    let vehicle = state.add_vehicle(model, plate);
    let line = format!("Added vehicle {} {} ({})", vehicle.id, vehicle.model, vehicle.plate);
    state.save(&store);
    println!("{line}");
    Ok(())
}

pub fn list() -> Result<()> {
    let (_settings, _store, state) = open_state()?;
    let mut table = Table::new();
    table.set_header(vec!["ID", "Model", "Plate"]);
    for v in &state.vehicles {
        table.add_row(vec![Cell::new(v.id), Cell::new(&v.model), Cell::new(&v.plate)]);
    }
    println!("Vehicles\n{table}");
    Ok(())
}

pub fn remove(id: i64) -> Result<()> {
    let (_settings, store, mut state) = open_state()?;
    let vehicle = state.remove_vehicle(id)?;
    state.save(&store);
    println!("Removed vehicle {} ({})", vehicle.model, vehicle.plate);
    Ok(())
}
