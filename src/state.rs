//! Application state: the current trip, its expenses, the archived history,
//! the vehicle list and the report branding. Loaded once per command from
//! the [`Store`] and written back when the command changes something.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::Store;
use crate::error::{Result, TripError};
use crate::layout::ReportInput;
use crate::models::{
    cents, Branding, Expense, ExpenseCategory, Totals, Trip, TripRecord, Vehicle,
};

pub const CURRENT_TRIP: &str = "current_trip";
pub const CURRENT_EXPENSES: &str = "current_expenses";
pub const TRIP_HISTORY: &str = "trip_history";
pub const VEHICLES: &str = "vehicles";
pub const COMPANY_HEADER: &str = "company_header";
pub const COMPANY_FOOTER: &str = "company_footer";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub current_trip: Option<Trip>,
    pub current_expenses: Vec<Expense>,
    pub trip_history: Vec<TripRecord>,
    pub vehicles: Vec<Vehicle>,
    pub branding: Branding,
}

/// A slot that fails to load is logged and falls back to its default.
fn load_slot<T: DeserializeOwned + Default>(store: &Store, key: &str) -> T {
    match store.get_record::<T>(key) {
        Ok(Some(v)) => v,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!("could not load {key}: {e}");
            T::default()
        }
    }
}

/// A slot that fails to save is logged; the remaining slots are still written.
fn save_slot<T: Serialize + ?Sized>(store: &Store, key: &str, value: &T) {
    if let Err(e) = store.put_record(key, value) {
        tracing::warn!("could not save {key}: {e}");
    }
}

/// Millisecond timestamp, bumped past `last` so ids stay strictly increasing.
fn next_id(last: Option<i64>) -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    match last {
        Some(last) if last >= now => last + 1,
        _ => now,
    }
}

impl AppState {
    pub fn load(store: &Store) -> Self {
        Self {
            current_trip: load_slot(store, CURRENT_TRIP),
            current_expenses: load_slot(store, CURRENT_EXPENSES),
            trip_history: load_slot(store, TRIP_HISTORY),
            vehicles: load_slot(store, VEHICLES),
            branding: Branding {
                header: load_slot(store, COMPANY_HEADER),
                footer: load_slot(store, COMPANY_FOOTER),
            },
        }
    }

    pub fn save(&self, store: &Store) {
        save_slot(store, CURRENT_TRIP, &self.current_trip);
        save_slot(store, CURRENT_EXPENSES, &self.current_expenses);
        save_slot(store, TRIP_HISTORY, &self.trip_history);
        save_slot(store, VEHICLES, &self.vehicles);
        save_slot(store, COMPANY_HEADER, &self.branding.header);
        save_slot(store, COMPANY_FOOTER, &self.branding.footer);
        tracing::debug!("state saved");
    }

    /// Write every slot in one transaction. Used where a partial write would
    /// leave mixed data behind, such as restoring a backup.
    pub fn save_all(&self, store: &mut Store) -> Result<()> {
        let records = [
            (CURRENT_TRIP, serde_json::to_value(&self.current_trip)?),
            (CURRENT_EXPENSES, serde_json::to_value(&self.current_expenses)?),
            (TRIP_HISTORY, serde_json::to_value(&self.trip_history)?),
            (VEHICLES, serde_json::to_value(&self.vehicles)?),
            (COMPANY_HEADER, serde_json::to_value(&self.branding.header)?),
            (COMPANY_FOOTER, serde_json::to_value(&self.branding.footer)?),
        ];
        store.put_records(&records)?;
        tracing::debug!("state saved in one transaction");
        Ok(())
    }

    pub fn start_trip(&mut self, mut trip: Trip) -> Result<()> {
        if let Some(active) = &self.current_trip {
            return Err(TripError::TripInProgress(active.destination.clone()));
        }
        trip.budget = cents(trip.budget).ok_or(TripError::InvalidAmount(trip.budget))?;
        tracing::info!(destination = %trip.destination, "trip started");
        self.current_trip = Some(trip);
        self.current_expenses.clear();
        Ok(())
    }

    pub fn add_expense(
        &mut self,
        category: ExpenseCategory,
        amount: f64,
        receipt: Option<String>,
    ) -> Result<&Expense> {
        if self.current_trip.is_none() {
            return Err(TripError::NoActiveTrip);
        }
        let amount = cents(amount).ok_or(TripError::InvalidAmount(amount))?;
        let id = next_id(self.current_expenses.last().map(|e| e.id));
        self.current_expenses.push(Expense {
            id,
            category,
            amount,
            receipt,
        });
        Ok(&self.current_expenses[self.current_expenses.len() - 1])
    }

    /// Archive the current trip into the history list.
    pub fn end_trip(&mut self) -> Result<TripRecord> {
        let trip = self.current_trip.take().ok_or(TripError::NoActiveTrip)?;
        let expenses = std::mem::take(&mut self.current_expenses);
        let total = Totals::of(&trip, &expenses).total;
        let record = TripRecord {
            id: next_id(self.trip_history.iter().map(|r| r.id).max()),
            trip,
            expenses,
            total,
        };
        tracing::info!(id = record.id, "trip archived");
        self.trip_history.push(record.clone());
        Ok(record)
    }

    pub fn find_trip(&self, id: i64) -> Result<&TripRecord> {
        self.trip_history
            .iter()
            .find(|r| r.id == id)
            .ok_or(TripError::UnknownTrip(id))
    }

    pub fn delete_trip(&mut self, id: i64) -> Result<TripRecord> {
        let pos = self
            .trip_history
            .iter()
            .position(|r| r.id == id)
            .ok_or(TripError::UnknownTrip(id))?;
        Ok(self.trip_history.remove(pos))
    }

    pub fn add_vehicle(&mut self, model: &str, plate: &str) -> &Vehicle {
        let id = next_id(self.vehicles.iter().map(|v| v.id).max());
        self.vehicles.push(Vehicle {
            id,
            model: model.trim().to_string(),
            plate: plate.trim().to_uppercase(),
        });
        &self.vehicles[self.vehicles.len() - 1]
    }

    pub fn find_vehicle(&self, id: i64) -> Result<&Vehicle> {
        self.vehicles
            .iter()
            .find(|v| v.id == id)
            .ok_or(TripError::UnknownVehicle(id))
    }

    /// Trips keep their own copy of the vehicle, so removal never touches history.
    pub fn remove_vehicle(&mut self, id: i64) -> Result<Vehicle> {
        let pos = self
            .vehicles
            .iter()
            .position(|v| v.id == id)
            .ok_or(TripError::UnknownVehicle(id))?;
        Ok(self.vehicles.remove(pos))
    }

    /// Replace whichever branding images are given; `None` leaves that slot alone.
    pub fn set_branding(&mut self, header: Option<String>, footer: Option<String>) {
        if header.is_some() {
            self.branding.header = header;
        }
        if footer.is_some() {
            self.branding.footer = footer;
        }
    }

    pub fn clear_branding(&mut self) {
        self.branding = Branding::default();
    }

    pub fn current_snapshot(&self) -> Result<ReportInput<'_>> {
        let trip = self.current_trip.as_ref().ok_or(TripError::NoActiveTrip)?;
        Ok(ReportInput {
            trip,
            expenses: &self.current_expenses,
            branding: &self.branding,
        })
    }

    pub fn snapshot_of<'a>(&'a self, record: &'a TripRecord) -> ReportInput<'a> {
        ReportInput {
            trip: &record.trip,
            expenses: &record.expenses,
            branding: &self.branding,
        }
    }
}
