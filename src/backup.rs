//! JSON backup file: everything the app persists, in one document.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TripError};
use crate::models::{cents, Branding, Expense, Totals, Trip, TripRecord, Vehicle};
use crate::state::AppState;

pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(default)]
    pub version: serde_json::Value,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub trip_history: Vec<TripRecord>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub current_trip: Option<Trip>,
    #[serde(default)]
    pub current_expenses: Vec<Expense>,
    #[serde(default)]
    pub company_header: Option<String>,
    #[serde(default)]
    pub company_footer: Option<String>,
}

impl Backup {
    pub fn from_state(state: &AppState) -> Self {
        Self {
            version: BACKUP_VERSION.into(),
            date: Some(chrono::Utc::now().to_rfc3339()),
            trip_history: state.trip_history.clone(),
            vehicles: state.vehicles.clone(),
            current_trip: state.current_trip.clone(),
            current_expenses: state.current_expenses.clone(),
            company_header: state.branding.header.clone(),
            company_footer: state.branding.footer.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a backup file. The top level must be a JSON object; absent fields
    /// default to empty, malformed ones reject the whole file. Budgets and
    /// amounts must be non-negative and are normalized to whole cents.
    pub fn parse(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| TripError::InvalidBackup(format!("not valid JSON: {e}")))?;
        if !value.is_object() {
            return Err(TripError::InvalidBackup("expected a JSON object at the top level".to_string()));
        }
        let mut backup: Self =
            serde_json::from_value(value).map_err(|e| TripError::InvalidBackup(e.to_string()))?;
        backup.normalize_money()?;
        Ok(backup)
    }

    fn normalize_money(&mut self) -> Result<()> {
        let trips = self
            .current_trip
            .iter_mut()
            .chain(self.trip_history.iter_mut().map(|r| &mut r.trip));
        for trip in trips {
            trip.budget = cents(trip.budget).ok_or_else(|| {
                TripError::InvalidBackup(format!(
                    "trip to {} has an invalid budget: {}",
                    trip.destination, trip.budget
                ))
            })?;
        }

        let expenses = self
            .current_expenses
            .iter_mut()
            .chain(self.trip_history.iter_mut().flat_map(|r| r.expenses.iter_mut()));
        for expense in expenses {
            expense.amount = cents(expense.amount).ok_or_else(|| {
                TripError::InvalidBackup(format!(
                    "expense {} has an invalid amount: {}",
                    expense.id, expense.amount
                ))
            })?;
        }

        for record in &mut self.trip_history {
            record.total = Totals::of(&record.trip, &record.expenses).total;
        }
        Ok(())
    }

    /// The state this backup restores to. Replaces every persisted slot.
    pub fn into_state(self) -> AppState {
        AppState {
            current_trip: self.current_trip,
            current_expenses: self.current_expenses,
            trip_history: self.trip_history,
            vehicles: self.vehicles,
            branding: Branding {
                header: self.company_header,
                footer: self.company_footer,
            },
        }
    }
}
