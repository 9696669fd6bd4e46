use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub model: String,
    pub plate: String,
}

/// How the trip budget was handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetMethod {
    Pix,
    #[serde(rename = "Espécie")]
    Cash,
}

impl BudgetMethod {
    pub fn label(self) -> &'static str {
        match self {
            BudgetMethod::Pix => "Pix",
            BudgetMethod::Cash => "Espécie",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub destination: String,
    pub participants: String,
    /// Start date as `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub budget: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_method: Option<BudgetMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[serde(rename = "Alimentação")]
    Food,
    #[serde(rename = "Café")]
    Coffee,
    #[serde(rename = "Hospedagem")]
    Lodging,
    #[serde(rename = "Combustível")]
    Fuel,
    #[serde(rename = "Pedágio")]
    Toll,
    #[serde(rename = "Estacionamento")]
    Parking,
    #[serde(rename = "Diversos")]
    Misc,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 7] = [
        ExpenseCategory::Food,
        ExpenseCategory::Coffee,
        ExpenseCategory::Lodging,
        ExpenseCategory::Fuel,
        ExpenseCategory::Toll,
        ExpenseCategory::Parking,
        ExpenseCategory::Misc,
    ];

    /// Label used in reports and in the backup file.
    pub fn label(self) -> &'static str {
        match self {
            ExpenseCategory::Food => "Alimentação",
            ExpenseCategory::Coffee => "Café",
            ExpenseCategory::Lodging => "Hospedagem",
            ExpenseCategory::Fuel => "Combustível",
            ExpenseCategory::Toll => "Pedágio",
            ExpenseCategory::Parking => "Estacionamento",
            ExpenseCategory::Misc => "Diversos",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub category: ExpenseCategory,
    pub amount: f64,
    /// `data:image/...;base64,` URI or bare base64.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
}

/// A trip that has been ended and archived into the history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: i64,
    pub trip: Trip,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Branding {
    pub header: Option<String>,
    pub footer: Option<String>,
}

/// A money amount normalized to whole cents. `None` for negative or
/// non-finite input.
pub fn cents(amount: f64) -> Option<f64> {
    if !amount.is_finite() || amount < 0.0 {
        return None;
    }
    Some((amount * 100.0).round() / 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub budget: f64,
    pub total: f64,
    pub balance: f64,
}

impl Totals {
    /// The only place total and balance are computed; status output and
    /// both report kinds go through here.
    pub fn of(trip: &Trip, expenses: &[Expense]) -> Self {
        let total: f64 = expenses.iter().map(|e| e.amount).sum();
        Self {
            budget: trip.budget,
            total,
            balance: trip.budget - total,
        }
    }

    pub fn in_budget(&self) -> bool {
        self.balance >= 0.0
    }
}
