use thiserror::Error;

#[derive(Error, Debug)]
pub enum TripError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No active trip. Start one with `tripbook trip start`.")]
    NoActiveTrip,

    #[error("A trip to {0} is already in progress. End it first with `tripbook trip end`.")]
    TripInProgress(String),

    #[error("Unknown trip: {0}")]
    UnknownTrip(i64),

    #[error("Unknown vehicle: {0}")]
    UnknownVehicle(i64),

    #[error("Invalid amount: {0} (must be a non-negative number)")]
    InvalidAmount(f64),

    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid backup file: {0}")]
    InvalidBackup(String),

    #[error("Image error: {0}")]
    Image(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TripError>;
