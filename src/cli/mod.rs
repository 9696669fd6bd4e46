pub mod backup;
pub mod branding;
pub mod expense;
#[cfg(feature = "pdf")]
pub mod export;
pub mod init;
pub mod trip;
pub mod vehicle;

use clap::{Parser, Subcommand, ValueEnum};

use crate::db::Store;
use crate::error::Result;
use crate::layout::{BrandingPolicy, DetailedLayout};
use crate::models::{BudgetMethod, ExpenseCategory};
use crate::settings::{load_settings, Settings};
use crate::state::AppState;

/// Load settings, open the store and read the persisted state.
pub(crate) fn open_state() -> Result<(Settings, Store, AppState)> {
    let settings = load_settings();
    let store = Store::open(&settings.db_path())?;
    let state = AppState::load(&store);
    Ok((settings, store, state))
}

#[derive(Parser)]
#[command(name = "tripbook", about = "Travel expense tracker with receipts and PDF reports.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for tripbook data (default: ~/Documents/tripbook)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Start, inspect, end and browse trips.
    Trip {
        #[command(subcommand)]
        command: TripCommands,
    },
    /// Log expenses on the current trip.
    Expense {
        #[command(subcommand)]
        command: ExpenseCommands,
    },
    /// Manage vehicles that can be attached to trips.
    Vehicle {
        #[command(subcommand)]
        command: VehicleCommands,
    },
    /// Header and footer images stamped on every report.
    Branding {
        #[command(subcommand)]
        command: BrandingCommands,
    },
    /// Generate PDF reports.
    #[cfg(feature = "pdf")]
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
    /// Export or restore a JSON backup of all data.
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MethodArg {
    Pix,
    Cash,
}

impl From<MethodArg> for BudgetMethod {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::Pix => BudgetMethod::Pix,
            MethodArg::Cash => BudgetMethod::Cash,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Food,
    Coffee,
    Lodging,
    Fuel,
    Toll,
    Parking,
    Misc,
}

impl From<CategoryArg> for ExpenseCategory {
    fn from(c: CategoryArg) -> Self {
        match c {
            CategoryArg::Food => ExpenseCategory::Food,
            CategoryArg::Coffee => ExpenseCategory::Coffee,
            CategoryArg::Lodging => ExpenseCategory::Lodging,
            CategoryArg::Fuel => ExpenseCategory::Fuel,
            CategoryArg::Toll => ExpenseCategory::Toll,
            CategoryArg::Parking => ExpenseCategory::Parking,
            CategoryArg::Misc => ExpenseCategory::Misc,
        }
    }
}

#[derive(Subcommand)]
pub enum TripCommands {
    /// Start a new trip.
    Start {
        #[arg(long)]
        destination: String,
        #[arg(long)]
        participants: String,
        /// Start date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Budget handed over for the trip
        #[arg(long, default_value = "0")]
        budget: f64,
        /// How the budget was handed over
        #[arg(long, value_enum)]
        method: Option<MethodArg>,
        /// Vehicle ID (shown in `tripbook vehicle list`)
        #[arg(long)]
        vehicle: Option<i64>,
    },
    /// Show the current trip with budget, total and balance.
    Status,
    /// End the current trip and archive it into the history.
    End,
    /// List archived trips.
    History,
    /// Show an archived trip.
    Show {
        /// Trip ID (shown in `tripbook trip history`)
        id: i64,
    },
    /// Delete an archived trip.
    Delete {
        /// Trip ID (shown in `tripbook trip history`)
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Add an expense to the current trip.
    Add {
        #[arg(long, value_enum)]
        category: CategoryArg,
        #[arg(long)]
        amount: f64,
        /// Receipt photo (JPEG or PNG)
        #[arg(long)]
        receipt: Option<String>,
    },
    /// List expenses on the current trip.
    List,
}

#[derive(Subcommand)]
pub enum VehicleCommands {
    /// Register a vehicle.
    Add {
        /// Model name, e.g. 'Fiat Strada'
        model: String,
        /// License plate
        plate: String,
    },
    /// List vehicles.
    List,
    /// Remove a vehicle.
    Remove {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BrandingCommands {
    /// Set the header and/or footer image (JPEG or PNG).
    Set {
        #[arg(long)]
        header: Option<String>,
        #[arg(long)]
        footer: Option<String>,
    },
    /// Remove both branding images.
    Clear,
    /// Show which branding images are configured.
    Show,
}

#[cfg(feature = "pdf")]
#[derive(clap::Args)]
pub struct ReportArgs {
    /// Archived trip ID (default: the current trip)
    #[arg(long)]
    pub trip: Option<i64>,
    /// Output file path
    #[arg(long)]
    pub output: Option<String>,
    /// Open the PDF in the system viewer after writing it
    #[arg(long, conflicts_with = "stdout")]
    pub open: bool,
    /// Write the PDF to stdout
    #[arg(long)]
    pub stdout: bool,
    /// Which pages carry the branding footer
    #[arg(long, value_enum)]
    pub branding: Option<BrandingPolicy>,
}

#[cfg(feature = "pdf")]
#[derive(Subcommand)]
pub enum ReportCommands {
    /// Financial overview: trip details, budget, total, balance, expense list.
    Summary {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Every expense with its receipt image.
    Detailed {
        #[command(flatten)]
        args: ReportArgs,
        /// Receipts per page
        #[arg(long, value_enum)]
        layout: Option<DetailedLayout>,
    },
}

#[derive(Subcommand)]
pub enum BackupCommands {
    /// Write all data to a JSON file.
    Export {
        /// Output path (default: <data_dir>/backups/tripbook-backup-YYYYMMDD-HHMMSS.json)
        #[arg(long)]
        output: Option<String>,
    },
    /// Replace all data with the contents of a backup file.
    Restore {
        file: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
