mod backup;
mod cli;
mod db;
mod error;
mod fmt;
mod layout;
mod models;
#[cfg(feature = "pdf")]
mod pdf;
mod receipt;
mod settings;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "pdf")]
use cli::ReportCommands;
use cli::{
    BackupCommands, BrandingCommands, Cli, Commands, ExpenseCommands, TripCommands,
    VehicleCommands,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Trip { command } => match command {
            TripCommands::Start {
                destination,
                participants,
                date,
                budget,
                method,
                vehicle,
            } => cli::trip::start(cli::trip::StartArgs {
                destination,
                participants,
                date,
                budget,
                method: method.map(Into::into),
                vehicle,
            }),
            TripCommands::Status => cli::trip::status(),
            TripCommands::End => cli::trip::end(),
            TripCommands::History => cli::trip::history(),
            TripCommands::Show { id } => cli::trip::show(id),
            TripCommands::Delete { id } => cli::trip::delete(id),
        },
        Commands::Expense { command } => match command {
            ExpenseCommands::Add {
                category,
                amount,
                receipt,
            } => cli::expense::add(category.into(), amount, receipt.as_deref()),
            ExpenseCommands::List => cli::expense::list(),
        },
        Commands::Vehicle { command } => match command {
            VehicleCommands::Add { model, plate } => cli::vehicle::add(&model, &plate),
            VehicleCommands::List => cli::vehicle::list(),
            VehicleCommands::Remove { id } => cli::vehicle::remove(id),
        },
        Commands::Branding { command } => match command {
            BrandingCommands::Set { header, footer } => {
                cli::branding::set(header.as_deref(), footer.as_deref())
            }
            BrandingCommands::Clear => cli::branding::clear(),
            BrandingCommands::Show => cli::branding::show(),
        },
        #[cfg(feature = "pdf")]
        Commands::Report { command } => match command {
            ReportCommands::Summary { args } => {
                cli::export::run(layout::ReportKind::Summary, args, None)
            }
            ReportCommands::Detailed { args, layout: detailed } => {
                cli::export::run(layout::ReportKind::Detailed, args, detailed)
            }
        },
        Commands::Backup { command } => match command {
            BackupCommands::Export { output } => cli::backup::export(output),
            BackupCommands::Restore { file, yes } => cli::backup::restore(&file, yes),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
