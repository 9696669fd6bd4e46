use std::io::Write;
use std::path::PathBuf;

use crate::backup::Backup;
use crate::cli::open_state;
use crate::error::Result;
use crate::fmt::format_bytes;

pub fn export(output: Option<String>) -> Result<()> {
    let (settings, _store, state) = open_state()?;

    let dest_path = match output {
        Some(p) => PathBuf::from(p),
        None => {
            let backups_dir = settings.backups_dir();
            std::fs::create_dir_all(&backups_dir)?;
            let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
            backups_dir.join(format!("tripbook-backup-{stamp}.json"))
        }
    };

    let json = Backup::from_state(&state).to_json()?;
    std::fs::write(&dest_path, format!("{json}\n"))?;

    let size = std::fs::metadata(&dest_path)?.len();
    println!("Backup saved to {}", dest_path.display());
    println!("Size: {}", format_bytes(size));
    Ok(())
}

pub fn restore(file: &str, yes: bool) -> Result<()> {
    let content = std::fs::read_to_string(file)?;
    let backup = Backup::parse(&content)?;

    let (_settings, mut store, _state) = open_state()?;
    if !yes {
        print!("Replace ALL current data with {file}? [y/N]: ");
        std::io::stdout().flush()?;
        let mut input = String::new();
        std::io::stdin().read_line(&mut input).ok();
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Restore cancelled.");
            return Ok(());
        }
    }

    let state = backup.into_state();
    state.save_all(&mut store)?;
    tracing::info!(
        trips = state.trip_history.len(),
        vehicles = state.vehicles.len(),
        "backup restored"
    );
    println!(
        "Restored {} archived trip(s), {} vehicle(s){}.",
        state.trip_history.len(),
        state.vehicles.len(),
        if state.current_trip.is_some() { " and the current trip" } else { "" }
    );
    Ok(())
}
