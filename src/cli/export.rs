use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::{open_state, ReportArgs};
use crate::error::{Result, TripError};
use crate::layout::{self, DetailedLayout, LayoutOptions, Rendered, ReportInput, ReportKind};
use crate::pdf::PdfCanvas;
use crate::settings::Disposition;

const GENERATION_FAILED: &str = "could not generate the PDF report";

/// Build the whole document in memory. Nothing reaches the disk unless this succeeds.
fn build(
    kind: ReportKind,
    input: &ReportInput<'_>,
    options: LayoutOptions,
) -> Result<(Vec<u8>, Rendered)> {
    let title = layout::report_filename(kind, &input.trip.destination);
    let mut canvas = PdfCanvas::new(title.trim_end_matches(".pdf"))?;
    let rendered = layout::render(&mut canvas, kind, input, options);
    let bytes = canvas.into_bytes()?;
    Ok((bytes, rendered))
}

fn write_pdf(bytes: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

fn open_in_viewer(path: &Path) -> std::io::Result<()> {
    let status = if cfg!(target_os = "macos") {
        std::process::Command::new("open").arg(path).status()?
    } else if cfg!(target_os = "windows") {
        std::process::Command::new("cmd")
            .args(["/C", "start", ""])
            .arg(path)
            .status()?
    } else {
        std::process::Command::new("xdg-open").arg(path).status()?
    };
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("viewer exited with {status}")))
    }
}

pub fn run(kind: ReportKind, args: ReportArgs, layout_override: Option<DetailedLayout>) -> Result<()> {
    let (settings, _store, state) = open_state()?;
    let input = match args.trip {
        Some(id) => state.snapshot_of(state.find_trip(id)?),
        None => state.current_snapshot()?,
    };

    let mut options = settings.layout_options();
    if let Some(detailed) = layout_override {
        options.detailed = detailed;
    }
    if let Some(branding) = args.branding {
        options.branding = branding;
    }

    let disposition = if args.stdout {
        Disposition::Stdout
    } else if args.open {
        Disposition::Open
    } else {
        settings.disposition
    };

    // Progress goes to stderr so --stdout stays a clean PDF stream.
    eprintln!("Generating report...");
    let (bytes, rendered) = build(kind, &input, options).map_err(|e| {
        tracing::error!("report generation failed: {e}");
        TripError::Pdf(GENERATION_FAILED.to_string())
    })?;
    tracing::info!(pages = rendered.pages, receipt_errors = rendered.receipt_errors, "report built");

    if disposition == Disposition::Stdout {
        let mut out = std::io::stdout().lock();
        out.write_all(&bytes)?;
        out.flush()?;
        return Ok(());
    }

    let path = match args.output {
        Some(p) => PathBuf::from(p),
        None => settings
            .exports_dir()
            .join(layout::report_filename(kind, &input.trip.destination)),
    };
    write_pdf(&bytes, &path)?;
    println!("Wrote {}", path.display());
    println!(
        "{} page{}{}",
        rendered.pages,
        if rendered.pages == 1 { "" } else { "s" },
        match rendered.receipt_errors {
            0 => String::new(),
            n => format!(", {n} receipt(s) could not be loaded"),
        }
    );

    if disposition == Disposition::Open {
        if let Err(e) = open_in_viewer(&path) {
            if settings.open_fallback_to_save {
                tracing::warn!("could not open {}: {e}", path.display());
                println!("Could not open a viewer; the report was saved instead.");
            } else {
                return Err(TripError::Other(format!("could not open {}: {e}", path.display())));
            }
        }
    }
    Ok(())
}
