use std::path::Path;

use crate::cli::open_state;
use crate::error::{Result, TripError};
use crate::receipt::{load_image_file, EncodedImage};

pub fn set(header: Option<&str>, footer: Option<&str>) -> Result<()> {
    if header.is_none() && footer.is_none() {
        return Err(TripError::Other("pass --header and/or --footer".to_string()));
    }
    let (_settings, store, mut state) = open_state()?;
    let header = header.map(|p| load_image_file(Path::new(p))).transpose()?;
    let footer = footer.map(|p| load_image_file(Path::new(p))).transpose()?;
    state.set_branding(header, footer);
    state.save(&store);
    println!("Branding updated.");
    Ok(())
}

pub fn clear() -> Result<()> {
    let (_settings, store, mut state) = open_state()?;
    state.clear_branding();
    state.save(&store);
    println!("Branding cleared.");
    Ok(())
}

fn describe(src: Option<&str>) -> String {
    match src {
        None => "(not set)".to_string(),
        Some(src) => match EncodedImage::from_source(src).and_then(|img| img.dimensions()) {
            Ok((w, h)) => format!("{w}x{h} px"),
            Err(e) => format!("unreadable ({e})"),
        },
    }
}

pub fn show() -> Result<()> {
    let (_settings, _store, state) = open_state()?;
    println!("Header: {}", describe(state.branding.header.as_deref()));
    println!("Footer: {}", describe(state.branding.footer.as_deref()));
    Ok(())
}
