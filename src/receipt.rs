//! Receipt and branding images.
//!
//! Images are stored as `data:image/...;base64,` URIs (or bare base64) so they
//! survive the JSON store and the backup file untouched. Drawing needs the raw
//! bytes plus a format tag, and layout needs the intrinsic pixel size.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;

use crate::error::{Result, TripError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    fn mime(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }

    fn to_image_crate(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

/// Raw encoded image bytes with their detected format.
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl EncodedImage {
    /// Decode a stored image string: data URI or bare base64.
    pub fn from_source(src: &str) -> Result<Self> {
        let b64 = if src.starts_with("data:") {
            let comma = src
                .find(',')
                .ok_or_else(|| TripError::Image("invalid data URI: missing comma".to_string()))?;
            &src[comma + 1..]
        } else {
            src
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(b64.trim())
            .map_err(|e| TripError::Image(format!("base64 decode error: {e}")))?;
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format = sniff_format(&bytes)
            .ok_or_else(|| TripError::Image("unsupported image format (expected JPEG or PNG)".to_string()))?;
        Ok(Self { bytes, format })
    }

    /// Intrinsic pixel size, read from the image header without decoding pixels.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        let mut reader = image::io::Reader::new(Cursor::new(&self.bytes));
        reader.set_format(self.format.to_image_crate());
        let (w, h) = reader
            .into_dimensions()
            .map_err(|e| TripError::Image(format!("failed to read image size: {e}")))?;
        if w == 0 || h == 0 {
            return Err(TripError::Image("image has zero width or height".to_string()));
        }
        Ok((w, h))
    }

    /// Fully decode to pixels.
    pub fn decode(&self) -> Result<image::DynamicImage> {
        image::load_from_memory_with_format(&self.bytes, self.format.to_image_crate())
            .map_err(|e| TripError::Image(format!("failed to decode image: {e}")))
    }

    pub fn to_data_uri(&self) -> String {
        let b64 = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{b64}", self.format.mime())
    }
}

fn sniff_format(data: &[u8]) -> Option<ImageFormat> {
    if data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF] {
        Some(ImageFormat::Jpeg)
    } else if data.len() >= 8 && data[..8] == [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A] {
        Some(ImageFormat::Png)
    } else {
        None
    }
}

/// Read an image file from disk into the stored data-URI form.
/// The file must be a readable JPEG or PNG.
pub fn load_image_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    let image = EncodedImage::from_bytes(bytes)
        .map_err(|e| TripError::Image(format!("{}: {e}", path.display())))?;
    image.dimensions()?;
    Ok(image.to_data_uri())
}
