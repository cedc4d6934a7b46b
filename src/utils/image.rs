//! Page image loading.
//!
//! Pages of any format supported by the `image` crate are decoded and converted
//! to 8-bit RGB, which is what the preprocessor expects.

use crate::core::errors::{DiagramError, DiagramResult};
use image::RgbImage;
use std::path::Path;

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Arguments
///
/// * `path` - Path of the image file to load
///
/// # Errors
///
/// Returns `DiagramError::ImageLoad` if the file cannot be opened or decoded.
pub fn load_image(path: impl AsRef<Path>) -> DiagramResult<RgbImage> {
    let img = image::open(path.as_ref()).map_err(DiagramError::ImageLoad)?;
    Ok(img.to_rgb8())
}

/// Decodes an image from encoded bytes (PNG, JPEG, ...) and converts it to RgbImage.
///
/// # Errors
///
/// Returns `DiagramError::InvalidInput` for an empty slice and
/// `DiagramError::ImageLoad` if the format is unknown or decoding fails.
pub fn load_image_from_memory(bytes: &[u8]) -> DiagramResult<RgbImage> {
    if bytes.is_empty() {
        return Err(DiagramError::invalid_input("encoded page data is empty"));
    }
    let img = image::load_from_memory(bytes).map_err(DiagramError::ImageLoad)?;
    Ok(img.to_rgb8())
}
