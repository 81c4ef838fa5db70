//! Image decoding.
//!
//! Any format the `image` crate decodes is accepted. Multi-page TIFFs yield
//! their first page. A failed decode leaves nothing behind.

#[cfg(test)]
#[path = "image_io_test.rs"]
mod image_io_test;

use std::path::Path;

use image::DynamicImage;

use crate::error::DecodeError;

/// Read and decode the image at `path`.
///
/// # Errors
///
/// [`DecodeError::Read`] if the file cannot be read, otherwise as [`decode_image`].
pub fn load_image(path: &Path) -> Result<DynamicImage, DecodeError> {
    let bytes = std::fs::read(path).map_err(|source| DecodeError::Read { path: path.to_path_buf(), source })?;
    let image = decode_image(&bytes)?;
    tracing::info!(path = %path.display(), width = image.width(), height = image.height(), "image loaded");
    Ok(image)
}

/// Decode an in-memory image, guessing the format from its contents.
///
/// # Errors
///
/// [`DecodeError::Image`] for unsupported or malformed data and
/// [`DecodeError::Empty`] for a zero-sized image.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let image = image::load_from_memory(bytes)?;
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(DecodeError::Empty { width, height });
    }
    Ok(image)
}
