//! Error types shared across the crate.
//!
//! Editing never fails: out-of-range input is clamped. Errors exist only at
//! the edges, where images are decoded, the vision backend is called and
//! results are written out.

use std::path::PathBuf;

/// Error returned when an input image cannot be read or decoded.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The bytes are not a supported or well-formed image.
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
    /// The image decoded to zero pixels.
    #[error("image has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },
}

/// Error returned by the detection adapter.
#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    /// Detection was requested before any vision backend became available.
    #[error("vision backend is not available")]
    BackendUnavailable,
    /// The backend failed to load from every configured source.
    #[error("vision backend failed to load: {0}")]
    LoadFailed(String),
    /// The backend ran but reported an error.
    #[error("circle detection failed: {0}")]
    Backend(String),
}

/// Error returned when measurements cannot be serialized.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// JSON serialization failed.
    #[error("failed to serialize measurements: {0}")]
    Json(#[from] serde_json::Error),
    /// The rendered export could not be written to its destination.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
