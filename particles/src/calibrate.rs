//! Pixel-to-physical scale calibration.
//!
//! The ratio is always recomputed from the two user inputs. Bad inputs give a
//! ratio of zero rather than an error, so the mistake shows up as obviously
//! wrong physical measurements instead of blocking the user.

#[cfg(test)]
#[path = "calibrate_test.rs"]
mod calibrate_test;

use serde::{Deserialize, Serialize};

/// Nanometres in one micrometre.
const NM_PER_UM: f64 = 1000.0;

/// Physical units per pixel, or `0.0` if either input is non-positive or not finite.
#[must_use]
pub fn ratio(known_pixels: f64, known_length: f64) -> f64 {
    let valid = |v: f64| v.is_finite() && v > 0.0;
    if valid(known_pixels) && valid(known_length) { known_length / known_pixels } else { 0.0 }
}

/// A scale bar measurement: `known_length` physical units span `known_pixels` pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub known_pixels: f64,
    pub known_length: f64,
    /// Unit label for `known_length`, e.g. `"nm"`.
    pub unit: String,
}

impl Default for Calibration {
    /// 80 µm over 307 px, expressed in nanometres.
    fn default() -> Self {
        Self::from_micrometers(80.0, 307.0)
    }
}

impl Calibration {
    #[must_use]
    pub fn new(known_pixels: f64, known_length: f64, unit: impl Into<String>) -> Self {
        Self { known_pixels, known_length, unit: unit.into() }
    }

    /// A scale bar read in micrometres, reported in nanometres per pixel.
    #[must_use]
    pub fn from_micrometers(micrometers: f64, pixels: f64) -> Self {
        Self::new(pixels, micrometers * NM_PER_UM, "nm")
    }

    /// Physical units per pixel. See [`ratio`].
    #[must_use]
    pub fn ratio(&self) -> f64 {
        ratio(self.known_pixels, self.known_length)
    }

    /// Convert a pixel length into physical units.
    #[must_use]
    pub fn to_physical(&self, pixels: f64) -> f64 {
        pixels * self.ratio()
    }

    /// Whether the inputs produce a usable (non-zero) ratio.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.ratio() > 0.0
    }
}
