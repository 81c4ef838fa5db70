//! Detection adapter over an external circle-finding capability.
//!
//! The circle finder itself is opaque: it takes a grayscale image and Hough
//! parameters and returns center/radius triples. What this module owns is the
//! step after that: dropping candidates below the minimum area and numbering
//! the survivors `1..=n` in the order the finder returned them.

#[cfg(test)]
#[path = "detect_test.rs"]
mod detect_test;

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};

use crate::consts::EDGE_THRESHOLD;
use crate::error::DetectError;
use crate::store::{Particle, ParticleId};

/// A raw circle candidate as returned by a [`CircleFinder`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Parameters handed to the circle finder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoughParams {
    /// Smallest radius to search for, in pixels.
    pub min_radius: u32,
    /// Largest radius to search for, in pixels.
    pub max_radius: u32,
    /// Upper threshold of the edge-detection pre-pass.
    pub edge_threshold: f64,
    /// Accumulator votes a center needs before it counts; higher is stricter.
    pub circle_threshold: u32,
}

/// The circle-finding capability. Obtained once the vision backend is ready.
pub trait CircleFinder: Send + Sync {
    /// Find circles in `image`, strongest first.
    ///
    /// # Errors
    ///
    /// Implementations return [`DetectError::Backend`] when they cannot run.
    fn find_circles(&self, image: &GrayImage, params: &HoughParams) -> Result<Vec<Circle>, DetectError>;
}

/// User-facing detection settings.
///
/// Every field is clamped to its slider range by [`DetectionParams::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionParams {
    /// `[1, 50]` px.
    pub min_radius: u32,
    /// `[10, 100]` px, and never below `min_radius`.
    pub max_radius: u32,
    /// Detection strictness, `[1, 100]`.
    pub circle_threshold: u32,
    /// Post-detection area filter, `[0, 500]` px².
    pub min_area: u32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self { min_radius: 9, max_radius: 38, circle_threshold: 27, min_area: 30 }
    }
}

impl DetectionParams {
    /// Clamp every field to its allowed range.
    #[must_use]
    pub fn clamped(self) -> Self {
        let min_radius = self.min_radius.clamp(1, 50);
        let max_radius = self.max_radius.clamp(10, 100).max(min_radius);
        Self {
            min_radius,
            max_radius,
            circle_threshold: self.circle_threshold.clamp(1, 100),
            min_area: self.min_area.min(500),
        }
    }

    /// The parameters passed through to the finder. `min_area` is not among them.
    #[must_use]
    pub fn hough(&self) -> HoughParams {
        let p = self.clamped();
        HoughParams {
            min_radius: p.min_radius,
            max_radius: p.max_radius,
            edge_threshold: EDGE_THRESHOLD,
            circle_threshold: p.circle_threshold,
        }
    }
}

/// Runs a [`CircleFinder`] and turns its output into numbered particles.
#[derive(Clone)]
pub struct Detector {
    finder: Arc<dyn CircleFinder>,
}

impl fmt::Debug for Detector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Detector").finish_non_exhaustive()
    }
}

impl Detector {
    #[must_use]
    pub fn new(finder: Arc<dyn CircleFinder>) -> Self {
        Self { finder }
    }

    /// Detect particles in a decoded image of any color type.
    ///
    /// # Errors
    ///
    /// Propagates the finder's [`DetectError`].
    pub fn detect(&self, image: &DynamicImage, params: &DetectionParams) -> Result<Vec<Particle>, DetectError> {
        self.detect_gray(&image.to_luma8(), params)
    }

    /// Detect particles in an already grayscale image.
    ///
    /// # Errors
    ///
    /// Propagates the finder's [`DetectError`].
    pub fn detect_gray(&self, image: &GrayImage, params: &DetectionParams) -> Result<Vec<Particle>, DetectError> {
        let params = params.clamped();
        let candidates = self.finder.find_circles(image, &params.hough())?;
        let found = candidates.len();
        let particles = number_candidates(candidates, f64::from(params.min_area));
        tracing::info!(
            width = image.width(),
            height = image.height(),
            found,
            kept = particles.len(),
            "particle detection complete"
        );
        Ok(particles)
    }
}

/// Drop candidates whose rounded area is below `min_area`, then number the rest from 1.
#[must_use]
pub fn number_candidates(candidates: Vec<Circle>, min_area: f64) -> Vec<Particle> {
    candidates
        .into_iter()
        .filter(|c| (PI * c.radius * c.radius).round() >= min_area)
        .zip(1..)
        .map(|(c, id): (Circle, ParticleId)| Particle::new(id, c.x, c.y, c.radius))
        .collect()
}
