//! Measurement export.
//!
//! Physical diameters are computed here, at export time, from the current
//! calibration ratio. Nothing physical is ever stored on a particle.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use serde::Serialize;

use crate::calibrate::Calibration;
use crate::error::ExportError;
use crate::store::{Particle, ParticleId};

/// One exported row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: ParticleId,
    pub x: f64,
    pub y: f64,
    pub diameter_px: f64,
    pub diameter_physical: f64,
    pub unit: String,
    pub area_px: f64,
}

impl Record {
    #[must_use]
    pub fn new(particle: &Particle, calibration: &Calibration) -> Self {
        Self {
            id: particle.id,
            x: particle.x,
            y: particle.y,
            diameter_px: particle.diameter(),
            diameter_physical: calibration.to_physical(particle.diameter()),
            unit: calibration.unit.clone(),
            area_px: particle.area(),
        }
    }
}

/// Aggregate figures over an exported set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub unit: String,
    /// `None` when there are no particles.
    pub mean_diameter: Option<f64>,
    pub min_diameter: Option<f64>,
    pub max_diameter: Option<f64>,
}

/// Build one [`Record`] per particle, in order.
#[must_use]
pub fn records(particles: &[Particle], calibration: &Calibration) -> Vec<Record> {
    particles.iter().map(|p| Record::new(p, calibration)).collect()
}

/// CSV with header `ID,X,Y,Diameter(px),Diameter(<unit>),Area(px²)`.
///
/// Pixel values use their shortest exact form; the physical diameter always
/// has three decimals.
#[must_use]
pub fn to_csv(particles: &[Particle], calibration: &Calibration) -> String {
    let mut out = format!("ID,X,Y,Diameter(px),Diameter({}),Area(px²)\n", calibration.unit);
    for r in records(particles, calibration) {
        out.push_str(&format!(
            "{},{},{},{},{:.3},{}\n",
            r.id, r.x, r.y, r.diameter_px, r.diameter_physical, r.area_px
        ));
    }
    out
}

/// Pretty-printed JSON array of [`Record`]s.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn to_json(particles: &[Particle], calibration: &Calibration) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(&records(particles, calibration))?)
}

/// Count and physical diameter statistics.
#[must_use]
pub fn summary(particles: &[Particle], calibration: &Calibration) -> Summary {
    let diameters: Vec<f64> = particles.iter().map(|p| calibration.to_physical(p.diameter())).collect();
    #[allow(clippy::cast_precision_loss)]
    let mean = (!diameters.is_empty()).then(|| diameters.iter().sum::<f64>() / diameters.len() as f64);
    Summary {
        count: diameters.len(),
        unit: calibration.unit.clone(),
        mean_diameter: mean,
        min_diameter: diameters.iter().copied().reduce(f64::min),
        max_diameter: diameters.iter().copied().reduce(f64::max),
    }
}
