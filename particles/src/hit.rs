#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::consts::EDGE_BAND;
use crate::store::{Particle, ParticleId};

/// Which part of a particle was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRegion {
    /// Inside the circle, away from the rim. Grabbing here moves the particle.
    Interior,
    /// Within [`EDGE_BAND`] of the rim, on either side. Grabbing here resizes.
    Edge,
}

impl HitRegion {
    /// CSS cursor name shown while hovering this region.
    #[must_use]
    pub fn cursor(self) -> &'static str {
        match self {
            Self::Interior => "move",
            Self::Edge => "nwse-resize",
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub particle_id: ParticleId,
    pub region: HitRegion,
}

/// Classify `image_pt` against a single particle.
///
/// The edge band takes priority, so a point just inside the rim is an edge hit.
#[must_use]
pub fn classify(image_pt: Point, particle: &Particle) -> Option<HitRegion> {
    let distance = image_pt.distance(Point::new(particle.x, particle.y));
    if (distance - particle.radius()).abs() < EDGE_BAND {
        Some(HitRegion::Edge)
    } else if distance < particle.radius() {
        Some(HitRegion::Interior)
    } else {
        None
    }
}

/// Find the particle under `image_pt`, checking the selected particle first.
///
/// Among unselected particles the first in iteration order wins; overlapping
/// particles are not ranked by distance.
#[must_use]
pub fn hit_test(image_pt: Point, particles: &[Particle], selected: Option<ParticleId>) -> Option<Hit> {
    let selected_hit = selected
        .and_then(|id| particles.iter().find(|p| p.id == id))
        .and_then(|p| classify(image_pt, p).map(|region| Hit { particle_id: p.id, region }));
    if selected_hit.is_some() {
        return selected_hit;
    }

    particles
        .iter()
        .filter(|p| Some(p.id) != selected)
        .find_map(|p| classify(image_pt, p).map(|region| Hit { particle_id: p.id, region }))
}
