//! Overlay scene: what to draw on top of the image.
//!
//! [`scene`] is a pure function from particle state and camera to a list of
//! view-space [`Primitive`]s. It touches no drawing surface; a host (canvas,
//! raster, SVG) walks the list and paints it. Layers come out in paint order:
//! particles first, then the selection highlight and its handles.

#[cfg(test)]
#[path = "overlay_test.rs"]
mod overlay_test;

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, Point};
use crate::consts::{CENTER_DOT_RADIUS_PX, HANDLE_RADIUS_PX, OUTLINE_WIDTH_PX};
use crate::store::{Particle, ParticleId};

/// Horizontal label offset left of the center for diameter labels, in image pixels.
const DIAMETER_LABEL_OFFSET: f64 = 20.0;

/// Horizontal label offset for id labels, which are narrower.
const ID_LABEL_OFFSET: f64 = 10.0;

/// Gap between the top of the rim and the label baseline.
const LABEL_GAP: f64 = 5.0;

/// Labels never sit higher than this, so they stay on the image.
const LABEL_MIN_Y: f64 = 15.0;

/// What each particle's label shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    /// `"{diameter}px"`.
    #[default]
    Diameter,
    /// The particle id.
    Id,
}

/// One drawable element in view space.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Stroked circle around a particle.
    Outline { center: Point, radius: f64, width: f64 },
    /// Filled dot at a particle's center.
    CenterDot { center: Point, radius: f64 },
    /// Text anchored at its bottom-left corner.
    Label { at: Point, text: String },
    /// Emphasis ring around the selected particle.
    Highlight { center: Point, radius: f64, width: f64 },
    /// Resize grab point on the selected particle's rim.
    Handle { center: Point, radius: f64 },
}

/// Image extent used to skip particles whose center falls outside it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBounds {
    pub width: f64,
    pub height: f64,
}

impl ImageBounds {
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && x < self.width && y >= 0.0 && y < self.height
    }
}

/// Build the overlay for `particles` as seen through `camera`.
#[must_use]
pub fn scene(
    particles: &[Particle],
    camera: &Camera,
    selected: Option<ParticleId>,
    bounds: ImageBounds,
    labels: LabelMode,
) -> Vec<Primitive> {
    let mut out = Vec::with_capacity(particles.len() * 3 + 5);
    for particle in visible(particles, bounds) {
        push_particle(&mut out, particle, camera, labels);
    }

    if let Some(particle) = selected.and_then(|id| visible(particles, bounds).find(|p| p.id == id)) {
        push_selection(&mut out, particle, camera);
    }
    out
}

/// Label text for `particle`.
#[must_use]
pub fn label_text(particle: &Particle, labels: LabelMode) -> String {
    match labels {
        LabelMode::Diameter => format!("{}px", particle.diameter()),
        LabelMode::Id => particle.id.to_string(),
    }
}

/// Label anchor in image space: left of center, just above the rim, clamped onto the image.
#[must_use]
pub fn label_anchor(particle: &Particle, labels: LabelMode) -> Point {
    let offset = match labels {
        LabelMode::Diameter => DIAMETER_LABEL_OFFSET,
        LabelMode::Id => ID_LABEL_OFFSET,
    };
    Point::new((particle.x - offset).max(0.0), (particle.y - particle.radius() - LABEL_GAP).max(LABEL_MIN_Y))
}

fn visible(particles: &[Particle], bounds: ImageBounds) -> impl Iterator<Item = &Particle> {
    particles.iter().filter(move |p| bounds.contains(p.x, p.y))
}

fn push_particle(out: &mut Vec<Primitive>, particle: &Particle, camera: &Camera, labels: LabelMode) {
    let center = camera.image_to_screen(Point::new(particle.x, particle.y));
    out.push(Primitive::Outline { center, radius: particle.radius() * camera.zoom, width: OUTLINE_WIDTH_PX });
    out.push(Primitive::CenterDot { center, radius: CENTER_DOT_RADIUS_PX });
    out.push(Primitive::Label {
        at: camera.image_to_screen(label_anchor(particle, labels)),
        text: label_text(particle, labels),
    });
}

fn push_selection(out: &mut Vec<Primitive>, particle: &Particle, camera: &Camera) {
    let r = particle.radius();
    let center = camera.image_to_screen(Point::new(particle.x, particle.y));
    out.push(Primitive::Highlight { center, radius: r * camera.zoom, width: OUTLINE_WIDTH_PX * 2.0 });

    // East, south, west, north.
    for (dx, dy) in [(r, 0.0), (0.0, r), (-r, 0.0), (0.0, -r)] {
        let handle = camera.image_to_screen(Point::new(particle.x + dx, particle.y + dy));
        out.push(Primitive::Handle { center: handle, radius: HANDLE_RADIUS_PX });
    }
}
