//! Particle model and the in-memory store that owns an editing session.
//!
//! A [`Particle`] stores only its center and radius. Diameter and area are
//! derived on every read, and the radius setter enforces [`MIN_RADIUS`], so no
//! sequence of edits can leave a particle with inconsistent measurements.
//!
//! [`ParticleStore`] keeps two copies of the particle set. The committed copy
//! is what detection produced or what the user last confirmed; the working
//! copy receives every live edit. [`ParticleStore::commit`] replaces the
//! committed copy wholesale and [`ParticleStore::discard`] throws the working
//! copy away. There is no field-level merge between the two.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::f64::consts::PI;

use crate::consts::{DIAMETER_NUDGE, ID_STEP, MIN_RADIUS};

/// Identifier for a particle, unique within a session.
pub type ParticleId = u32;

/// A circular region in image space.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Session-unique identifier.
    pub id: ParticleId,
    /// Center x in image pixels.
    pub x: f64,
    /// Center y in image pixels.
    pub y: f64,
    radius: f64,
}

impl Particle {
    /// Create a particle; `radius` is clamped to [`MIN_RADIUS`].
    #[must_use]
    pub fn new(id: ParticleId, x: f64, y: f64, radius: f64) -> Self {
        Self { id, x, y, radius: clamp_radius(radius) }
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Always `2 × radius`.
    #[must_use]
    pub fn diameter(&self) -> f64 {
        self.radius * 2.0
    }

    /// `π × radius²`, rounded to whole square pixels.
    #[must_use]
    pub fn area(&self) -> f64 {
        (PI * self.radius * self.radius).round()
    }

    /// Set the radius, clamped to [`MIN_RADIUS`].
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = clamp_radius(radius);
    }

    /// Grow or shrink the diameter by `delta`, keeping the center fixed.
    pub fn nudge_diameter(&mut self, delta: f64) {
        self.set_radius(self.radius + delta / 2.0);
    }

    /// Place the center at `(x, y)`.
    pub fn move_to(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }
}

fn clamp_radius(radius: f64) -> f64 {
    // f64::max returns the non-NaN operand, so NaN lands on the floor too.
    radius.max(MIN_RADIUS)
}

/// A single edit applied through [`ParticleStore::apply`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleEdit {
    /// Absolute placement of the center.
    MoveTo { x: f64, y: f64 },
    /// Relative shift of the center.
    Translate { dx: f64, dy: f64 },
    /// Absolute radius (clamped).
    Resize { radius: f64 },
    /// Diameter change by a signed number of nudge steps.
    NudgeDiameter { steps: i32 },
}

impl ParticleEdit {
    fn apply_to(self, particle: &mut Particle) {
        match self {
            Self::MoveTo { x, y } => particle.move_to(x, y),
            Self::Translate { dx, dy } => particle.move_to(particle.x + dx, particle.y + dy),
            Self::Resize { radius } => particle.set_radius(radius),
            Self::NudgeDiameter { steps } => particle.nudge_diameter(f64::from(steps) * DIAMETER_NUDGE),
        }
    }
}

/// Committed and working particle sets plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    committed: Vec<Particle>,
    working: Vec<Particle>,
    selected: Option<ParticleId>,
    /// Highest id ever handed out this session; ids are never reused.
    high_water: ParticleId,
}

impl ParticleStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Whole-set operations ---

    /// Replace both copies with a fresh detection result and clear the selection.
    pub fn replace_all(&mut self, particles: Vec<Particle>) {
        self.bump_high_water(&particles);
        self.committed.clone_from(&particles);
        self.working = particles;
        self.selected = None;
    }

    /// Make the working copy the committed copy.
    pub fn commit(&mut self) {
        self.committed.clone_from(&self.working);
    }

    /// Throw away live edits, restoring the committed copy.
    ///
    /// The selection survives only if the selected particle still exists.
    pub fn discard(&mut self) {
        self.working.clone_from(&self.committed);
        if self.selected.is_some_and(|id| self.find_by_id(id).is_none()) {
            self.selected = None;
        }
    }

    /// Whether the working copy differs from the committed copy.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.working != self.committed
    }

    // --- Per-particle operations (working copy) ---

    /// The id the next [`add`](Self::add) will assign.
    #[must_use]
    pub fn next_id(&self) -> ParticleId {
        let max_live = self.working.iter().map(|p| p.id).max().unwrap_or(0);
        self.high_water.max(max_live).saturating_add(ID_STEP)
    }

    /// Append `particle` under a freshly minted id and return that id.
    pub fn add(&mut self, mut particle: Particle) -> ParticleId {
        let id = self.next_id();
        particle.id = id;
        self.high_water = id;
        self.working.push(particle);
        id
    }

    /// Add a particle of `radius` centered at `(x, y)`.
    pub fn add_at(&mut self, x: f64, y: f64, radius: f64) -> ParticleId {
        self.add(Particle::new(0, x, y, radius))
    }

    /// Remove a particle, clearing the selection if it pointed at it.
    pub fn remove(&mut self, id: ParticleId) -> Option<Particle> {
        let index = self.working.iter().position(|p| p.id == id)?;
        if self.selected == Some(id) {
            self.selected = None;
        }
        Some(self.working.remove(index))
    }

    /// Run `mutator` against a particle. Returns `None` if the id is unknown.
    ///
    /// The mutator only sees [`Particle`]'s public surface, so derived
    /// measurements and the radius floor hold afterwards.
    pub fn update<F>(&mut self, id: ParticleId, mutator: F) -> Option<&Particle>
    where
        F: FnOnce(&mut Particle),
    {
        let particle = self.working.iter_mut().find(|p| p.id == id)?;
        mutator(particle);
        Some(particle)
    }

    /// Apply a typed edit. Returns `None` if the id is unknown.
    pub fn apply(&mut self, id: ParticleId, edit: ParticleEdit) -> Option<&Particle> {
        self.update(id, |p| edit.apply_to(p))
    }

    /// Look up a particle in the working copy.
    #[must_use]
    pub fn find_by_id(&self, id: ParticleId) -> Option<&Particle> {
        self.working.iter().find(|p| p.id == id)
    }

    // --- Selection ---

    /// Select a particle. Unknown ids leave the selection untouched and return `false`.
    pub fn select(&mut self, id: ParticleId) -> bool {
        if self.find_by_id(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }

    /// Clear the selection, returning what was selected.
    pub fn deselect(&mut self) -> Option<ParticleId> {
        self.selected.take()
    }

    #[must_use]
    pub fn selected(&self) -> Option<ParticleId> {
        self.selected
    }

    /// The selected particle, if any.
    #[must_use]
    pub fn selected_particle(&self) -> Option<&Particle> {
        self.selected.and_then(|id| self.find_by_id(id))
    }

    // --- Views ---

    /// Working copy in insertion order.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.working
    }

    /// Committed copy in insertion order.
    #[must_use]
    pub fn committed(&self) -> &[Particle] {
        &self.committed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.working.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    fn bump_high_water(&mut self, particles: &[Particle]) {
        if let Some(max) = particles.iter().map(|p| p.id).max() {
            self.high_water = self.high_water.max(max);
        }
    }
}
