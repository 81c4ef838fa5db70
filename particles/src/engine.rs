//! Editing engine: turns pointer, wheel and key input into particle and camera updates.
//!
//! [`EngineCore`] owns everything an editing session needs (store, camera,
//! mode, gesture) and has no host dependencies, so a canvas front end, a
//! native GUI or a test can drive it the same way. Every handler returns the
//! [`Action`]s the host should react to; `RenderNeeded` follows every change
//! to particles, selection or camera.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::camera::{Camera, Point};
use crate::consts::{ARROW_STEP, ARROW_STEP_LARGE, DEFAULT_NEW_RADIUS, FOCUS_ZOOM};
use crate::hit::{self, HitRegion};
use crate::input::{Button, EditorConfig, InputState, Key, Mode, Modifiers, UiState, WheelDelta};
use crate::overlay::{self, ImageBounds, LabelMode, Primitive};
use crate::store::{Particle, ParticleEdit, ParticleId, ParticleStore};

const DEFAULT_CURSOR: &str = "default";
const PAN_CURSOR: &str = "grab";

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ParticleCreated(Particle),
    ParticleUpdated(Particle),
    ParticleDeleted { id: ParticleId },
    SelectionChanged(Option<ParticleId>),
    ViewChanged(Camera),
    SetCursor(String),
    RenderNeeded,
}

/// Core engine state for one image and its particles.
#[derive(Debug, Clone, Default)]
pub struct EngineCore {
    pub store: ParticleStore,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub image_width: f64,
    pub image_height: f64,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Install a fresh detection result, discarding any live edits and the selection.
    pub fn load_detection(&mut self, particles: Vec<Particle>) -> Vec<Action> {
        let had_selection = self.store.selected().is_some();
        let count = particles.len();
        self.store.replace_all(particles);
        self.input = InputState::Idle;
        tracing::info!(count, "detection loaded");

        let mut actions = Vec::new();
        if had_selection {
            actions.push(Action::SelectionChanged(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Set the pixel size of the loaded image.
    pub fn set_image_size(&mut self, width: f64, height: f64) {
        self.image_width = width;
        self.image_height = height;
    }

    /// Set the pixel size of the visible canvas.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Replace the pan and zoom sensitivities.
    pub fn set_config(&mut self, config: EditorConfig) {
        self.ui.config = config;
    }

    // --- Mode ---

    /// Switch interaction mode. Leaving [`Mode::Edit`] commits the working copy.
    pub fn set_mode(&mut self, mode: Mode) -> Vec<Action> {
        let previous = self.ui.mode;
        if previous == Mode::Edit && mode != Mode::Edit {
            self.store.commit();
            tracing::info!(particles = self.store.len(), "edits committed");
        }
        self.ui.mode = mode;
        self.input = InputState::Idle;
        tracing::debug!(?previous, ?mode, "mode changed");

        let mut actions = Vec::new();
        let cursor = if mode == Mode::Pan { PAN_CURSOR } else { DEFAULT_CURSOR };
        self.push_cursor(cursor, &mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Throw away live edits and return to [`Mode::View`].
    pub fn cancel_edit(&mut self) -> Vec<Action> {
        let before = self.store.selected();
        self.store.discard();
        self.ui.mode = Mode::View;
        self.input = InputState::Idle;
        tracing::info!("edits discarded");

        let mut actions = Vec::new();
        if self.store.selected() != before {
            actions.push(Action::SelectionChanged(self.store.selected()));
        }
        self.push_cursor(DEFAULT_CURSOR, &mut actions);
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Particle operations ---

    /// Add a default-sized particle at the image center and select it.
    pub fn add_particle(&mut self) -> Vec<Action> {
        let center = self.image_center();
        let id = self.store.add_at(center.x, center.y, DEFAULT_NEW_RADIUS);
        self.store.select(id);
        tracing::debug!(id, "particle added");

        let mut actions = Vec::new();
        if let Some(particle) = self.store.find_by_id(id) {
            actions.push(Action::ParticleCreated(particle.clone()));
        }
        actions.push(Action::SelectionChanged(Some(id)));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Delete the selected particle, if any.
    pub fn delete_selected(&mut self) -> Vec<Action> {
        let Some(id) = self.store.selected() else {
            return Vec::new();
        };
        if self.store.remove(id).is_none() {
            return Vec::new();
        }
        self.end_gesture_on(id);
        tracing::debug!(id, "particle deleted");
        vec![Action::ParticleDeleted { id }, Action::SelectionChanged(None), Action::RenderNeeded]
    }

    /// Clear the selection.
    pub fn deselect(&mut self) -> Vec<Action> {
        match self.store.deselect() {
            Some(id) => {
                self.end_gesture_on(id);
                vec![Action::SelectionChanged(None), Action::RenderNeeded]
            }
            None => Vec::new(),
        }
    }

    /// Select a particle, zoom in to at least [`FOCUS_ZOOM`] and center it in the viewport.
    pub fn focus_particle(&mut self, id: ParticleId) -> Vec<Action> {
        let Some(target) = self.store.find_by_id(id).map(|p| Point::new(p.x, p.y)) else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        self.select(id, &mut actions);
        self.camera.zoom = self.camera.zoom.max(FOCUS_ZOOM);
        self.camera.center_on(target, self.viewport_center());
        tracing::debug!(id, zoom = self.camera.zoom, "focused particle");

        actions.push(Action::ViewChanged(self.camera));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Set the zoom level from the slider, anchored at the viewport center.
    pub fn set_zoom(&mut self, zoom: f64) -> Vec<Action> {
        let anchor = self.viewport_center();
        self.zoom_to(anchor, zoom)
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        match button {
            Button::Secondary => Vec::new(),
            Button::Middle => {
                self.start_pan(screen_pt);
                Vec::new()
            }
            Button::Primary => self.primary_down(screen_pt),
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        match self.input {
            InputState::Panning { last_screen } => {
                let sensitivity = self.ui.config.pan_sensitivity;
                let (dx, dy) = (screen_pt.x - last_screen.x, screen_pt.y - last_screen.y);
                self.camera.pan_by(dx * sensitivity, dy * sensitivity);
                self.input = InputState::Panning { last_screen: screen_pt };
                vec![Action::ViewChanged(self.camera), Action::RenderNeeded]
            }
            InputState::MovingParticle { id } => {
                let q = self.camera.screen_to_image(screen_pt);
                self.edit_particle(id, ParticleEdit::MoveTo { x: q.x, y: q.y })
            }
            InputState::ResizingParticle { id } => {
                let q = self.camera.screen_to_image(screen_pt);
                let Some(center) = self.store.find_by_id(id).map(|p| Point::new(p.x, p.y)) else {
                    self.input = InputState::Idle;
                    return Vec::new();
                };
                self.edit_particle(id, ParticleEdit::Resize { radius: q.distance(center) })
            }
            InputState::Idle => {
                if self.ui.mode != Mode::Edit {
                    return Vec::new();
                }
                let q = self.camera.screen_to_image(screen_pt);
                let cursor = hit::hit_test(q, self.store.particles(), self.store.selected())
                    .map_or(DEFAULT_CURSOR, |hit| hit.region.cursor());
                let mut actions = Vec::new();
                self.push_cursor(cursor, &mut actions);
                actions
            }
        }
    }

    /// End any gesture. The selection is kept.
    pub fn on_pointer_up(&mut self) -> Vec<Action> {
        if !self.input.is_active() {
            return Vec::new();
        }
        tracing::debug!(state = ?self.input, "gesture ended");
        self.input = InputState::Idle;
        vec![Action::RenderNeeded]
    }

    /// The pointer left the canvas. Only panning is cancelled; particle drags continue.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        if matches!(self.input, InputState::Panning { .. }) {
            self.input = InputState::Idle;
        }
        Vec::new()
    }

    /// Wheel up zooms in, wheel down zooms out, anchored at the cursor.
    pub fn on_wheel(&mut self, screen_pt: Point, delta: WheelDelta) -> Vec<Action> {
        if matches!(self.input, InputState::ResizingParticle { .. }) || delta.dy == 0.0 {
            return Vec::new();
        }
        let step = self.ui.config.zoom_sensitivity;
        let zoom = if delta.dy < 0.0 { self.camera.zoom + step } else { self.camera.zoom - step };
        self.zoom_to(screen_pt, zoom)
    }

    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if key.0 == "Escape" {
            return self.deselect();
        }
        if self.ui.mode != Mode::Edit {
            return Vec::new();
        }
        let step = if modifiers.shift { ARROW_STEP_LARGE } else { ARROW_STEP };
        let edit = match key.0.as_str() {
            "Delete" | "Backspace" => return self.delete_selected(),
            "+" | "=" => ParticleEdit::NudgeDiameter { steps: 1 },
            "-" => ParticleEdit::NudgeDiameter { steps: -1 },
            "ArrowLeft" => ParticleEdit::Translate { dx: -step, dy: 0.0 },
            "ArrowRight" => ParticleEdit::Translate { dx: step, dy: 0.0 },
            "ArrowUp" => ParticleEdit::Translate { dx: 0.0, dy: -step },
            "ArrowDown" => ParticleEdit::Translate { dx: 0.0, dy: step },
            _ => return Vec::new(),
        };
        match self.store.selected() {
            Some(id) => self.edit_particle(id, edit),
            None => Vec::new(),
        }
    }

    // --- Queries ---

    /// The currently selected particle id, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ParticleId> {
        self.store.selected()
    }

    /// The current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        self.camera
    }

    /// Look up a particle in the working copy.
    #[must_use]
    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.store.find_by_id(id)
    }

    /// Working copy, as drawn.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        self.store.particles()
    }

    /// Overlay primitives for the current state.
    #[must_use]
    pub fn scene(&self, labels: LabelMode) -> Vec<Primitive> {
        let bounds = ImageBounds { width: self.image_width, height: self.image_height };
        overlay::scene(self.store.particles(), &self.camera, self.store.selected(), bounds, labels)
    }

    // --- Internals ---

    fn primary_down(&mut self, screen_pt: Point) -> Vec<Action> {
        if self.ui.mode == Mode::Pan {
            self.start_pan(screen_pt);
            return Vec::new();
        }

        let q = self.camera.screen_to_image(screen_pt);
        let hit = hit::hit_test(q, self.store.particles(), self.store.selected());
        let mut actions = Vec::new();
        match (self.ui.mode, hit) {
            (Mode::Edit, Some(hit)) => {
                if self.select(hit.particle_id, &mut actions) {
                    actions.push(Action::RenderNeeded);
                }
                self.input = match hit.region {
                    HitRegion::Interior => InputState::MovingParticle { id: hit.particle_id },
                    HitRegion::Edge => InputState::ResizingParticle { id: hit.particle_id },
                };
                tracing::debug!(id = hit.particle_id, state = ?self.input, "gesture started");
            }
            (Mode::View, None) if self.camera.is_zoomed() => self.start_pan(screen_pt),
            (_, Some(hit)) => {
                if self.select(hit.particle_id, &mut actions) {
                    actions.push(Action::RenderNeeded);
                }
            }
            (_, None) => {
                if self.store.deselect().is_some() {
                    actions.push(Action::SelectionChanged(None));
                    actions.push(Action::RenderNeeded);
                }
            }
        }
        actions
    }

    fn start_pan(&mut self, screen_pt: Point) {
        self.input = InputState::Panning { last_screen: screen_pt };
        tracing::debug!("panning started");
    }

    /// Select `id`, recording a `SelectionChanged` if it differs from the current selection.
    fn select(&mut self, id: ParticleId, actions: &mut Vec<Action>) -> bool {
        if self.store.selected() == Some(id) || !self.store.select(id) {
            return false;
        }
        actions.push(Action::SelectionChanged(Some(id)));
        true
    }

    fn edit_particle(&mut self, id: ParticleId, edit: ParticleEdit) -> Vec<Action> {
        match self.store.apply(id, edit) {
            Some(particle) => vec![Action::ParticleUpdated(particle.clone()), Action::RenderNeeded],
            None => {
                self.input = InputState::Idle;
                Vec::new()
            }
        }
    }

    fn zoom_to(&mut self, anchor: Point, zoom: f64) -> Vec<Action> {
        if !self.camera.zoom_at(anchor, zoom) {
            return Vec::new();
        }
        tracing::debug!(zoom = self.camera.zoom, "zoom changed");
        vec![Action::ViewChanged(self.camera), Action::RenderNeeded]
    }

    /// Drop a move or resize gesture that targets `id`; panning is unaffected.
    fn end_gesture_on(&mut self, id: ParticleId) {
        if let InputState::MovingParticle { id: busy } | InputState::ResizingParticle { id: busy } = self.input {
            if busy == id {
                self.input = InputState::Idle;
            }
        }
    }

    fn push_cursor(&mut self, cursor: &str, actions: &mut Vec<Action>) {
        if self.ui.cursor.as_deref() != Some(cursor) {
            self.ui.cursor = Some(cursor.to_owned());
            actions.push(Action::SetCursor(cursor.to_owned()));
        }
    }

    fn viewport_center(&self) -> Point {
        Point::new(self.viewport_width * 0.5, self.viewport_height * 0.5)
    }

    fn image_center(&self) -> Point {
        Point::new(self.image_width * 0.5, self.image_height * 0.5)
    }
}
