//! Input model: interaction modes, mouse buttons, keys, and the gesture state machine.
//!
//! `Mode` is the user's chosen way of interacting with the canvas and is
//! independent of any gesture. `InputState` is the gesture being tracked
//! between pointer-down and pointer-up, carrying the context needed to turn
//! later pointer-moves into particle or camera updates.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::consts::{DEFAULT_PAN_SENSITIVITY, DEFAULT_ZOOM_SENSITIVITY};
use crate::store::ParticleId;

/// Which interaction mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Detection results are shown read-only. Clicking selects; dragging pans when zoomed in.
    #[default]
    View,
    /// Particles can be moved, resized, added and deleted.
    Edit,
    /// Every drag pans the view.
    Pan,
}

/// Keyboard modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held; arrow keys move ten times further.
    pub shift: bool,
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button; always pans.
    Middle,
    /// Right mouse button; ignored.
    Secondary,
}

/// A keyboard key as reported by the browser (e.g. `"Delete"`, `"Escape"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down = zoom out).
    pub dy: f64,
}

/// User-tunable interaction settings (the sensitivity sliders).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Multiplier applied to pointer deltas while panning.
    pub pan_sensitivity: f64,
    /// Zoom change per wheel notch.
    pub zoom_sensitivity: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self { pan_sensitivity: DEFAULT_PAN_SENSITIVITY, zoom_sensitivity: DEFAULT_ZOOM_SENSITIVITY }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Current interaction mode.
    pub mode: Mode,
    /// Sensitivity settings.
    pub config: EditorConfig,
    /// Last cursor name pushed to the host, to avoid repeating it on every move.
    pub cursor: Option<String>,
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is dragging the view.
    Panning {
        /// Screen-space position of the previous pointer event, used to compute pan delta.
        last_screen: Point,
    },
    /// The user is dragging a particle; its center follows the pointer.
    MovingParticle {
        /// Id of the particle being moved.
        id: ParticleId,
    },
    /// The user is dragging a particle's rim; its radius follows the pointer distance.
    ResizingParticle {
        /// Id of the particle being resized.
        id: ParticleId,
    },
}

impl InputState {
    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}
