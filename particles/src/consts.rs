//! Shared numeric constants for the particles crate.

// ── Particles ───────────────────────────────────────────────────

/// Smallest radius any particle may have, in image pixels.
pub const MIN_RADIUS: f64 = 5.0;

/// Radius given to a manually added particle.
pub const DEFAULT_NEW_RADIUS: f64 = 20.0;

/// Gap between manually minted ids, leaving room for hand-numbered insertions.
pub const ID_STEP: u32 = 10;

/// Diameter change applied by one keyboard nudge, in image pixels.
pub const DIAMETER_NUDGE: f64 = 2.0;

/// Distance moved by one arrow-key press, in image pixels.
pub const ARROW_STEP: f64 = 1.0;

/// Distance moved by one arrow-key press with shift held.
pub const ARROW_STEP_LARGE: f64 = 10.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Half-width of the band around a particle's rim that counts as a resize grab, in image pixels.
pub const EDGE_BAND: f64 = 10.0;

// ── Camera ──────────────────────────────────────────────────────

/// Lowest zoom factor; the whole image is visible.
pub const MIN_ZOOM: f64 = 1.0;

/// Highest zoom factor reachable by wheel or slider.
pub const MAX_ZOOM: f64 = 10.0;

/// Zoom applied by jump-to-particle when the view is zoomed out further than this.
pub const FOCUS_ZOOM: f64 = 2.0;

/// Default multiplier applied to pointer deltas while panning.
pub const DEFAULT_PAN_SENSITIVITY: f64 = 0.5;

/// Default zoom change per wheel notch.
pub const DEFAULT_ZOOM_SENSITIVITY: f64 = 0.05;

// ── Detection ───────────────────────────────────────────────────

/// Upper Canny threshold handed to the circle finder; not user-tunable.
pub const EDGE_THRESHOLD: f64 = 100.0;

// ── Overlay ─────────────────────────────────────────────────────

/// Outline stroke width, in screen pixels.
pub const OUTLINE_WIDTH_PX: f64 = 2.0;

/// Radius of the filled center dot, in screen pixels.
pub const CENTER_DOT_RADIUS_PX: f64 = 2.0;

/// Radius of a selection resize handle, in screen pixels.
pub const HANDLE_RADIUS_PX: f64 = 4.0;
