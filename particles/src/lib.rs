//! Particle detection and editing core for SEM images.
//!
//! A circle finder proposes particles; this crate numbers and filters them,
//! then owns the interactive session in which a user corrects the result:
//! panning and zooming the view, selecting, moving, resizing, adding and
//! deleting particles. Measurements are converted to physical units from a
//! scale-bar calibration at export time.
//!
//! Front ends drive [`engine::EngineCore`] with pointer, wheel and key events
//! and react to the [`engine::Action`]s it returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Input handling and editing operations ([`engine::EngineCore`]) |
//! | [`store`] | Particle model and the committed/working particle store |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`input`] | Modes, input event types and the gesture state machine |
//! | [`hit`] | Hit-testing against particles |
//! | [`overlay`] | View-space drawing primitives for the current state |
//! | [`calibrate`] | Pixel-to-physical scale calibration |
//! | [`detect`] | Detection adapter over a [`detect::CircleFinder`] |
//! | [`vision`] | Built-in gradient Hough circle finder |
//! | [`backend`] | Vision backend readiness signal |
//! | [`export`] | CSV / JSON export and summaries |
//! | [`image_io`] | Image loading and decoding |
//! | [`error`] | Error types |
//! | [`consts`] | Shared numeric constants (zoom limits, minimum radius, etc.) |

pub mod backend;
pub mod calibrate;
pub mod camera;
pub mod consts;
pub mod detect;
pub mod engine;
pub mod error;
pub mod export;
pub mod hit;
pub mod image_io;
pub mod input;
pub mod overlay;
pub mod store;
pub mod vision;
