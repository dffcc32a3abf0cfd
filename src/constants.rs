//! Centralized constants used across the application.
//!
//! This module contains magic numbers and configuration values that are used
//! in multiple places or would benefit from being named constants.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Padding between the document edge and the canvas frame edge, in document
/// pixels. This is the `offset` of the geometry snapshot: every data-space
/// coordinate is shifted by this amount to land in canvas space.
pub const FRAME_PADDING: f32 = 20.0;

/// Review server used when no config file exists yet
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8787/api/v1";

/// Minimum drag distance (in document pixels) before a draft region counts
/// as drawn rather than an accidental click
pub const MIN_DRAFT_DRAG: f32 = 5.0;

/// Camera zoom clamp range (orthographic projection scale)
pub const MIN_ZOOM_SCALE: f32 = 0.1;
pub const MAX_ZOOM_SCALE: f32 = 10.0;

/// Rotation step for the Q/E canvas rotation shortcuts, in degrees
pub const ROTATION_STEP_DEGREES: f32 = 15.0;

/// Extra margin kept around the document when fitting it to the window
pub const FIT_MARGIN: f32 = 40.0;

/// How long a toast notification stays on screen, in seconds
pub const NOTIFICATION_TTL: f32 = 6.0;
