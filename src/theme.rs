//! Centralized color theme for the application.
//!
//! This module provides all colors used throughout the review UI and canvas
//! rendering. Modify values here to change the application's color scheme.

use bevy::prelude::Color;
use bevy_egui::egui;

// ============================================================================
// Issue Region Colors
// ============================================================================

/// Outline for an issue's highlight region
pub const REGION_OUTLINE: Color = Color::srgba(1.0, 0.35, 0.2, 0.9);

/// Outline for the draft region while the reviewer is still drawing it
pub const DRAFT_PREVIEW_OUTLINE: Color = Color::srgba(1.0, 0.75, 0.2, 0.8);

/// Outline for the committed draft region (id 0)
pub const DRAFT_REGION_OUTLINE: Color = Color::srgba(1.0, 0.75, 0.2, 1.0);

// ============================================================================
// Marker / Dialog Colors (egui)
// ============================================================================

/// Background of a collapsed marker for an unresolved issue
pub const MARKER_OPEN_BG: egui::Color32 = egui::Color32::from_rgb(170, 48, 33);

/// Background of a collapsed marker for a resolved issue
pub const MARKER_RESOLVED_BG: egui::Color32 = egui::Color32::from_rgb(46, 110, 58);

/// Marker text color
pub const MARKER_TEXT: egui::Color32 = egui::Color32::from_rgb(240, 240, 240);

/// Accent color for the dialog header strip
pub const DIALOG_HEADER: egui::Color32 = egui::Color32::from_rgb(45, 45, 48);

/// Error text in notifications
pub const NOTIFICATION_ERROR: egui::Color32 = egui::Color32::from_rgb(255, 100, 100);

/// Informational text in notifications
pub const NOTIFICATION_INFO: egui::Color32 = egui::Color32::from_rgb(180, 200, 255);
