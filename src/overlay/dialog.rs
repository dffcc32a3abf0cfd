//! Dialog state machine for the single expanded issue.
//!
//! At most one issue shows its conversation dialog at any time. The state is
//! an explicit enum rather than a nullable id so the single-slot invariant
//! holds by construction. The dialog's remembered screen adjustment lives in
//! [`DialogPlacement`], explicit per-dialog state instead of a module
//! global, and is reset whenever a different issue expands.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::collections::HashMap;

use crate::canvas::ToggleRegionVisibility;
use crate::review::IssueSnapshot;

/// Which issue, if any, currently shows its dialog
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogState {
    #[default]
    Collapsed,
    Expanded(i64),
}

impl DialogState {
    pub fn expanded_issue(&self) -> Option<i64> {
        match self {
            DialogState::Collapsed => None,
            DialogState::Expanded(id) => Some(*id),
        }
    }

    /// Expanding an already-expanded issue is a no-op
    pub fn expand(&mut self, issue_id: i64) {
        *self = DialogState::Expanded(issue_id);
    }

    pub fn collapse(&mut self) {
        *self = DialogState::Collapsed;
    }
}

/// Expanded dialog dimensions in screen pixels
pub const DIALOG_WIDTH: f32 = 230.0;
pub const DIALOG_HEIGHT: f32 = 215.0;

/// Pixel thresholds and return steps for the rubber-band behavior.
/// Inherited tuning values; adjust here, not inline.
pub struct DialogEdgeProfile {
    pub exit_top: f32,
    pub exit_bottom: f32,
    pub exit_left: f32,
    pub exit_right: f32,
    pub step_x: f32,
    pub step_y: f32,
}

pub const DIALOG_EDGE_PROFILE: DialogEdgeProfile = DialogEdgeProfile {
    exit_top: -100.0,
    exit_bottom: 718.0,
    exit_left: -220.0,
    exit_right: 1300.0,
    step_x: DIALOG_WIDTH / 2.0,
    step_y: DIALOG_HEIGHT / 2.4432,
};

/// True when the dialog rectangle at `pos` has no intersection with the
/// viewport at all
pub fn fully_outside_viewport(pos: Vec2, viewport: Vec2) -> bool {
    pos.x > viewport.x
        || pos.y > viewport.y
        || pos.x + DIALOG_WIDTH < 0.0
        || pos.y + DIALOG_HEIGHT < 0.0
}

/// Corrective nudge pulling an off-screen dialog back toward the visible
/// band, one step per axis, clamped so the correction cannot push it out the
/// opposite edge. Returns `Vec2::ZERO` when the position is inside every
/// threshold.
pub fn edge_correction(pos: Vec2) -> Vec2 {
    let profile = &DIALOG_EDGE_PROFILE;
    let mut target = pos;

    if pos.y > profile.exit_bottom {
        target.y = (pos.y - profile.step_y).max(profile.exit_top);
    } else if pos.y < profile.exit_top {
        target.y = (pos.y + profile.step_y).min(profile.exit_bottom);
    }

    if pos.x > profile.exit_right {
        target.x = (pos.x - profile.step_x).max(profile.exit_left);
    } else if pos.x < profile.exit_left {
        target.x = (pos.x + profile.step_x).min(profile.exit_right);
    }

    target - pos
}

/// Screen-space adjustment applied to the expanded dialog after the canvas
/// projection, accumulated by the rubber-band return behavior
#[derive(Resource, Default)]
pub struct DialogPlacement {
    for_issue: Option<i64>,
    pin_offset: Vec2,
}

impl DialogPlacement {
    /// Current adjustment for `issue_id`, resetting when the dialog moved to
    /// a different issue
    pub fn offset_for(&mut self, issue_id: i64) -> Vec2 {
        if self.for_issue != Some(issue_id) {
            self.for_issue = Some(issue_id);
            self.pin_offset = Vec2::ZERO;
        }
        self.pin_offset
    }

    pub fn nudge(&mut self, delta: Vec2) {
        self.pin_offset += delta;
    }
}

/// UI-side state of the expanded dialog: the comment input, the delete
/// confirmation, and the rectangle of the last rendered window (used for
/// outside-click detection)
#[derive(Resource, Default)]
pub struct DialogUiState {
    pub for_issue: Option<i64>,
    pub input: String,
    pub confirm_delete: bool,
    pub window_rect: Option<(Vec2, Vec2)>,
}

impl DialogUiState {
    /// Reset per-dialog input when a different issue expands
    pub fn sync_issue(&mut self, issue_id: i64) {
        if self.for_issue != Some(issue_id) {
            self.for_issue = Some(issue_id);
            self.input.clear();
            self.confirm_delete = false;
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        match self.window_rect {
            Some((min, max)) => {
                point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
            }
            None => false,
        }
    }
}

/// A pointer-down anywhere outside the dialog's rectangle collapses it
pub fn collapse_on_outside_click(
    mouse_button: Res<ButtonInput<MouseButton>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    ui_state: Res<DialogUiState>,
    mut dialog: ResMut<DialogState>,
) {
    if *dialog == DialogState::Collapsed {
        return;
    }
    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }
    // Clicks belong to the confirmation modal while it is up
    if ui_state.confirm_delete {
        return;
    }

    let Ok(window) = window_query.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };

    if !ui_state.contains(cursor) {
        dialog.collapse();
    }
}

/// Keeps each issue's on-canvas highlight in step with its resolved flag.
///
/// Unresolved issues show their highlight region; resolved issues hide it.
/// The flip goes through a message so it lands one tick later, after the
/// canvas has finished its own region setup.
pub fn sync_region_highlights(
    snapshot: Res<IssueSnapshot>,
    mut previous: Local<HashMap<i64, bool>>,
    mut toggles: MessageWriter<ToggleRegionVisibility>,
) {
    if !snapshot.is_changed() {
        return;
    }

    for (id, issue) in snapshot.issues.iter() {
        if let Some(was_resolved) = previous.get(id)
            && *was_resolved != issue.resolved
        {
            toggles.write(ToggleRegionVisibility {
                issue_id: *id,
                visible: !issue.resolved,
            });
        }
    }

    *previous = snapshot
        .issues
        .iter()
        .map(|(id, issue)| (*id, issue.resolved))
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialog_state_single_slot() {
        let mut state = DialogState::default();
        assert_eq!(state.expanded_issue(), None);

        state.expand(4);
        assert_eq!(state.expanded_issue(), Some(4));

        // Expanding another issue replaces, never accumulates
        state.expand(9);
        assert_eq!(state.expanded_issue(), Some(9));

        state.collapse();
        assert_eq!(state, DialogState::Collapsed);
    }

    #[test]
    fn test_reexpanding_same_issue_is_noop() {
        let mut state = DialogState::Expanded(4);
        state.expand(4);
        assert_eq!(state, DialogState::Expanded(4));
    }

    #[test]
    fn test_fully_outside_viewport() {
        let viewport = Vec2::new(1600.0, 900.0);
        assert!(!fully_outside_viewport(Vec2::new(100.0, 100.0), viewport));
        // Partially visible still counts as visible
        assert!(!fully_outside_viewport(
            Vec2::new(-DIALOG_WIDTH + 10.0, 100.0),
            viewport
        ));
        assert!(fully_outside_viewport(Vec2::new(1601.0, 100.0), viewport));
        assert!(fully_outside_viewport(Vec2::new(100.0, 901.0), viewport));
        assert!(fully_outside_viewport(
            Vec2::new(-DIALOG_WIDTH - 1.0, 100.0),
            viewport
        ));
        assert!(fully_outside_viewport(
            Vec2::new(100.0, -DIALOG_HEIGHT - 1.0),
            viewport
        ));
    }

    #[test]
    fn test_edge_correction_steps_back_from_bottom() {
        let pos = Vec2::new(400.0, 800.0);
        let delta = edge_correction(pos);
        assert_eq!(delta.x, 0.0);
        assert!((delta.y + DIALOG_EDGE_PROFILE.step_y).abs() < 1e-4);
    }

    #[test]
    fn test_edge_correction_steps_back_from_top_and_left() {
        let pos = Vec2::new(-300.0, -150.0);
        let delta = edge_correction(pos);
        assert!((delta.x - DIALOG_EDGE_PROFILE.step_x).abs() < 1e-4);
        assert!((delta.y - DIALOG_EDGE_PROFILE.step_y).abs() < 1e-4);
    }

    #[test]
    fn test_edge_correction_zero_inside_thresholds() {
        assert_eq!(edge_correction(Vec2::new(400.0, 300.0)), Vec2::ZERO);
    }

    #[test]
    fn test_edge_correction_clamps_to_opposite_edge() {
        // A ridiculous position cannot be corrected past the opposite band
        let pos = Vec2::new(400.0, DIALOG_EDGE_PROFILE.exit_top - 10_000.0);
        let delta = edge_correction(pos);
        assert!(pos.y + delta.y <= DIALOG_EDGE_PROFILE.exit_bottom);
    }

    #[test]
    fn test_placement_resets_per_issue() {
        let mut placement = DialogPlacement::default();
        assert_eq!(placement.offset_for(1), Vec2::ZERO);

        placement.nudge(Vec2::new(-10.0, 5.0));
        assert_eq!(placement.offset_for(1), Vec2::new(-10.0, 5.0));

        // A different dialog starts from scratch
        assert_eq!(placement.offset_for(2), Vec2::ZERO);
    }

    #[test]
    fn test_ui_state_rect_containment() {
        let mut ui_state = DialogUiState::default();
        assert!(!ui_state.contains(Vec2::new(1.0, 1.0)));

        ui_state.window_rect = Some((Vec2::new(10.0, 10.0), Vec2::new(100.0, 80.0)));
        assert!(ui_state.contains(Vec2::new(50.0, 40.0)));
        assert!(!ui_state.contains(Vec2::new(150.0, 40.0)));
    }

    #[test]
    fn test_ui_state_resets_on_issue_change() {
        let mut ui_state = DialogUiState::default();
        ui_state.sync_issue(3);
        ui_state.input = "half-typed".to_string();
        ui_state.confirm_delete = true;

        ui_state.sync_issue(3);
        assert_eq!(ui_state.input, "half-typed");

        ui_state.sync_issue(4);
        assert!(ui_state.input.is_empty());
        assert!(!ui_state.confirm_delete);
    }
}
