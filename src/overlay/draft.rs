//! Draft issue workflow: drawing, submitting and cancelling an unsaved issue.
//!
//! A draft is not an issue: it has no id, no comments and no backing store.
//! While one exists it owns the creation dialog and the reserved canvas
//! region 0, and it is mutually exclusive with any expanded persisted dialog.

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::canvas::{
    CanvasFitRequest, CanvasGeometry, CanvasProjector, IssueRegion, IssueRegions,
    DRAFT_REGION_ID,
};
use crate::constants::MIN_DRAFT_DRAG;
use crate::theme;

use super::dialog::DialogState;
use super::policy::IssueDisplaySettings;
use super::tools::{CurrentTool, ReviewTool};

/// Lifecycle of the one possible draft
#[derive(Resource, Debug, Clone, PartialEq, Default)]
pub enum DraftState {
    #[default]
    Inactive,
    /// Drawn but not yet submitted; the region survives a failed submit
    Pending { region: Vec<f32> },
    /// Create request in flight
    Submitting { region: Vec<f32> },
}

impl DraftState {
    pub fn region(&self) -> Option<&[f32]> {
        match self {
            DraftState::Inactive => None,
            DraftState::Pending { region } | DraftState::Submitting { region } => {
                Some(region.as_slice())
            }
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, DraftState::Submitting { .. })
    }
}

/// In-progress drag for the Issue tool
#[derive(Resource, Default)]
pub struct DraftDrag {
    pub start: Option<Vec2>,
}

/// Begin a pending draft. Any expanded dialog collapses first: only one of
/// {expanded persisted dialog, active draft dialog} may exist at a time.
pub fn begin_draft(region: Vec<f32>, draft: &mut DraftState, dialog: &mut DialogState) {
    dialog.collapse();
    *draft = DraftState::Pending { region };
}

/// Discard the draft without any persistence call
pub fn cancel_draft(draft: &mut DraftState) {
    *draft = DraftState::Inactive;
}

/// Move a pending draft into the submitting state, returning the region to
/// send. Returns `None` when there is nothing submittable (already
/// submitting, or no draft).
pub fn submit_draft(draft: &mut DraftState) -> Option<Vec<f32>> {
    if let DraftState::Pending { region } = draft {
        let region = region.clone();
        *draft = DraftState::Submitting {
            region: region.clone(),
        };
        Some(region)
    } else {
        None
    }
}

/// Rectangle polygon from two drag corners, flat x,y layout
pub fn rect_region(a: Vec2, b: Vec2) -> Vec<f32> {
    let min = a.min(b);
    let max = a.max(b);
    vec![min.x, min.y, max.x, min.y, max.x, max.y, min.x, max.y]
}

/// Drag-to-draw system for the Issue tool
pub fn handle_draft_drawing(
    mouse_button: Res<ButtonInput<MouseButton>>,
    current_tool: Res<CurrentTool>,
    settings: Res<IssueDisplaySettings>,
    geometry: Res<CanvasGeometry>,
    projector: CanvasProjector,
    mut drag: ResMut<DraftDrag>,
    mut draft: ResMut<DraftState>,
    mut dialog: ResMut<DialogState>,
    mut regions: ResMut<IssueRegions>,
    mut fit_events: MessageWriter<CanvasFitRequest>,
    mut contexts: EguiContexts,
) {
    if current_tool.tool != ReviewTool::Issue {
        drag.start = None;
        return;
    }

    // A submit in flight owns the draft slot; no redrawing until it settles
    if draft.is_submitting() {
        drag.start = None;
        return;
    }

    // The global mute also disables drawing: a draft drawn while everything
    // is hidden would be invisible
    if settings.issues_hidden || !geometry.ready {
        drag.start = None;
        return;
    }

    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.is_pointer_over_area()
    {
        return;
    }

    let Some(data_pos) = projector.cursor_data_pos() else {
        return;
    };

    if mouse_button.just_pressed(MouseButton::Left) {
        drag.start = Some(data_pos);
    } else if mouse_button.just_released(MouseButton::Left)
        && let Some(start) = drag.start
    {
        drag.start = None;

        // Only process if we dragged a meaningful distance (not just a click)
        if (data_pos - start).length() < MIN_DRAFT_DRAG {
            return;
        }

        let region = rect_region(start, data_pos);
        begin_draft(region.clone(), &mut draft, &mut dialog);

        // The reviewer sees the draft the instant they finish drawing: the
        // region is installed synchronously, not via the next region setup
        regions.regions.insert(
            DRAFT_REGION_ID,
            IssueRegion {
                points: region,
                hidden: false,
            },
        );

        fit_events.write(CanvasFitRequest);
    }
}

/// Gizmo preview of the rectangle while the drag is still in progress
pub fn render_draft_preview(
    mut gizmos: Gizmos<crate::canvas::RegionGizmoGroup>,
    current_tool: Res<CurrentTool>,
    drag: Res<DraftDrag>,
    geometry: Res<CanvasGeometry>,
    projector: CanvasProjector,
) {
    if current_tool.tool != ReviewTool::Issue {
        return;
    }

    let Some(start) = drag.start else {
        return;
    };

    let Some(current) = projector.cursor_data_pos() else {
        return;
    };

    let corners = rect_region(start, current);
    let world: Vec<Vec2> = corners
        .chunks_exact(2)
        .filter_map(|pair| projector.data_to_world(geometry.offset, Vec2::new(pair[0], pair[1])))
        .collect();

    if world.len() == 4 {
        for i in 0..4 {
            gizmos.line_2d(world[i], world[(i + 1) % 4], theme::DRAFT_PREVIEW_OUTLINE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGION: [f32; 8] = [10.0, 10.0, 50.0, 10.0, 50.0, 50.0, 10.0, 50.0];

    #[test]
    fn test_begin_draft_collapses_expanded_dialog() {
        // Expand issue A, start drawing a draft: A must collapse and the
        // draft must be the active one
        let mut dialog = DialogState::Expanded(5);
        let mut draft = DraftState::Inactive;

        begin_draft(REGION.to_vec(), &mut draft, &mut dialog);

        assert_eq!(dialog, DialogState::Collapsed);
        assert_eq!(draft.region(), Some(REGION.as_slice()));
        assert!(!draft.is_submitting());
    }

    #[test]
    fn test_cancel_discards_region() {
        let mut draft = DraftState::Pending {
            region: REGION.to_vec(),
        };
        cancel_draft(&mut draft);
        assert_eq!(draft, DraftState::Inactive);
        assert!(draft.region().is_none());
    }

    #[test]
    fn test_submit_moves_to_submitting() {
        let mut draft = DraftState::Pending {
            region: REGION.to_vec(),
        };

        let sent = submit_draft(&mut draft).unwrap();
        assert_eq!(sent, REGION.to_vec());
        assert!(draft.is_submitting());
        // The region is retained for the failure path
        assert_eq!(draft.region(), Some(REGION.as_slice()));
    }

    #[test]
    fn test_submit_is_rejected_while_submitting() {
        let mut draft = DraftState::Submitting {
            region: REGION.to_vec(),
        };
        assert!(submit_draft(&mut draft).is_none());
    }

    #[test]
    fn test_submit_without_draft_is_noop() {
        let mut draft = DraftState::Inactive;
        assert!(submit_draft(&mut draft).is_none());
        assert_eq!(draft, DraftState::Inactive);
    }

    #[test]
    fn test_rect_region_normalizes_corners() {
        // Dragging up-left produces the same polygon as down-right
        let a = rect_region(Vec2::new(50.0, 50.0), Vec2::new(10.0, 10.0));
        let b = rect_region(Vec2::new(10.0, 10.0), Vec2::new(50.0, 50.0));
        assert_eq!(a, b);
        assert_eq!(a, REGION.to_vec());
    }
}
