//! The issue overlay engine.
//!
//! Places, declutters and maintains issue markers and their conversation
//! dialogs in sync with the live canvas. Issues come in from the review
//! snapshot, geometry comes in from the canvas, and the only things going
//! out are layout decisions and fire-and-forget persistence requests.
//!
//! ## Module Structure
//!
//! - [`policy`] - Global visibility toggles and the marker decision table
//! - [`placement`] - Data polygon → screen bounding box and anchors
//! - [`layout`] - Collision-avoidance layout for collapsed markers
//! - [`dialog`] - Single-slot dialog state machine and rubber-band return
//! - [`draft`] - Draft issue workflow (drawing, submit, cancel)
//! - [`tools`] - Select/Issue tool switching
//!
//! ## Key Invariants
//!
//! - At most one issue is expanded at any instant ([`DialogState`])
//! - A draft and an expanded dialog never coexist
//! - Issues without comments never render a standalone marker
//! - Nothing renders while the canvas geometry is unavailable

mod dialog;
mod draft;
mod layout;
mod placement;
mod policy;
mod tools;

// Re-exports - State
pub use dialog::{DialogPlacement, DialogState, DialogUiState};
pub use draft::{DraftDrag, DraftState};
pub use policy::IssueDisplaySettings;
pub use tools::{CurrentTool, ReviewTool};

// Re-exports - Pure helpers used by the UI layer
pub use dialog::{
    edge_correction, fully_outside_viewport, DIALOG_HEIGHT, DIALOG_WIDTH,
};
pub use draft::{cancel_draft, submit_draft};
pub use layout::{layout_markers, MarkerSlot};
pub use placement::ScreenBox;
pub use policy::marker_visible;

use bevy::prelude::*;
use std::collections::HashMap;

use crate::canvas::{IssueRegion, RegionSync, SetupIssueRegions, DRAFT_REGION_ID};
use crate::review::{Issue, IssueSnapshot};

/// Per-render partition of the issue snapshot
#[derive(Default)]
pub struct OverlayPartition<'a> {
    /// The one expanded issue, if it is currently renderable
    pub expanded: Option<&'a Issue>,
    /// Visible collapsed issues with at least one comment, in snapshot order
    pub collapsed: Vec<&'a Issue>,
}

/// Split the snapshot into {expanded, collapsed-with-comments, hidden}.
/// Issues without comments are only reachable through the draft flow, so
/// they never produce a standalone marker.
pub fn partition_issues<'a>(
    snapshot: &'a IssueSnapshot,
    settings: &IssueDisplaySettings,
    dialog: &DialogState,
) -> OverlayPartition<'a> {
    let mut partition = OverlayPartition::default();
    if settings.issues_hidden {
        return partition;
    }

    for (id, issue) in snapshot.issues.iter() {
        if !marker_visible(settings, issue.resolved) {
            continue;
        }
        if dialog.expanded_issue() == Some(*id) {
            partition.expanded = Some(issue);
        } else if !issue.comments.is_empty() {
            partition.collapsed.push(issue);
        }
    }

    partition
}

/// The full region set for the current snapshot, toggles and draft.
/// Resolved issues keep their region installed but hidden so a hover can
/// reveal it; the reserved id 0 carries the draft.
pub fn build_region_set(
    snapshot: &IssueSnapshot,
    settings: &IssueDisplaySettings,
    draft: &DraftState,
) -> HashMap<i64, IssueRegion> {
    let mut regions = HashMap::new();

    if settings.issues_hidden {
        return regions;
    }

    for (id, issue) in snapshot.issues.iter() {
        if settings.resolved_hidden && issue.resolved {
            continue;
        }
        regions.insert(
            *id,
            IssueRegion {
                points: issue.position.clone(),
                hidden: issue.resolved,
            },
        );
    }

    if let Some(region) = draft.region() {
        regions.insert(
            DRAFT_REGION_ID,
            IssueRegion {
                points: region.to_vec(),
                hidden: false,
            },
        );
    }

    regions
}

/// Rebuilds the canvas region set whenever its inputs change
pub fn sync_issue_regions(
    snapshot: Res<IssueSnapshot>,
    settings: Res<IssueDisplaySettings>,
    draft: Res<DraftState>,
    mut setup: MessageWriter<SetupIssueRegions>,
) {
    if !(snapshot.is_changed() || settings.is_changed() || draft.is_changed()) {
        return;
    }

    setup.write(SetupIssueRegions {
        regions: build_region_set(&snapshot, &settings, &draft),
    });
}

pub struct OverlayPlugin;

impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<IssueDisplaySettings>()
            .init_resource::<DialogState>()
            .init_resource::<DialogPlacement>()
            .init_resource::<DialogUiState>()
            .init_resource::<DraftState>()
            .init_resource::<DraftDrag>()
            .init_resource::<CurrentTool>()
            .add_systems(
                Update,
                (
                    tools::handle_tool_shortcuts,
                    tools::update_cursor_icon,
                    dialog::collapse_on_outside_click,
                ),
            )
            // Region writers run after the canvas has applied last frame's
            // messages, which is what defers highlight flips by one tick
            .add_systems(
                Update,
                (
                    draft::handle_draft_drawing,
                    draft::render_draft_preview,
                    sync_issue_regions,
                    dialog::sync_region_highlights,
                )
                    .chain()
                    .after(RegionSync),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::Comment;

    fn issue(id: i64, resolved: bool, comments: usize) -> Issue {
        Issue {
            id,
            frame: 0,
            position: vec![10.0, 10.0, 50.0, 10.0, 50.0, 50.0, 10.0, 50.0],
            resolved,
            comments: (0..comments)
                .map(|n| Comment {
                    id: n as i64,
                    message: "note".to_string(),
                    owner: None,
                    created_date: None,
                })
                .collect(),
        }
    }

    fn snapshot_of(issues: Vec<Issue>) -> IssueSnapshot {
        let mut snapshot = IssueSnapshot::default();
        snapshot.replace(issues);
        snapshot
    }

    #[test]
    fn test_partition_excludes_expanded_from_collapsed() {
        let snapshot = snapshot_of(vec![issue(1, false, 1), issue(2, false, 1)]);
        let settings = IssueDisplaySettings::default();
        let dialog = DialogState::Expanded(1);

        let partition = partition_issues(&snapshot, &settings, &dialog);
        assert_eq!(partition.expanded.map(|i| i.id), Some(1));
        assert_eq!(partition.collapsed.len(), 1);
        assert_eq!(partition.collapsed[0].id, 2);
    }

    #[test]
    fn test_partition_skips_commentless_issues() {
        let snapshot = snapshot_of(vec![issue(1, false, 0), issue(2, false, 2)]);
        let settings = IssueDisplaySettings::default();

        let partition = partition_issues(&snapshot, &settings, &DialogState::Collapsed);
        assert_eq!(partition.collapsed.len(), 1);
        assert_eq!(partition.collapsed[0].id, 2);
    }

    #[test]
    fn test_partition_empty_when_issues_hidden() {
        // Scenario: issues_hidden = true renders no marker and no dialog,
        // regardless of any other flag
        let snapshot = snapshot_of(vec![issue(1, false, 1), issue(2, true, 1)]);
        let settings = IssueDisplaySettings {
            issues_hidden: true,
            resolved_hidden: false,
        };
        let dialog = DialogState::Expanded(1);

        let partition = partition_issues(&snapshot, &settings, &dialog);
        assert!(partition.expanded.is_none());
        assert!(partition.collapsed.is_empty());
    }

    #[test]
    fn test_partition_respects_resolved_hidden() {
        // Scenario: resolved issue with resolved_hidden set is not visible
        let snapshot = snapshot_of(vec![issue(5, true, 1)]);
        let settings = IssueDisplaySettings {
            issues_hidden: false,
            resolved_hidden: true,
        };

        let partition = partition_issues(&snapshot, &settings, &DialogState::Collapsed);
        assert!(partition.collapsed.is_empty());
    }

    #[test]
    fn test_partition_unresolved_visible() {
        // Scenario: unresolved issue with one comment and nothing hidden is
        // a visible marker
        let snapshot = snapshot_of(vec![issue(5, false, 1)]);
        let settings = IssueDisplaySettings::default();

        let partition = partition_issues(&snapshot, &settings, &DialogState::Collapsed);
        assert_eq!(partition.collapsed.len(), 1);
        assert_eq!(partition.collapsed[0].id, 5);
    }

    #[test]
    fn test_region_set_marks_resolved_hidden() {
        let snapshot = snapshot_of(vec![issue(1, false, 1), issue(2, true, 1)]);
        let settings = IssueDisplaySettings::default();
        let regions = build_region_set(&snapshot, &settings, &DraftState::Inactive);

        // Scenario: unresolved issue is highlighted, resolved issue's
        // highlight is off (but still installed for hover)
        assert!(!regions[&1].hidden);
        assert!(regions[&2].hidden);
    }

    #[test]
    fn test_region_set_includes_draft_under_reserved_id() {
        let snapshot = snapshot_of(vec![issue(1, false, 1)]);
        let settings = IssueDisplaySettings::default();
        let draft = DraftState::Pending {
            region: vec![0.0, 0.0, 4.0, 0.0, 4.0, 4.0, 0.0, 4.0],
        };

        let regions = build_region_set(&snapshot, &settings, &draft);
        assert!(regions.contains_key(&DRAFT_REGION_ID));
        assert!(!regions[&DRAFT_REGION_ID].hidden);
    }

    #[test]
    fn test_region_set_empty_when_issues_hidden() {
        let snapshot = snapshot_of(vec![issue(1, false, 1)]);
        let settings = IssueDisplaySettings {
            issues_hidden: true,
            resolved_hidden: false,
        };
        let draft = DraftState::Pending {
            region: vec![0.0, 0.0, 4.0, 0.0, 4.0, 4.0, 0.0, 4.0],
        };

        // The hard global switch suppresses even the draft region
        let regions = build_region_set(&snapshot, &settings, &draft);
        assert!(regions.is_empty());
    }

    #[test]
    fn test_region_set_skips_resolved_when_resolved_hidden() {
        let snapshot = snapshot_of(vec![issue(1, true, 1)]);
        let settings = IssueDisplaySettings {
            issues_hidden: false,
            resolved_hidden: true,
        };

        let regions = build_region_set(&snapshot, &settings, &DraftState::Inactive);
        assert!(regions.is_empty());
    }
}
