//! Collapsed issue markers rendered as egui areas over the canvas.
//!
//! Marker anchors come out of the collision-avoidance layout in canvas
//! space; projecting only the anchor point through the camera keeps the
//! marker itself upright and constant-sized whatever the content transform.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use std::collections::HashSet;

use crate::canvas::{CanvasGeometry, CanvasProjector, ToggleRegionVisibility};
use crate::overlay::{layout_markers, partition_issues, DialogState, IssueDisplaySettings};
use crate::review::{Issue, IssueSnapshot};
use crate::theme;

/// Marker caption: first comment snippet plus the comment count
pub fn marker_label(issue: &Issue) -> String {
    let count = issue.comments.len();
    let snippet = issue
        .first_comment()
        .map(|comment| truncated(&comment.message, 24))
        .unwrap_or_default();
    format!("{} ({})", snippet, count)
}

fn truncated(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

#[allow(clippy::too_many_arguments)]
pub fn issue_markers_ui(
    mut contexts: EguiContexts,
    snapshot: Res<IssueSnapshot>,
    settings: Res<IssueDisplaySettings>,
    geometry: Res<CanvasGeometry>,
    projector: CanvasProjector,
    mut dialog: ResMut<DialogState>,
    mut hovered_last_pass: Local<HashSet<i64>>,
    mut toggles: MessageWriter<ToggleRegionVisibility>,
) -> Result {
    if !geometry.ready {
        return Ok(());
    }

    let partition = partition_issues(&snapshot, &settings, &dialog);
    let slots = layout_markers(&partition.collapsed, geometry.offset);

    let ctx = contexts.ctx_mut()?;
    let mut hovered_now: HashSet<i64> = HashSet::new();

    for slot in slots {
        let Some(issue) = snapshot.get(slot.issue_id) else {
            continue;
        };
        let Some(window_pos) = projector.canvas_to_window(Vec2::new(slot.left, slot.top)) else {
            continue;
        };

        let fill = if issue.resolved {
            theme::MARKER_RESOLVED_BG
        } else {
            theme::MARKER_OPEN_BG
        };

        let response = egui::Area::new(egui::Id::new(("issue_marker", slot.issue_id)))
            .fixed_pos(egui::pos2(window_pos.x, window_pos.y))
            .show(ctx, |ui| {
                ui.add(
                    egui::Button::new(
                        egui::RichText::new(marker_label(issue))
                            .color(theme::MARKER_TEXT)
                            .size(12.0),
                    )
                    .fill(fill),
                )
            })
            .inner;

        if response.clicked() {
            dialog.expand(slot.issue_id);
        }
        if response.hovered() {
            hovered_now.insert(slot.issue_id);
        }

        // Hovering reveals the issue's highlight region; leaving hides it
        // again, but only for resolved issues (unresolved stay highlighted)
        if response.hovered() && !hovered_last_pass.contains(&slot.issue_id) {
            toggles.write(ToggleRegionVisibility {
                issue_id: slot.issue_id,
                visible: true,
            });
        }
        if !response.hovered() && hovered_last_pass.contains(&slot.issue_id) && issue.resolved {
            toggles.write(ToggleRegionVisibility {
                issue_id: slot.issue_id,
                visible: false,
            });
        }
    }

    *hovered_last_pass = hovered_now;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::Comment;

    fn issue_with_message(message: &str) -> Issue {
        Issue {
            id: 3,
            frame: 0,
            position: vec![0.0, 0.0, 4.0, 4.0],
            resolved: false,
            comments: vec![
                Comment {
                    id: 1,
                    message: message.to_string(),
                    owner: None,
                    created_date: None,
                },
                Comment {
                    id: 2,
                    message: "second".to_string(),
                    owner: None,
                    created_date: None,
                },
            ],
        }
    }

    #[test]
    fn test_marker_label_shows_first_comment_and_count() {
        let issue = issue_with_message("misaligned label");
        assert_eq!(marker_label(&issue), "misaligned label (2)");
    }

    #[test]
    fn test_marker_label_truncates_long_messages() {
        let issue = issue_with_message("this comment is far too long to fit on a marker");
        let label = marker_label(&issue);
        assert!(label.contains('…'));
        assert!(label.ends_with("(2)"));
    }

    #[test]
    fn test_truncated_keeps_short_text() {
        assert_eq!(truncated("short", 24), "short");
    }
}
