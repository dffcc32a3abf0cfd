//! Expanded conversation dialog for a single issue.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};
use chrono::{DateTime, Utc};

use crate::canvas::{CanvasGeometry, CanvasProjector};
use crate::overlay::{
    edge_correction, fully_outside_viewport, DialogPlacement, DialogState, DialogUiState,
    IssueDisplaySettings, ScreenBox, DIALOG_WIDTH,
};
use crate::review::{
    CommentIssueRequest, DeleteIssueRequest, Issue, IssueSnapshot, PendingActions,
    ReopenIssueRequest, ResolveIssueRequest,
};
use crate::theme;

/// Dialog title: persisted issues carry their id, unsaved ones do not
pub fn dialog_title(issue: &Issue) -> String {
    if issue.is_persisted() {
        format!("Issue #{}", issue.id)
    } else {
        "Issue".to_string()
    }
}

/// Coarse relative age for a comment timestamp; absent timestamps are
/// treated as "just now"
pub fn relative_age(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(created) = created else {
        return "just now".to_string();
    };

    let seconds = (now - created).num_seconds().max(0);
    match seconds {
        0..=59 => "just now".to_string(),
        60..=3599 => {
            let minutes = seconds / 60;
            if minutes == 1 {
                "1 minute ago".to_string()
            } else {
                format!("{} minutes ago", minutes)
            }
        }
        3600..=86_399 => {
            let hours = seconds / 3600;
            if hours == 1 {
                "1 hour ago".to_string()
            } else {
                format!("{} hours ago", hours)
            }
        }
        _ => {
            let days = seconds / 86_400;
            if days == 1 {
                "1 day ago".to_string()
            } else {
                format!("{} days ago", days)
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn issue_dialog_ui(
    mut contexts: EguiContexts,
    snapshot: Res<IssueSnapshot>,
    settings: Res<IssueDisplaySettings>,
    geometry: Res<CanvasGeometry>,
    projector: CanvasProjector,
    mut dialog: ResMut<DialogState>,
    mut placement: ResMut<DialogPlacement>,
    mut ui_state: ResMut<DialogUiState>,
    pending: Res<PendingActions>,
    mut resolve_events: MessageWriter<ResolveIssueRequest>,
    mut reopen_events: MessageWriter<ReopenIssueRequest>,
    mut comment_events: MessageWriter<CommentIssueRequest>,
    mut delete_events: MessageWriter<DeleteIssueRequest>,
) -> Result {
    let Some(issue_id) = dialog.expanded_issue() else {
        ui_state.window_rect = None;
        return Ok(());
    };

    if !geometry.ready || settings.issues_hidden {
        ui_state.window_rect = None;
        return Ok(());
    }

    let Some(issue) = snapshot.get(issue_id) else {
        // The issue vanished from the snapshot (deleted elsewhere)
        dialog.collapse();
        ui_state.window_rect = None;
        return Ok(());
    };

    if settings.resolved_hidden && issue.resolved {
        ui_state.window_rect = None;
        return Ok(());
    }

    ui_state.sync_issue(issue_id);

    let Some(bbox) = ScreenBox::from_polygon(&issue.position, geometry.offset) else {
        return Ok(());
    };
    let Some(projected) = projector.canvas_to_window(bbox.dialog_anchor()) else {
        return Ok(());
    };

    let mut pos = projected + placement.offset_for(issue_id);

    // Rubber-band: once the dialog has fully left the viewport, walk it back
    // toward the visible band instead of hard re-centering
    if let Some(viewport) = projector.window_size()
        && fully_outside_viewport(pos, viewport)
    {
        let correction = edge_correction(pos);
        if correction != Vec2::ZERO {
            placement.nudge(correction);
            pos += correction;
        }
    }

    let is_busy = pending.is_busy(issue_id);
    let resolved = issue.resolved;
    let now = Utc::now();

    let mut collapse_clicked = false;
    let mut resolve_clicked = false;
    let mut reopen_clicked = false;
    let mut delete_clicked = false;
    let mut comment_to_send: Option<String> = None;

    let ctx = contexts.ctx_mut()?;

    let area = egui::Area::new(egui::Id::new("issue_dialog"))
        .fixed_pos(egui::pos2(pos.x, pos.y))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_width(DIALOG_WIDTH);

                // Header
                egui::Frame::NONE
                    .fill(theme::DIALOG_HEADER)
                    .inner_margin(egui::Margin::symmetric(6, 4))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.strong(dialog_title(issue));
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui
                                        .button("✕")
                                        .on_hover_text("Collapse the chat")
                                        .clicked()
                                    {
                                        collapse_clicked = true;
                                    }
                                },
                            );
                        });
                    });

                // Comment thread
                egui::ScrollArea::vertical()
                    .max_height(120.0)
                    .show(ui, |ui| {
                        if issue.comments.is_empty() {
                            ui.spinner();
                        }
                        for comment in issue.comments.iter() {
                            ui.horizontal(|ui| {
                                ui.strong(comment.owner.as_deref().unwrap_or("Unknown"));
                                ui.weak(relative_age(comment.created_date, now));
                            });
                            ui.label(&comment.message);
                            ui.add_space(4.0);
                        }
                    });

                // Comment input
                let input = ui.add(
                    egui::TextEdit::singleline(&mut ui_state.input)
                        .hint_text("Print a comment here")
                        .desired_width(f32::INFINITY),
                );
                if input.lost_focus()
                    && ui.input(|i| i.key_pressed(egui::Key::Enter))
                    && !ui_state.input.trim().is_empty()
                {
                    comment_to_send = Some(ui_state.input.trim().to_string());
                }

                // Footer: Remove on the left; Submit while text is present,
                // otherwise Resolve/Reopen
                ui.horizontal(|ui| {
                    if ui.add_enabled(!is_busy, egui::Button::new("Remove")).clicked() {
                        ui_state.confirm_delete = true;
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if is_busy {
                            ui.spinner();
                        }
                        if !ui_state.input.trim().is_empty() {
                            if ui.add_enabled(!is_busy, egui::Button::new("Submit")).clicked() {
                                comment_to_send = Some(ui_state.input.trim().to_string());
                            }
                        } else if resolved {
                            if ui.add_enabled(!is_busy, egui::Button::new("Reopen")).clicked() {
                                reopen_clicked = true;
                            }
                        } else if ui
                            .add_enabled(!is_busy, egui::Button::new("Resolve"))
                            .clicked()
                        {
                            resolve_clicked = true;
                        }
                    });
                });
            });
        });

    let rect = area.response.rect;
    ui_state.window_rect = Some((
        Vec2::new(rect.min.x, rect.min.y),
        Vec2::new(rect.max.x, rect.max.y),
    ));

    // Delete confirmation modal
    if ui_state.confirm_delete {
        egui::Window::new("Remove Issue")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("{} will be deleted.", dialog_title(issue)));
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        ui_state.confirm_delete = false;
                        delete_clicked = true;
                    }
                    if ui.button("Cancel").clicked() {
                        ui_state.confirm_delete = false;
                    }
                });
            });
    }

    // Handle actions after UI rendering
    if resolve_clicked {
        // Collapse happens only once the server confirms the resolve
        resolve_events.write(ResolveIssueRequest { issue_id });
    }
    if reopen_clicked {
        reopen_events.write(ReopenIssueRequest { issue_id });
    }
    if let Some(message) = comment_to_send {
        comment_events.write(CommentIssueRequest { issue_id, message });
        ui_state.input.clear();
    }
    if delete_clicked {
        delete_events.write(DeleteIssueRequest { issue_id });
        dialog.collapse();
    }
    if collapse_clicked {
        dialog.collapse();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds_before: i64, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        Some(now - chrono::Duration::seconds(seconds_before))
    }

    #[test]
    fn test_relative_age_buckets() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();

        assert_eq!(relative_age(None, now), "just now");
        assert_eq!(relative_age(at(10, now), now), "just now");
        assert_eq!(relative_age(at(60, now), now), "1 minute ago");
        assert_eq!(relative_age(at(5 * 60, now), now), "5 minutes ago");
        assert_eq!(relative_age(at(3600, now), now), "1 hour ago");
        assert_eq!(relative_age(at(7 * 3600, now), now), "7 hours ago");
        assert_eq!(relative_age(at(86_400, now), now), "1 day ago");
        assert_eq!(relative_age(at(3 * 86_400, now), now), "3 days ago");
    }

    #[test]
    fn test_relative_age_never_negative() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        // A clock-skewed future timestamp still reads as "just now"
        let future = Some(now + chrono::Duration::seconds(90));
        assert_eq!(relative_age(future, now), "just now");
    }

    #[test]
    fn test_dialog_title_by_persistence() {
        let mut issue = Issue {
            id: 7,
            frame: 0,
            position: vec![0.0, 0.0, 1.0, 1.0],
            resolved: false,
            comments: Vec::new(),
        };
        assert_eq!(dialog_title(&issue), "Issue #7");

        issue.id = -2;
        assert_eq!(dialog_title(&issue), "Issue");
    }
}
