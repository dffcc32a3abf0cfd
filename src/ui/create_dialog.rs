//! Creation dialog for a drawn draft region.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::canvas::{CanvasGeometry, CanvasProjector};
use crate::overlay::{
    cancel_draft, submit_draft, DraftState, IssueDisplaySettings, ScreenBox,
};
use crate::review::CreateIssueRequest;

/// Description input of the creation dialog
#[derive(Resource, Default)]
pub struct CreateDialogUi {
    pub input: String,
}

pub fn create_issue_dialog_ui(
    mut contexts: EguiContexts,
    geometry: Res<CanvasGeometry>,
    settings: Res<IssueDisplaySettings>,
    projector: CanvasProjector,
    mut draft: ResMut<DraftState>,
    mut ui_state: ResMut<CreateDialogUi>,
    mut create_events: MessageWriter<CreateIssueRequest>,
) -> Result {
    let Some(region) = draft.region().map(<[f32]>::to_vec) else {
        ui_state.input.clear();
        return Ok(());
    };

    if !geometry.ready || settings.issues_hidden {
        return Ok(());
    }

    // The draft dialog sits directly under its drawn region; it is unique by
    // construction so no collision avoidance applies
    let Some(bbox) = ScreenBox::from_polygon(&region, geometry.offset) else {
        return Ok(());
    };
    let Some(pos) = projector.canvas_to_window(bbox.draft_anchor()) else {
        return Ok(());
    };

    let submitting = draft.is_submitting();
    let mut submit_clicked = false;
    let mut cancel_clicked = false;

    let ctx = contexts.ctx_mut()?;
    egui::Area::new(egui::Id::new("create_issue_dialog"))
        .fixed_pos(egui::pos2(pos.x, pos.y))
        .show(ctx, |ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui| {
                ui.set_width(230.0);

                let input = ui.add_enabled(
                    !submitting,
                    egui::TextEdit::singleline(&mut ui_state.input)
                        .hint_text("Please, describe the issue")
                        .desired_width(f32::INFINITY),
                );
                if input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    submit_clicked = true;
                }

                ui.horizontal(|ui| {
                    if ui.add_enabled(!submitting, egui::Button::new("Cancel")).clicked() {
                        cancel_clicked = true;
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if submitting {
                            ui.spinner();
                        }
                        if ui.add_enabled(!submitting, egui::Button::new("Submit")).clicked() {
                            submit_clicked = true;
                        }
                    });
                });
            });
        });

    if cancel_clicked {
        // Cancel discards the region without any persistence call
        cancel_draft(&mut draft);
        ui_state.input.clear();
    }

    if submit_clicked {
        let message = ui_state.input.trim().to_string();
        // Empty descriptions are never sent
        if !message.is_empty()
            && let Some(position) = submit_draft(&mut draft)
        {
            create_events.write(CreateIssueRequest { position, message });
            ui_state.input.clear();
        }
    }

    Ok(())
}
