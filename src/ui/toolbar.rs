//! Main toolbar: tools, visibility toggles, frame navigation and the
//! document/server controls.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::canvas::{DocumentFrame, OpenDocumentRequest};
use crate::config::{AppConfig, SetServerUrlRequest};
use crate::overlay::{CurrentTool, IssueDisplaySettings, ReviewTool};
use crate::review::{
    FrameContext, PendingActions, RefreshIssuesRequest, SnapshotSync, SwitchFrameRequest,
};

/// State of the review-server settings window
#[derive(Resource, Default)]
pub struct ServerSettingsDialog {
    pub is_open: bool,
    pub url_input: String,
}

#[allow(clippy::too_many_arguments)]
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut current_tool: ResMut<CurrentTool>,
    mut settings: ResMut<IssueDisplaySettings>,
    frame_ctx: Res<FrameContext>,
    frame: Res<DocumentFrame>,
    config: Res<AppConfig>,
    pending: Res<PendingActions>,
    sync: Res<SnapshotSync>,
    mut server_dialog: ResMut<ServerSettingsDialog>,
    mut open_events: MessageWriter<OpenDocumentRequest>,
    mut switch_events: MessageWriter<SwitchFrameRequest>,
) -> Result {
    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                // Tool buttons with keyboard shortcuts
                for tool in ReviewTool::all() {
                    let selected = current_tool.tool == *tool;
                    let button = egui::Button::new(
                        egui::RichText::new(tool.display_name()).size(14.0).strong(),
                    )
                    .min_size(egui::vec2(0.0, 28.0))
                    .selected(selected);

                    if ui.add(button).clicked() {
                        current_tool.tool = *tool;
                    }
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                // Global visibility toggles
                ui.checkbox(&mut settings.issues_hidden, "Hide issues");
                let issues_hidden = settings.issues_hidden;
                ui.add_enabled(
                    !issues_hidden,
                    egui::Checkbox::new(&mut settings.resolved_hidden, "Hide resolved"),
                );

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                // Frame navigation
                if ui.button("◀").clicked() {
                    switch_events.write(SwitchFrameRequest { delta: -1 });
                }
                ui.label(format!(
                    "Frame {}/{}",
                    frame_ctx.frame + 1,
                    config.data.frame_count.max(1)
                ));
                if ui.button("▶").clicked() {
                    switch_events.write(SwitchFrameRequest { delta: 1 });
                }

                // Right-aligned document/server controls
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if pending.any_busy() || sync.is_fetching {
                        ui.spinner();
                    }

                    if let Some(name) = frame
                        .path
                        .as_deref()
                        .and_then(|p| p.file_name())
                        .and_then(|n| n.to_str())
                    {
                        ui.weak(name);
                    }

                    if ui.button("Server…").clicked() {
                        server_dialog.is_open = true;
                        server_dialog.url_input = config.data.server_url.clone();
                    }

                    if ui.button("Open…").clicked()
                        && let Some(path) = rfd::FileDialog::new()
                            .add_filter(
                                "Images",
                                &["png", "jpg", "jpeg", "webp", "bmp", "tiff", "gif"],
                            )
                            .pick_file()
                    {
                        open_events.write(OpenDocumentRequest { path });
                    }
                });
            });
        });

    Ok(())
}

/// Review-server settings window
pub fn server_settings_ui(
    mut contexts: EguiContexts,
    mut server_dialog: ResMut<ServerSettingsDialog>,
    mut url_events: MessageWriter<SetServerUrlRequest>,
    mut refresh_events: MessageWriter<RefreshIssuesRequest>,
) -> Result {
    if !server_dialog.is_open {
        return Ok(());
    }

    let ctx = contexts.ctx_mut()?;
    let mut open = true;
    let mut save_clicked = false;

    egui::Window::new("Review Server")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .open(&mut open)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Base URL:");
                ui.text_edit_singleline(&mut server_dialog.url_input);
            });
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    save_clicked = true;
                }
                if ui.button("Cancel").clicked() {
                    server_dialog.is_open = false;
                }
            });
        });

    if save_clicked {
        url_events.write(SetServerUrlRequest {
            url: server_dialog.url_input.clone(),
        });
        refresh_events.write(RefreshIssuesRequest);
        server_dialog.is_open = false;
    }

    if !open {
        server_dialog.is_open = false;
    }

    Ok(())
}
