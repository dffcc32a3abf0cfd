mod create_dialog;
mod issue_dialog;
mod markers;
mod notifications;
mod toolbar;

pub use notifications::Notifications;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Notifications>()
            .init_resource::<toolbar::ServerSettingsDialog>()
            .init_resource::<create_dialog::CreateDialogUi>()
            .add_systems(Update, notifications::tick_notifications)
            // Panels first, then canvas-anchored overlays, then windows and
            // toasts on top. Use chain() to enforce ordering.
            .add_systems(
                EguiPrimaryContextPass,
                (
                    toolbar::toolbar_ui,
                    markers::issue_markers_ui,
                    issue_dialog::issue_dialog_ui,
                    create_dialog::create_issue_dialog_ui,
                    toolbar::server_settings_ui,
                    notifications::config_reset_notification_ui,
                    notifications::notifications_ui,
                )
                    .chain(),
            );
    }
}
