//! Non-blocking toast notifications.
//!
//! Request failures land here instead of modal dialogs: the reviewer keeps
//! working and the toast expires on its own.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::config::ConfigResetNotification;
use crate::constants::NOTIFICATION_TTL;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    pub remaining: f32,
}

#[derive(Resource, Default)]
pub struct Notifications {
    pub entries: Vec<Notification>,
}

impl Notifications {
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message.into(), NotificationLevel::Error);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message.into(), NotificationLevel::Info);
    }

    fn push(&mut self, message: String, level: NotificationLevel) {
        self.entries.push(Notification {
            message,
            level,
            remaining: NOTIFICATION_TTL,
        });
    }
}

/// Ages out expired notifications
pub fn tick_notifications(time: Res<Time>, mut notifications: ResMut<Notifications>) {
    let delta = time.delta_secs();
    for entry in notifications.entries.iter_mut() {
        entry.remaining -= delta;
    }
    notifications.entries.retain(|entry| entry.remaining > 0.0);
}

/// Renders the toast stack in the bottom-right corner
pub fn notifications_ui(
    mut contexts: EguiContexts,
    notifications: Res<Notifications>,
) -> Result {
    if notifications.entries.is_empty() {
        return Ok(());
    }

    let ctx = contexts.ctx_mut()?;
    egui::Area::new(egui::Id::new("notifications"))
        .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
        .show(ctx, |ui| {
            for entry in notifications.entries.iter() {
                let color = match entry.level {
                    NotificationLevel::Error => theme::NOTIFICATION_ERROR,
                    NotificationLevel::Info => theme::NOTIFICATION_INFO,
                };
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(360.0);
                    ui.colored_label(color, &entry.message);
                });
            }
        });

    Ok(())
}

/// One-shot dialog shown when the config file had to be reset to defaults
pub fn config_reset_notification_ui(
    mut contexts: EguiContexts,
    mut reset_notification: ResMut<ConfigResetNotification>,
) -> Result {
    if !reset_notification.show {
        return Ok(());
    }

    let ctx = contexts.ctx_mut()?;
    egui::Window::new("Settings Reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            let reason = reset_notification
                .reason
                .clone()
                .unwrap_or_else(|| "unknown error".to_string());
            ui.label("Your settings were reset to defaults.");
            ui.label(reason);
            if ui.button("OK").clicked() {
                reset_notification.show = false;
            }
        });

    Ok(())
}
