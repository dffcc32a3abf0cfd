use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use bevy_egui::EguiContexts;

use crate::constants::{
    FIT_MARGIN, FRAME_PADDING, MAX_ZOOM_SCALE, MIN_ZOOM_SCALE, ROTATION_STEP_DEGREES,
};

use super::document::DocumentFrame;
use super::geometry::{CanvasFitRequest, CanvasTransformChanged, TransformChange};

#[derive(Component)]
pub struct ReviewCamera;

#[derive(Component)]
pub struct CameraZoom {
    pub scale: f32,
}

impl Default for CameraZoom {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

/// Rotation of the reviewed content in degrees. The camera itself rotates in
/// the opposite direction so that positive degrees rotate the document
/// clockwise on screen.
#[derive(Component, Default)]
pub struct CanvasAngle {
    pub degrees: f32,
}

pub fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        ReviewCamera,
        CameraZoom::default(),
        CanvasAngle::default(),
        Transform::from_translation(Vec3::new(0.0, 0.0, 1000.0)),
    ));
}

pub fn camera_pan(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<bevy::input::mouse::MouseMotion>,
    mut camera_query: Query<(&mut Transform, &CameraZoom), With<ReviewCamera>>,
) {
    if !mouse_button.pressed(MouseButton::Middle) {
        mouse_motion.clear();
        return;
    }

    let Ok((mut transform, zoom)) = camera_query.single_mut() else {
        return;
    };

    for event in mouse_motion.read() {
        let delta = event.delta * zoom.scale;
        // Move along the camera's own axes so panning tracks the cursor even
        // while the canvas is rotated
        let delta = transform.rotation * Vec3::new(-delta.x, delta.y, 0.0);
        transform.translation += delta;
    }
}

pub fn camera_zoom(
    mut scroll_events: MessageReader<MouseWheel>,
    mut camera_query: Query<&mut CameraZoom, With<ReviewCamera>>,
    mut changed: MessageWriter<CanvasTransformChanged>,
) {
    let Ok(mut zoom) = camera_query.single_mut() else {
        return;
    };

    for event in scroll_events.read() {
        let scroll_amount = match event.unit {
            MouseScrollUnit::Line => event.y * 0.1,
            MouseScrollUnit::Pixel => event.y * 0.001,
        };

        let new_scale = (zoom.scale - scroll_amount).clamp(MIN_ZOOM_SCALE, MAX_ZOOM_SCALE);
        if new_scale != zoom.scale {
            zoom.scale = new_scale;
            changed.write(CanvasTransformChanged {
                change: TransformChange::Zoom,
            });
        }
    }
}

pub fn apply_camera_zoom(
    mut camera_query: Query<(&CameraZoom, &mut Projection), (With<ReviewCamera>, Changed<CameraZoom>)>,
) {
    for (zoom, mut projection) in camera_query.iter_mut() {
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = zoom.scale;
        }
    }
}

/// Q/E rotate the canvas in fixed steps
pub fn camera_rotate(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut camera_query: Query<(&mut Transform, &mut CanvasAngle), With<ReviewCamera>>,
    mut changed: MessageWriter<CanvasTransformChanged>,
    mut contexts: EguiContexts,
) {
    // Don't rotate if typing in a text field
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    let step = if keyboard.just_pressed(KeyCode::KeyQ) {
        -ROTATION_STEP_DEGREES
    } else if keyboard.just_pressed(KeyCode::KeyE) {
        ROTATION_STEP_DEGREES
    } else {
        return;
    };

    let Ok((mut transform, mut angle)) = camera_query.single_mut() else {
        return;
    };

    angle.degrees = (angle.degrees + step) % 360.0;
    transform.rotation = Quat::from_rotation_z(-angle.degrees.to_radians());
    changed.write(CanvasTransformChanged {
        change: TransformChange::Reshape,
    });
}

/// Fits the document frame into the window, recentering the camera.
/// Triggered by the F shortcut or a [`CanvasFitRequest`] message.
pub fn handle_fit(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut fit_requests: MessageReader<CanvasFitRequest>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    frame: Res<DocumentFrame>,
    mut camera_query: Query<(&mut Transform, &mut CameraZoom), With<ReviewCamera>>,
    mut changed: MessageWriter<CanvasTransformChanged>,
    mut contexts: EguiContexts,
) {
    let typing = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_keyboard_input())
        .unwrap_or(false);

    let requested =
        !fit_requests.is_empty() || (keyboard.just_pressed(KeyCode::KeyF) && !typing);
    fit_requests.clear();
    if !requested {
        return;
    }

    let Some(size) = frame.size else {
        return;
    };

    let Ok(window) = window_query.single() else {
        return;
    };

    let Ok((mut transform, mut zoom)) = camera_query.single_mut() else {
        return;
    };

    let frame_width = size.x + 2.0 * FRAME_PADDING;
    let frame_height = size.y + 2.0 * FRAME_PADDING;
    let available_width = (window.width() - FIT_MARGIN).max(1.0);
    let available_height = (window.height() - FIT_MARGIN).max(1.0);

    let scale = (frame_width / available_width)
        .max(frame_height / available_height)
        .clamp(MIN_ZOOM_SCALE, MAX_ZOOM_SCALE);

    zoom.scale = scale;
    transform.translation.x = 0.0;
    transform.translation.y = 0.0;

    changed.write(CanvasTransformChanged {
        change: TransformChange::Fit,
    });
}

/// Window resizes reshape the canvas viewport
pub fn watch_window_resize(
    mut resized: MessageReader<WindowResized>,
    mut changed: MessageWriter<CanvasTransformChanged>,
) {
    if resized.read().last().is_some() {
        changed.write(CanvasTransformChanged {
            change: TransformChange::Reshape,
        });
    }
}
