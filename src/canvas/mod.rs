//! The rendering surface: document sprite, camera and highlight regions.
//!
//! The overlay treats this module as a collaborator with a narrow contract:
//! it reads the [`CanvasGeometry`] snapshot, installs highlight regions via
//! messages, and projects canvas-space anchors to window coordinates with
//! [`CanvasProjector`]. Everything else (pan/zoom/rotate input, fitting,
//! sprite management) is internal.
//!
//! ## Module Structure
//!
//! - [`camera`] - Review camera with pan/zoom/rotate/fit controls
//! - [`document`] - Document loading and coordinate space conversions
//! - [`geometry`] - Geometry snapshot and transform-change messages
//! - [`regions`] - Issue highlight region storage and gizmo rendering

mod camera;
mod document;
mod geometry;
mod regions;

// Re-exports - Components
pub use camera::{CameraZoom, CanvasAngle, ReviewCamera};

// Re-exports - Resources
pub use document::{DocumentFrame, DocumentSprite};
pub use geometry::CanvasGeometry;
pub use regions::{IssueRegion, IssueRegions, RegionGizmoGroup, DRAFT_REGION_ID};

// Re-exports - Messages
pub use document::OpenDocumentRequest;
pub use geometry::{CanvasFitRequest, CanvasTransformChanged, TransformChange};
pub use regions::{SetupIssueRegions, ToggleRegionVisibility};

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::config::ConfigLoaded;

/// Label for the region message appliers. Overlay systems that write region
/// messages schedule after this set, so their writes are picked up on the
/// next frame's pass rather than the current one.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegionSync;

/// Bundled camera, window and document access for projecting between the
/// overlay's canvas space and window coordinates.
#[derive(SystemParam)]
pub struct CanvasProjector<'w, 's> {
    window: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
    camera: Query<'w, 's, (&'static Camera, &'static GlobalTransform), With<ReviewCamera>>,
    frame: Res<'w, DocumentFrame>,
    geometry: Res<'w, CanvasGeometry>,
}

impl CanvasProjector<'_, '_> {
    /// Project a canvas-space point to window coordinates, if possible
    pub fn canvas_to_window(&self, point: Vec2) -> Option<Vec2> {
        let (camera, camera_transform) = self.camera.single().ok()?;
        let world = self.frame.canvas_to_world(self.geometry.offset, point)?;
        camera
            .world_to_viewport(camera_transform, world.extend(0.0))
            .ok()
    }

    /// Project a data-space point into Bevy world space (for gizmo drawing)
    pub fn data_to_world(&self, offset: f32, point: Vec2) -> Option<Vec2> {
        self.frame.data_to_world(offset, point)
    }

    /// Get the data-space position of the cursor, if it is over the window
    pub fn cursor_data_pos(&self) -> Option<Vec2> {
        let window = self.window.single().ok()?;
        let (camera, camera_transform) = self.camera.single().ok()?;
        let cursor_pos = window.cursor_position()?;
        let world = camera
            .viewport_to_world_2d(camera_transform, cursor_pos)
            .ok()?;
        self.frame.world_to_data(self.geometry.offset, world)
    }

    /// Logical window size
    pub fn window_size(&self) -> Option<Vec2> {
        let window = self.window.single().ok()?;
        Some(Vec2::new(window.width(), window.height()))
    }
}

pub struct CanvasPlugin;

impl Plugin for CanvasPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DocumentFrame>()
            .init_resource::<CanvasGeometry>()
            .init_resource::<IssueRegions>()
            .add_message::<CanvasTransformChanged>()
            .add_message::<CanvasFitRequest>()
            .add_message::<OpenDocumentRequest>()
            .add_message::<SetupIssueRegions>()
            .add_message::<ToggleRegionVisibility>()
            .init_gizmo_group::<regions::RegionGizmoGroup>()
            .add_systems(
                Startup,
                (
                    camera::spawn_camera,
                    regions::configure_region_gizmos,
                    document::open_last_document.after(ConfigLoaded),
                ),
            )
            // Transform input first, then fit, then the snapshot refresh, so a
            // single frame's changes land in one consistent geometry snapshot
            .add_systems(
                Update,
                (
                    document::open_document_system,
                    camera::camera_pan,
                    camera::camera_zoom,
                    camera::apply_camera_zoom,
                    camera::camera_rotate,
                    camera::watch_window_resize,
                    camera::handle_fit,
                    geometry::refresh_geometry,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    regions::apply_region_setup,
                    regions::apply_region_toggles,
                    regions::render_issue_regions,
                )
                    .chain()
                    .in_set(RegionSync),
            );
    }
}
