//! Reviewed document loading and coordinate spaces.
//!
//! Three coordinate spaces meet here:
//! - **data space**: document pixels, origin at the document's top-left
//!   corner, y growing downward. Issue positions are stored in this space.
//! - **canvas space**: data space shifted by the frame padding (`offset`),
//!   origin at the padded frame's top-left corner. The overlay computes all
//!   marker anchors in this space.
//! - **world space**: Bevy's 2D world, y growing upward, with the padded
//!   frame centered on the origin. The camera projects world to the window.

use bevy::prelude::*;
use std::path::PathBuf;

use crate::config::UpdateLastDocumentRequest;
use crate::ui::Notifications;

use super::geometry::CanvasFitRequest;

/// Marker component for the document sprite
#[derive(Component)]
pub struct DocumentSprite;

/// The currently reviewed document, if any
#[derive(Resource, Default)]
pub struct DocumentFrame {
    /// Document dimensions in pixels; `None` until a document is opened
    pub size: Option<Vec2>,
    /// Source path of the opened document
    pub path: Option<PathBuf>,
}

impl DocumentFrame {
    pub fn is_ready(&self) -> bool {
        self.size.is_some()
    }

    /// Canvas space → Bevy world space
    pub fn canvas_to_world(&self, offset: f32, c: Vec2) -> Option<Vec2> {
        let size = self.size?;
        Some(Vec2::new(
            c.x - (offset + size.x / 2.0),
            (offset + size.y / 2.0) - c.y,
        ))
    }

    /// Bevy world space → canvas space
    pub fn world_to_canvas(&self, offset: f32, w: Vec2) -> Option<Vec2> {
        let size = self.size?;
        Some(Vec2::new(
            w.x + offset + size.x / 2.0,
            offset + size.y / 2.0 - w.y,
        ))
    }

    /// Data space → Bevy world space
    pub fn data_to_world(&self, offset: f32, d: Vec2) -> Option<Vec2> {
        self.canvas_to_world(offset, d + Vec2::splat(offset))
    }

    /// Bevy world space → data space
    pub fn world_to_data(&self, offset: f32, w: Vec2) -> Option<Vec2> {
        self.world_to_canvas(offset, w).map(|c| c - Vec2::splat(offset))
    }
}

/// Message to open a document image for review
#[derive(Message)]
pub struct OpenDocumentRequest {
    pub path: PathBuf,
}

/// Opens a document: probes its dimensions up front so the frame and fit can
/// be set up before the asset finishes loading.
pub fn open_document_system(
    mut commands: Commands,
    mut events: MessageReader<OpenDocumentRequest>,
    asset_server: Res<AssetServer>,
    mut frame: ResMut<DocumentFrame>,
    existing: Query<Entity, With<DocumentSprite>>,
    mut fit_events: MessageWriter<CanvasFitRequest>,
    mut config_events: MessageWriter<UpdateLastDocumentRequest>,
    mut notifications: ResMut<Notifications>,
) {
    for event in events.read() {
        match image::image_dimensions(&event.path) {
            Ok((width, height)) => {
                for entity in existing.iter() {
                    commands.entity(entity).despawn();
                }

                let texture = asset_server.load(event.path.clone());
                commands.spawn((
                    Sprite::from_image(texture),
                    Transform::from_translation(Vec3::ZERO),
                    DocumentSprite,
                ));

                frame.size = Some(Vec2::new(width as f32, height as f32));
                frame.path = Some(event.path.clone());

                fit_events.write(CanvasFitRequest);
                config_events.write(UpdateLastDocumentRequest {
                    path: event.path.clone(),
                });

                if let Some(name) = event.path.file_name().and_then(|n| n.to_str()) {
                    notifications.info(format!("Reviewing {}", name));
                }
                info!("Opened document {:?} ({}x{})", event.path, width, height);
            }
            Err(e) => {
                warn!("Failed to open document {:?}: {}", event.path, e);
                notifications.error(format!("Could not open document: {}", e));
            }
        }
    }
}

/// Startup system that re-opens the last reviewed document, if it still exists
pub fn open_last_document(
    config: Res<crate::config::AppConfig>,
    mut open_events: MessageWriter<OpenDocumentRequest>,
) {
    if let Some(ref path) = config.data.last_document {
        if path.exists() {
            open_events.write(OpenDocumentRequest { path: path.clone() });
        } else {
            info!("Last reviewed document no longer exists: {:?}", path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_800x600() -> DocumentFrame {
        DocumentFrame {
            size: Some(Vec2::new(800.0, 600.0)),
            path: None,
        }
    }

    #[test]
    fn test_not_ready_without_document() {
        let frame = DocumentFrame::default();
        assert!(!frame.is_ready());
        assert!(frame.canvas_to_world(20.0, Vec2::ZERO).is_none());
        assert!(frame.world_to_data(20.0, Vec2::ZERO).is_none());
    }

    #[test]
    fn test_document_top_left_maps_to_sprite_corner() {
        let frame = frame_800x600();
        // Data origin is the document's top-left pixel; the sprite is
        // centered on the world origin.
        let world = frame.data_to_world(20.0, Vec2::ZERO).unwrap();
        assert_eq!(world, Vec2::new(-400.0, 300.0));
    }

    #[test]
    fn test_document_center_maps_to_world_origin() {
        let frame = frame_800x600();
        let world = frame.data_to_world(20.0, Vec2::new(400.0, 300.0)).unwrap();
        assert_eq!(world, Vec2::ZERO);
    }

    #[test]
    fn test_world_data_roundtrip() {
        let frame = frame_800x600();
        let data = Vec2::new(123.5, 456.25);
        let world = frame.data_to_world(20.0, data).unwrap();
        let back = frame.world_to_data(20.0, world).unwrap();
        assert!((back - data).length() < 1e-4);
    }

    #[test]
    fn test_canvas_space_is_data_plus_offset() {
        let frame = frame_800x600();
        let offset = 20.0;
        let data = Vec2::new(50.0, 75.0);
        let via_data = frame.data_to_world(offset, data).unwrap();
        let via_canvas = frame
            .canvas_to_world(offset, data + Vec2::splat(offset))
            .unwrap();
        assert_eq!(via_data, via_canvas);
    }
}
