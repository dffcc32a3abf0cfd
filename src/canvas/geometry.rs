//! Geometry snapshot of the rendering surface.
//!
//! The overlay never talks to the camera directly; it reads [`CanvasGeometry`],
//! which is re-read from the camera only when the canvas announces a transform
//! change. A stale snapshot is impossible by construction: every zoom, fit and
//! reshape writes a [`CanvasTransformChanged`] message and the refresh system
//! rebuilds the snapshot wholesale.

use bevy::prelude::*;

use crate::constants::FRAME_PADDING;

use super::camera::{CameraZoom, CanvasAngle, ReviewCamera};
use super::document::DocumentFrame;

/// Which canvas signal invalidated the previous snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformChange {
    Zoom,
    Fit,
    Reshape,
}

/// Message fired by the canvas whenever its view transform changes
#[derive(Message)]
pub struct CanvasTransformChanged {
    pub change: TransformChange,
}

/// Message asking the canvas to fit the document into the window
#[derive(Message)]
pub struct CanvasFitRequest;

/// Immutable-per-render view of the canvas transform.
///
/// `offset` is added to every data coordinate to reach canvas space; `scale`
/// is the zoom factor (screen size = data size × scale); `angle` is the
/// content rotation in degrees. Marker anchors are projected through the
/// camera so overlay widgets stay upright and constant-sized on screen.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    /// False until a document is loaded and the camera exists; the overlay
    /// renders nothing while false
    pub ready: bool,
    pub offset: f32,
    pub scale: f32,
    pub angle: f32,
}

impl Default for CanvasGeometry {
    fn default() -> Self {
        Self {
            ready: false,
            offset: FRAME_PADDING,
            scale: 1.0,
            angle: 0.0,
        }
    }
}

/// Rebuilds the geometry snapshot when the canvas reports a transform change
pub fn refresh_geometry(
    mut events: MessageReader<CanvasTransformChanged>,
    frame: Res<DocumentFrame>,
    camera_query: Query<(&CameraZoom, &CanvasAngle), With<ReviewCamera>>,
    mut geometry: ResMut<CanvasGeometry>,
) {
    let mut changed = false;
    for event in events.read() {
        debug!("Canvas transform changed: {:?}", event.change);
        changed = true;
    }
    if !changed {
        return;
    }

    let Ok((zoom, angle)) = camera_query.single() else {
        geometry.ready = false;
        return;
    };

    *geometry = CanvasGeometry {
        ready: frame.is_ready(),
        offset: FRAME_PADDING,
        // CameraZoom stores the orthographic projection scale, which grows
        // when zooming out; the content zoom factor is its inverse.
        scale: 1.0 / zoom.scale,
        angle: angle.degrees,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_defaults_to_not_ready() {
        let geometry = CanvasGeometry::default();
        assert!(!geometry.ready);
        assert_eq!(geometry.offset, FRAME_PADDING);
        assert_eq!(geometry.scale, 1.0);
        assert_eq!(geometry.angle, 0.0);
    }
}
