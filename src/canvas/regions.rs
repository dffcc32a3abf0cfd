//! Issue highlight regions drawn on the canvas.
//!
//! The overlay owns which regions exist and whether they are hidden; the
//! canvas only draws them. Region id `0` is reserved for the draft issue.

use bevy::camera::visibility::RenderLayers;
use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore};
use bevy::prelude::*;
use std::collections::HashMap;

use crate::theme;

use super::document::DocumentFrame;
use super::geometry::CanvasGeometry;

/// Region id reserved for the draft issue; persisted issue ids are never 0
pub const DRAFT_REGION_ID: i64 = 0;

/// Custom gizmo group for issue region rendering
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct RegionGizmoGroup;

/// Keep region gizmos on the default camera layer
pub fn configure_region_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<RegionGizmoGroup>();
    config.render_layers = RenderLayers::layer(0);
}

/// A single highlight region in data-space coordinates
#[derive(Clone, Debug, PartialEq)]
pub struct IssueRegion {
    /// Flat x,y polygon in data space
    pub points: Vec<f32>,
    pub hidden: bool,
}

/// All highlight regions currently installed on the canvas
#[derive(Resource, Default)]
pub struct IssueRegions {
    pub regions: HashMap<i64, IssueRegion>,
}

impl IssueRegions {
    pub fn set_visible(&mut self, issue_id: i64, visible: bool) {
        if let Some(region) = self.regions.get_mut(&issue_id) {
            region.hidden = !visible;
        }
    }
}

/// Message replacing the full region set (the overlay rebuilds it wholesale)
#[derive(Message)]
pub struct SetupIssueRegions {
    pub regions: HashMap<i64, IssueRegion>,
}

/// Message toggling a single region's visibility
#[derive(Message)]
pub struct ToggleRegionVisibility {
    pub issue_id: i64,
    pub visible: bool,
}

pub fn apply_region_setup(
    mut events: MessageReader<SetupIssueRegions>,
    mut regions: ResMut<IssueRegions>,
) {
    for event in events.read() {
        regions.regions = event.regions.clone();
    }
}

pub fn apply_region_toggles(
    mut events: MessageReader<ToggleRegionVisibility>,
    mut regions: ResMut<IssueRegions>,
) {
    for event in events.read() {
        regions.set_visible(event.issue_id, event.visible);
    }
}

/// Draws every visible region as a closed polygon in world space
pub fn render_issue_regions(
    mut gizmos: Gizmos<RegionGizmoGroup>,
    regions: Res<IssueRegions>,
    frame: Res<DocumentFrame>,
    geometry: Res<CanvasGeometry>,
) {
    if !geometry.ready {
        return;
    }

    for (id, region) in regions.regions.iter() {
        if region.hidden || region.points.len() < 6 {
            continue;
        }

        let color = if *id == DRAFT_REGION_ID {
            theme::DRAFT_REGION_OUTLINE
        } else {
            theme::REGION_OUTLINE
        };

        let world_points: Vec<Vec2> = region
            .points
            .chunks_exact(2)
            .filter_map(|pair| {
                frame.data_to_world(geometry.offset, Vec2::new(pair[0], pair[1]))
            })
            .collect();

        for window in world_points.windows(2) {
            gizmos.line_2d(window[0], window[1], color);
        }
        if let (Some(first), Some(last)) = (world_points.first(), world_points.last()) {
            gizmos.line_2d(*last, *first, color);
        }
    }
}
