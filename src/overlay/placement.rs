//! Screen-space mapping from data polygons to overlay anchors.
//!
//! The mapping rule is deliberately simple: every data coordinate is shifted
//! by the geometry offset, and the resulting bounding box drives all anchor
//! math. Rotation and zoom never enter here; anchors are projected through
//! the camera afterwards, which is what keeps markers upright and
//! constant-sized while the content transforms underneath them.

use bevy::prelude::*;

/// Axis-aligned bounding box of a translated polygon, in canvas space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl ScreenBox {
    /// Translate every data coordinate by `offset` and take the bounding
    /// box. Returns `None` for polygons with fewer than one x,y pair.
    pub fn from_polygon(points: &[f32], offset: f32) -> Option<ScreenBox> {
        let mut pairs = points.chunks_exact(2);
        let first = pairs.next()?;

        let mut bbox = ScreenBox {
            min_x: first[0] + offset,
            min_y: first[1] + offset,
            max_x: first[0] + offset,
            max_y: first[1] + offset,
        };

        for pair in pairs {
            let x = pair[0] + offset;
            let y = pair[1] + offset;
            bbox.min_x = bbox.min_x.min(x);
            bbox.min_y = bbox.min_y.min(y);
            bbox.max_x = bbox.max_x.max(x);
            bbox.max_y = bbox.max_y.max(y);
        }

        Some(bbox)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Anchor of the expanded dialog: the box center
    pub fn dialog_anchor(&self) -> Vec2 {
        Vec2::new(
            self.min_x + self.width() / 2.0,
            self.min_y + self.height() / 2.0,
        )
    }

    /// Anchor of the draft creation dialog: left edge, below the region
    pub fn draft_anchor(&self) -> Vec2 {
        Vec2::new(self.min_x, self.max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: [f32; 8] = [10.0, 10.0, 50.0, 10.0, 50.0, 50.0, 10.0, 50.0];

    #[test]
    fn test_bbox_applies_offset() {
        let bbox = ScreenBox::from_polygon(&QUAD, 15.0).unwrap();
        assert_eq!(bbox.min_x, 25.0);
        assert_eq!(bbox.min_y, 25.0);
        assert_eq!(bbox.max_x, 65.0);
        assert_eq!(bbox.max_y, 65.0);
        assert_eq!(bbox.width(), 40.0);
        assert_eq!(bbox.height(), 40.0);
    }

    #[test]
    fn test_translating_polygon_shifts_anchor_by_same_vector() {
        // Round-trip property: moving the data polygon by a known vector
        // moves the screen anchor by exactly that vector
        let shifted: Vec<f32> = QUAD
            .chunks_exact(2)
            .flat_map(|pair| [pair[0] + 7.0, pair[1] - 3.0])
            .collect();

        let base = ScreenBox::from_polygon(&QUAD, 15.0).unwrap().dialog_anchor();
        let moved = ScreenBox::from_polygon(&shifted, 15.0)
            .unwrap()
            .dialog_anchor();

        assert_eq!(moved - base, Vec2::new(7.0, -3.0));
    }

    #[test]
    fn test_empty_polygon_has_no_box() {
        assert!(ScreenBox::from_polygon(&[], 15.0).is_none());
        assert!(ScreenBox::from_polygon(&[1.0], 15.0).is_none());
    }

    #[test]
    fn test_odd_trailing_coordinate_is_ignored() {
        let bbox = ScreenBox::from_polygon(&[0.0, 0.0, 10.0, 10.0, 99.0], 0.0).unwrap();
        assert_eq!(bbox.max_x, 10.0);
    }

    #[test]
    fn test_draft_anchor_is_left_bottom() {
        let bbox = ScreenBox::from_polygon(&QUAD, 0.0).unwrap();
        assert_eq!(bbox.draft_anchor(), Vec2::new(10.0, 50.0));
    }

    #[test]
    fn test_dialog_anchor_is_center() {
        let bbox = ScreenBox::from_polygon(&QUAD, 0.0).unwrap();
        assert_eq!(bbox.dialog_anchor(), Vec2::new(30.0, 30.0));
    }
}
