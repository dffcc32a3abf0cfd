//! Collision-avoidance layout for collapsed markers.
//!
//! Markers landing on (nearly) the same spot are detected by bucketing on
//! their default anchor row. The first occupant of a bucket keeps the
//! default anchor; each later occupant gets a divisor pair from a hand-tuned
//! profile table that pushes it into a different quadrant around the shared
//! anchor. This is a cheap, deterministic declutter pass, not a physics
//! solver: O(n), no state across renders.

use std::collections::HashMap;

use crate::review::Issue;

use super::placement::ScreenBox;

/// Divisor pair applied to a marker's bounding box to derive its anchor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionOffsetProfile {
    pub hidden_x: f32,
    pub hidden_y: f32,
}

/// Default divisors: anchor at the box center
pub const DEFAULT_PROFILE: CollisionOffsetProfile = CollisionOffsetProfile {
    hidden_x: 2.0,
    hidden_y: 2.0,
};

/// Inherited tuning values for the 1st..4th extra occupant of a bucket, one
/// quadrant each
pub const COLLISION_PROFILES: [CollisionOffsetProfile; 4] = [
    CollisionOffsetProfile {
        hidden_x: 1.4,
        hidden_y: 7.0,
    },
    CollisionOffsetProfile {
        hidden_x: 1.4,
        hidden_y: 1.2,
    },
    CollisionOffsetProfile {
        hidden_x: 10.0,
        hidden_y: 1.2,
    },
    CollisionOffsetProfile {
        hidden_x: 10.0,
        hidden_y: 7.0,
    },
];

/// Vertical lift subtracted from every marker anchor, in canvas pixels
pub const MARKER_ANCHOR_LIFT: f32 = 15.0;

/// Extra vertical drop per completed cycle through the profile table, used
/// once a bucket holds more than four extra markers
pub const MARKER_STACK_DROP: f32 = 24.0;

/// Divisor profile plus extra drop for the n-th occupant of a bucket.
///
/// Occupancies past the table wrap around and stack downward, so arbitrarily
/// many co-located markers stay pairwise distinct.
pub fn profile_for_occupancy(occupancy: u32) -> (CollisionOffsetProfile, f32) {
    if occupancy == 0 {
        return (DEFAULT_PROFILE, 0.0);
    }
    let index = ((occupancy - 1) % 4) as usize;
    let cycles = ((occupancy - 1) / 4) as f32;
    (COLLISION_PROFILES[index], cycles * MARKER_STACK_DROP)
}

/// Computed screen anchor for one collapsed marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSlot {
    pub issue_id: i64,
    pub top: f32,
    pub left: f32,
}

/// Lay out the collapsed markers for one render pass.
///
/// The bucket map lives and dies inside this call; arrangement may shift
/// between renders if the visible set or iteration order changes.
pub fn layout_markers(issues: &[&Issue], offset: f32) -> Vec<MarkerSlot> {
    let mut buckets: HashMap<u32, u32> = HashMap::new();
    let mut slots = Vec::with_capacity(issues.len());

    for issue in issues {
        let Some(bbox) = ScreenBox::from_polygon(&issue.position, offset) else {
            continue;
        };

        // Bucket on the default anchor row, exact bit pattern: identical
        // boxes collide, everything else does not
        let base_top = bbox.min_y + bbox.height() / DEFAULT_PROFILE.hidden_y - MARKER_ANCHOR_LIFT;
        let key = base_top.to_bits();

        let occupancy = match buckets.get(&key) {
            None => {
                buckets.insert(key, 0);
                0
            }
            Some(last) => {
                let next = last + 1;
                buckets.insert(key, next);
                next
            }
        };

        let (profile, extra_drop) = profile_for_occupancy(occupancy);
        slots.push(MarkerSlot {
            issue_id: issue.id,
            top: bbox.min_y + bbox.height() / profile.hidden_y - MARKER_ANCHOR_LIFT + extra_drop,
            left: bbox.min_x + bbox.width() / profile.hidden_x,
        });
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::Comment;

    fn issue_at(id: i64, quad: [f32; 8]) -> Issue {
        Issue {
            id,
            frame: 0,
            position: quad.to_vec(),
            resolved: false,
            comments: vec![Comment {
                id: 1,
                message: "m".to_string(),
                owner: None,
                created_date: None,
            }],
        }
    }

    const QUAD_A: [f32; 8] = [10.0, 10.0, 50.0, 10.0, 50.0, 50.0, 10.0, 50.0];
    const QUAD_FAR: [f32; 8] = [300.0, 300.0, 340.0, 300.0, 340.0, 340.0, 300.0, 340.0];

    #[test]
    fn test_single_marker_gets_default_anchor() {
        let issue = issue_at(1, QUAD_A);
        let slots = layout_markers(&[&issue], 15.0);

        assert_eq!(slots.len(), 1);
        // min_y 25 + height 40/2 - lift 15 = 30; min_x 25 + width 40/2 = 45
        assert_eq!(slots[0].top, 30.0);
        assert_eq!(slots[0].left, 45.0);
    }

    #[test]
    fn test_colliding_markers_get_distinct_anchors() {
        // Two identical boxes share the bucket key; the second must land on
        // a different anchor via the first override pair
        let a = issue_at(1, QUAD_A);
        let b = issue_at(2, QUAD_A);
        let slots = layout_markers(&[&a, &b], 15.0);

        assert_eq!(slots.len(), 2);
        assert!(
            slots[0].top != slots[1].top || slots[0].left != slots[1].left,
            "colliding markers must not be pixel-identical"
        );

        // First override pair: (1.4, 7.0)
        let expected_top = 25.0 + 40.0 / 7.0 - 15.0;
        let expected_left = 25.0 + 40.0 / 1.4;
        assert!((slots[1].top - expected_top).abs() < 1e-4);
        assert!((slots[1].left - expected_left).abs() < 1e-4);
    }

    #[test]
    fn test_distant_markers_keep_default_anchor() {
        let a = issue_at(1, QUAD_A);
        let b = issue_at(2, QUAD_FAR);
        let slots = layout_markers(&[&a, &b], 15.0);

        // Different buckets: both use the default divisors
        assert_eq!(slots[0].top, 30.0);
        assert_eq!(slots[1].top, 300.0 + 15.0 + 40.0 / 2.0 - 15.0);
    }

    #[test]
    fn test_five_colliding_markers_all_distinct() {
        let issues: Vec<Issue> = (1..=6).map(|id| issue_at(id, QUAD_A)).collect();
        let refs: Vec<&Issue> = issues.iter().collect();
        let slots = layout_markers(&refs, 15.0);

        assert_eq!(slots.len(), 6);
        for i in 0..slots.len() {
            for j in (i + 1)..slots.len() {
                assert!(
                    slots[i].top != slots[j].top || slots[i].left != slots[j].left,
                    "slots {} and {} overlap",
                    i,
                    j
                );
            }
        }

        // The sixth marker wraps to the first override pair, one stack down
        let (profile, drop) = profile_for_occupancy(5);
        assert_eq!(profile, COLLISION_PROFILES[0]);
        assert_eq!(drop, MARKER_STACK_DROP);
    }

    #[test]
    fn test_profile_table_coverage() {
        assert_eq!(profile_for_occupancy(0).0, DEFAULT_PROFILE);
        assert_eq!(profile_for_occupancy(1).0, COLLISION_PROFILES[0]);
        assert_eq!(profile_for_occupancy(2).0, COLLISION_PROFILES[1]);
        assert_eq!(profile_for_occupancy(3).0, COLLISION_PROFILES[2]);
        assert_eq!(profile_for_occupancy(4).0, COLLISION_PROFILES[3]);
        // No extra drop within the first cycle
        assert_eq!(profile_for_occupancy(4).1, 0.0);
    }

    #[test]
    fn test_degenerate_position_is_skipped() {
        let mut broken = issue_at(1, QUAD_A);
        broken.position.clear();
        let ok = issue_at(2, QUAD_A);

        let slots = layout_markers(&[&broken, &ok], 15.0);
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].issue_id, 2);
    }
}
