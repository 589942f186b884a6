//! Segment registry: persistent ids for accepted segments and the reverse
//! point → segment table.

use crate::segment::TreeSegment;

/// Maps every point id of the input cloud to the segment that claimed it.
///
/// Segment ids start at 1. A point already claimed by an earlier segment keeps
/// its first owner.
#[derive(Debug, Clone)]
pub struct SegmentRegistry {
    ids: Vec<Option<u32>>,
    next: u32,
}

impl SegmentRegistry {
    /// Registry for a cloud of `n_points` points (ids `0..n_points`).
    pub fn new(n_points: usize) -> Self {
        Self {
            ids: vec![None; n_points],
            next: 1,
        }
    }

    /// Gives `segment` the next id and claims its unclaimed points.
    pub fn claim(&mut self, segment: &TreeSegment) -> u32 {
        let id = self.next;
        segment.assign_segment_id(&mut self.ids, &mut self.next);
        id
    }

    /// Segment that owns point `point_id`, if any.
    pub fn segment_of(&self, point_id: usize) -> Option<u32> {
        self.ids.get(point_id).copied().flatten()
    }

    /// Number of segments registered so far.
    pub fn segment_count(&self) -> usize {
        (self.next - 1) as usize
    }

    /// Per-point segment ids, indexed by point id.
    pub fn into_point_ids(self) -> Vec<Option<u32>> {
        self.ids
    }
}
