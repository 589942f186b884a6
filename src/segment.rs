//! A candidate tree: an incrementally grown cluster of LiDAR points.
//!
//! [`TreeSegment`] owns the points fed to it by the clustering step, keeps the
//! planar convex boundary of those points up to date, and caches the derived
//! metrics (area, last area change, two-point distance) that the scores in
//! [`crate::scoring`] read.
//!
//! Most points admitted after the first few fall inside the current boundary;
//! for them [`TreeSegment::add_point`] only pays for a containment test.

use crate::boundary::Boundary;
use crate::point::{planar_distance, Point2, PointXYZ};
use crate::scoring::Scores;

/// One candidate tree crown.
#[derive(Debug, Clone, Default)]
pub struct TreeSegment {
    pub(crate) points: Vec<PointXYZ>,
    boundary: Boundary,
    apex: Option<Point2>,
    /// Index in `points` of the highest point (first one on ties).
    highest: Option<usize>,
    pub(crate) area: f64,
    area_delta: f64,
    pub(crate) pair_distance: f64,
    /// Closed boundary ring captured at the last area recomputation.
    pub(crate) hull_ring: Vec<Point2>,
    pub(crate) scores: Scores,
}

impl TreeSegment {
    /// Empty segment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Segment seeded with its apex.
    pub fn with_seed(seed: PointXYZ) -> Self {
        let mut seg = Self::new();
        seg.add_point(seed);
        seg
    }

    /// Builds a segment from a batch of points in one pass, then computes the
    /// boundary and metrics once with [`TreeSegment::rebuild`].
    pub fn from_points(points: &[PointXYZ]) -> Self {
        let mut seg = Self::new();
        seg.points = points.to_vec();
        for i in 0..seg.points.len() {
            seg.track_highest(i);
        }
        seg.apex = points.first().map(PointXYZ::planar);
        seg.rebuild();
        seg
    }

    /// Admits `p`.
    ///
    /// When the planar projection of `p` is covered by the current boundary
    /// nothing but the point list changes. Otherwise the boundary is replaced
    /// by the hull including `p` and the area cache is refreshed.
    pub fn add_point(&mut self, p: PointXYZ) {
        let idx = self.points.len();
        self.points.push(p);
        self.track_highest(idx);
        if self.apex.is_none() {
            self.apex = Some(p.planar());
        }

        if self.points.len() == 2 {
            self.update_pair_distance();
        } else {
            self.pair_distance = 0.0;
        }

        let q = p.planar();
        if self.boundary.covers(q) {
            return;
        }
        self.boundary = self.boundary.with_point(q);
        self.recompute_area();
    }

    /// Absolute area change that admitting `p` would cause, without admitting it.
    ///
    /// Zero when `p` is already covered by the boundary.
    pub fn test_area_change(&self, p: &PointXYZ) -> f64 {
        let q = p.planar();
        if self.boundary.covers(q) {
            return 0.0;
        }
        (self.boundary.with_point(q).area() - self.area).abs()
    }

    /// Planar distance from `p` to the closest point of the segment.
    pub fn nearest_distance(&self, p: &PointXYZ) -> Option<f64> {
        let q = p.planar();
        self.points
            .iter()
            .map(|s| planar_distance(s.planar(), q))
            .min_by(f64::total_cmp)
    }

    /// Recomputes boundary, area and pair distance from the full point list.
    ///
    /// `area_delta` keeps the value of the last incremental mutation.
    pub fn rebuild(&mut self) {
        self.boundary = Boundary::from_points(self.points.iter().map(PointXYZ::planar));
        match self.points.len() {
            0 | 1 => {
                self.area = 0.0;
                self.pair_distance = 0.0;
                self.hull_ring.clear();
            }
            2 => {
                self.area = 0.0;
                self.hull_ring.clear();
                self.update_pair_distance();
            }
            _ => {
                self.area = self.boundary.area();
                self.hull_ring = self.boundary.ring();
                self.pair_distance = 0.0;
            }
        }
    }

    /// Refreshes the area cache after a boundary mutation.
    ///
    /// No-op while the segment has two points or fewer.
    fn recompute_area(&mut self) {
        if self.points.len() <= 2 {
            return;
        }
        let previous = self.area;
        self.area = self.boundary.area();
        self.area_delta = (self.area - previous).abs();
        self.hull_ring = self.boundary.ring();
        self.pair_distance = 0.0;
    }

    fn update_pair_distance(&mut self) {
        if let [a, b] = self.points.as_slice() {
            self.pair_distance = planar_distance(a.planar(), b.planar());
        }
    }

    fn track_highest(&mut self, idx: usize) {
        let z = self.points[idx].z;
        match self.highest {
            Some(h) if self.points[h].z >= z => {}
            _ => self.highest = Some(idx),
        }
    }

    /// Number of admitted points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in insertion order.
    pub fn points(&self) -> &[PointXYZ] {
        &self.points
    }

    /// Current convex boundary.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// Planar position of the first admitted point.
    pub fn apex(&self) -> Option<Point2> {
        self.apex
    }

    /// Boundary area, 0 below three points.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Absolute area change of the last boundary mutation.
    pub fn area_delta(&self) -> f64 {
        self.area_delta
    }

    /// Distance between the two points of a two-point segment.
    pub fn pair_distance(&self) -> f64 {
        self.pair_distance
    }

    /// Closed boundary ring as of the last area recomputation.
    pub fn hull_ring(&self) -> &[Point2] {
        &self.hull_ring
    }

    /// Point with the maximum elevation; the earliest one on ties.
    pub fn highest_point(&self) -> Option<&PointXYZ> {
        self.highest.and_then(|i| self.points.get(i))
    }

    /// Point with the minimum elevation; the earliest one on ties.
    pub fn lowest_point(&self) -> Option<&PointXYZ> {
        self.points
            .iter()
            .reduce(|low, p| if p.z < low.z { p } else { low })
    }

    /// Scores from the last [`TreeSegment::score`] call.
    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    /// Writes this segment's index into `ids` for every point not already
    /// claimed, then advances `next_index`.
    ///
    /// Point ids beyond `ids.len()` are skipped.
    pub fn assign_segment_id(&self, ids: &mut [Option<u32>], next_index: &mut u32) {
        for p in &self.points {
            match ids.get_mut(p.id) {
                Some(slot) => {
                    if slot.is_none() {
                        *slot = Some(*next_index);
                    }
                }
                None => log::warn!(
                    "point id {} out of range ({} slots), segment {} skips it",
                    p.id,
                    ids.len(),
                    next_index
                ),
            }
        }
        *next_index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64, z: f64, id: usize) -> PointXYZ {
        PointXYZ::new(x, y, z, id)
    }

    #[test]
    fn test_degenerate_counts() {
        let seg = TreeSegment::new();
        assert_eq!(seg.area(), 0.0);
        assert!(seg.boundary().is_empty());
        assert!(seg.apex().is_none());

        let mut seg = TreeSegment::with_seed(pt(1.0, 2.0, 10.0, 0));
        assert_eq!(seg.area(), 0.0);
        assert_eq!(seg.boundary().vertices(), &[Point2::new(1.0, 2.0)]);
        assert_eq!(seg.pair_distance(), 0.0);

        seg.add_point(pt(4.0, 6.0, 8.0, 1));
        assert_eq!(seg.len(), 2);
        assert_eq!(seg.area(), 0.0);
        assert!((seg.pair_distance() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_pair_distance_cleared_by_covered_third_point() {
        let mut seg = TreeSegment::with_seed(pt(0.0, 0.0, 20.0, 0));
        seg.add_point(pt(2.0, 0.0, 10.0, 1));
        assert!((seg.pair_distance() - 2.0).abs() < 1e-12);

        // lies on the two-point boundary, so no area recomputation happens
        seg.add_point(pt(1.0, 0.0, 10.0, 2));
        assert_eq!(seg.boundary().len(), 2);
        assert_eq!(seg.pair_distance(), 0.0);
    }

    #[test]
    fn test_duplicate_second_point() {
        let mut seg = TreeSegment::with_seed(pt(1.0, 1.0, 10.0, 0));
        seg.add_point(pt(1.0, 1.0, 9.0, 1));
        assert_eq!(seg.len(), 2);
        assert_eq!(seg.pair_distance(), 0.0);
        assert_eq!(seg.boundary().len(), 1);
    }

    #[test]
    fn test_third_point_builds_area() {
        let mut seg = TreeSegment::new();
        seg.add_point(pt(0.0, 0.0, 10.0, 0));
        seg.add_point(pt(2.0, 0.0, 8.0, 1));
        seg.add_point(pt(0.0, 2.0, 7.0, 2));
        assert!((seg.area() - 2.0).abs() < 1e-12);
        assert!((seg.area_delta() - 2.0).abs() < 1e-12);
        assert_eq!(seg.pair_distance(), 0.0);
        assert_eq!(seg.hull_ring().len(), 4);
    }

    #[test]
    fn test_interior_point_is_idempotent() {
        let mut seg = TreeSegment::new();
        for (i, &(x, y)) in [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)].iter().enumerate() {
            seg.add_point(pt(x, y, 5.0, i));
        }
        let boundary = seg.boundary().clone();
        let (area, delta) = (seg.area(), seg.area_delta());

        seg.add_point(pt(2.0, 2.0, 6.0, 4));
        seg.add_point(pt(4.0, 2.0, 6.0, 5));

        assert_eq!(seg.len(), 6);
        assert_eq!(seg.boundary(), &boundary);
        assert_eq!(seg.area(), area);
        assert_eq!(seg.area_delta(), delta);
    }

    #[test]
    fn test_area_is_monotone() {
        let coords = [
            (0.0, 0.0),
            (1.0, 0.2),
            (0.3, 1.1),
            (0.5, 0.5),
            (-1.0, 0.4),
            (2.0, 2.0),
            (0.9, 0.9),
            (-0.5, -1.5),
            (3.0, -1.0),
            (1.0, 1.0),
        ];
        let mut seg = TreeSegment::new();
        let mut last = 0.0;
        for (i, &(x, y)) in coords.iter().enumerate() {
            seg.add_point(pt(x, y, 1.0 + i as f64, i));
            assert!(seg.area() >= last, "area shrank at point {}", i);
            last = seg.area();
        }
        for p in seg.points() {
            assert!(seg.boundary().covers(p.planar()));
        }
    }

    #[test]
    fn test_area_change_is_pure() {
        let mut seg = TreeSegment::new();
        for (i, &(x, y)) in [(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)].iter().enumerate() {
            seg.add_point(pt(x, y, 3.0, i));
        }
        assert_eq!(seg.test_area_change(&pt(0.5, 0.5, 1.0, 9)), 0.0);

        let change = seg.test_area_change(&pt(2.0, 2.0, 1.0, 9));
        assert!((change - 2.0).abs() < 1e-12);
        assert_eq!(seg.len(), 3);
        assert!((seg.area() - 2.0).abs() < 1e-12);

        seg.add_point(pt(2.0, 2.0, 1.0, 9));
        assert!((seg.area_delta() - change).abs() < 1e-12);
    }

    #[test]
    fn test_highest_and_lowest_ties() {
        let mut seg = TreeSegment::new();
        seg.add_point(pt(0.0, 0.0, 20.0, 0));
        seg.add_point(pt(1.0, 0.0, 20.0, 1));
        seg.add_point(pt(0.0, 1.0, 5.0, 2));
        seg.add_point(pt(1.0, 1.0, 5.0, 3));
        assert_eq!(seg.highest_point().map(|p| p.id), Some(0));
        assert_eq!(seg.lowest_point().map(|p| p.id), Some(2));

        seg.add_point(pt(0.5, 0.5, 25.0, 4));
        assert_eq!(seg.highest_point().map(|p| p.id), Some(4));
        assert_eq!(seg.apex(), Some(Point2::new(0.0, 0.0)));
    }

    #[test]
    fn test_nearest_distance() {
        let mut seg = TreeSegment::new();
        assert!(seg.nearest_distance(&pt(0.0, 0.0, 0.0, 0)).is_none());
        seg.add_point(pt(0.0, 0.0, 10.0, 0));
        seg.add_point(pt(10.0, 0.0, 10.0, 1));
        let d = seg.nearest_distance(&pt(7.0, 4.0, 3.0, 2)).unwrap();
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_points_matches_incremental() {
        let pts: Vec<PointXYZ> = [(0.0, 0.0, 9.0), (3.0, 0.0, 4.0), (3.0, 3.0, 12.0), (0.0, 3.0, 2.0), (1.0, 1.0, 1.0)]
            .iter()
            .enumerate()
            .map(|(i, &(x, y, z))| pt(x, y, z, i))
            .collect();
        let batch = TreeSegment::from_points(&pts);
        let mut incr = TreeSegment::new();
        for p in &pts {
            incr.add_point(*p);
        }
        assert_eq!(batch.boundary(), incr.boundary());
        assert!((batch.area() - incr.area()).abs() < 1e-12);
        assert_eq!(batch.highest_point().map(|p| p.id), Some(2));
        assert_eq!(batch.apex(), incr.apex());

        let pair = TreeSegment::from_points(&pts[..2]);
        assert!((pair.pair_distance() - 3.0).abs() < 1e-12);
        assert_eq!(pair.area(), 0.0);
    }

    #[test]
    fn test_assign_segment_id_first_claim_wins() {
        let a = TreeSegment::from_points(&[pt(0.0, 0.0, 5.0, 0), pt(1.0, 0.0, 5.0, 1)]);
        let b = TreeSegment::from_points(&[pt(1.0, 0.0, 5.0, 1), pt(2.0, 0.0, 5.0, 2)]);
        let mut ids = vec![None; 3];
        let mut next = 1;
        a.assign_segment_id(&mut ids, &mut next);
        b.assign_segment_id(&mut ids, &mut next);
        assert_eq!(ids, vec![Some(1), Some(1), Some(2)]);
        assert_eq!(next, 3);
    }

    #[test]
    fn test_assign_segment_id_skips_out_of_range() {
        let a = TreeSegment::from_points(&[pt(0.0, 0.0, 5.0, 0), pt(1.0, 0.0, 5.0, 7)]);
        let mut ids = vec![None; 2];
        let mut next = 4;
        a.assign_segment_id(&mut ids, &mut next);
        assert_eq!(ids, vec![Some(4), None]);
        assert_eq!(next, 5);
    }
}
