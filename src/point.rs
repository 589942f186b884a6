//! Point types and planar projection.
//!
//! Every geometric quantity in this crate is computed in the horizontal (x, y)
//! plane; elevation travels with the 3D point and is only read back for the
//! highest/lowest point queries and the size score.

use serde::{Deserialize, Serialize};

/// A LiDAR return: planar position, elevation and a stable external id.
///
/// `id` indexes the caller's global point table (see
/// [`SegmentRegistry`](crate::registry::SegmentRegistry)).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointXYZ {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub id: usize,
}

impl PointXYZ {
    pub fn new(x: f64, y: f64, z: f64, id: usize) -> Self {
        Self { x, y, z, id }
    }

    /// Planar projection (elevation dropped).
    #[inline]
    pub fn planar(&self) -> Point2 {
        Point2 { x: self.x, y: self.y }
    }
}

/// A point in the horizontal plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance in the horizontal plane.
#[inline]
pub fn planar_distance(a: Point2, b: Point2) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Z component of `(a - o) × (b - o)`. Positive when `o → a → b` turns left.
#[inline]
pub(crate) fn cross(o: Point2, a: Point2, b: Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Planar centroid of a point set, `None` if empty.
pub fn planar_centroid<'a, I>(points: I) -> Option<Point2>
where
    I: IntoIterator<Item = &'a PointXYZ>,
{
    let mut n = 0usize;
    let mut sx = 0.0;
    let mut sy = 0.0;
    for p in points {
        sx += p.x;
        sy += p.y;
        n += 1;
    }
    if n == 0 {
        None
    } else {
        Some(Point2::new(sx / n as f64, sy / n as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_drops_elevation() {
        let p = PointXYZ::new(3.0, 4.0, 25.0, 7);
        assert_eq!(p.planar(), Point2::new(3.0, 4.0));
        assert!((planar_distance(p.planar(), Point2::default()) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_cross_orientation() {
        let o = Point2::new(0.0, 0.0);
        assert!(cross(o, Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)) > 0.0);
        assert!(cross(o, Point2::new(0.0, 1.0), Point2::new(1.0, 0.0)) < 0.0);
        assert_eq!(cross(o, Point2::new(1.0, 1.0), Point2::new(2.0, 2.0)), 0.0);
    }

    #[test]
    fn test_planar_centroid() {
        let pts = [
            PointXYZ::new(0.0, 0.0, 1.0, 0),
            PointXYZ::new(2.0, 0.0, 5.0, 1),
            PointXYZ::new(2.0, 2.0, 3.0, 2),
            PointXYZ::new(0.0, 2.0, 9.0, 3),
        ];
        assert_eq!(planar_centroid(&pts), Some(Point2::new(1.0, 1.0)));
        let empty: [PointXYZ; 0] = [];
        assert_eq!(planar_centroid(&empty), None);
    }
}
