//! Planar convex boundary of a point cluster.
//!
//! A [`Boundary`] is an immutable value: adding an exterior point produces a
//! new boundary ([`Boundary::with_point`]) that replaces the old one wholesale.
//! Vertices are stored counter-clockwise, without the closing vertex and
//! without collinear or repeated vertices; [`Boundary::ring`] returns the
//! closed form.

use crate::point::{cross, planar_distance, Point2};
use std::fmt::Write as _;

/// Signed distance (map units) below which a point is still considered on an edge.
const COVER_EPS: f64 = 1e-9;

/// Convex hull of the planar projection of a cluster.
///
/// Degenerate shapes are kept as-is: no vertex (empty cluster), one vertex
/// (all points coincide) or two vertices (all points collinear).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Boundary {
    vertices: Vec<Point2>,
}

impl Boundary {
    /// Boundary of nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Convex hull of `points` (Andrew's monotone chain, O(n log n)).
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point2>,
    {
        let mut pts: Vec<Point2> = points.into_iter().collect();
        pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
        pts.dedup();

        if pts.len() <= 2 {
            return Self { vertices: pts };
        }

        let mut lower: Vec<Point2> = Vec::with_capacity(pts.len());
        for &p in &pts {
            while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0
            {
                lower.pop();
            }
            lower.push(p);
        }

        let mut upper: Vec<Point2> = Vec::with_capacity(pts.len());
        for &p in pts.iter().rev() {
            while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0
            {
                upper.pop();
            }
            upper.push(p);
        }

        // Last point of each chain is the first of the other one.
        lower.pop();
        upper.pop();
        lower.extend(upper);

        Self { vertices: lower }
    }

    /// Hull of the current vertices plus `p`.
    ///
    /// Interior points never become hull vertices again, so this equals the
    /// hull of every point admitted so far plus `p`.
    pub fn with_point(&self, p: Point2) -> Self {
        Self::from_points(self.vertices.iter().copied().chain(std::iter::once(p)))
    }

    /// Counter-clockwise vertices, open (first vertex not repeated).
    pub fn vertices(&self) -> &[Point2] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Closed ring: the vertices followed by the first vertex again.
    ///
    /// A single-vertex boundary yields just that vertex.
    pub fn ring(&self) -> Vec<Point2> {
        let mut ring = self.vertices.clone();
        if ring.len() >= 2 {
            ring.push(ring[0]);
        }
        ring
    }

    /// Polygon area (shoelace). Zero for fewer than three vertices.
    pub fn area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            twice += a.x * b.y - b.x * a.y;
        }
        (twice * 0.5).abs()
    }

    /// `true` if `p` lies inside or on the boundary.
    pub fn covers(&self, p: Point2) -> bool {
        match self.vertices.len() {
            0 => false,
            1 => planar_distance(self.vertices[0], p) <= COVER_EPS,
            2 => on_segment(self.vertices[0], self.vertices[1], p),
            n => (0..n).all(|i| {
                let a = self.vertices[i];
                let b = self.vertices[(i + 1) % n];
                cross(a, b, p) >= -COVER_EPS * planar_distance(a, b)
            }),
        }
    }

    /// WKT geometry of the boundary: `POLYGON` for a proper hull, `LINESTRING`
    /// or `POINT` for degenerate ones.
    pub fn to_wkt(&self) -> String {
        let mut wkt = String::new();
        match self.vertices.len() {
            0 => wkt.push_str("POLYGON EMPTY"),
            1 => {
                let v = self.vertices[0];
                let _ = write!(wkt, "POINT({:.2} {:.2})", v.x, v.y);
            }
            2 => {
                wkt.push_str("LINESTRING(");
                push_coords(&mut wkt, &self.vertices);
                wkt.push(')');
            }
            _ => {
                wkt.push_str("POLYGON((");
                push_coords(&mut wkt, &self.ring());
                wkt.push_str("))");
            }
        }
        wkt
    }
}

fn push_coords(wkt: &mut String, coords: &[Point2]) {
    for (i, v) in coords.iter().enumerate() {
        if i > 0 {
            wkt.push(',');
        }
        let _ = write!(wkt, "{:.2} {:.2}", v.x, v.y);
    }
}

fn on_segment(a: Point2, b: Point2, p: Point2) -> bool {
    let len = planar_distance(a, b);
    if cross(a, b, p).abs() > COVER_EPS * len {
        return false;
    }
    let dot = (p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y);
    dot >= -COVER_EPS * len && dot <= len * len + COVER_EPS * len
}
