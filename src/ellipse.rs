//! Principal-axis fit of a boundary vertex set.
//!
//! The fit is a 2×2 PCA solved in closed form from the trace and determinant
//! of the covariance matrix; vertices are then projected on both principal
//! axes and the spread along each axis is reported.

use crate::point::Point2;

/// Result of [`fit_ellipse`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseFit {
    /// Mean of the distinct vertices.
    pub centroid: Point2,
    /// Unit principal axes, major first.
    pub axes: [Point2; 2],
    /// Covariance eigenvalues matching `axes` (descending).
    pub eigenvalues: [f64; 2],
    /// Spread `max - min` of the projections on each axis.
    ///
    /// These are full axis lengths, not half-lengths; the circularity score
    /// only uses their ratio.
    pub extents: [f64; 2],
}

impl EllipseFit {
    /// Major / minor extent, 0 when the minor extent vanishes.
    pub fn elongation(&self) -> f64 {
        let a = self.extents[0].max(self.extents[1]);
        let b = self.extents[0].min(self.extents[1]);
        if b != 0.0 {
            a / b
        } else {
            0.0
        }
    }
}

/// Fit principal axes to `vertices` (exact duplicates are ignored, so a
/// closed ring can be passed as-is).
///
/// Returns `None` with fewer than two distinct vertices.
pub fn fit_ellipse(vertices: &[Point2]) -> Option<EllipseFit> {
    let mut distinct: Vec<Point2> = Vec::with_capacity(vertices.len());
    for v in vertices {
        if !distinct.contains(v) {
            distinct.push(*v);
        }
    }
    if distinct.len() < 2 {
        return None;
    }

    let n = distinct.len() as f64;
    let cx = distinct.iter().map(|v| v.x).sum::<f64>() / n;
    let cy = distinct.iter().map(|v| v.y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for v in &distinct {
        let dx = v.x - cx;
        let dy = v.y - cy;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    let (eigenvalues, axes) = symmetric_eigen(sxx / n, sxy / n, syy / n);

    let mut extents = [0.0; 2];
    for (k, axis) in axes.iter().enumerate() {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for v in &distinct {
            let t = (v.x - cx) * axis.x + (v.y - cy) * axis.y;
            lo = lo.min(t);
            hi = hi.max(t);
        }
        extents[k] = (hi - lo).abs();
    }

    Some(EllipseFit {
        centroid: Point2::new(cx, cy),
        axes,
        eigenvalues,
        extents,
    })
}

/// Eigen-decomposition of `[[a, b], [b, c]]`, eigenvalues descending.
///
/// λ = T/2 ± sqrt(T²/4 − D) with T the trace and D the determinant; the
/// eigenvector of λ is (λ − c, b), or an axis when `b == 0`.
fn symmetric_eigen(a: f64, b: f64, c: f64) -> ([f64; 2], [Point2; 2]) {
    let half_trace = 0.5 * (a + c);
    let det = a * c - b * b;
    let disc = (half_trace * half_trace - det).max(0.0).sqrt();
    let l1 = half_trace + disc;
    let l2 = half_trace - disc;

    let major = if b != 0.0 {
        let (vx, vy) = (l1 - c, b);
        let norm = vx.hypot(vy);
        Point2::new(vx / norm, vy / norm)
    } else if a >= c {
        Point2::new(1.0, 0.0)
    } else {
        Point2::new(0.0, 1.0)
    };
    let minor = Point2::new(-major.y, major.x);

    ([l1, l2], [major, minor])
}
