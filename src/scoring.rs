//! Tree-crown plausibility scores.
//!
//! Four independent geometric criteria (Vega et al. 2014, PTrees, §2.3):
//!
//! - **size**: is the segment dense enough for its height (Eq. 4–5)?
//! - **orientation**: is the highest point near the planar centre (Eq. 7)?
//! - **regularity**: does the hull fill the circle through its far vertices (Eq. 8)?
//! - **circularity**: major/minor principal extent of the hull (Eq. 6).
//!
//! The aggregate is their plain mean. Every score falls back to 0 when its
//! geometric precondition does not hold; no score is ever NaN or infinite.

use crate::ellipse::fit_ellipse;
use crate::point::{planar_centroid, planar_distance, Point2, PointXYZ};
use crate::segment::TreeSegment;
use log::debug;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Rank used to pick the crown radius among apex-to-hull distances.
pub const RADIUS_PERCENTILE: f64 = 0.95;

/// Sub-scores and their mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub size: f64,
    pub orientation: f64,
    pub regularity: f64,
    pub circularity: f64,
    pub aggregate: f64,
}

impl Scores {
    /// Bundles the four scores and computes the aggregate.
    pub fn new(size: f64, orientation: f64, regularity: f64, circularity: f64) -> Self {
        Self {
            size,
            orientation,
            regularity,
            circularity,
            aggregate: (size + orientation + regularity + circularity) / 4.0,
        }
    }
}

/// Density criterion.
///
/// `D = n / area` (or `n / pair_distance` for a two-point segment),
/// `threshold = k · D · ln(h)`; the score is 1 above the threshold and
/// `n / threshold` below it. Non-positive or non-finite thresholds give 0.
pub fn size_score(n: usize, area: f64, pair_distance: f64, h: f64, k: u32) -> f64 {
    let n = n as f64;
    let density = if area != 0.0 {
        n / area
    } else if pair_distance != 0.0 {
        n / pair_distance
    } else {
        0.0
    };
    if density == 0.0 {
        return 0.0;
    }

    let threshold = k as f64 * density * h.ln();
    if !threshold.is_finite() || threshold <= 0.0 {
        return 0.0;
    }
    if n > threshold {
        1.0
    } else {
        n / threshold
    }
}

/// Eccentricity of the highest point `m`.
///
/// Compares `|m − G|` (G = planar centroid of all points) with the mean
/// distance from `m` to the hull ring vertices.
pub fn orientation_score(points: &[PointXYZ], m: Point2, ring: &[Point2]) -> f64 {
    let Some(g) = planar_centroid(points) else {
        return 0.0;
    };
    if ring.is_empty() {
        return 0.0;
    }
    let dist_mg = planar_distance(m, g);
    let dist_mh = ring.iter().map(|v| planar_distance(m, *v)).sum::<f64>() / ring.len() as f64;
    if dist_mh <= 0.0 {
        return 0.0;
    }
    if dist_mg <= dist_mh / 2.0 {
        1.0 - 2.0 * dist_mg / dist_mh
    } else {
        0.0
    }
}

/// Hull area over the area of the circle of radius `r95`, the 95th
/// percentile of the distances from `m` to the hull ring vertices.
pub fn regularity_score(area: f64, m: Point2, ring: &[Point2]) -> f64 {
    let mut dists: Vec<f64> = ring.iter().map(|v| planar_distance(m, *v)).collect();
    dists.sort_by(f64::total_cmp);
    match percentile_rank(&dists, RADIUS_PERCENTILE) {
        Some(radius) if radius > 0.0 => area / (PI * radius * radius),
        _ => 0.0,
    }
}

/// Major/minor principal extent of the hull ring, 0 when degenerate.
pub fn circularity_score(ring: &[Point2]) -> f64 {
    fit_ellipse(ring).map_or(0.0, |fit| fit.elongation())
}

/// Value at 1-indexed rank `ceil(q · n)` of an ascending slice.
pub fn percentile_rank(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = (q * sorted.len() as f64).ceil() as usize;
    let idx = rank.clamp(1, sorted.len()) - 1;
    Some(sorted[idx])
}

impl TreeSegment {
    /// Hull-based scores need a real polygon.
    fn has_crown_geometry(&self) -> bool {
        self.area != 0.0 && self.points.len() > 2 && self.hull_ring.len() > 2
    }

    /// Scores the segment with `k` neighbours, stores the sub-scores (see
    /// [`TreeSegment::scores`]) and returns the aggregate.
    pub fn score(&mut self, k: u32) -> f64 {
        let top = self.highest_point().copied();

        let size = top.map_or(0.0, |m| {
            size_score(self.points.len(), self.area, self.pair_distance, m.z, k)
        });

        let (orientation, regularity, circularity) = match top {
            Some(m) if self.has_crown_geometry() => {
                let m = m.planar();
                (
                    orientation_score(&self.points, m, &self.hull_ring),
                    regularity_score(self.area, m, &self.hull_ring),
                    circularity_score(&self.hull_ring),
                )
            }
            _ => (0.0, 0.0, 0.0),
        };

        self.scores = Scores::new(size, orientation, regularity, circularity);
        debug!(
            "segment n={} area={:.2}: size={:.3} orientation={:.3} regularity={:.3} circularity={:.3} -> {:.3}",
            self.points.len(),
            self.area,
            size,
            orientation,
            regularity,
            circularity,
            self.scores.aggregate
        );
        self.scores.aggregate
    }
}
