//! Neighbourhood profile filtering.
//!
//! Before proposing points to a segment, the growth step prunes each point's
//! neighbour list: neighbours further than `mean + 2·sd` of the planar
//! distances to the reference point are dropped (Vega et al. 2014, §2.2).

use crate::point::{planar_distance, PointXYZ};

/// Keeps the reference point (`profile[0]`) and the leading neighbours whose
/// planar distance to it does not exceed `mean + 2·sd`.
///
/// `profile` is expected in increasing distance order (as a k-NN query returns
/// it); the scan stops at the first neighbour above the threshold. Profiles
/// with fewer than two points are returned as-is.
pub fn filter_profile(profile: &[PointXYZ]) -> Vec<PointXYZ> {
    let Some((reference, neighbours)) = profile.split_first() else {
        return Vec::new();
    };
    if neighbours.is_empty() {
        return vec![*reference];
    }

    let origin = reference.planar();
    let dist: Vec<f64> = neighbours
        .iter()
        .map(|p| planar_distance(origin, p.planar()))
        .collect();
    let threshold = profile_threshold(&dist);

    let mut kept = Vec::with_capacity(profile.len());
    kept.push(*reference);
    kept.extend(
        neighbours
            .iter()
            .zip(&dist)
            .take_while(|(_, &d)| d <= threshold)
            .map(|(p, _)| *p),
    );
    kept
}

/// `mean + 2·sd` (population sd) of `dist`.
pub fn profile_threshold(dist: &[f64]) -> f64 {
    if dist.is_empty() {
        return 0.0;
    }
    let n = dist.len() as f64;
    let mean = dist.iter().sum::<f64>() / n;
    let var = dist.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / n;
    mean + 2.0 * var.sqrt()
}
