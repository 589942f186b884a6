//! Scoring and acceptance parameters.

use crate::error::{PtreesError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters for [`segment_trees`](crate::pipeline::segment_trees).
///
/// Every field has a default, so a JSON file only needs the fields it changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeScoringParams {
    /// Number of nearest neighbours used by the clustering step; scales the
    /// density threshold of the size score.
    pub k: u32,
    /// Segments with fewer points are rejected before scoring.
    pub min_points: usize,
    /// Minimum aggregate score of an accepted segment.
    pub min_score: f64,
    /// Attach the boundary WKT to every detected crown.
    pub compute_crown: bool,
}

impl Default for TreeScoringParams {
    fn default() -> Self {
        Self {
            k: 10,
            min_points: 3,
            min_score: 0.0,
            compute_crown: false,
        }
    }
}

impl TreeScoringParams {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(PtreesError::InvalidParams("k must be at least 1".into()));
        }
        if !self.min_score.is_finite() {
            return Err(PtreesError::InvalidParams(format!(
                "min_score must be finite, got {}",
                self.min_score
            )));
        }
        Ok(())
    }
}

/// Reads parameters from a JSON file; missing fields keep their defaults.
pub fn load_params(path: &Path) -> Result<TreeScoringParams> {
    let data = fs::read_to_string(path)?;
    let params: TreeScoringParams = serde_json::from_str(&data)?;
    params.validate()?;
    Ok(params)
}
