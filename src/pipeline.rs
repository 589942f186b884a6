//! Segment assembly, scoring and acceptance.
//!
//! Pipeline: assemble_segments → score_segments → extract_crowns
//!
//! The clustering step upstream decides which points belong together; it
//! hands over a labelled point stream. [`segment_trees`] turns that stream into
//! one [`TreeSegment`] per label, scores every segment in parallel, keeps the
//! plausible ones and registers them in a [`SegmentRegistry`].

use crate::error::{PtreesError, Result};
use crate::params::TreeScoringParams;
use crate::point::PointXYZ;
use crate::registry::SegmentRegistry;
use crate::scoring::Scores;
use crate::segment::TreeSegment;
use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A point together with the cluster label assigned upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledPoint {
    pub point: PointXYZ,
    pub cluster: u32,
}

/// Output of [`assemble_segments`].
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    /// `(label, segment)` in order of first appearance of the label.
    pub segments: Vec<(u32, TreeSegment)>,
    /// `true` if the abort flag stopped the pass early.
    pub aborted: bool,
}

/// A segment after scoring.
#[derive(Debug, Clone)]
pub struct ScoredSegment {
    pub label: u32,
    pub segment: TreeSegment,
    pub aggregate: f64,
}

/// An accepted tree crown.
#[derive(Debug, Clone, Serialize)]
pub struct DetectedCrown {
    /// Registry id (1-based).
    pub id: u32,
    /// Upstream cluster label.
    pub label: u32,
    /// X of the highest point.
    pub x: f64,
    /// Y of the highest point.
    pub y: f64,
    /// Elevation of the highest point.
    pub h: f64,
    pub n_points: usize,
    /// Boundary area in map units².
    pub area: f64,
    pub scores: Scores,
    /// Boundary as WKT, when requested.
    pub crown_wkt: Option<String>,
}

/// Result of [`segment_trees`].
#[derive(Debug, Clone, Default)]
pub struct TreeSegmentation {
    pub crowns: Vec<DetectedCrown>,
    /// Segments dropped for too few points or a low aggregate score.
    pub rejected: usize,
    /// Per-point segment id, indexed by point id.
    pub point_ids: Vec<Option<u32>>,
    pub aborted: bool,
}

// ---------------------------------------------------------------------------
// assemble_segments
// ---------------------------------------------------------------------------

/// Feeds the labelled stream, in order, to one segment per label.
///
/// `abort` is checked before every insertion. Stopping early leaves each
/// segment valid for the points it already admitted.
pub fn assemble_segments(points: &[LabeledPoint], abort: &AtomicBool) -> Assembly {
    assemble_until(points, |_| abort.load(Ordering::Relaxed))
}

/// Assembly loop; `stop(i)` is asked before the `i`-th insertion.
fn assemble_until<F>(points: &[LabeledPoint], mut stop: F) -> Assembly
where
    F: FnMut(usize) -> bool,
{
    let mut index: HashMap<u32, usize> = HashMap::new();
    let mut segments: Vec<(u32, TreeSegment)> = Vec::new();

    for (i, lp) in points.iter().enumerate() {
        if stop(i) {
            warn!(
                "segment assembly aborted after {} of {} points ({} segments)",
                i,
                points.len(),
                segments.len()
            );
            return Assembly {
                segments,
                aborted: true,
            };
        }
        let slot = *index.entry(lp.cluster).or_insert_with(|| {
            segments.push((lp.cluster, TreeSegment::new()));
            segments.len() - 1
        });
        segments[slot].1.add_point(lp.point);
    }

    debug!(
        "assembled {} segments from {} points",
        segments.len(),
        points.len()
    );
    Assembly {
        segments,
        aborted: false,
    }
}

// ---------------------------------------------------------------------------
// score_segments
// ---------------------------------------------------------------------------

/// Scores every segment in parallel; output order follows input order.
pub fn score_segments(segments: Vec<(u32, TreeSegment)>, k: u32) -> Vec<ScoredSegment> {
    segments
        .into_par_iter()
        .map(|(label, mut segment)| {
            let aggregate = segment.score(k);
            ScoredSegment {
                label,
                segment,
                aggregate,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// extract_crowns
// ---------------------------------------------------------------------------

fn is_accepted(seg: &ScoredSegment, params: &TreeScoringParams) -> bool {
    seg.segment.len() >= params.min_points && seg.aggregate >= params.min_score
}

/// Keeps the accepted segments and registers them, in input order.
///
/// Returns the crowns and the number of rejected segments.
pub fn extract_crowns(
    scored: &[ScoredSegment],
    params: &TreeScoringParams,
    registry: &mut SegmentRegistry,
) -> (Vec<DetectedCrown>, usize) {
    let mut crowns = Vec::new();
    let mut rejected = 0usize;

    for seg in scored {
        if !is_accepted(seg, params) {
            debug!(
                "cluster {} rejected: n={} aggregate={:.3}",
                seg.label,
                seg.segment.len(),
                seg.aggregate
            );
            rejected += 1;
            continue;
        }
        let Some(top) = seg.segment.highest_point() else {
            rejected += 1;
            continue;
        };
        let id = registry.claim(&seg.segment);
        crowns.push(DetectedCrown {
            id,
            label: seg.label,
            x: top.x,
            y: top.y,
            h: top.z,
            n_points: seg.segment.len(),
            area: seg.segment.area(),
            scores: *seg.segment.scores(),
            crown_wkt: params
                .compute_crown
                .then(|| seg.segment.boundary().to_wkt()),
        });
    }

    (crowns, rejected)
}

// ---------------------------------------------------------------------------
// segment_trees — top-level function
// ---------------------------------------------------------------------------

/// Length of the point-id table: one past the largest id.
///
/// Every id must be below `points.len()`, which bounds the table by the input
/// size.
fn point_table_len(points: &[LabeledPoint]) -> Result<usize> {
    let rows = points.len();
    let mut len = 0usize;
    for lp in points {
        let id = lp.point.id;
        if id >= rows {
            return Err(PtreesError::PointIdOutOfRange { id, rows });
        }
        len = len.max(id + 1);
    }
    Ok(len)
}

/// Full run: assembly, parallel scoring, acceptance and registration.
///
/// Segments under `params.min_points` are dropped before scoring. When the
/// abort flag fires during assembly, the partial segments are still scored
/// and `aborted` is set on the result.
///
/// Fails with [`PtreesError::PointIdOutOfRange`] when a point id is not below
/// the number of input points.
pub fn segment_trees(
    points: &[LabeledPoint],
    params: &TreeScoringParams,
    abort: &AtomicBool,
) -> Result<TreeSegmentation> {
    let n_ids = point_table_len(points)?;

    let Assembly { segments, aborted } = assemble_segments(points, abort);

    let (candidates, too_small): (Vec<_>, Vec<_>) = segments
        .into_iter()
        .partition(|(_, seg)| seg.len() >= params.min_points);

    let scored = score_segments(candidates, params.k);

    let mut registry = SegmentRegistry::new(n_ids);
    let (crowns, rejected) = extract_crowns(&scored, params, &mut registry);

    debug!(
        "{} crowns accepted, {} rejected, {} too small",
        crowns.len(),
        rejected,
        too_small.len()
    );

    Ok(TreeSegmentation {
        crowns,
        rejected: rejected + too_small.len(),
        point_ids: registry.into_point_ids(),
        aborted,
    })
}
