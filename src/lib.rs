//! # ptrees — tree-crown plausibility scoring for LiDAR point clusters
//!
//! Point-based tree extraction from airborne laser scanning (ALS) data.
//! Upstream clustering groups points into candidate trees; this crate grows
//! the planar convex boundary of each candidate point by point and scores how
//! much it looks like a single crown.
//!
//! This crate provides:
//! - **Segment geometry**: [`TreeSegment`] (incremental hull, area cache,
//!   highest/lowest point), [`Boundary`], [`fit_ellipse`]
//! - **Scoring**: size, orientation, regularity, circularity and their mean
//!   ([`TreeSegment::score`], [`Scores`])
//! - **Pipeline**: `assemble_segments`, `score_segments`, `extract_crowns`,
//!   `segment_trees`, plus the [`SegmentRegistry`] and neighbourhood filtering
//!
//! Reference: Vega, C., Hamrouni, A., El Mokhtari, S., Morel, J., Bock, J.,
//! Renaud, J.-P., Bouvier, M., Durrieu, S. 2014. *PTrees: A point-based
//! approach to forest tree extraction from lidar data*. International Journal
//! of Applied Earth Observation and Geoinformation 33, 98–108.

pub mod boundary;
pub mod ellipse;
pub mod error;
pub mod io;
pub mod neighborhood;
pub mod params;
pub mod pipeline;
pub mod point;
pub mod registry;
pub mod scoring;
pub mod segment;

pub use boundary::Boundary;
pub use ellipse::{fit_ellipse, EllipseFit};
pub use error::{PtreesError, Result};
pub use params::TreeScoringParams;
pub use pipeline::*;
pub use point::{planar_distance, Point2, PointXYZ};
pub use registry::SegmentRegistry;
pub use scoring::Scores;
pub use segment::TreeSegment;
