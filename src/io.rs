//! CSV input/output for the command-line tool.
//!
//! Input: a labelled point table with header `x,y,z,id,cluster`.
//! Output: one row per detected crown, and optionally one row per point with
//! its segment id.

use crate::error::{PtreesError, Result};
use crate::pipeline::{DetectedCrown, LabeledPoint};
use crate::point::PointXYZ;
use csv::{ReaderBuilder, Writer};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct PointRecord {
    x: f64,
    y: f64,
    z: f64,
    id: usize,
    cluster: u32,
}

/// Reads a labelled point table from `path`.
pub fn read_labeled_points(path: &Path) -> Result<Vec<LabeledPoint>> {
    let file = File::open(path)?;
    read_labeled_points_from(BufReader::new(file))
}

/// Reads a labelled point table from any reader.
///
/// Rows with unparsable fields, non-finite coordinates or an id not below
/// the number of rows are reported with their line number.
pub fn read_labeled_points_from<R: Read>(reader: R) -> Result<Vec<LabeledPoint>> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut points = Vec::new();
    let mut lines = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let row: PointRecord = record
            .deserialize(Some(&headers))
            .map_err(|e| PtreesError::record(line, e.to_string()))?;
        if !(row.x.is_finite() && row.y.is_finite() && row.z.is_finite()) {
            return Err(PtreesError::record(line, "non-finite coordinate"));
        }
        points.push(LabeledPoint {
            point: PointXYZ::new(row.x, row.y, row.z, row.id),
            cluster: row.cluster,
        });
        lines.push(line);
    }

    let rows = points.len();
    if let Some((lp, line)) = points.iter().zip(&lines).find(|(lp, _)| lp.point.id >= rows) {
        return Err(PtreesError::record(
            *line,
            format!("point id {} out of range for {} points", lp.point.id, rows),
        ));
    }
    Ok(points)
}

/// Writes the crown report to `path`.
pub fn write_crowns_csv(path: &Path, crowns: &[DetectedCrown], with_crown: bool) -> Result<()> {
    let file = File::create(path)?;
    write_crowns(BufWriter::new(file), crowns, with_crown)
}

/// Writes the crown report: ids, apex, size and the four scores, plus the
/// boundary WKT when `with_crown` is set.
pub fn write_crowns<W: Write>(writer: W, crowns: &[DetectedCrown], with_crown: bool) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);

    let mut header = vec![
        "id",
        "cluster",
        "x",
        "y",
        "h",
        "n_points",
        "area",
        "size",
        "orientation",
        "regularity",
        "circularity",
        "score",
    ];
    if with_crown {
        header.push("crown_wkt");
    }
    wtr.write_record(&header)?;

    for c in crowns {
        let mut row = vec![
            c.id.to_string(),
            c.label.to_string(),
            format!("{:.2}", c.x),
            format!("{:.2}", c.y),
            format!("{:.2}", c.h),
            c.n_points.to_string(),
            format!("{:.2}", c.area),
            format!("{:.4}", c.scores.size),
            format!("{:.4}", c.scores.orientation),
            format!("{:.4}", c.scores.regularity),
            format!("{:.4}", c.scores.circularity),
            format!("{:.4}", c.scores.aggregate),
        ];
        if with_crown {
            row.push(c.crown_wkt.clone().unwrap_or_default());
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `id,segment` for every point id (empty segment when unclaimed).
pub fn write_point_ids_csv(path: &Path, ids: &[Option<u32>]) -> Result<()> {
    let file = File::create(path)?;
    let mut wtr = Writer::from_writer(BufWriter::new(file));
    wtr.write_record(["id", "segment"])?;
    for (i, seg) in ids.iter().enumerate() {
        let seg = seg.map(|s| s.to_string()).unwrap_or_default();
        wtr.write_record([i.to_string(), seg])?;
    }
    wtr.flush()?;
    Ok(())
}
