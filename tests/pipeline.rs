use ptrees::io::{read_labeled_points, write_crowns_csv};
use ptrees::{segment_trees, LabeledPoint, PointXYZ, TreeScoringParams};
use std::f64::consts::PI;
use std::fmt::Write as _;
use std::sync::atomic::AtomicBool;

/// Apex at `(cx, cy, top)` followed by `n` points on an ellipse at `z`.
fn crown_points(
    cluster: u32,
    first_id: usize,
    apex: (f64, f64, f64),
    centre: (f64, f64),
    radii: (f64, f64),
    n: usize,
    z: f64,
) -> Vec<LabeledPoint> {
    let mut pts = vec![LabeledPoint {
        point: PointXYZ::new(apex.0, apex.1, apex.2, first_id),
        cluster,
    }];
    for i in 0..n {
        let t = 2.0 * PI * i as f64 / n as f64;
        pts.push(LabeledPoint {
            point: PointXYZ::new(
                centre.0 + radii.0 * t.cos(),
                centre.1 + radii.1 * t.sin(),
                z,
                first_id + 1 + i,
            ),
            cluster,
        });
    }
    pts
}

fn to_csv(points: &[LabeledPoint]) -> String {
    let mut out = String::from("x,y,z,id,cluster\n");
    for lp in points {
        let p = lp.point;
        writeln!(out, "{},{},{},{},{}", p.x, p.y, p.z, p.id, lp.cluster).unwrap();
    }
    out
}

#[test]
fn regular_crown_is_preferred_over_elongated_one() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut points = crown_points(1, 0, (0.0, 0.0, 22.0), (0.0, 0.0), (3.0, 3.0), 11, 12.0);
    points.extend(crown_points(
        2,
        12,
        (109.5, 0.0, 22.0),
        (100.0, 0.0),
        (10.0, 1.0),
        11,
        12.0,
    ));

    let abort = AtomicBool::new(false);
    let params = TreeScoringParams {
        k: 5,
        ..Default::default()
    };
    let result = segment_trees(&points, &params, &abort).unwrap();
    assert_eq!(result.crowns.len(), 2);

    let regular = &result.crowns[0];
    let elongated = &result.crowns[1];
    assert_eq!(regular.label, 1);
    assert_eq!(regular.n_points, 12);
    assert_eq!(elongated.n_points, 12);
    assert!(
        (regular.scores.aggregate - 1.0).abs() < (elongated.scores.aggregate - 1.0).abs(),
        "regular={:?} elongated={:?}",
        regular.scores,
        elongated.scores
    );
}

#[test]
fn shared_point_is_claimed_by_first_segment() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut points = crown_points(1, 0, (0.0, 0.0, 20.0), (0.0, 0.0), (2.0, 2.0), 6, 10.0);
    let mut second = crown_points(2, 7, (3.0, 0.0, 18.0), (3.0, 0.0), (1.0, 1.0), 6, 9.0);
    // point 3 also appears in the second cluster
    second.push(LabeledPoint {
        point: points[3].point,
        cluster: 2,
    });
    points.extend(second);

    let abort = AtomicBool::new(false);
    let result = segment_trees(&points, &TreeScoringParams::default(), &abort).unwrap();
    assert_eq!(result.crowns.len(), 2);
    assert_eq!(result.point_ids[3], Some(1));
    assert_eq!(result.point_ids[7], Some(2));
}

#[test]
fn csv_round_trip_through_pipeline() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();

    let points = crown_points(5, 0, (10.0, 10.0, 25.0), (10.0, 10.0), (2.5, 2.5), 9, 15.0);
    let input = dir.path().join("points.csv");
    std::fs::write(&input, to_csv(&points)).unwrap();

    let loaded = read_labeled_points(&input).unwrap();
    assert_eq!(loaded, points);

    let abort = AtomicBool::new(false);
    let params = TreeScoringParams {
        compute_crown: true,
        ..Default::default()
    };
    let result = segment_trees(&loaded, &params, &abort).unwrap();
    assert_eq!(result.crowns.len(), 1);

    let output = dir.path().join("crowns.csv");
    write_crowns_csv(&output, &result.crowns, true).unwrap();
    let text = std::fs::read_to_string(&output).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert!(text.contains("POLYGON(("));
}
