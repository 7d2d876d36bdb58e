use crate::geom::{
    GridShapeIssue, GridSurfaceError, MeshOptions, Point3, PointGrid, Surface, SurfaceBuildOptions, SurfaceHandle,
    build_surface, build_surface_from_flat,
};

fn bump_4x4() -> Vec<f64> {
    let mut coords = Vec::with_capacity(48);
    for row in 0..4 {
        for col in 0..4 {
            let interior = (1..=2).contains(&row) && (1..=2).contains(&col);
            coords.extend([col as f64, row as f64, if interior { 1.0 } else { 0.0 }]);
        }
    }
    coords
}

#[test]
fn control_points_round_trip_in_grid_order() {
    let coords = bump_4x4();
    let surface = build_surface_from_flat(&coords, 4, 4, &SurfaceBuildOptions::default()).unwrap();

    assert_eq!(surface.rows(), 4);
    assert_eq!(surface.cols(), 4);
    assert_eq!(surface.resolved_degrees(), (3, 3));

    let flat: Vec<f64> = surface.control_points().into_iter().flatten().collect();
    assert_eq!(flat, coords);
}

#[test]
fn two_by_two_grid_degrades_to_bilinear() {
    let coords = [
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        1.0, 1.0, 1.0,
    ];
    let surface = build_surface_from_flat(&coords, 2, 2, &SurfaceBuildOptions::default()).unwrap();
    assert_eq!(surface.resolved_degrees(), (1, 1));
    assert_eq!(surface.requested_degrees(), (3, 3));

    let (ku, kv) = surface.knot_vectors();
    for knots in [ku, kv] {
        assert_eq!(knots.knots(), &[0.0, 1.0]);
        assert_eq!(knots.multiplicities(), &[2, 2]);
    }
    assert_eq!(surface.bounds(), (0.0, 1.0, 0.0, 1.0));
}

#[test]
fn single_row_is_rejected_before_construction() {
    let coords: Vec<f64> = (0..5).flat_map(|i| [i as f64, 0.0, 0.0]).collect();
    let err = build_surface_from_flat(&coords, 1, 5, &SurfaceBuildOptions::default()).unwrap_err();
    assert_eq!(
        err,
        GridSurfaceError::InvalidGridDimensions {
            rows: 1,
            cols: 5,
            issue: GridShapeIssue::TooSmall
        }
    );
    assert!(err.is_input_error());
}

#[test]
fn short_buffer_reports_expected_length() {
    let coords = vec![0.0; 10];
    let err = build_surface_from_flat(&coords, 2, 2, &SurfaceBuildOptions::default()).unwrap_err();
    assert_eq!(
        err,
        GridSurfaceError::InvalidGridDimensions {
            rows: 2,
            cols: 2,
            issue: GridShapeIssue::LengthMismatch {
                expected: 12,
                provided: 10
            }
        }
    );
    assert!(err.is_input_error());
}

#[test]
fn construction_is_repeatable() {
    let grid = PointGrid::from_flat(&bump_4x4(), 4, 4).unwrap();
    let options = SurfaceBuildOptions::default();
    let a = build_surface(&grid, &options).unwrap();
    let b = build_surface(&grid, &options).unwrap();

    assert_eq!(a.control_points(), b.control_points());
    assert_eq!(a.knot_vectors(), b.knot_vectors());
    assert_eq!(
        a.mesh(&MeshOptions::default()).unwrap(),
        b.mesh(&MeshOptions::default()).unwrap()
    );
}

#[test]
fn columns_run_along_u_and_rows_along_v() {
    // 2 rows x 4 cols: cubic is possible along U only.
    let points = (0..2)
        .flat_map(|r| (0..4).map(move |c| Point3::new(c as f64, r as f64, 0.0)))
        .collect();
    let grid = PointGrid::from_points(points, 2, 4).unwrap();
    let surface = build_surface(&grid, &SurfaceBuildOptions::default()).unwrap();

    assert_eq!(surface.resolved_degrees(), (3, 1));
    let (ku, kv) = surface.knot_vectors();
    assert_eq!(ku.multiplicities(), &[4, 4]);
    assert_eq!(kv.multiplicities(), &[2, 2]);

    // x follows u, y follows v.
    let p = surface.surface().point_at(1.0, 0.0);
    assert!((p.x - 3.0).abs() < 1e-12);
    assert!(p.y.abs() < 1e-12);
}

#[test]
fn larger_grid_gets_interior_knots() {
    let points = (0..3)
        .flat_map(|r| (0..7).map(move |c| Point3::new(c as f64, r as f64, (c * r) as f64)))
        .collect();
    let grid = PointGrid::from_points(points, 3, 7).unwrap();
    let surface = build_surface(&grid, &SurfaceBuildOptions::new(3, 3)).unwrap();

    let (ku, kv) = surface.knot_vectors();
    assert_eq!(ku.knots(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
    assert_eq!(ku.multiplicities(), &[4, 1, 1, 1, 4]);
    assert_eq!(kv.degree(), 2);
    assert_eq!(kv.knots(), &[0.0, 1.0]);
    assert_eq!(kv.multiplicities(), &[3, 3]);
}
