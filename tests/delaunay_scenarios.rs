//! End-to-end scenarios for the batch filter.
//!
//! These tests cover:
//! - Small known configurations (single tetrahedron, bipyramid, duplicates)
//! - Random clouds with and without alpha
//! - Determinism and re-triangulation of the output points
//! - Degenerate input (coplanar, coincident)
//! - Progress reporting and cancellation

use std::collections::{BTreeMap, BTreeSet};
use std::ops::ControlFlow;

use approx::assert_relative_eq;
use delaunay3d::geometry::util::point_generation::{
    generate_grid_points, generate_random_points_seeded, generate_sphere_points_seeded,
};
use delaunay3d::prelude::*;

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

fn with_alpha(alpha: f64) -> Delaunay3d {
    Delaunay3d::new(
        Delaunay3dOptionsBuilder::default()
            .alpha(alpha)
            .build()
            .unwrap(),
    )
}

fn tet_set(mesh: &UnstructuredMesh) -> BTreeSet<[PointId; 4]> {
    mesh.tetrahedra()
        .map(|mut t| {
            t.sort_unstable();
            t
        })
        .collect()
}

fn build(points: &[[f64; 3]]) -> Triangulation {
    Delaunay3d::default()
        .build_triangulation(points, HashGridIndex::new(), |_, _| ControlFlow::Continue(()))
        .unwrap()
}

fn signed_volume(points: &OutputPoints, tet: [PointId; 4]) -> f64 {
    let [a, b, c, d] = tet.map(|id| points.get(id).unwrap());
    let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let w = [d[0] - a[0], d[1] - a[1], d[2] - a[2]];
    u[0] * (v[1] * w[2] - v[2] * w[1]) - u[1] * (v[0] * w[2] - v[2] * w[0])
        + u[2] * (v[0] * w[1] - v[1] * w[0])
}

// =========================================================================
// Known configurations
// =========================================================================

#[test]
fn test_single_tetrahedron() {
    init_tracing();
    let points = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ];
    let output = Delaunay3d::default().triangulate(&points).unwrap();
    let mesh = output.mesh();

    assert_eq!(mesh.number_of_points(), 4);
    assert_eq!(mesh.number_of_cells(), 1);
    let tet = mesh.tetrahedra().next().unwrap();
    assert_eq!(tet_set(mesh), BTreeSet::from([[0, 1, 2, 3]]));
    assert_relative_eq!(signed_volume(mesh.points(), tet), 1.0, epsilon = 1e-12);
    assert_eq!(*output.report(), InsertionReport { inserted: 4, ..InsertionReport::default() });
}

#[test]
fn test_bipyramid_shares_one_face() {
    init_tracing();
    let points = [
        [0.0, 0.0, 0.0],
        [2.0, 0.0, 0.0],
        [1.0, 2.0, 0.0],
        [1.0, 0.7, 1.5],
        [1.0, 0.7, -1.5],
    ];
    let output = Delaunay3d::default().triangulate(&points).unwrap();
    let tets = tet_set(output.mesh());
    assert_eq!(tets, BTreeSet::from([[0, 1, 2, 3], [0, 1, 2, 4]]));

    let mut face_use: BTreeMap<[PointId; 3], usize> = BTreeMap::new();
    for t in &tets {
        for skip in 0..4 {
            let mut face = [0; 3];
            let mut k = 0;
            for (i, &p) in t.iter().enumerate() {
                if i != skip {
                    face[k] = p;
                    k += 1;
                }
            }
            *face_use.entry(face).or_insert(0) += 1;
        }
    }
    let shared: Vec<_> = face_use.iter().filter(|&(_, &n)| n == 2).collect();
    assert_eq!(shared, vec![(&[0, 1, 2], &2)]);
    assert_eq!(face_use.values().filter(|&&n| n == 1).count(), 6);

    for tet in output.mesh().tetrahedra() {
        assert!(signed_volume(output.mesh().points(), tet) > 0.0);
    }
}

#[test]
fn test_duplicate_point_is_rejected() {
    init_tracing();
    let points = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 0.0],
    ];
    let output = Delaunay3d::default().triangulate(&points).unwrap();
    assert_eq!(output.number_of_duplicate_points(), 1);
    assert_eq!(output.number_of_degeneracies(), 0);
    assert_eq!(output.mesh().number_of_points(), 5);
    let tets = tet_set(output.mesh());
    assert_eq!(tets.len(), 1);
    assert!(!tets.iter().flatten().any(|&p| p == 4));

    let once = Delaunay3d::default().triangulate(&points[..4]).unwrap();
    assert_eq!(once.mesh().cells(), output.mesh().cells());
}

#[test]
fn test_near_duplicate_within_tolerance() {
    init_tracing();
    // The diagonal is about 1.74, so the absolute tolerance is about 0.0017.
    let points = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [1.0005, 1.0, 1.0],
        [1.0, 1.0, 1.01],
    ];
    let output = Delaunay3d::default().triangulate(&points).unwrap();
    assert_eq!(output.number_of_duplicate_points(), 1);
    assert_eq!(output.report().inserted, 6);
}

// =========================================================================
// Random clouds and alpha
// =========================================================================

#[test]
fn test_random_cloud_alpha_zero_and_huge_alpha_agree() {
    init_tracing();
    let points = generate_random_points_seeded(100, (0.0, 1.0), 11).unwrap();

    let plain = Delaunay3d::default().triangulate(&points).unwrap();
    let mesh = plain.mesh();
    assert!(mesh.number_of_tetrahedra() > 0);
    assert_eq!(mesh.number_of_cells(), mesh.number_of_tetrahedra());
    assert!(mesh.tetrahedra().flatten().all(|p| p < 100));
    for tet in mesh.tetrahedra() {
        assert!(signed_volume(mesh.points(), tet) > 0.0);
    }

    let huge = with_alpha(1.0e8).triangulate(&points).unwrap();
    assert_eq!(tet_set(huge.mesh()), tet_set(mesh));
    assert_eq!(huge.mesh().number_of_triangles(), 0);
    assert_eq!(huge.mesh().number_of_lines(), 0);
}

#[test]
fn test_alpha_results_are_nested() {
    init_tracing();
    let points = generate_random_points_seeded(150, (-1.0, 1.0), 5).unwrap();
    let diagonal = 12.0_f64.sqrt();

    let all = tet_set(Delaunay3d::default().triangulate(&points).unwrap().mesh());
    let mut previous: BTreeSet<[PointId; 4]> = BTreeSet::new();
    for alpha in [0.05, 0.2, 0.5, 2.0 * diagonal] {
        let current = tet_set(with_alpha(alpha).triangulate(&points).unwrap().mesh());
        assert!(previous.is_subset(&current), "alpha {alpha}");
        assert!(current.is_subset(&all), "alpha {alpha}");
        previous = current;
    }
}

#[test]
fn test_alpha_toggles_only_filter_output() {
    init_tracing();
    let points = generate_random_points_seeded(80, (0.0, 1.0), 21).unwrap();
    let full = with_alpha(0.15).triangulate(&points).unwrap();

    let options = Delaunay3dOptionsBuilder::default()
        .alpha(0.15)
        .alpha_tris(false)
        .alpha_verts(false)
        .build()
        .unwrap();
    let partial = Delaunay3d::new(options).triangulate(&points).unwrap();

    assert_eq!(tet_set(partial.mesh()), tet_set(full.mesh()));
    assert_eq!(
        partial.mesh().lines().collect::<Vec<_>>(),
        full.mesh().lines().collect::<Vec<_>>()
    );
    assert_eq!(partial.mesh().number_of_triangles(), 0);
    assert_eq!(partial.mesh().number_of_vertices(), 0);
}

#[test]
fn test_alpha_cell_groups_are_ordered() {
    init_tracing();
    let points = generate_random_points_seeded(120, (0.0, 1.0), 3).unwrap();
    let output = with_alpha(0.12).triangulate(&points).unwrap();
    let rank = |cell: &MeshCell| match cell {
        MeshCell::Tetra(_) => 0,
        MeshCell::Triangle(_) => 1,
        MeshCell::Line(_) => 2,
        MeshCell::Vertex(_) => 3,
    };
    let ranks: Vec<_> = output.mesh().cells().iter().map(rank).collect();
    assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn test_bounding_triangulation_output() {
    init_tracing();
    let points = generate_random_points_seeded(30, (0.0, 1.0), 8).unwrap();
    let options = Delaunay3dOptionsBuilder::default()
        .bounding_triangulation(true)
        .build()
        .unwrap();
    let with_bounding = Delaunay3d::new(options).triangulate(&points).unwrap();
    let without = Delaunay3d::default().triangulate(&points).unwrap();

    assert_eq!(with_bounding.mesh().number_of_points(), 36);
    assert!(tet_set(without.mesh()).is_subset(&tet_set(with_bounding.mesh())));
    assert!(with_bounding.mesh().tetrahedra().flatten().any(|p| p >= 30));
    assert_eq!(
        with_bounding.mesh().points().get(5),
        without.mesh().points().get(5)
    );
}

// =========================================================================
// Determinism
// =========================================================================

#[test]
fn test_runs_are_deterministic() {
    init_tracing();
    let points = generate_random_points_seeded(200, (-10.0, 10.0), 99).unwrap();
    let a = Delaunay3d::default().triangulate(&points).unwrap();
    let b = Delaunay3d::default().triangulate(&points).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_retriangulating_output_points_is_stable() {
    init_tracing();
    let points = generate_random_points_seeded(120, (0.0, 5.0), 17).unwrap();
    let first = Delaunay3d::default().triangulate(&points).unwrap();
    let OutputPoints::Double(again) = first.mesh().points().clone() else {
        panic!("double input must give double output");
    };
    let second = Delaunay3d::default().triangulate(&again).unwrap();
    assert_eq!(tet_set(first.mesh()), tet_set(second.mesh()));
}

// =========================================================================
// Degenerate input
// =========================================================================

#[test]
fn test_all_points_coincident() {
    init_tracing();
    let points = [[2.0, -1.0, 4.0]; 6];
    let triangulation = build(&points);
    assert_eq!(triangulation.report().inserted, 1);
    assert_eq!(triangulation.report().duplicates, 5);
    assert_eq!(triangulation.real_tetrahedra().count(), 0);
    assert_relative_eq!(triangulation.characteristic_length(), 2.5);
    assert_eq!(triangulation.validate(), Ok(()));
}

#[test]
fn test_coplanar_points_do_not_abort() {
    init_tracing();
    let points: Vec<[f64; 3]> = generate_grid_points(4, 1.0, [0.0; 3])
        .unwrap()
        .into_iter()
        .filter(|p| p[2] == 0.0)
        .collect();
    assert_eq!(points.len(), 16);
    let triangulation = build(&points);
    let report = triangulation.report();
    assert_eq!(report.inserted + report.duplicates + report.degeneracies, 16);
    assert_eq!(report.duplicates, 0);
    assert!(report.inserted > 0);
}

#[test]
fn test_cospherical_points_stay_consistent() {
    init_tracing();
    let points = generate_sphere_points_seeded(60, [0.0; 3], 1.0, 4).unwrap();
    let triangulation = build(&points);
    assert_eq!(triangulation.validate_face_sharing(), Ok(()));
    assert_eq!(triangulation.validate_point_coverage(), Ok(()));
    assert_eq!(triangulation.validate(), Ok(()));
}

#[test]
fn test_unlocatable_points_are_counted_as_degeneracies() {
    init_tracing();
    let points = generate_random_points_seeded(200, (0.0, 1.0), 8).unwrap();
    let options = Delaunay3dOptionsBuilder::default()
        .max_walk_steps(1)
        .build()
        .unwrap();
    let triangulation = Delaunay3d::new(options)
        .build_triangulation(&points, HashGridIndex::new(), |_, _| ControlFlow::Continue(()))
        .unwrap();

    let report = *triangulation.report();
    assert!(report.degeneracies > 0);
    assert!(report.inserted > 0);
    assert_eq!(report.duplicates, 0);
    assert_eq!(report.inserted + report.degeneracies, points.len());
    assert!(!report.cancelled);
    assert_eq!(triangulation.validate(), Ok(()));

    let used: BTreeSet<PointId> = triangulation
        .real_tetrahedra()
        .flat_map(|(_, tet)| tet)
        .collect();
    assert!(used.len() <= report.inserted);
}

// =========================================================================
// Progress and cancellation
// =========================================================================

#[test]
fn test_cancellation_leaves_a_valid_partial_mesh() {
    init_tracing();
    let points = generate_random_points_seeded(100, (0.0, 1.0), 2).unwrap();
    let options = Delaunay3dOptionsBuilder::default()
        .progress_interval(10)
        .build()
        .unwrap();
    let mut seen = Vec::new();
    let triangulation = Delaunay3d::new(options)
        .build_triangulation(&points, HashGridIndex::new(), |done, total| {
            seen.push(done);
            assert_eq!(total, 100);
            if done >= 50 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

    assert_eq!(seen, vec![0, 10, 20, 30, 40, 50]);
    let report = triangulation.report();
    assert!(report.cancelled);
    assert_eq!(report.inserted + report.duplicates + report.degeneracies, 50);
    assert_eq!(triangulation.validate(), Ok(()));
    assert!(
        triangulation
            .real_tetrahedra()
            .all(|(_, points)| points.iter().all(|&p| p < 50))
    );
}

#[test]
fn test_break_after_last_point_does_not_cancel() {
    init_tracing();
    let points = generate_random_points_seeded(10, (0.0, 1.0), 3).unwrap();
    let options = Delaunay3dOptionsBuilder::default()
        .progress_interval(5)
        .build()
        .unwrap();
    let mut seen = Vec::new();
    let output = Delaunay3d::new(options)
        .triangulate_with_progress(&points, |done, total| {
            seen.push(done);
            if done == total {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

    assert_eq!(seen, vec![0, 5, 10]);
    assert!(!output.was_cancelled());
    assert_eq!(output.report().inserted, 10);
    assert!(output.mesh().number_of_tetrahedra() > 0);
}

#[test]
fn test_cancelled_output_is_flagged() {
    init_tracing();
    let points = generate_random_points_seeded(20, (0.0, 1.0), 6).unwrap();
    let output = Delaunay3d::default()
        .triangulate_with_progress(&points, |_, _| ControlFlow::Break(()))
        .unwrap();
    assert!(output.was_cancelled());
    assert_eq!(output.report().inserted, 0);
    assert_eq!(output.mesh().number_of_cells(), 0);
    assert_eq!(output.mesh().number_of_points(), 20);
}
