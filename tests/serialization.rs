//! JSON round trips of options, reports and output meshes.

use delaunay3d::prelude::*;

#[test]
fn test_options_round_trip() {
    let options = Delaunay3dOptionsBuilder::default()
        .alpha(0.5)
        .alpha_lines(false)
        .tolerance(0.01)
        .bounding_triangulation(true)
        .output_precision(OutputPrecision::Single)
        .progress_interval(10)
        .build()
        .unwrap();
    let json = serde_json::to_string(&options).unwrap();
    let back: Delaunay3dOptions = serde_json::from_str(&json).unwrap();
    assert_eq!(back, options);
    assert!(json.contains("\"alpha_lines\":false"));
}

#[test]
fn test_output_round_trip() {
    let points = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, 1.0],
    ];
    let output = Delaunay3d::default().triangulate(&points).unwrap();
    let json = serde_json::to_string(&output).unwrap();
    let back: Delaunay3dOutput = serde_json::from_str(&json).unwrap();
    assert_eq!(back, output);
    assert_eq!(back.number_of_duplicate_points(), 1);
    assert!(json.contains("Tetra"));
}

#[test]
fn test_single_precision_mesh_round_trip() {
    let mesh = UnstructuredMesh::new(
        OutputPoints::Single(vec![[0.0, 0.5, 1.0], [2.0, -1.0, 0.25]]),
        vec![MeshCell::Line([0, 1]), MeshCell::Vertex(1)],
    );
    let value = serde_json::to_value(&mesh).unwrap();
    let back: UnstructuredMesh = serde_json::from_value(value).unwrap();
    assert_eq!(back, mesh);
    assert_eq!(back.points().precision(), Precision::Single);
}

#[test]
fn test_report_and_filter_round_trip() {
    let report = InsertionReport {
        inserted: 7,
        duplicates: 2,
        degeneracies: 1,
        holes: 0,
        cancelled: true,
    };
    let back: InsertionReport =
        serde_json::from_str(&serde_json::to_string(&report).unwrap()).unwrap();
    assert_eq!(back, report);

    let filter = AlphaFilter {
        alpha: 1.5,
        vertices: false,
        ..AlphaFilter::default()
    };
    let back: AlphaFilter =
        serde_json::from_str(&serde_json::to_string(&filter).unwrap()).unwrap();
    assert_eq!(back, filter);
}
