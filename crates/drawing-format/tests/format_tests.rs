use approx::assert_relative_eq;
use drawing_format::{
    export_off, load_drawing, save_drawing, DrawingMetadata, ExportError, LoadError, FORMAT_NAME, FORMAT_VERSION,
};
use nalgebra::Point3;
use ortho_types::{CurveSpec, DrawingSpec, EdgeRole};
use reconstruct::{reconstruct, ReconstructionConfig};
use solid_kernel::primitives::make_box;
use solid_kernel::{BspKernel, Polyhedron};

// ── Helper Functions ─────────────────────────────────────────────────────

fn rect(spec: &mut DrawingSpec, x0: f64, y0: f64, x1: f64, y1: f64) {
    let c = [[x0, y0], [x1, y0], [x1, y1], [x0, y1]];
    for i in 0..4 {
        spec.push_edge(CurveSpec::line(c[i], c[(i + 1) % 4]), EdgeRole::Normal);
    }
}

fn two_view_box() -> DrawingSpec {
    let mut spec = DrawingSpec::new();
    rect(&mut spec, 0.0, 0.0, 10.0, 5.0);
    rect(&mut spec, 0.0, -20.0, 10.0, -12.0);
    spec
}

fn annotated_drawing() -> DrawingSpec {
    let mut spec = two_view_box();
    spec.push_edge(CurveSpec::circular_arc([5.0, 2.5], 1.5, 0.0, std::f64::consts::TAU), EdgeRole::Normal)
        .push_edge(CurveSpec::line([5.0, -21.0], [5.0, -11.0]), EdgeRole::Center)
        .push_label([12.0, -16.0], "A-A")
        .push_hatch(vec![CurveSpec::line([0.0, 0.0], [1.0, 0.0])]);
    spec
}

// ── M1: Document Schema Tests ────────────────────────────────────────────

#[test]
fn save_writes_format_header() {
    let json = save_drawing(&two_view_box(), &DrawingMetadata::new("Block")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed["format"], FORMAT_NAME);
    assert_eq!(parsed["version"], FORMAT_VERSION);
    assert_eq!(parsed["metadata"]["name"], "Block");
    assert_eq!(parsed["metadata"]["units"], "mm");
    assert!(parsed["metadata"].get("source").is_none());
}

#[test]
fn save_tags_curve_types() {
    let json = save_drawing(&annotated_drawing(), &DrawingMetadata::new("Tagged")).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
    let edges = parsed["drawing"]["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 10);
    assert_eq!(edges[0]["curve"]["type"], "Line");
    assert_eq!(edges[8]["curve"]["type"], "Arc");
    assert_eq!(edges[9]["role"], "Center");
    assert_eq!(parsed["drawing"]["labels"][0]["text"], "A-A");
}

// ── M2: Load Tests ──────────────────────────────────────────────────────

#[test]
fn load_round_trips_drawing_and_metadata() {
    let spec = annotated_drawing();
    let meta = DrawingMetadata::new("Round trip").with_source("sheet-3.dxf");
    let json = save_drawing(&spec, &meta).unwrap();
    let (loaded, loaded_meta) = load_drawing(&json).unwrap();
    assert_eq!(loaded, spec);
    assert_eq!(loaded_meta, meta);
}

#[test]
fn load_fills_optional_fields() {
    let json = r#"{
        "format": "ortho-drawing",
        "version": 1,
        "metadata": {
            "name": "Minimal",
            "created": "2026-01-01T00:00:00Z",
            "modified": "2026-01-01T00:00:00Z"
        },
        "drawing": {
            "edges": [
                { "curve": { "type": "Line", "start": [0, 0], "end": [1, 0] }, "role": "Normal" }
            ]
        }
    }"#;
    let (spec, meta) = load_drawing(json).unwrap();
    assert_eq!(spec.edges.len(), 1);
    assert!(spec.labels.is_empty() && spec.hatches.is_empty());
    assert_eq!(meta.units, "mm");
    assert_eq!(meta.source, None);
}

#[test]
fn load_rejects_unknown_format() {
    let json = save_drawing(&two_view_box(), &DrawingMetadata::new("x"))
        .unwrap()
        .replace(FORMAT_NAME, "dxf");
    assert_eq!(load_drawing(&json).unwrap_err(), LoadError::UnknownFormat("dxf".into()));
}

#[test]
fn load_rejects_future_version() {
    let mut value: serde_json::Value =
        serde_json::from_str(&save_drawing(&two_view_box(), &DrawingMetadata::new("x")).unwrap()).unwrap();
    value["version"] = serde_json::json!(FORMAT_VERSION + 1);
    let err = load_drawing(&value.to_string()).unwrap_err();
    assert_eq!(
        err,
        LoadError::FutureVersion {
            file_version: FORMAT_VERSION + 1,
            supported_version: FORMAT_VERSION,
        }
    );
}

#[test]
fn load_reports_missing_migration() {
    let mut value: serde_json::Value =
        serde_json::from_str(&save_drawing(&two_view_box(), &DrawingMetadata::new("x")).unwrap()).unwrap();
    value["version"] = serde_json::json!(0);
    assert!(matches!(
        load_drawing(&value.to_string()),
        Err(LoadError::MigrationFailed { from: 0, to: 1, .. })
    ));
}

#[test]
fn load_rejects_garbage() {
    assert!(matches!(load_drawing("{ not json"), Err(LoadError::ParseError(_))));
    assert!(matches!(
        load_drawing(r#"{"format": "ortho-drawing"}"#),
        Err(LoadError::ParseError(_))
    ));
}

// ── M3: OFF Export Tests ────────────────────────────────────────────────

#[test]
fn off_lists_vertices_then_faces() {
    let b = make_box(Point3::origin(), Point3::new(1.0, 2.0, 3.0));
    let off = export_off(&b).unwrap();
    let lines: Vec<&str> = off.lines().collect();
    assert_eq!(lines[0], "OFF");
    assert_eq!(lines[1], "8 6 0");
    assert_eq!(lines.len(), 2 + 8 + 6);
    assert!(lines[10..].iter().all(|l| l.starts_with("4 ")));
}

#[test]
fn off_rejects_empty_and_broken_solids() {
    assert_eq!(export_off(&Polyhedron::empty()).unwrap_err(), ExportError::NoSolid);
    let broken = Polyhedron::new(vec![Point3::origin(); 3], vec![vec![0, 1, 7]]);
    assert_eq!(
        export_off(&broken).unwrap_err(),
        ExportError::InvalidFace {
            face: 0,
            index: 7,
            len: 3
        }
    );
}

// ── M4: Full Round-Trip Tests ───────────────────────────────────────────

#[test]
fn loaded_drawing_reconstructs_and_exports() {
    let json = save_drawing(&two_view_box(), &DrawingMetadata::new("Block")).unwrap();
    let (spec, _) = load_drawing(&json).unwrap();
    let out = reconstruct(&spec, &ReconstructionConfig::default(), &mut BspKernel::new()).unwrap();
    assert_relative_eq!(out.solid.volume(), 400.0, epsilon = 1e-6);

    let off = export_off(&out.solid).unwrap();
    let counts: Vec<usize> = off
        .lines()
        .nth(1)
        .unwrap()
        .split_whitespace()
        .map(|s| s.parse().unwrap())
        .collect();
    assert_eq!(counts[0], out.solid.vertices.len());
    assert_eq!(counts[1], out.solid.faces.len());
}
