//! End-to-end reconstruction scenarios built with the drawing builder.
//!
//! Each scenario lays out a classified drawing, reconstructs it with the BSP
//! kernel and checks formations, folding and the result solid.

use std::f64::consts::{PI, TAU};

use ortho_types::{EdgeRole, FormationKind, ProjectionPlane};
use reconstruct::{reconstruct, FormationClass, ReconstructError, ReconstructionConfig};
use solid_kernel::{BspKernel, MockKernel};
use test_harness::assertions::*;
use test_harness::helpers::{front_and_top, three_views, through_document};
use test_harness::{DrawingBuilder, HarnessError, ReconstructionReport};

fn regular_polygon_area(r: f64, sides: usize) -> f64 {
    0.5 * sides as f64 * r * r * (TAU / sides as f64).sin()
}

// ── Scenario 1: Two-view block ──────────────────────────────────────────────

#[test]
fn test_two_view_block() {
    let r = front_and_top(10.0, 5.0, 8.0).reconstruct(&mut BspKernel::new()).unwrap();
    assert_formation_kinds(&r, &[FormationKind::Protrusion]).unwrap();
    assert_planes(&r, &[ProjectionPlane::Front, ProjectionPlane::Top]).unwrap();
    assert_volume(&r, 400.0, 1e-9).unwrap();
    assert_bounds(&r, [0.0, 0.0, 0.0], [10.0, 8.0, 5.0], 1e-9).unwrap();
    assert_valid_solid(&r).unwrap();
    assert_no_warnings(&r).unwrap();
}

// ── Scenario 2: Three-view block ────────────────────────────────────────────

#[test]
fn test_three_view_block() {
    let r = three_views(12.0, 4.0, 7.0).reconstruct(&mut BspKernel::new()).unwrap();
    assert_planes(
        &r,
        &[ProjectionPlane::Front, ProjectionPlane::Top, ProjectionPlane::Left],
    )
    .unwrap();
    assert_eq!(r.view_box.formations.len(), 1);
    assert_eq!(r.view_box.formations[0].len(), 3);
    assert_volume(&r, 12.0 * 4.0 * 7.0, 1e-9).unwrap();
    assert_bounds(&r, [0.0, 0.0, 0.0], [12.0, 7.0, 4.0], 1e-9).unwrap();
    assert_valid_solid(&r).unwrap();
}

// ── Scenario 3: L-shaped block ──────────────────────────────────────────────

#[test]
fn test_l_block() {
    let mut b = DrawingBuilder::new();
    b.polygon(&[[0.0, 0.0], [10.0, 0.0], [10.0, 2.0], [3.0, 2.0], [3.0, 6.0], [0.0, 6.0]])
        .rect(0.0, -18.0, 10.0, -10.0)
        .line([3.0, -18.0], [3.0, -10.0], EdgeRole::Normal);
    let r = b.reconstruct(&mut BspKernel::new()).unwrap();
    assert_formation_kinds(&r, &[FormationKind::Protrusion]).unwrap();
    assert_volume(&r, (10.0 * 2.0 + 3.0 * 4.0) * 8.0, 1e-9).unwrap();
    assert_bounds(&r, [0.0, 0.0, 0.0], [10.0, 8.0, 6.0], 1e-9).unwrap();
    assert_valid_solid(&r).unwrap();
}

// ── Scenario 4: Block with a through hole ───────────────────────────────────

#[test]
fn test_block_with_through_hole() {
    let mut b = front_and_top(10.0, 5.0, 8.0);
    b.circle([5.0, 2.5], 1.5)
        .hidden([3.5, -18.0], [3.5, -10.0])
        .hidden([6.5, -18.0], [6.5, -10.0]);
    let r = b.reconstruct(&mut BspKernel::new()).unwrap();
    assert_formation_counts(&r, 1, 1).unwrap();

    let sides = 2 * ReconstructionConfig::default().extrusion.arc_segments;
    let expected = 400.0 - regular_polygon_area(1.5, sides) * 8.0;
    assert_volume(&r, expected, 1e-9).unwrap();
    assert_valid_solid(&r).unwrap();
}

// ── Scenario 5: Sphere ──────────────────────────────────────────────────────

#[test]
fn test_sphere_from_three_circles() {
    let mut b = DrawingBuilder::new();
    for c in [[0.0, 0.0], [0.0, -10.0], [10.0, 0.0]] {
        b.circle(c, 2.0).crosshair(c, 3.0);
    }
    let r = b.reconstruct(&mut BspKernel::new()).unwrap();
    assert_formation_kinds(&r, &[FormationKind::Protrusion]).unwrap();
    assert!(matches!(
        r.view_box.formations[0].class,
        FormationClass::Sphere { radius, .. } if (radius - 2.0).abs() < 1e-12
    ));
    let ideal = 4.0 / 3.0 * PI * 8.0;
    assert!(r.solid.volume() > 0.9 * ideal && r.solid.volume() < ideal);
    assert_bounds(&r, [0.0, 0.0, 0.0], [4.0, 4.0, 4.0], 1e-9).unwrap();
    assert_valid_solid(&r).unwrap();
}

// ── Scenario 6: Drawing document round trip ─────────────────────────────────

#[test]
fn test_document_round_trip_reconstructs_identically() {
    let b = three_views(12.0, 4.0, 7.0);
    let direct = b.reconstruct(&mut BspKernel::new()).unwrap();
    let loaded = through_document(b.spec(), "three views").unwrap();
    assert_eq!(&loaded, b.spec());
    let again = reconstruct(&loaded, &ReconstructionConfig::default(), &mut BspKernel::new()).unwrap();
    assert_eq!(again.solid.faces.len(), direct.solid.faces.len());
    assert!((again.solid.volume() - direct.solid.volume()).abs() < 1e-12);
}

// ── Scenario 7: Kernel failures ─────────────────────────────────────────────

#[test]
fn test_failing_kernel_reports_no_solid() {
    let err = front_and_top(10.0, 5.0, 8.0)
        .reconstruct(&mut MockKernel::always_failing())
        .unwrap_err();
    assert!(matches!(err, HarnessError::Reconstruct(ReconstructError::NoSolid)));
}

// ── Report ──────────────────────────────────────────────────────────────────

#[test]
fn test_report_describes_block() {
    let r = front_and_top(10.0, 5.0, 8.0).reconstruct(&mut BspKernel::new()).unwrap();
    let report = ReconstructionReport::new(&r);
    assert!(report.all_passed());
    let text = report.to_text();
    assert!(text.starts_with("=== Orthographic Reconstruction Report ==="));
    assert!(text.contains("Views (2):"));
    assert!(text.contains("[0] Front"));
    assert!(text.contains("[1] Top"));
    assert!(text.contains("Formations (1, 1 protrusions, 0 depressions):"));
    assert!(text.contains("volume=400.000"));
    assert!(text.contains("[PASS] closed_surface"));
    assert!(text.contains("Warnings: none"));
    assert_eq!(text, report.to_string());
}

#[test]
fn test_assertion_failure_carries_report() {
    let r = front_and_top(10.0, 5.0, 8.0).reconstruct(&mut BspKernel::new()).unwrap();
    let err = assert_formation_kinds(&r, &[FormationKind::Depression]).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("expected formations [Depression], got [Protrusion]"));
    assert!(msg.contains("=== Orthographic Reconstruction Report ==="));
}
