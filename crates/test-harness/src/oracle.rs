//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics,
//! so one pass collects every failure.

use nalgebra::{Point3, Vector3};
use solid_kernel::Polyhedron;

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

// ── Solid Oracles ───────────────────────────────────────────────────────────

/// Every face has at least three in-range vertex indices.
pub fn check_face_validity(solid: &Polyhedron) -> OracleVerdict {
    let bad: Vec<usize> = solid
        .faces
        .iter()
        .enumerate()
        .filter(|(_, f)| f.len() < 3 || f.iter().any(|&i| i >= solid.vertices.len()))
        .map(|(i, _)| i)
        .collect();
    if bad.is_empty() {
        OracleVerdict::pass("face_validity", format!("all {} faces valid", solid.faces.len()))
    } else {
        OracleVerdict::fail(
            "face_validity",
            format!("{} invalid faces: {:?}", bad.len(), &bad[..bad.len().min(5)]),
        )
    }
}

/// The vector areas of a closed surface sum to zero.
pub fn check_closed_surface(solid: &Polyhedron) -> OracleVerdict {
    let total: Vector3<f64> = (0..solid.faces.len()).map(|f| solid.face_normal(f)).sum();
    let scale = solid.surface_area().max(1.0);
    let residual = total.norm() / scale;
    let verdict = if residual < 1e-9 {
        OracleVerdict::pass("closed_surface", format!("vector area residual {residual:.2e}"))
    } else {
        OracleVerdict::fail(
            "closed_surface",
            format!("vector area residual {residual:.2e} (surface is open)"),
        )
    };
    verdict.with_value(residual)
}

/// Faces wind counter-clockwise from outside.
pub fn check_positive_volume(solid: &Polyhedron) -> OracleVerdict {
    let v = solid.signed_volume();
    let verdict = if v > 0.0 {
        OracleVerdict::pass("positive_volume", format!("signed volume {v:.6}"))
    } else {
        OracleVerdict::fail("positive_volume", format!("signed volume {v:.6} (inside out or empty)"))
    };
    verdict.with_value(v)
}

/// Volume within a relative tolerance of `expected`.
pub fn check_volume(solid: &Polyhedron, expected: f64, rel_tol: f64) -> OracleVerdict {
    let v = solid.volume();
    let err = (v - expected).abs() / expected.abs().max(1e-12);
    let verdict = if err <= rel_tol {
        OracleVerdict::pass("volume", format!("{v:.6} ≈ {expected:.6}"))
    } else {
        OracleVerdict::fail(
            "volume",
            format!("expected {expected:.6}, got {v:.6} (rel err {err:.2e} > {rel_tol:.2e})"),
        )
    };
    verdict.with_value(v)
}

/// Axis-aligned bounds within `tol` of the expected corners.
pub fn check_bounds(solid: &Polyhedron, min: Point3<f64>, max: Point3<f64>, tol: f64) -> OracleVerdict {
    let Some((lo, hi)) = solid.bounds() else {
        return OracleVerdict::fail("bounds", "solid has no faces".to_string());
    };
    let off = (lo - min).abs().max().max((hi - max).abs().max());
    let verdict = if off <= tol {
        OracleVerdict::pass("bounds", format!("({lo}) -> ({hi})"))
    } else {
        OracleVerdict::fail(
            "bounds",
            format!("expected ({min}) -> ({max}), got ({lo}) -> ({hi})"),
        )
    };
    verdict.with_value(off)
}

/// Run the checks every reconstructed solid should pass.
pub fn run_solid_checks(solid: &Polyhedron) -> Vec<OracleVerdict> {
    vec![
        check_face_validity(solid),
        check_closed_surface(solid),
        check_positive_volume(solid),
    ]
}
