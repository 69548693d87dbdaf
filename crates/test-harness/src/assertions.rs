//! Assertion helpers with diagnostic output.
//!
//! Every failure carries the expected and actual values plus the full
//! reconstruction report.

use nalgebra::Point3;
use ortho_types::{FormationKind, ProjectionPlane};
use reconstruct::Reconstruction;

use crate::helpers::HarnessError;
use crate::oracle::{check_bounds, check_volume, run_solid_checks, OracleVerdict};
use crate::report::ReconstructionReport;

fn failed(r: &Reconstruction, detail: String) -> HarnessError {
    HarnessError::AssertionFailed {
        detail: format!("{detail}\n{}", ReconstructionReport::new(r)),
    }
}

fn verdict(r: &Reconstruction, v: OracleVerdict) -> Result<(), HarnessError> {
    if v.passed {
        Ok(())
    } else {
        Err(HarnessError::OracleFailure {
            oracle: v.oracle_name,
            detail: format!("{}\n{}", v.detail, ReconstructionReport::new(r)),
        })
    }
}

/// Assert the result volume within a relative tolerance.
pub fn assert_volume(r: &Reconstruction, expected: f64, rel_tol: f64) -> Result<(), HarnessError> {
    verdict(r, check_volume(&r.solid, expected, rel_tol))
}

/// Assert the result's axis-aligned bounds.
pub fn assert_bounds(r: &Reconstruction, min: [f64; 3], max: [f64; 3], tol: f64) -> Result<(), HarnessError> {
    verdict(r, check_bounds(&r.solid, Point3::from(min), Point3::from(max), tol))
}

/// Assert the solid passes every structural oracle.
pub fn assert_valid_solid(r: &Reconstruction) -> Result<(), HarnessError> {
    for v in run_solid_checks(&r.solid) {
        verdict(r, v)?;
    }
    Ok(())
}

/// Assert formation kinds in formation order.
pub fn assert_formation_kinds(r: &Reconstruction, expected: &[FormationKind]) -> Result<(), HarnessError> {
    let actual: Vec<FormationKind> = r.view_box.formations.iter().map(|f| f.kind).collect();
    if actual == expected {
        Ok(())
    } else {
        Err(failed(r, format!("expected formations {expected:?}, got {actual:?}")))
    }
}

/// Assert formation kinds ignoring order.
pub fn assert_formation_counts(r: &Reconstruction, protrusions: usize, depressions: usize) -> Result<(), HarnessError> {
    let d = r
        .view_box
        .formations
        .iter()
        .filter(|f| f.kind == FormationKind::Depression)
        .count();
    let p = r.view_box.formations.len() - d;
    if (p, d) == (protrusions, depressions) {
        Ok(())
    } else {
        Err(failed(
            r,
            format!("expected {protrusions} protrusions and {depressions} depressions, got {p} and {d}"),
        ))
    }
}

/// Assert the projection plane of each view, in view order.
pub fn assert_planes(r: &Reconstruction, expected: &[ProjectionPlane]) -> Result<(), HarnessError> {
    let actual: Vec<Option<ProjectionPlane>> = r.view_box.views.iter().map(|v| v.plane).collect();
    let wanted: Vec<Option<ProjectionPlane>> = expected.iter().copied().map(Some).collect();
    if actual == wanted {
        Ok(())
    } else {
        Err(failed(r, format!("expected planes {expected:?}, got {actual:?}")))
    }
}

/// Assert the reconstruction produced no warnings.
pub fn assert_no_warnings(r: &Reconstruction) -> Result<(), HarnessError> {
    if r.warnings.is_empty() {
        Ok(())
    } else {
        Err(failed(r, format!("unexpected warnings: {:?}", r.warnings)))
    }
}
