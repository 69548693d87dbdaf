//! Object Constructor: composes formation solids into the final object.

use ortho_types::FormationKind;
use solid_kernel::{KernelError, Polyhedron, SolidKernel};
use tracing::{debug, info, instrument, warn};

use crate::error::ReconstructError;
use crate::extrude::FormationSolid;
use crate::formation::LoopFormation;

/// Combine formation solids: Protrusions first, then Depressions, each
/// applied left to right; corrections are subtracted last. `solids` lines
/// up with `formations`. A boolean that fails on degenerate geometry drops
/// that formation or correction and records a warning.
#[instrument(skip_all, fields(formations = formations.len()))]
pub fn construct_object(
    formations: &[LoopFormation],
    solids: &[FormationSolid],
    kernel: &mut dyn SolidKernel,
    warnings: &mut Vec<String>,
) -> Result<Polyhedron, ReconstructError> {
    let mut order: Vec<usize> = (0..formations.len().min(solids.len())).collect();
    order.sort_by_key(|&i| formations[i].kind == FormationKind::Depression);

    let mut object: Option<Polyhedron> = None;
    for i in order {
        let Some(solid) = &solids[i].solid else {
            continue;
        };
        let kind = formations[i].kind;
        let Some(acc) = object.take() else {
            object = Some(solid.clone());
            debug!(formation = i, ?kind, "formation seeds the object");
            continue;
        };
        let applied = match kind {
            FormationKind::Protrusion => kernel.union(&acc, solid),
            FormationKind::Depression => kernel.subtract(&acc, solid),
        };
        object = Some(match applied {
            Ok(next) => {
                debug!(formation = i, ?kind, "formation applied");
                next
            }
            Err(KernelError::Degenerate { reason }) => {
                warn!(formation = i, ?kind, %reason, "formation dropped from the object");
                warnings.push(format!("formation {i} ({kind:?}) could not be applied: {reason}"));
                acc
            }
            Err(e) => return Err(e.into()),
        });
    }
    let mut object = object.ok_or(ReconstructError::NoSolid)?;
    for (i, s) in solids.iter().enumerate() {
        for correction in &s.corrections {
            match kernel.subtract(&object, correction) {
                Ok(next) => object = next,
                Err(KernelError::Degenerate { reason }) => {
                    warn!(formation = i, %reason, "correction dropped");
                    warnings.push(format!("correction of formation {i} could not be applied: {reason}"));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    let object = kernel.canonicalize(&object)?;
    info!(
        vertices = object.vertices.len(),
        faces = object.faces.len(),
        "object constructed"
    );
    Ok(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formation::FormationClass;
    use approx::assert_relative_eq;
    use nalgebra::Point3;
    use solid_kernel::primitives::make_box;
    use solid_kernel::{BooleanOp, MockKernel};

    fn formation(kind: FormationKind) -> LoopFormation {
        let mut f = LoopFormation::new(Vec::new(), FormationClass::Normal);
        f.kind = kind;
        f
    }

    fn solid(p: Polyhedron) -> FormationSolid {
        FormationSolid {
            solid: Some(p),
            ..FormationSolid::default()
        }
    }

    #[test]
    fn depression_listed_first_is_applied_after_protrusions() {
        let formations = [
            formation(FormationKind::Depression),
            formation(FormationKind::Protrusion),
        ];
        let solids = [
            solid(make_box(Point3::new(1.0, 1.0, -1.0), Point3::new(2.0, 2.0, 5.0))),
            solid(make_box(Point3::origin(), Point3::new(4.0, 4.0, 4.0))),
        ];
        let mut kernel = MockKernel::new();
        let object = construct_object(&formations, &solids, &mut kernel, &mut Vec::new()).unwrap();
        assert_relative_eq!(object.volume(), 64.0 - 4.0, epsilon = 1e-6);
        assert_eq!(kernel.calls_of(BooleanOp::Subtract), 1);
        assert_eq!(kernel.calls_of(BooleanOp::Union), 0);
    }

    #[test]
    fn missing_solids_are_skipped() {
        let formations = [
            formation(FormationKind::Protrusion),
            formation(FormationKind::Protrusion),
        ];
        let solids = [
            FormationSolid::default(),
            solid(make_box(Point3::origin(), Point3::new(1.0, 2.0, 3.0))),
        ];
        let object = construct_object(&formations, &solids, &mut MockKernel::new(), &mut Vec::new()).unwrap();
        assert_relative_eq!(object.volume(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn nothing_to_build_is_an_error() {
        let formations = [formation(FormationKind::Protrusion)];
        let solids = [FormationSolid::default()];
        assert_eq!(
            construct_object(&formations, &solids, &mut MockKernel::new(), &mut Vec::new()),
            Err(ReconstructError::NoSolid)
        );
    }

    #[test]
    fn degenerate_depression_is_dropped_with_a_warning() {
        let formations = [
            formation(FormationKind::Protrusion),
            formation(FormationKind::Depression),
        ];
        let solids = [
            solid(make_box(Point3::origin(), Point3::new(4.0, 4.0, 4.0))),
            solid(make_box(Point3::new(1.0, 1.0, -1.0), Point3::new(2.0, 2.0, 5.0))),
        ];
        let mut kernel = MockKernel::failing(1);
        let mut warnings = Vec::new();
        let object = construct_object(&formations, &solids, &mut kernel, &mut warnings).unwrap();
        assert_relative_eq!(object.volume(), 64.0, epsilon = 1e-6);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("formation 1"), "{}", warnings[0]);
    }

    #[test]
    fn degenerate_correction_is_dropped_with_a_warning() {
        let formations = [formation(FormationKind::Protrusion)];
        let solids = [FormationSolid {
            solid: Some(make_box(Point3::origin(), Point3::new(2.0, 2.0, 2.0))),
            corrections: vec![make_box(Point3::origin(), Point3::new(1.0, 1.0, 1.0))],
            ..FormationSolid::default()
        }];
        let mut warnings = Vec::new();
        let object = construct_object(
            &formations,
            &solids,
            &mut MockKernel::always_failing(),
            &mut warnings,
        )
        .unwrap();
        assert_relative_eq!(object.volume(), 8.0, epsilon = 1e-6);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("correction of formation 0"));
    }
}
