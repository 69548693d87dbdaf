//! Loop and formation extrusion.

use nalgebra::Point3;
use ortho_types::{CornerKind, FormationKind};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use solid_kernel::primitives::{make_box, make_cone, make_sphere};
use solid_kernel::{KernelError, Polyhedron, SolidKernel};
use tracing::{debug, instrument, warn};

use crate::config::ReconstructionConfig;
use crate::drawing::Drawing;
use crate::error::ReconstructError;
use crate::formation::{FormationClass, LoopFormation, LoopRef};
use crate::view_box::ViewBox;

/// Reorders the extrusions of a formation between intersection attempts.
pub trait LoopShuffle {
    fn shuffle(&mut self, order: &mut [usize]);
}

/// [`LoopShuffle`] backed by a seeded `StdRng`; `None` draws the seed from
/// the operating system.
#[derive(Debug, Clone)]
pub struct SeededShuffle {
    rng: StdRng,
}

impl SeededShuffle {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { rng }
    }
}

impl LoopShuffle for SeededShuffle {
    fn shuffle(&mut self, order: &mut [usize]) {
        order.shuffle(&mut self.rng);
    }
}

/// Solid realized from one formation, plus the solids to subtract from the
/// finished object.
#[derive(Debug, Clone, Default)]
pub struct FormationSolid {
    pub solid: Option<Polyhedron>,
    pub corrections: Vec<Polyhedron>,
    /// Parts of the formation that were given up on degenerate geometry.
    pub warnings: Vec<String>,
}

fn degenerate(reason: impl Into<String>) -> ReconstructError {
    ReconstructError::Kernel(KernelError::Degenerate {
        reason: reason.into(),
    })
}

/// Extrude a loop along its view's perpendicular axis through the whole
/// view box.
pub fn extrude_loop(
    drawing: &Drawing,
    view_box: &ViewBox,
    r: LoopRef,
    config: &ReconstructionConfig,
    kernel: &mut dyn SolidKernel,
) -> Result<Polyhedron, ReconstructError> {
    let view = view_box
        .view(r.view)
        .ok_or_else(|| degenerate(format!("{} is not in the view box", r.view)))?;
    let l = view
        .loops
        .get(r.id)
        .ok_or_else(|| degenerate(format!("loop missing from {}", r.view)))?;
    let idx = view
        .perpendicular_axis()
        .ok_or(ReconstructError::UnalignedView { view: r.view })?;

    let (mut lo, mut hi) = (view_box.bounds.min[idx], view_box.bounds.max[idx]);
    if hi - lo < config.tolerance.coincidence {
        return Err(degenerate("view box has no depth along the extrusion axis"));
    }
    let first = l
        .edges()
        .first()
        .and_then(|e| drawing.edges.get(*e)?.vertices[0])
        .and_then(|v| view.vertices.get(v));
    if first.is_some_and(|v| (v.position3d[idx] - hi).abs() < 1e-5) {
        std::mem::swap(&mut lo, &mut hi);
    }

    let mut profile: Vec<Point3<f64>> = Vec::new();
    let segments = config.extrusion.arc_segments.max(1);
    for corner in l.corners() {
        let (Some(prev), Some(next)) = (drawing.edges.get(corner.prev), drawing.edges.get(corner.next)) else {
            continue;
        };
        if corner.kind == CornerKind::Tangent && prev.is_line() && next.is_line() {
            continue;
        }
        let Some(vertex) = view.vertices.get(corner.vertex) else {
            debug_assert!(false, "loop corner without a vertex");
            continue;
        };
        profile.push(view.transform.transform_point2(&vertex.position));
        if next.is_line() {
            continue;
        }
        let from_start = next.vertex_index(corner.vertex) != Some(1);
        for k in 1..segments {
            let t = k as f64 / segments as f64;
            let p = next.curve.point(if from_start { t } else { 1.0 - t });
            profile.push(view.transform.transform_point2(&p));
        }
    }
    if profile.len() < 3 {
        return Err(degenerate(format!("loop profile has {} points", profile.len())));
    }

    let n = profile.len();
    let mut vertices = Vec::with_capacity(2 * n);
    for p in &profile {
        let (mut a, mut b) = (*p, *p);
        a[idx] = lo;
        b[idx] = hi;
        vertices.push(a);
        vertices.push(b);
    }
    let m = 2 * n;
    let mut faces: Vec<Vec<usize>> = (0..n)
        .map(|i| vec![2 * i + 1, 2 * i, (2 * i + 2) % m, (2 * i + 3) % m])
        .collect();
    faces.push((0..n).rev().map(|i| 2 * i).collect());
    faces.push((0..n).map(|i| 2 * i + 1).collect());
    Ok(kernel.build_from_faces(vertices, faces)?)
}

/// Realize one formation as a solid. A generic formation whose booleans keep
/// failing yields no solid rather than an error.
#[instrument(skip_all, fields(loops = formation.len(), kind = ?formation.kind))]
pub fn extrude_formation(
    drawing: &Drawing,
    view_box: &ViewBox,
    formation: &LoopFormation,
    config: &ReconstructionConfig,
    kernel: &mut dyn SolidKernel,
    shuffle: &mut dyn LoopShuffle,
) -> Result<FormationSolid, ReconstructError> {
    let ext = &config.extrusion;
    match formation.class {
        FormationClass::Sphere { center, radius } => {
            debug!(?center, radius, "sphere primitive");
            Ok(FormationSolid {
                solid: Some(make_sphere(center, radius, ext.sphere_stacks, ext.sphere_slices)),
                ..FormationSolid::default()
            })
        }
        FormationClass::Cone(g) => {
            let cone = make_cone(g.base, g.height, g.base_x, g.base_y, g.top_x, g.top_y, ext.cone_slices);
            let mut out = FormationSolid::default();
            if formation.kind == FormationKind::Protrusion {
                if let Some((min, max)) = cone.bounds() {
                    match kernel.subtract(&make_box(min, max), &cone) {
                        Ok(c) => out.corrections.push(c),
                        Err(KernelError::Degenerate { reason }) => {
                            warn!(%reason, "cone correction skipped");
                            out.warnings.push(format!("cone correction skipped: {reason}"));
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
            out.solid = Some(cone);
            Ok(out)
        }
        FormationClass::Normal => {
            let solid = intersect_extrusions(drawing, view_box, formation, config, kernel, shuffle)?;
            Ok(FormationSolid {
                solid,
                ..FormationSolid::default()
            })
        }
    }
}

fn intersect_extrusions(
    drawing: &Drawing,
    view_box: &ViewBox,
    formation: &LoopFormation,
    config: &ReconstructionConfig,
    kernel: &mut dyn SolidKernel,
    shuffle: &mut dyn LoopShuffle,
) -> Result<Option<Polyhedron>, ReconstructError> {
    let has_arc = |r: &LoopRef| {
        view_box.get_loop(*r).is_some_and(|l| {
            l.edges()
                .iter()
                .any(|e| drawing.edges.get(*e).is_some_and(|x| !x.is_line()))
        })
    };
    let mut refs: Vec<LoopRef> = formation.loops.iter().copied().filter(|r| !has_arc(r)).collect();
    refs.extend(formation.loops.iter().copied().filter(|r| has_arc(r)));

    let mut prisms = Vec::with_capacity(refs.len());
    for r in &refs {
        match extrude_loop(drawing, view_box, *r, config, kernel) {
            Ok(p) => prisms.push(p),
            Err(ReconstructError::Kernel(KernelError::Degenerate { reason })) => {
                warn!(view = r.view.0, %reason, "loop extrusion degenerate");
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
    }
    let mut order: Vec<usize> = (0..prisms.len()).collect();

    for attempt in 0..config.extrusion.max_attempts.max(1) {
        match intersect_in_order(&prisms, &order, kernel) {
            Ok(solid) => {
                debug!(attempt, faces = solid.faces.len(), "formation intersected");
                return Ok(Some(solid));
            }
            Err(KernelError::Degenerate { reason }) => {
                debug!(attempt, %reason, "degenerate intersection, reshuffling");
                shuffle.shuffle(&mut order);
            }
            Err(e) => return Err(e.into()),
        }
    }
    warn!(
        attempts = config.extrusion.max_attempts,
        "formation produced no solid"
    );
    Ok(None)
}

fn intersect_in_order(
    prisms: &[Polyhedron],
    order: &[usize],
    kernel: &mut dyn SolidKernel,
) -> Result<Polyhedron, KernelError> {
    let mut it = order.iter().map(|&i| &prisms[i]);
    let Some(first) = it.next() else {
        return Err(KernelError::Degenerate {
            reason: "formation has no loops".into(),
        });
    };
    let mut acc = first.clone();
    for p in it {
        acc = kernel.intersect(&acc, p)?;
    }
    Ok(acc)
}
