//! End-to-end reconstruction driver.

use ortho_types::DrawingSpec;
use solid_kernel::{Polyhedron, SolidKernel};
use tracing::{info, instrument, warn};

use crate::config::ReconstructionConfig;
use crate::drawing::Drawing;
use crate::error::ReconstructError;
use crate::extrude::{extrude_formation, LoopShuffle, SeededShuffle};
use crate::fold::fold_planes;
use crate::formation_construct::construct_formations;
use crate::loop_trace::construct_loops;
use crate::object::construct_object;
use crate::preprocess::preprocess;
use crate::relation::{construct_relations, filter_relations};
use crate::view_box::ViewBox;
use crate::view_construct::{classify_vertices, construct_views};

/// Everything a reconstruction produced.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub drawing: Drawing,
    pub view_box: ViewBox,
    pub solid: Polyhedron,
    /// Formations, or parts of them, left out of the solid.
    pub warnings: Vec<String>,
}

/// Run every stage up to and including formation construction.
#[instrument(skip_all, fields(edges = spec.edges.len()))]
pub fn build_view_box(
    spec: &DrawingSpec,
    config: &ReconstructionConfig,
) -> Result<(Drawing, ViewBox), ReconstructError> {
    let tol = &config.tolerance;
    let mut drawing = Drawing::from_spec(spec);
    preprocess(&mut drawing, tol);

    let mut views = construct_views(&mut drawing, tol);
    if views.len() < 2 {
        return Err(ReconstructError::TooFewViews { count: views.len() });
    }
    classify_vertices(&drawing, &mut views);
    construct_loops(&mut drawing, &mut views, tol)?;
    construct_relations(&drawing, &mut views, config);
    filter_relations(&mut views)?;
    let root = fold_planes(&drawing, &mut views, tol)?;

    let mut view_box = ViewBox::new(views, root);
    construct_formations(&drawing, &mut view_box, config);
    Ok((drawing, view_box))
}

/// Reconstruct a solid from a classified drawing.
pub fn reconstruct(
    spec: &DrawingSpec,
    config: &ReconstructionConfig,
    kernel: &mut dyn SolidKernel,
) -> Result<Reconstruction, ReconstructError> {
    let mut shuffle = SeededShuffle::new(config.extrusion.seed);
    reconstruct_with(spec, config, kernel, &mut shuffle)
}

/// [`reconstruct`] with an explicit retry shuffle.
pub fn reconstruct_with(
    spec: &DrawingSpec,
    config: &ReconstructionConfig,
    kernel: &mut dyn SolidKernel,
    shuffle: &mut dyn LoopShuffle,
) -> Result<Reconstruction, ReconstructError> {
    let (drawing, view_box) = build_view_box(spec, config)?;

    let mut warnings = Vec::new();
    let mut solids = Vec::with_capacity(view_box.formations.len());
    for (i, formation) in view_box.formations.iter().enumerate() {
        let solid = extrude_formation(&drawing, &view_box, formation, config, kernel, shuffle)?;
        if solid.solid.is_none() {
            warn!(formation = i, "formation skipped");
            warnings.push(format!(
                "formation {i} ({:?}, {} loops) produced no solid",
                formation.kind,
                formation.len()
            ));
        }
        warnings.extend(solid.warnings.iter().map(|w| format!("formation {i}: {w}")));
        solids.push(solid);
    }
    let solid = construct_object(&view_box.formations, &solids, kernel, &mut warnings)?;
    info!(
        views = view_box.views.len(),
        formations = view_box.formations.len(),
        warnings = warnings.len(),
        "reconstruction finished"
    );
    Ok(Reconstruction {
        drawing,
        view_box,
        solid,
        warnings,
    })
}
