//! Drawing clean-up ahead of view construction: degenerate edges, T-junctions,
//! hatch binding and the endpoint extension graph.

use nalgebra::Point2;
use tracing::{debug, instrument};

use crate::config::Tolerance;
use crate::drawing::{Curve, Drawing, Edge, EdgeId};

/// Run every preprocessing step in order.
#[instrument(skip_all, fields(edges = drawing.edges.len()))]
pub fn preprocess(drawing: &mut Drawing, tol: &Tolerance) {
    let removed = remove_degenerate_edges(drawing, tol.coincidence);
    let split = split_t_junctions(drawing, tol.coincidence);
    let bound = bind_hatches(drawing, tol.coincidence);
    link_extensions(drawing, tol.coincidence);
    debug!(removed, split, bound, edges = drawing.edges.len(), "drawing preprocessed");
}

/// Remove edges whose endpoints coincide. Returns the number removed.
pub fn remove_degenerate_edges(drawing: &mut Drawing, eps: f64) -> usize {
    let degenerate: Vec<EdgeId> = drawing
        .edges
        .iter()
        .filter(|(_, e)| e.curve.is_degenerate(eps))
        .map(|(id, _)| id)
        .collect();
    for id in &degenerate {
        drawing.edges.remove(*id);
    }
    degenerate.len()
}

/// Split boundary lines at endpoints of other boundary edges lying strictly
/// inside them. Returns the number of lines split.
pub fn split_t_junctions(drawing: &mut Drawing, eps: f64) -> usize {
    let endpoints: Vec<(EdgeId, Point2<f64>)> = drawing
        .edges
        .iter()
        .filter(|(_, e)| e.role.is_boundary())
        .flat_map(|(id, e)| [(id, e.endpoint(0)), (id, e.endpoint(1))])
        .collect();

    let mut splits: Vec<(EdgeId, Vec<f64>)> = Vec::new();
    for (id, edge) in drawing.edges.iter() {
        let Curve::Line { start, end } = edge.curve else {
            continue;
        };
        if !edge.role.is_boundary() {
            continue;
        }
        let length = (end - start).norm();
        let mut params: Vec<f64> = endpoints
            .iter()
            .filter(|(other, _)| *other != id)
            .filter_map(|(_, p)| {
                let t = edge.curve.line_parameter(p)?;
                let foot = start + (end - start) * t;
                let inside = t * length > eps && (1.0 - t) * length > eps;
                (inside && (p - foot).norm() < eps).then_some(t)
            })
            .collect();
        if params.is_empty() {
            continue;
        }
        params.sort_by(f64::total_cmp);
        params.dedup_by(|a, b| (*a - *b) * length < eps);
        splits.push((id, params));
    }

    let count = splits.len();
    for (id, params) in splits {
        let Some(edge) = drawing.edges.remove(id) else {
            continue;
        };
        let mut cuts = vec![edge.endpoint(0)];
        cuts.extend(params.iter().map(|t| edge.curve.point(*t)));
        cuts.push(edge.endpoint(1));
        for pair in cuts.windows(2) {
            let mut piece = Edge::new(Curve::line(pair[0], pair[1]), edge.role);
            piece.hatch = edge.hatch;
            drawing.edges.insert(piece);
        }
    }
    count
}

/// Bind each hatch boundary curve to a coincident, still unbound drawing edge.
/// Returns the number of bindings made.
pub fn bind_hatches(drawing: &mut Drawing, eps: f64) -> usize {
    let mut bound = 0;
    let hatch_ids: Vec<_> = drawing.hatches.keys().collect();
    for hid in hatch_ids {
        let Some(hatch) = drawing.hatches.get_mut(hid) else {
            continue;
        };
        let boundary = std::mem::take(&mut hatch.boundary);
        let mut unmatched = Vec::new();
        let mut matched = Vec::new();
        for curve in boundary {
            let hit = drawing
                .edges
                .iter()
                .find(|(id, e)| {
                    e.hatch.is_none() && !matched.contains(id) && e.curve.is_coincident(&curve, eps)
                })
                .map(|(id, _)| id);
            match hit {
                Some(id) => matched.push(id),
                None => unmatched.push(curve),
            }
        }
        for id in &matched {
            if let Some(e) = drawing.edges.get_mut(*id) {
                e.hatch = Some(hid);
            }
        }
        bound += matched.len();
        if let Some(hatch) = drawing.hatches.get_mut(hid) {
            hatch.boundary = unmatched;
            hatch.edges.extend(matched);
        }
    }
    bound
}

/// Record, for every pair of extension-compatible edges touching at an
/// endpoint, each as the other's extension at that endpoint.
pub fn link_extensions(drawing: &mut Drawing, eps: f64) {
    let ids = drawing.edge_ids();
    for e in drawing.edges.values_mut() {
        e.extensions = [Vec::new(), Vec::new()];
    }
    let mut links: Vec<(EdgeId, usize, EdgeId)> = Vec::new();
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            let (ea, eb) = (&drawing.edges[*a], &drawing.edges[*b]);
            if !ea.role.extends(eb.role) {
                continue;
            }
            for ka in 0..2 {
                for kb in 0..2 {
                    if (ea.endpoint(ka) - eb.endpoint(kb)).norm() < eps {
                        links.push((*a, ka, *b));
                        links.push((*b, kb, *a));
                    }
                }
            }
        }
    }
    for (edge, k, other) in links {
        if let Some(e) = drawing.edges.get_mut(edge) {
            if !e.extensions[k].contains(&other) {
                e.extensions[k].push(other);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ortho_types::{CurveSpec, DrawingSpec, EdgeRole};

    fn spec_with(lines: &[((f64, f64), (f64, f64), EdgeRole)]) -> Drawing {
        let mut spec = DrawingSpec::new();
        for (a, b, role) in lines {
            spec.push_edge(CurveSpec::line([a.0, a.1], [b.0, b.1]), *role);
        }
        Drawing::from_spec(&spec)
    }

    #[test]
    fn zero_length_edges_are_removed() {
        let mut d = spec_with(&[
            ((0.0, 0.0), (0.0, 0.0), EdgeRole::Normal),
            ((0.0, 0.0), (1.0, 0.0), EdgeRole::Normal),
        ]);
        assert_eq!(remove_degenerate_edges(&mut d, 1e-6), 1);
        assert_eq!(d.edges.len(), 1);
    }

    #[test]
    fn hidden_line_splits_boundary() {
        let mut d = spec_with(&[
            ((0.0, 0.0), (10.0, 0.0), EdgeRole::Normal),
            ((4.0, 0.0), (4.0, 5.0), EdgeRole::Phantom),
        ]);
        assert_eq!(split_t_junctions(&mut d, 1e-6), 1);
        assert_eq!(d.edges.len(), 3);
        let normals = d.edges.values().filter(|e| e.role == EdgeRole::Normal).count();
        assert_eq!(normals, 2);
    }

    #[test]
    fn centerlines_do_not_split() {
        let mut d = spec_with(&[
            ((0.0, 0.0), (10.0, 0.0), EdgeRole::Normal),
            ((4.0, 0.0), (4.0, 5.0), EdgeRole::Center),
        ]);
        assert_eq!(split_t_junctions(&mut d, 1e-6), 0);
    }

    #[test]
    fn extensions_are_symmetric() {
        let mut d = spec_with(&[
            ((0.0, 0.0), (1.0, 0.0), EdgeRole::Normal),
            ((1.0, 0.0), (1.0, 1.0), EdgeRole::Phantom),
            ((1.0, 0.0), (2.0, -1.0), EdgeRole::Center),
        ]);
        link_extensions(&mut d, 1e-6);
        let ids = d.edge_ids();
        assert_eq!(d.edges[ids[0]].extensions[1], vec![ids[1]]);
        assert_eq!(d.edges[ids[1]].extensions[0], vec![ids[0]]);
        assert!(d.edges[ids[2]].extensions[0].is_empty());
    }

    #[test]
    fn hatch_binds_coincident_edge() {
        let mut spec = DrawingSpec::new();
        spec.push_edge(CurveSpec::line([0.0, 0.0], [1.0, 0.0]), EdgeRole::Normal)
            .push_hatch(vec![
                CurveSpec::line([1.0, 0.0], [0.0, 0.0]),
                CurveSpec::line([5.0, 5.0], [6.0, 5.0]),
            ]);
        let mut d = Drawing::from_spec(&spec);
        assert_eq!(bind_hatches(&mut d, 1e-6), 1);
        let (hid, hatch) = d.hatches.iter().next().unwrap();
        assert_eq!(hatch.edges.len(), 1);
        assert_eq!(hatch.boundary.len(), 1);
        assert_eq!(d.edges[hatch.edges[0]].hatch, Some(hid));
    }
}
