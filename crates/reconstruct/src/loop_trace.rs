//! Loop Constructor: angle-sweep tracing of closed boundaries in each view.

use std::collections::BTreeSet;
use std::f64::consts::{PI, TAU};

use nalgebra::Vector2;

use ortho_types::EdgeRole;
use slotmap::SlotMap;
use tracing::{debug, instrument, warn};

use crate::config::Tolerance;
use crate::drawing::{Drawing, EdgeId};
use crate::error::ReconstructError;
use crate::loops::Loop;
use crate::view::View;

/// Turns this close to zero are straight continuations, whatever their sign.
const STRAIGHT: f64 = 1e-9;

/// Result of one walk: the edges in order and the turning angle summed over
/// every corner except the closing one.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub edges: Vec<EdgeId>,
    pub turning: f64,
}

impl Trace {
    /// The walk wound around an aggregate region instead of a single face.
    /// A face sums to at most `(n - 2)π`, an aggregate to more than `nπ`.
    pub fn is_aggregate(&self) -> bool {
        self.turning > self.edges.len() as f64 * PI
    }
}

/// Counter-clockwise angle from the chord `back` to the chord `out`, in `[0, 2π)`.
fn sweep(back: &Vector2<f64>, out: &Vector2<f64>) -> f64 {
    let z = out.x * back.y - out.y * back.x;
    let angle = z.atan2(out.dot(back));
    if angle < -STRAIGHT {
        angle + TAU
    } else {
        angle.max(0.0)
    }
}

/// Walk from `start` towards its endpoint `toward`, always taking the
/// extension with the smallest counter-clockwise turn, until the walk reaches
/// the other endpoint of `start`. Fails when a vertex offers no continuation
/// or an edge would be visited twice.
pub fn trace(drawing: &Drawing, start: EdgeId, toward: usize) -> Option<Trace> {
    let end = drawing.edges.get(start)?.vertices[1 - toward]?;
    let mut current = start;
    let mut k = toward;
    let mut edges = vec![start];
    let mut turning = 0.0;
    loop {
        let e = drawing.edges.get(current)?;
        let vertex = e.vertices[k]?;
        let back = e.chord_from(k).try_normalize(0.0)?;

        let mut best: Option<(EdgeId, usize, f64)> = None;
        for cand in &e.extensions[k] {
            if *cand == current {
                continue;
            }
            let Some(c) = drawing.edges.get(*cand) else {
                continue;
            };
            if !c.role.is_boundary() {
                continue;
            }
            let Some(kc) = c.vertex_index(vertex) else {
                continue;
            };
            let Some(out) = c.chord_from(kc).try_normalize(0.0) else {
                continue;
            };
            let angle = sweep(&back, &out);
            if best.map_or(true, |(_, _, a)| angle < a) {
                best = Some((*cand, kc, angle));
            }
        }

        let (next, kn, angle) = best?;
        if edges.contains(&next) {
            return None;
        }
        turning += angle;
        edges.push(next);
        current = next;
        k = 1 - kn;
        if drawing.edges.get(next)?.vertices[k] == Some(end) {
            return Some(Trace { edges, turning });
        }
    }
}

/// Trace the outer loop and every fundamental loop of each view, then set
/// the disjoint and hatched flags.
#[instrument(skip_all, fields(views = views.len()))]
pub fn construct_loops(
    drawing: &mut Drawing,
    views: &mut [View],
    tol: &Tolerance,
) -> Result<(), ReconstructError> {
    for view in views.iter_mut() {
        construct_view_loops(drawing, view, tol)?;
    }
    Ok(())
}

fn construct_view_loops(
    drawing: &mut Drawing,
    view: &mut View,
    tol: &Tolerance,
) -> Result<(), ReconstructError> {
    view.loops = SlotMap::with_key();
    view.outer_loop = None;

    let seed = view
        .edges_with_role(drawing, EdgeRole::Normal)
        .fold(None::<(EdgeId, f64)>, |best, id| {
            let x = drawing.edges[id].bounds().center().x;
            match best {
                Some((_, bx)) if bx <= x => best,
                _ => Some((id, x)),
            }
        })
        .map(|(id, _)| id)
        .ok_or(ReconstructError::EmptyView { view: view.id })?;

    let first = trace(drawing, seed, 0);
    let outer = if first.as_ref().is_some_and(Trace::is_aggregate) {
        first
    } else {
        trace(drawing, seed, 1).or(first)
    }
    .ok_or(ReconstructError::OpenOuterLoop { view: view.id })?;
    let mut outer = Loop::new(outer.edges, drawing, tol)
        .ok_or(ReconstructError::OpenOuterLoop { view: view.id })?;
    outer.reverse(drawing, tol);
    outer.fundamental = false;
    let outer_id = view.loops.insert(outer);
    view.outer_loop = Some(outer_id);

    let boundary: Vec<EdgeId> = view
        .edges
        .iter()
        .copied()
        .filter(|id| drawing.edges.get(*id).is_some_and(|e| e.role.is_boundary()))
        .collect();
    let mut visited = BTreeSet::new();
    for id in boundary {
        if !visited.insert(id) {
            continue;
        }
        let found = match trace(drawing, id, 1) {
            Some(t) if !t.is_aggregate() => Some(t),
            _ => trace(drawing, id, 0).filter(|t| !t.is_aggregate()),
        };
        let Some(found) = found else {
            debug!(view = view.id.0, "trace did not close");
            continue;
        };
        let set: BTreeSet<EdgeId> = found.edges.iter().copied().collect();
        visited.extend(set.iter().copied());
        if view.loops.values().any(|l| l.edge_set() == set) {
            continue;
        }
        match Loop::new(found.edges, drawing, tol) {
            Some(l) => {
                view.loops.insert(l);
            }
            None => warn!(view = view.id.0, "traced edges do not form a loop"),
        }
    }

    for id in &view.edges {
        if let Some(e) = drawing.edges.get_mut(*id) {
            e.loops.clear();
        }
    }
    for (lid, l) in view.loops.iter() {
        for e in l.edges() {
            if let Some(edge) = drawing.edges.get_mut(*e) {
                edge.loops.push(lid);
            }
        }
    }
    let sectional = view.is_sectional();
    for l in view.loops.values_mut() {
        l.disjoint = l
            .edges()
            .iter()
            .all(|e| drawing.edges.get(*e).is_some_and(|x| x.loops.len() == 1));
        let first_hatch = l.edges().first().and_then(|e| drawing.edges.get(*e)?.hatch);
        l.hatched = sectional
            && first_hatch.is_some()
            && l
                .edges()
                .iter()
                .all(|e| drawing.edges.get(*e).is_some_and(|x| x.hatch == first_hatch));
    }
    debug!(view = view.id.0, loops = view.loops.len(), "loops traced");
    Ok(())
}
