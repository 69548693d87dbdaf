//! Topological merge of two loops sharing edges.

use std::collections::BTreeSet;

use crate::config::Tolerance;
use crate::drawing::{Drawing, EdgeId};
use crate::loops::Loop;

/// Merge two loops of one view into the loop bounding their union.
///
/// The merged boundary is the symmetric difference of the edge sets. Returns
/// `None` when the loops share no edge or the remaining edges do not chain
/// into a single cycle.
pub fn merge_loops(a: &Loop, b: &Loop, drawing: &Drawing, tol: &Tolerance) -> Option<Loop> {
    let sa = a.edge_set();
    let sb = b.edge_set();
    if sa.is_disjoint(&sb) {
        return None;
    }
    let mut remaining: BTreeSet<EdgeId> = sa.symmetric_difference(&sb).copied().collect();
    let first = remaining.pop_first()?;
    let mut vertex = drawing.edges.get(first)?.vertices[1]?;
    let mut chain = vec![first];
    while !remaining.is_empty() {
        let next = remaining
            .iter()
            .copied()
            .find(|id| drawing.edges.get(*id).is_some_and(|e| e.has_vertex(vertex)))?;
        remaining.remove(&next);
        vertex = drawing.edges.get(next)?.other_vertex(vertex)?;
        chain.push(next);
    }
    Loop::new(chain, drawing, tol)
}
