//! Closed edge cycles of a view and their derived corner data.

use std::collections::BTreeSet;

use ortho_types::{CornerKind, EdgeRole};
use slotmap::new_key_type;

use crate::config::Tolerance;
use crate::drawing::{Drawing, EdgeId};
use crate::geometry::{Affine, Rect2, Rect3};
use crate::view::VertexId;

new_key_type! {
    pub struct LoopId;
}

/// One corner of a loop: `vertex` is where `prev` hands over to `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopVertex {
    pub vertex: VertexId,
    pub prev: EdgeId,
    pub next: EdgeId,
    pub kind: CornerKind,
}

/// Ordered cycle of edges. Derived data is recomputed whenever the edge
/// sequence changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    edges: Vec<EdgeId>,
    corners: Vec<LoopVertex>,
    vertex_set: BTreeSet<VertexId>,
    bounds: Rect2,
    bounds3d: Rect3,
    /// A minimal cycle rather than the outline of an aggregate.
    pub fundamental: bool,
    /// No Phantom edge in the boundary.
    pub solid: bool,
    /// Shares no edge with another loop.
    pub disjoint: bool,
    /// Every edge borders one hatch (sectional views only).
    pub hatched: bool,
}

impl Loop {
    /// Build a loop from a closed edge sequence. Returns `None` when fewer
    /// than two edges are given or consecutive edges share no vertex.
    pub fn new(edges: Vec<EdgeId>, drawing: &Drawing, tol: &Tolerance) -> Option<Self> {
        let corners = compute_corners(&edges, drawing, tol)?;
        let vertex_set = corners.iter().map(|c| c.vertex).collect();
        let mut bounds = Rect2::empty();
        let mut solid = true;
        for id in &edges {
            let e = drawing.edges.get(*id)?;
            bounds.extend(&e.bounds());
            solid &= e.role != EdgeRole::Phantom;
        }
        Some(Self {
            edges,
            corners,
            vertex_set,
            bounds,
            bounds3d: Rect3::empty(),
            fundamental: true,
            solid,
            disjoint: false,
            hatched: false,
        })
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn corners(&self) -> &[LoopVertex] {
        &self.corners
    }

    pub fn vertex_set(&self) -> &BTreeSet<VertexId> {
        &self.vertex_set
    }

    pub fn bounds(&self) -> &Rect2 {
        &self.bounds
    }

    pub fn bounds3d(&self) -> &Rect3 {
        &self.bounds3d
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }

    pub fn edge_set(&self) -> BTreeSet<EdgeId> {
        self.edges.iter().copied().collect()
    }

    pub fn same_edges(&self, other: &Loop) -> bool {
        self.edge_set() == other.edge_set()
    }

    /// Reverse the winding.
    pub fn reverse(&mut self, drawing: &Drawing, tol: &Tolerance) {
        self.edges.reverse();
        if let Some(corners) = compute_corners(&self.edges, drawing, tol) {
            self.corners = corners;
        }
    }

    /// Recompute the 3D box from the transformed boxes of the edges.
    pub fn refresh_3d(&mut self, drawing: &Drawing, transform: &Affine) {
        let mut b = Rect3::empty();
        for id in &self.edges {
            if let Some(e) = drawing.edges.get(*id) {
                b.extend(&transform.transform_rect2(&e.bounds()));
            }
        }
        self.bounds3d = b;
    }
}

fn compute_corners(
    edges: &[EdgeId],
    drawing: &Drawing,
    tol: &Tolerance,
) -> Option<Vec<LoopVertex>> {
    let n = edges.len();
    if n < 2 {
        return None;
    }
    let first = drawing.edges.get(edges[0])?;
    let second = drawing.edges.get(edges[1])?;
    let mut vertex = if n == 2 {
        first.vertices[1].filter(|v| second.has_vertex(*v))?
    } else {
        first.common_vertex(second)?
    };
    let mut corners = Vec::with_capacity(n);
    for i in 0..n {
        let prev = drawing.edges.get(edges[i])?;
        let next = drawing.edges.get(edges[(i + 1) % n])?;
        if i > 0 {
            vertex = prev.other_vertex(vertex)?;
        }
        let kp = prev.vertex_index(vertex)?;
        let kn = next.vertex_index(vertex)?;
        let tp = prev.curve.tangent(kp);
        let tn = next.curve.tangent(kn);
        let kind = if tp.norm() > 0.0
            && tn.norm() > 0.0
            && tp.normalize().perp(&tn.normalize()).abs() < tol.angular
        {
            CornerKind::Tangent
        } else {
            CornerKind::Normal
        };
        corners.push(LoopVertex {
            vertex,
            prev: edges[i],
            next: edges[(i + 1) % n],
            kind,
        });
    }
    Some(corners)
}
