//! Views: per-sheet aggregates of edges, vertices and loops, and their pose.

use nalgebra::{Point2, Point3};
use ortho_types::{EdgeRole, ProjectionPlane, RelationAxis, RelationKind, VertexKind, ViewKind};
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::drawing::{Drawing, EdgeId, HatchId, LabelId};
use crate::geometry::{Affine, Rect2};
use crate::loops::{Loop, LoopId};

new_key_type! {
    pub struct VertexId;
}

/// Index of a view in its owning collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId(pub usize);

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "view {}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Point2<f64>,
    /// Valid once the owning view has been folded.
    pub position3d: Point3<f64>,
    pub kind: VertexKind,
    pub edges: Vec<EdgeId>,
}

/// A named section-plane trace.
#[derive(Debug, Clone, PartialEq)]
pub struct CuttingChain {
    pub name: String,
    pub edges: Vec<EdgeId>,
}

/// Belief-weighted assertion that a view is aligned with `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRelation {
    pub kind: RelationKind,
    pub axis: RelationAxis,
    pub target: ViewId,
    pub belief: f64,
}

#[derive(Debug, Clone)]
pub struct View {
    pub id: ViewId,
    pub kind: ViewKind,
    /// Section name, matched from an `X-X` label.
    pub name: Option<String>,
    pub edges: Vec<EdgeId>,
    pub labels: Vec<LabelId>,
    pub hatches: Vec<HatchId>,
    pub vertices: SlotMap<VertexId, Vertex>,
    pub loops: SlotMap<LoopId, Loop>,
    pub outer_loop: Option<LoopId>,
    pub cutting_chains: Vec<CuttingChain>,
    /// The chain in another view this section view was cut along.
    pub source_chain: Option<CuttingChain>,
    pub relations: Vec<ViewRelation>,
    pub adjacent: Vec<ViewId>,
    pub transform: Affine,
    pub plane: Option<ProjectionPlane>,
    /// Box of the Normal edges.
    pub bounds: Rect2,
}

impl View {
    pub fn new(id: ViewId) -> Self {
        Self {
            id,
            kind: ViewKind::Regular,
            name: None,
            edges: Vec::new(),
            labels: Vec::new(),
            hatches: Vec::new(),
            vertices: SlotMap::with_key(),
            loops: SlotMap::with_key(),
            outer_loop: None,
            cutting_chains: Vec::new(),
            source_chain: None,
            relations: Vec::new(),
            adjacent: Vec::new(),
            transform: Affine::identity(),
            plane: None,
            bounds: Rect2::empty(),
        }
    }

    pub fn is_sectional(&self) -> bool {
        self.kind == ViewKind::Sectional
    }

    pub fn center(&self) -> Point2<f64> {
        self.bounds.center()
    }

    /// World axis the folded view looks along.
    pub fn perpendicular_axis(&self) -> Option<usize> {
        self.plane.map(ProjectionPlane::perpendicular_axis)
    }

    pub fn find_vertex(&self, position: &Point2<f64>, eps: f64) -> Option<VertexId> {
        self.vertices
            .iter()
            .find(|(_, v)| (v.position - position).norm() < eps)
            .map(|(id, _)| id)
    }

    /// Attach `edge` to this view, creating or reusing the vertices at its ends.
    pub fn add_edge(&mut self, drawing: &mut Drawing, edge: EdgeId, eps: f64) {
        let Some(e) = drawing.edges.get_mut(edge) else {
            return;
        };
        for k in 0..2 {
            let p = e.endpoint(k);
            let vertex = match self.find_vertex(&p, eps) {
                Some(v) => v,
                None => self.vertices.insert(Vertex {
                    position: p,
                    position3d: Point3::origin(),
                    kind: VertexKind::Normal,
                    edges: Vec::new(),
                }),
            };
            if let Some(v) = self.vertices.get_mut(vertex) {
                v.edges.push(edge);
            }
            e.vertices[k] = Some(vertex);
        }
        e.view = Some(self.id);
        self.edges.push(edge);
        if e.role == EdgeRole::Normal {
            self.bounds.extend(&e.bounds());
        }
    }

    /// Detach `edge`; vertices left without edges are destroyed.
    pub fn remove_edge(&mut self, drawing: &mut Drawing, edge: EdgeId) {
        if let Some(e) = drawing.edges.get_mut(edge) {
            for slot in e.vertices.iter_mut() {
                if let Some(vid) = slot.take() {
                    let empty = match self.vertices.get_mut(vid) {
                        Some(v) => {
                            v.edges.retain(|x| *x != edge);
                            v.edges.is_empty()
                        }
                        None => false,
                    };
                    if empty {
                        self.vertices.remove(vid);
                    }
                }
            }
            e.view = None;
        }
        self.edges.retain(|x| *x != edge);
        self.recompute_bounds(drawing);
    }

    pub fn recompute_bounds(&mut self, drawing: &Drawing) {
        self.bounds = Rect2::empty();
        for id in &self.edges {
            if let Some(e) = drawing.edges.get(*id) {
                if e.role == EdgeRole::Normal {
                    self.bounds.extend(&e.bounds());
                }
            }
        }
    }

    pub fn outer(&self) -> Option<&Loop> {
        self.outer_loop.and_then(|id| self.loops.get(id))
    }

    /// Edges of the given role, in view order.
    pub fn edges_with_role<'a>(
        &'a self,
        drawing: &'a Drawing,
        role: EdgeRole,
    ) -> impl Iterator<Item = EdgeId> + 'a {
        self.edges
            .iter()
            .copied()
            .filter(move |id| drawing.edges.get(*id).is_some_and(|e| e.role == role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawing::{Curve, Edge};

    fn line(drawing: &mut Drawing, a: (f64, f64), b: (f64, f64), role: EdgeRole) -> EdgeId {
        drawing.edges.insert(Edge::new(
            Curve::line(Point2::new(a.0, a.1), Point2::new(b.0, b.1)),
            role,
        ))
    }

    #[test]
    fn add_edge_shares_vertices() {
        let mut d = Drawing::default();
        let a = line(&mut d, (0.0, 0.0), (1.0, 0.0), EdgeRole::Normal);
        let b = line(&mut d, (1.0, 0.0), (1.0, 1.0), EdgeRole::Normal);
        let mut v = View::new(ViewId(0));
        v.add_edge(&mut d, a, 1e-6);
        v.add_edge(&mut d, b, 1e-6);
        assert_eq!(v.vertices.len(), 3);
        assert_eq!(d.edges[a].common_vertex(&d.edges[b]), d.edges[b].vertices[0]);
        assert_eq!(v.bounds.max, Point2::new(1.0, 1.0));
    }

    #[test]
    fn bounds_cover_normal_edges_only() {
        let mut d = Drawing::default();
        let a = line(&mut d, (0.0, 0.0), (1.0, 0.0), EdgeRole::Normal);
        let c = line(&mut d, (-5.0, 0.0), (5.0, 0.0), EdgeRole::Center);
        let mut v = View::new(ViewId(0));
        v.add_edge(&mut d, a, 1e-6);
        v.add_edge(&mut d, c, 1e-6);
        assert_eq!(v.bounds.min.x, 0.0);
        assert_eq!(v.edges_with_role(&d, EdgeRole::Center).count(), 1);
    }

    #[test]
    fn removing_last_edge_destroys_vertices() {
        let mut d = Drawing::default();
        let a = line(&mut d, (0.0, 0.0), (1.0, 0.0), EdgeRole::Normal);
        let mut v = View::new(ViewId(3));
        v.add_edge(&mut d, a, 1e-6);
        v.remove_edge(&mut d, a);
        assert!(v.vertices.is_empty());
        assert!(v.edges.is_empty());
        assert_eq!(d.edges[a].view, None);
    }
}
