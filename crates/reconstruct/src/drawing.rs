//! The classified drawing: arenas of edges, labels and hatches.

use std::f64::consts::{PI, TAU};

use nalgebra::{Point2, Vector2};
use ortho_types::{CurveSpec, DrawingSpec, EdgeRole};
use slotmap::{new_key_type, SlotMap};

use crate::geometry::Rect2;
use crate::loops::LoopId;
use crate::view::{VertexId, ViewId};

new_key_type! {
    pub struct EdgeId;
    pub struct LabelId;
    pub struct HatchId;
}

/// Elliptic arc `center + long·cos(a) + short·sin(a)`, `a = start + t·span`.
///
/// `span` is non-negative and `start` lies in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub center: Point2<f64>,
    pub long_axis: Vector2<f64>,
    pub short_axis: Vector2<f64>,
    pub start: f64,
    pub span: f64,
}

impl Arc {
    pub fn new(
        center: Point2<f64>,
        long_axis: Vector2<f64>,
        short_axis: Vector2<f64>,
        start: f64,
        span: f64,
    ) -> Self {
        let (start, span) = if span < 0.0 {
            (start + span, -span)
        } else {
            (start, span)
        };
        Self {
            center,
            long_axis,
            short_axis,
            start: start.rem_euclid(TAU),
            span,
        }
    }

    pub fn at_angle(&self, angle: f64) -> Point2<f64> {
        self.center + self.long_axis * angle.cos() + self.short_axis * angle.sin()
    }

    pub fn point(&self, t: f64) -> Point2<f64> {
        self.at_angle(self.start + t * self.span)
    }

    pub fn radius(&self) -> f64 {
        self.long_axis.norm()
    }

    pub fn is_circular(&self, eps: f64) -> bool {
        self.long_axis.norm() - self.short_axis.norm() <= eps
    }

    fn contains_angle(&self, angle: f64) -> bool {
        (angle - self.start).rem_euclid(TAU) <= self.span + 1e-12
    }

    pub fn bounds(&self) -> Rect2 {
        let mut r = Rect2::from_points(&[self.point(0.0), self.point(1.0)]);
        for k in 0..2 {
            let base = self.short_axis[k].atan2(self.long_axis[k]);
            for angle in [base, base + PI] {
                if self.contains_angle(angle) {
                    r.extend_point(&self.at_angle(angle));
                }
            }
        }
        r
    }
}

/// Geometry of a drawing edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Curve {
    Line { start: Point2<f64>, end: Point2<f64> },
    Arc(Arc),
}

impl Curve {
    pub fn line(start: Point2<f64>, end: Point2<f64>) -> Self {
        Curve::Line { start, end }
    }

    /// Convert an input record. Closed arcs are split into two halves so that
    /// no edge starts where it ends.
    pub fn from_spec(spec: &CurveSpec) -> Vec<Curve> {
        match spec {
            CurveSpec::Line { start, end } => vec![Curve::Line {
                start: Point2::from(*start),
                end: Point2::from(*end),
            }],
            CurveSpec::Arc {
                center,
                long_axis,
                short_axis,
                start_angle,
                span,
            } => {
                let arc = Arc::new(
                    Point2::from(*center),
                    Vector2::from(*long_axis),
                    Vector2::from(*short_axis),
                    *start_angle,
                    *span,
                );
                if arc.span >= TAU - 1e-9 {
                    let half = TAU / 2.0;
                    vec![
                        Curve::Arc(Arc { span: half, ..arc }),
                        Curve::Arc(Arc::new(
                            arc.center,
                            arc.long_axis,
                            arc.short_axis,
                            arc.start + half,
                            half,
                        )),
                    ]
                } else {
                    vec![Curve::Arc(arc)]
                }
            }
        }
    }

    pub fn point(&self, t: f64) -> Point2<f64> {
        match self {
            Curve::Line { start, end } => start + (end - start) * t,
            Curve::Arc(arc) => arc.point(t),
        }
    }

    /// Endpoint 0 (start) or 1 (end).
    pub fn endpoint(&self, k: usize) -> Point2<f64> {
        match self {
            Curve::Line { start, end } => {
                if k == 0 {
                    *start
                } else {
                    *end
                }
            }
            Curve::Arc(arc) => arc.point(if k == 0 { 0.0 } else { 1.0 }),
        }
    }

    /// Direction of travel at endpoint `k`.
    pub fn tangent(&self, k: usize) -> Vector2<f64> {
        match self {
            Curve::Line { start, end } => end - start,
            Curve::Arc(arc) => {
                let t = if k == 0 { 0.0 } else { 1.0 };
                let h = 1e-6;
                (arc.point(t + h) - arc.point(t - h)) / (2.0 * h)
            }
        }
    }

    pub fn bounds(&self) -> Rect2 {
        match self {
            Curve::Line { start, end } => Rect2::from_points(&[*start, *end]),
            Curve::Arc(arc) => arc.bounds(),
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self, Curve::Line { .. })
    }

    pub fn as_arc(&self) -> Option<&Arc> {
        match self {
            Curve::Arc(arc) => Some(arc),
            Curve::Line { .. } => None,
        }
    }

    pub fn is_degenerate(&self, eps: f64) -> bool {
        (self.endpoint(0) - self.endpoint(1)).norm() < eps
    }

    /// Same line segment irrespective of direction, or same arc with the
    /// same center and endpoint pair.
    pub fn is_coincident(&self, other: &Curve, eps: f64) -> bool {
        let near = |a: Point2<f64>, b: Point2<f64>| (a - b).norm() < eps;
        let same_ends = (near(self.endpoint(0), other.endpoint(0))
            && near(self.endpoint(1), other.endpoint(1)))
            || (near(self.endpoint(0), other.endpoint(1))
                && near(self.endpoint(1), other.endpoint(0)));
        match (self, other) {
            (Curve::Line { .. }, Curve::Line { .. }) => same_ends,
            (Curve::Arc(a), Curve::Arc(b)) => near(a.center, b.center) && same_ends,
            _ => false,
        }
    }

    /// Parameter of `p` projected onto a line, `None` for arcs.
    pub fn line_parameter(&self, p: &Point2<f64>) -> Option<f64> {
        match self {
            Curve::Line { start, end } => {
                let d = end - start;
                let len2 = d.norm_squared();
                (len2 > 0.0).then(|| (p - start).dot(&d) / len2)
            }
            Curve::Arc(_) => None,
        }
    }
}

/// One edge of the drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub curve: Curve,
    pub role: EdgeRole,
    pub hatch: Option<HatchId>,
    /// Edges touching endpoint 0 and endpoint 1.
    pub extensions: [Vec<EdgeId>; 2],
    pub vertices: [Option<VertexId>; 2],
    pub view: Option<ViewId>,
    pub loops: Vec<LoopId>,
}

impl Edge {
    pub fn new(curve: Curve, role: EdgeRole) -> Self {
        Self {
            curve,
            role,
            hatch: None,
            extensions: [Vec::new(), Vec::new()],
            vertices: [None, None],
            view: None,
            loops: Vec::new(),
        }
    }

    pub fn endpoint(&self, k: usize) -> Point2<f64> {
        self.curve.endpoint(k)
    }

    pub fn bounds(&self) -> Rect2 {
        self.curve.bounds()
    }

    pub fn is_line(&self) -> bool {
        self.curve.is_line()
    }

    /// Which end (0 or 1) sits at `vertex`.
    pub fn vertex_index(&self, vertex: VertexId) -> Option<usize> {
        self.vertices.iter().position(|v| *v == Some(vertex))
    }

    pub fn other_vertex(&self, vertex: VertexId) -> Option<VertexId> {
        self.vertex_index(vertex).and_then(|k| self.vertices[1 - k])
    }

    pub fn has_vertex(&self, vertex: VertexId) -> bool {
        self.vertex_index(vertex).is_some()
    }

    /// Shared vertex of two edges, preferring this edge's end 1.
    pub fn common_vertex(&self, other: &Edge) -> Option<VertexId> {
        [1, 0]
            .into_iter()
            .filter_map(|k| self.vertices[k])
            .find(|v| other.has_vertex(*v))
    }

    /// Chord from endpoint `k` to the opposite endpoint.
    pub fn chord_from(&self, k: usize) -> Vector2<f64> {
        self.endpoint(1 - k) - self.endpoint(k)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub position: Point2<f64>,
    pub text: String,
    pub size: f64,
    pub view: Option<ViewId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hatch {
    pub pattern: String,
    /// Boundary curves not matched to any drawing edge.
    pub boundary: Vec<Curve>,
    /// Drawing edges bound to this hatch.
    pub edges: Vec<EdgeId>,
    pub view: Option<ViewId>,
}

/// Arena owner of every edge, label and hatch of the input.
#[derive(Debug, Clone, Default)]
pub struct Drawing {
    pub edges: SlotMap<EdgeId, Edge>,
    pub labels: SlotMap<LabelId, Label>,
    pub hatches: SlotMap<HatchId, Hatch>,
}

impl Drawing {
    pub fn from_spec(spec: &DrawingSpec) -> Self {
        let mut drawing = Drawing::default();
        for edge in &spec.edges {
            for curve in Curve::from_spec(&edge.curve) {
                drawing.edges.insert(Edge::new(curve, edge.role));
            }
        }
        for label in &spec.labels {
            drawing.labels.insert(Label {
                position: Point2::from(label.position),
                text: label.text.clone(),
                size: label.size,
                view: None,
            });
        }
        for hatch in &spec.hatches {
            drawing.hatches.insert(Hatch {
                pattern: hatch.pattern.clone(),
                boundary: hatch.boundary.iter().flat_map(Curve::from_spec).collect(),
                edges: Vec::new(),
                view: None,
            });
        }
        drawing
    }

    /// Edge handles in encounter order.
    pub fn edge_ids(&self) -> Vec<EdgeId> {
        self.edges.keys().collect()
    }

    pub fn hatch_bounds(&self, hatch: HatchId) -> Rect2 {
        let mut r = Rect2::empty();
        if let Some(h) = self.hatches.get(hatch) {
            for curve in &h.boundary {
                r.extend(&curve.bounds());
            }
            for e in &h.edges {
                if let Some(edge) = self.edges.get(*e) {
                    r.extend(&edge.bounds());
                }
            }
        }
        r
    }

    pub fn bounds(&self) -> Rect2 {
        let mut r = Rect2::empty();
        for edge in self.edges.values() {
            r.extend(&edge.bounds());
        }
        r
    }
}
