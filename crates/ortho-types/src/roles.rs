use serde::{Deserialize, Serialize};

/// Drawing purpose of an edge, assigned by the external edge classifier
/// from the line style and color of the source drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeRole {
    /// A visible boundary line.
    Normal,
    /// A centerline (dash-dot).
    Center,
    /// A hidden boundary line (dashed).
    Phantom,
    /// The trace of a section plane.
    Cutting,
}

impl EdgeRole {
    /// Normal and Phantom edges bound faces and take part in loop tracing.
    pub fn is_boundary(self) -> bool {
        matches!(self, EdgeRole::Normal | EdgeRole::Phantom)
    }

    /// Whether an edge of this role may extend an edge of `other` at a shared endpoint.
    pub fn extends(self, other: EdgeRole) -> bool {
        self == other || (self.is_boundary() && other.is_boundary())
    }
}

/// Classification of a view vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VertexKind {
    #[default]
    Normal,
    /// Only cutting-plane traces terminate here.
    Virtual,
}

/// Classification of a loop corner by the tangents of its two edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CornerKind {
    Normal,
    /// The incident tangents are collinear.
    Tangent,
}

/// Whether a loop formation adds material to the object or removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FormationKind {
    Protrusion,
    Depression,
}
