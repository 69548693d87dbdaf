use serde::{Deserialize, Serialize};

/// Whether a view is a plain projection or a section through the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViewKind {
    #[default]
    Regular,
    /// The view carries at least one hatch.
    Sectional,
}

/// One of the six axis-aligned orientations a folded view can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProjectionPlane {
    Front,
    Rear,
    Left,
    Right,
    Top,
    Bottom,
}

impl ProjectionPlane {
    pub const ALL: [ProjectionPlane; 6] = [
        ProjectionPlane::Front,
        ProjectionPlane::Rear,
        ProjectionPlane::Left,
        ProjectionPlane::Right,
        ProjectionPlane::Top,
        ProjectionPlane::Bottom,
    ];

    /// Index (0 = x, 1 = y, 2 = z) of the world axis this plane looks along.
    pub fn perpendicular_axis(self) -> usize {
        match self {
            ProjectionPlane::Left | ProjectionPlane::Right => 0,
            ProjectionPlane::Front | ProjectionPlane::Rear => 1,
            ProjectionPlane::Top | ProjectionPlane::Bottom => 2,
        }
    }

    /// Classify a transformed view normal. Returns `None` when no component
    /// exceeds `threshold` in magnitude.
    pub fn from_normal(normal: [f64; 3], threshold: f64) -> Option<Self> {
        let [x, y, z] = normal;
        if x < -threshold {
            Some(ProjectionPlane::Left)
        } else if x > threshold {
            Some(ProjectionPlane::Right)
        } else if y < -threshold {
            Some(ProjectionPlane::Rear)
        } else if y > threshold {
            Some(ProjectionPlane::Front)
        } else if z < -threshold {
            Some(ProjectionPlane::Bottom)
        } else if z > threshold {
            Some(ProjectionPlane::Top)
        } else {
            None
        }
    }
}

/// Kind of evidence a view relation is based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// Equal extents along the same drawing axis.
    Parallel,
    /// Equal extents along swapped drawing axes.
    Perpendicular,
    /// A section view named after a cutting-plane trace.
    Name,
    /// An arc center lying on a centerline of the other view.
    Center,
}

/// Drawing axis along which two views are aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationAxis {
    X,
    Y,
}

impl RelationAxis {
    pub fn perpendicular(self) -> Self {
        match self {
            RelationAxis::X => RelationAxis::Y,
            RelationAxis::Y => RelationAxis::X,
        }
    }

    /// X when the direction runs more horizontally than vertically.
    pub fn of_direction(dx: f64, dy: f64) -> Self {
        if dx.abs() > dy.abs() {
            RelationAxis::X
        } else {
            RelationAxis::Y
        }
    }
}
