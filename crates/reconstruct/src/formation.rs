//! Loop formations: groups of loops projecting one 3D feature.

use nalgebra::{Point3, Vector3};
use ortho_types::FormationKind;

use crate::loops::LoopId;
use crate::view::ViewId;

/// Handle of a loop within the view box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopRef {
    pub view: ViewId,
    pub id: LoopId,
}

/// Frustum between two elliptic ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeGeometry {
    pub base: Point3<f64>,
    pub height: Vector3<f64>,
    pub base_x: Vector3<f64>,
    pub base_y: Vector3<f64>,
    pub top_x: Vector3<f64>,
    pub top_y: Vector3<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormationClass {
    /// Realized by intersecting the loop extrusions.
    Normal,
    Sphere { center: Point3<f64>, radius: f64 },
    Cone(ConeGeometry),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopFormation {
    pub loops: Vec<LoopRef>,
    pub kind: FormationKind,
    pub class: FormationClass,
}

impl LoopFormation {
    pub fn new(loops: Vec<LoopRef>, class: FormationClass) -> Self {
        Self {
            loops,
            kind: FormationKind::Protrusion,
            class,
        }
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    pub fn contains(&self, r: LoopRef) -> bool {
        self.loops.contains(&r)
    }
}
