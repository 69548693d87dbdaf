use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Errors from kernel operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("degenerate geometry: {reason}")]
    Degenerate { reason: String },

    #[error("face {face} is invalid: {reason}")]
    InvalidFace { face: usize, reason: String },

    #[error("face {face} references vertex {index} but only {len} vertices exist")]
    IndexOutOfRange { face: usize, index: usize, len: usize },
}

/// Which boolean a kernel call performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOp {
    Union,
    Subtract,
    Intersect,
}

/// A closed polyhedral solid: shared vertex positions and faces given as
/// ordered index lists, counter-clockwise when seen from outside.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyhedron {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<Vec<usize>>,
}

impl Polyhedron {
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<Vec<usize>>) -> Self {
        Self { vertices, faces }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn face_points(&self, face: usize) -> Vec<Point3<f64>> {
        self.faces[face].iter().map(|&i| self.vertices[i]).collect()
    }

    /// Area-weighted normal of a face (Newell's method). Its length is twice
    /// the face area.
    pub fn face_normal(&self, face: usize) -> Vector3<f64> {
        newell_normal(&self.face_points(face))
    }

    /// Signed volume by the divergence theorem over a triangle fan of each face.
    /// Positive for outward-oriented solids.
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;
        for face in &self.faces {
            if face.len() < 3 {
                continue;
            }
            let a = self.vertices[face[0]].coords;
            for k in 1..face.len() - 1 {
                let b = self.vertices[face[k]].coords;
                let c = self.vertices[face[k + 1]].coords;
                volume += a.dot(&b.cross(&c));
            }
        }
        volume / 6.0
    }

    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    pub fn surface_area(&self) -> f64 {
        (0..self.faces.len())
            .map(|f| self.face_normal(f).norm() * 0.5)
            .sum()
    }

    /// Axis-aligned bounds of the referenced vertices.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let mut used = self.faces.iter().flatten().map(|&i| self.vertices[i]);
        let first = used.next()?;
        let (mut min, mut max) = (first, first);
        for p in used {
            for k in 0..3 {
                min[k] = min[k].min(p[k]);
                max[k] = max[k].max(p[k]);
            }
        }
        Some((min, max))
    }

    /// The same solid with every face winding reversed.
    pub fn reversed(mut self) -> Self {
        for face in &mut self.faces {
            face.reverse();
        }
        self
    }

    /// Reverse all faces if the solid is inside out.
    pub fn oriented_outward(self) -> Self {
        if self.signed_volume() < 0.0 {
            self.reversed()
        } else {
            self
        }
    }

    /// Check index ranges, face sizes and coordinate finiteness.
    pub fn validate(&self) -> Result<(), KernelError> {
        if let Some(p) = self.vertices.iter().find(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(KernelError::Degenerate {
                reason: format!("non-finite vertex {:?}", p),
            });
        }
        for (f, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(KernelError::InvalidFace {
                    face: f,
                    reason: format!("{} vertices", face.len()),
                });
            }
            if let Some(&index) = face.iter().find(|&&i| i >= self.vertices.len()) {
                return Err(KernelError::IndexOutOfRange {
                    face: f,
                    index,
                    len: self.vertices.len(),
                });
            }
        }
        Ok(())
    }
}

pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut n = Vector3::zeros();
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n
}
