use nalgebra::Point3;

use crate::types::{KernelError, Polyhedron};

/// Boolean and construction capability the reconstruction pipeline relies on.
/// Implemented by BspKernel and by MockKernel (fault-injecting test double).
pub trait SolidKernel {
    /// Boolean intersection of two solids.
    fn intersect(&mut self, a: &Polyhedron, b: &Polyhedron) -> Result<Polyhedron, KernelError>;

    /// Boolean union of two solids.
    fn union(&mut self, a: &Polyhedron, b: &Polyhedron) -> Result<Polyhedron, KernelError>;

    /// Boolean subtraction: a minus b.
    fn subtract(&mut self, a: &Polyhedron, b: &Polyhedron) -> Result<Polyhedron, KernelError>;

    /// Weld coincident vertices, drop degenerate faces and unused vertices.
    fn canonicalize(&mut self, solid: &Polyhedron) -> Result<Polyhedron, KernelError>;

    /// Build a validated, outward-oriented solid from raw faces.
    fn build_from_faces(
        &mut self,
        vertices: Vec<Point3<f64>>,
        faces: Vec<Vec<usize>>,
    ) -> Result<Polyhedron, KernelError>;
}
