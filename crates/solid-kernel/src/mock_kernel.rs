//! MockKernel: a scripted test double around [`BspKernel`].
//!
//! Records every boolean call and can be told to fail a number of upcoming
//! boolean calls with a degenerate-geometry error, which lets tests drive the
//! retry path of formation extrusion deterministically.

use nalgebra::Point3;

use crate::bsp_kernel::BspKernel;
use crate::traits::SolidKernel;
use crate::types::{BooleanOp, KernelError, Polyhedron};

/// One recorded boolean call.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelCall {
    pub op: BooleanOp,
    pub a_faces: usize,
    pub b_faces: usize,
    pub failed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MockKernel {
    inner: BspKernel,
    pending_failures: usize,
    fail_forever: bool,
    pub calls: Vec<KernelCall>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` boolean calls.
    pub fn failing(count: usize) -> Self {
        Self {
            pending_failures: count,
            ..Self::default()
        }
    }

    /// Fail every boolean call.
    pub fn always_failing() -> Self {
        Self {
            fail_forever: true,
            ..Self::default()
        }
    }

    pub fn calls_of(&self, op: BooleanOp) -> usize {
        self.calls.iter().filter(|c| c.op == op).count()
    }

    pub fn failures(&self) -> usize {
        self.calls.iter().filter(|c| c.failed).count()
    }

    fn record(
        &mut self,
        op: BooleanOp,
        a: &Polyhedron,
        b: &Polyhedron,
    ) -> Result<(), KernelError> {
        let fail = self.fail_forever || self.pending_failures > 0;
        if self.pending_failures > 0 {
            self.pending_failures -= 1;
        }
        self.calls.push(KernelCall {
            op,
            a_faces: a.faces.len(),
            b_faces: b.faces.len(),
            failed: fail,
        });
        if fail {
            Err(KernelError::Degenerate {
                reason: format!("injected failure in {:?}", op),
            })
        } else {
            Ok(())
        }
    }
}

impl SolidKernel for MockKernel {
    fn intersect(&mut self, a: &Polyhedron, b: &Polyhedron) -> Result<Polyhedron, KernelError> {
        self.record(BooleanOp::Intersect, a, b)?;
        self.inner.intersect(a, b)
    }

    fn union(&mut self, a: &Polyhedron, b: &Polyhedron) -> Result<Polyhedron, KernelError> {
        self.record(BooleanOp::Union, a, b)?;
        self.inner.union(a, b)
    }

    fn subtract(&mut self, a: &Polyhedron, b: &Polyhedron) -> Result<Polyhedron, KernelError> {
        self.record(BooleanOp::Subtract, a, b)?;
        self.inner.subtract(a, b)
    }

    fn canonicalize(&mut self, solid: &Polyhedron) -> Result<Polyhedron, KernelError> {
        self.inner.canonicalize(solid)
    }

    fn build_from_faces(
        &mut self,
        vertices: Vec<Point3<f64>>,
        faces: Vec<Vec<usize>>,
    ) -> Result<Polyhedron, KernelError> {
        self.inner.build_from_faces(vertices, faces)
    }
}
