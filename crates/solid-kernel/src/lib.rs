//! Polyhedral solid modelling used by the reconstruction pipeline.
//!
//! Solids are plain [`Polyhedron`] values: a vertex list plus faces given as
//! ordered index lists, outward oriented. Boolean evaluation goes through the
//! [`SolidKernel`] trait so callers can swap the BSP implementation for the
//! fault-injecting [`MockKernel`] in tests.

pub mod bsp;
pub mod bsp_kernel;
pub mod mock_kernel;
pub mod primitives;
pub mod traits;
pub mod triangulate;
pub mod types;

pub use bsp_kernel::BspKernel;
pub use mock_kernel::{KernelCall, MockKernel};
pub use traits::*;
pub use types::*;
