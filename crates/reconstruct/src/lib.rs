//! Reconstruction of polyhedral solids from orthographic drawings.
//!
//! A classified 2D drawing is split into views, each view's edge graph is
//! traced into loops, views are related and folded into one 3D frame, loops
//! that project the same feature are grouped into formations, and the
//! formations are extruded and combined into the final solid through a
//! [`solid_kernel::SolidKernel`].
//!
//! [`reconstruct`] runs the whole pipeline; every stage is also public.

pub mod config;
pub mod drawing;
pub mod error;
pub mod evidence;
pub mod extrude;
pub mod fold;
pub mod formation;
pub mod formation_construct;
pub mod geometry;
pub mod loop_merge;
pub mod loop_trace;
pub mod loops;
pub mod object;
pub mod pipeline;
pub mod preprocess;
pub mod relation;
pub mod view;
pub mod view_box;
pub mod view_construct;

pub use config::{EvidenceConfig, ExtrusionConfig, FormationConfig, ReconstructionConfig, Tolerance};
pub use drawing::{Drawing, EdgeId, HatchId, LabelId};
pub use error::ReconstructError;
pub use evidence::EvidenceSet;
pub use extrude::{extrude_formation, extrude_loop, FormationSolid, LoopShuffle, SeededShuffle};
pub use fold::fold_planes;
pub use formation::{FormationClass, LoopFormation, LoopRef};
pub use formation_construct::construct_formations;
pub use loop_trace::construct_loops;
pub use loops::{Loop, LoopId, LoopVertex};
pub use object::construct_object;
pub use pipeline::{build_view_box, reconstruct, reconstruct_with, Reconstruction};
pub use preprocess::preprocess;
pub use relation::{construct_relations, filter_relations};
pub use view::{View, ViewId};
pub use view_box::ViewBox;
pub use view_construct::{classify_vertices, construct_views};
