use solid_kernel::KernelError;
use thiserror::Error;

use crate::view::ViewId;

/// Fatal failures of the reconstruction pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReconstructError {
    #[error("drawing has {count} views; at least two are needed")]
    TooFewViews { count: usize },

    #[error("view {view:?} has no closed outer boundary")]
    OpenOuterLoop { view: ViewId },

    #[error("view {view:?} has no normal edges")]
    EmptyView { view: ViewId },

    #[error("view {view:?} is not related to any other view")]
    Disconnected { view: ViewId },

    #[error("evidence sources are in total conflict")]
    TotalConflict,

    #[error("no regular view can serve as the folding root")]
    NoRootView,

    #[error("fold axis between {view:?} and {parent:?} is ambiguous (x={weight_x}, y={weight_y})")]
    AmbiguousFold {
        view: ViewId,
        parent: ViewId,
        weight_x: f64,
        weight_y: f64,
    },

    #[error("fold of {view:?} onto {parent:?} has no unique transform")]
    SingularFold { view: ViewId, parent: ViewId },

    #[error("folded normal of {view:?} is not axis aligned")]
    UnalignedView { view: ViewId },

    #[error("no formation produced a solid")]
    NoSolid,

    #[error("kernel: {0}")]
    Kernel(#[from] KernelError),
}
