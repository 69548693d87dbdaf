pub mod drawing;
pub mod roles;
pub mod view;

pub use drawing::*;
pub use roles::*;
pub use view::*;
