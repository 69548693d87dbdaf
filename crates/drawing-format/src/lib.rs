pub mod errors;
pub mod load;
pub mod metadata;
pub mod migrate;
pub mod off_export;
pub mod save;

pub use errors::{ExportError, LoadError};
pub use load::load_drawing;
pub use metadata::DrawingMetadata;
pub use off_export::export_off;
pub use save::{save_drawing, FORMAT_NAME, FORMAT_VERSION};
