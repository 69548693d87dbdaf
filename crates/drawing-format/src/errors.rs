/// Errors while loading a drawing document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("malformed drawing document: {0}")]
    ParseError(String),

    #[error("not an ortho-drawing document (format tag {0:?})")]
    UnknownFormat(String),

    #[error("document version {file_version} is newer than this reader ({supported_version})")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },

    #[error("cannot migrate document v{from} to v{to}: {reason}")]
    MigrationFailed { from: u32, to: u32, reason: String },
}

/// Errors while writing documents or exporting solids.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("serialization failed: {0}")]
    Serialize(String),

    #[error("face {face} references vertex {index} of {len}")]
    InvalidFace { face: usize, index: usize, len: usize },

    #[error("no solid available for export")]
    NoSolid,
}
