use ortho_types::DrawingSpec;
use serde::Serialize;

use crate::errors::ExportError;
use crate::metadata::DrawingMetadata;

/// Format identifier written into every document.
pub const FORMAT_NAME: &str = "ortho-drawing";

/// Current document version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
struct DrawingFile<'a> {
    format: &'a str,
    version: u32,
    metadata: &'a DrawingMetadata,
    drawing: &'a DrawingSpec,
}

/// Serialize a classified drawing to pretty-printed JSON.
pub fn save_drawing(drawing: &DrawingSpec, metadata: &DrawingMetadata) -> Result<String, ExportError> {
    let file = DrawingFile {
        format: FORMAT_NAME,
        version: FORMAT_VERSION,
        metadata,
        drawing,
    };
    serde_json::to_string_pretty(&file).map_err(|e| ExportError::Serialize(e.to_string()))
}
