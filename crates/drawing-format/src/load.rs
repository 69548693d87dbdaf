use ortho_types::DrawingSpec;
use serde::Deserialize;

use crate::errors::LoadError;
use crate::metadata::DrawingMetadata;
use crate::save::{FORMAT_NAME, FORMAT_VERSION};

#[derive(Debug, Clone, Deserialize)]
struct DrawingFileRaw {
    format: String,
    version: u32,
    metadata: DrawingMetadata,
    drawing: DrawingSpec,
}

/// Deserialize a drawing document, checking its format and version and
/// migrating older versions forward.
pub fn load_drawing(json: &str) -> Result<(DrawingSpec, DrawingMetadata), LoadError> {
    let raw: DrawingFileRaw =
        serde_json::from_str(json).map_err(|e| LoadError::ParseError(e.to_string()))?;

    if raw.format != FORMAT_NAME {
        return Err(LoadError::UnknownFormat(raw.format));
    }
    if raw.version > FORMAT_VERSION {
        return Err(LoadError::FutureVersion {
            file_version: raw.version,
            supported_version: FORMAT_VERSION,
        });
    }
    let drawing = if raw.version < FORMAT_VERSION {
        crate::migrate::migrate(raw.drawing, raw.version, FORMAT_VERSION)?
    } else {
        raw.drawing
    };
    Ok((drawing, raw.metadata))
}
