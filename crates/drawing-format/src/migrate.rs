use ortho_types::DrawingSpec;

use crate::errors::LoadError;

/// Apply format migrations from `from_version` to `to_version`, one version
/// step at a time. Version 1 is the first published version, so there are no
/// steps yet.
pub fn migrate(
    drawing: DrawingSpec,
    from_version: u32,
    to_version: u32,
) -> Result<DrawingSpec, LoadError> {
    if from_version != to_version {
        return Err(LoadError::MigrationFailed {
            from: from_version,
            to: to_version,
            reason: format!("no migration path from v{from_version} to v{to_version}"),
        });
    }
    Ok(drawing)
}
