use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptive data stored alongside a drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingMetadata {
    pub name: String,
    /// Drawing units, e.g. "mm".
    #[serde(default = "default_units")]
    pub units: String,
    /// File or system the classified drawing came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

fn default_units() -> String {
    "mm".to_string()
}

impl DrawingMetadata {
    /// Metadata with the given name, millimetre units and the current time.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            units: default_units(),
            source: None,
            created: now,
            modified: now,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Bump the modification time.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}
