use serde::{Deserialize, Serialize};

use crate::roles::EdgeRole;

/// Geometry of one drawing curve in sheet coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CurveSpec {
    Line {
        start: [f64; 2],
        end: [f64; 2],
    },
    /// Elliptic arc `center + long·cos(t) + short·sin(t)` for
    /// `t` in `start_angle..start_angle + span`.
    Arc {
        center: [f64; 2],
        long_axis: [f64; 2],
        short_axis: [f64; 2],
        start_angle: f64,
        span: f64,
    },
}

impl CurveSpec {
    pub fn line(start: [f64; 2], end: [f64; 2]) -> Self {
        CurveSpec::Line { start, end }
    }

    /// A counter-clockwise circular arc.
    pub fn circular_arc(center: [f64; 2], radius: f64, start_angle: f64, span: f64) -> Self {
        CurveSpec::Arc {
            center,
            long_axis: [radius, 0.0],
            short_axis: [0.0, radius],
            start_angle,
            span,
        }
    }
}

/// A classified drawing edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub curve: CurveSpec,
    pub role: EdgeRole,
}

/// A text annotation placed on the sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub position: [f64; 2],
    pub text: String,
    #[serde(default)]
    pub size: f64,
}

/// A hatched region, described by its boundary curves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HatchSpec {
    #[serde(default)]
    pub pattern: String,
    pub boundary: Vec<CurveSpec>,
}

/// The classified 2D drawing consumed by the reconstruction pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawingSpec {
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
    #[serde(default)]
    pub labels: Vec<LabelSpec>,
    #[serde(default)]
    pub hatches: Vec<HatchSpec>,
}

impl DrawingSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_edge(&mut self, curve: CurveSpec, role: EdgeRole) -> &mut Self {
        self.edges.push(EdgeSpec { curve, role });
        self
    }

    pub fn push_label(&mut self, position: [f64; 2], text: impl Into<String>) -> &mut Self {
        self.labels.push(LabelSpec {
            position,
            text: text.into(),
            size: 0.0,
        });
        self
    }

    pub fn push_hatch(&mut self, boundary: Vec<CurveSpec>) -> &mut Self {
        self.hatches.push(HatchSpec {
            pattern: String::new(),
            boundary,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_spec_is_tagged() {
        let json = serde_json::to_string(&CurveSpec::line([0.0, 0.0], [1.0, 0.0])).unwrap();
        assert!(json.contains("\"type\":\"Line\""));
    }

    #[test]
    fn drawing_spec_fields_default() {
        let spec: DrawingSpec = serde_json::from_str("{}").unwrap();
        assert!(spec.edges.is_empty());
        assert!(spec.hatches.is_empty());
    }

    #[test]
    fn builder_pushes_records() {
        let mut spec = DrawingSpec::new();
        spec.push_edge(CurveSpec::line([0.0, 0.0], [1.0, 0.0]), EdgeRole::Normal)
            .push_label([0.5, 0.5], "A-A");
        assert_eq!(spec.edges.len(), 1);
        assert_eq!(spec.labels[0].text, "A-A");
    }
}
