//! Helper functions: error type, drawing builders, standard view layouts.

use std::f64::consts::TAU;

use drawing_format::{load_drawing, save_drawing, DrawingMetadata};
use ortho_types::{CurveSpec, DrawingSpec, EdgeRole};
use reconstruct::{reconstruct, ReconstructError, Reconstruction, ReconstructionConfig};
use solid_kernel::SolidKernel;

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("reconstruction failed: {0}")]
    Reconstruct(#[from] ReconstructError),

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("document error: {0}")]
    Document(String),
}

/// Gap left between neighbouring views by the layout helpers.
pub const VIEW_GAP: f64 = 10.0;

// ── Drawing Builder ─────────────────────────────────────────────────────────

/// Fluent builder for classified drawings.
#[derive(Debug, Clone, Default)]
pub struct DrawingBuilder {
    spec: DrawingSpec,
}

impl DrawingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, a: [f64; 2], b: [f64; 2], role: EdgeRole) -> &mut Self {
        self.spec.push_edge(CurveSpec::line(a, b), role);
        self
    }

    /// Dashed (hidden) line.
    pub fn hidden(&mut self, a: [f64; 2], b: [f64; 2]) -> &mut Self {
        self.line(a, b, EdgeRole::Phantom)
    }

    /// Closed outline of Normal lines through `points`.
    pub fn polygon(&mut self, points: &[[f64; 2]]) -> &mut Self {
        for (i, p) in points.iter().enumerate() {
            let q = points[(i + 1) % points.len()];
            self.line(*p, q, EdgeRole::Normal);
        }
        self
    }

    pub fn rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> &mut Self {
        self.polygon(&[[x0, y0], [x1, y0], [x1, y1], [x0, y1]])
    }

    /// Full circle of Normal role.
    pub fn circle(&mut self, center: [f64; 2], radius: f64) -> &mut Self {
        self.spec
            .push_edge(CurveSpec::circular_arc(center, radius, 0.0, TAU), EdgeRole::Normal);
        self
    }

    /// Horizontal and vertical center lines crossing at `center`.
    pub fn crosshair(&mut self, center: [f64; 2], half: f64) -> &mut Self {
        let [x, y] = center;
        self.line([x - half, y], [x + half, y], EdgeRole::Center)
            .line([x, y - half], [x, y + half], EdgeRole::Center)
    }

    pub fn label(&mut self, position: [f64; 2], text: &str) -> &mut Self {
        self.spec.push_label(position, text);
        self
    }

    /// Hatch whose boundary is the given rectangle.
    pub fn hatch_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) -> &mut Self {
        let c = [[x0, y0], [x1, y0], [x1, y1], [x0, y1]];
        let boundary = (0..4).map(|i| CurveSpec::line(c[i], c[(i + 1) % 4])).collect();
        self.spec.push_hatch(boundary);
        self
    }

    pub fn spec(&self) -> &DrawingSpec {
        &self.spec
    }

    pub fn build(&self) -> DrawingSpec {
        self.spec.clone()
    }

    /// Reconstruct the current drawing with default settings.
    pub fn reconstruct(&self, kernel: &mut dyn SolidKernel) -> Result<Reconstruction, HarnessError> {
        Ok(reconstruct(&self.spec, &ReconstructionConfig::default(), kernel)?)
    }
}

// ── Standard Layouts ────────────────────────────────────────────────────────

/// Front view of a `w × h` face with its lower left corner at the origin,
/// and the `w × d` top view below it.
pub fn front_and_top(w: f64, h: f64, d: f64) -> DrawingBuilder {
    let mut b = DrawingBuilder::new();
    b.rect(0.0, 0.0, w, h).rect(0.0, -VIEW_GAP - d, w, -VIEW_GAP);
    b
}

/// [`front_and_top`] plus the `d × h` side view to the right of the front.
pub fn three_views(w: f64, h: f64, d: f64) -> DrawingBuilder {
    let mut b = front_and_top(w, h, d);
    b.rect(w + VIEW_GAP, 0.0, w + VIEW_GAP + d, h);
    b
}

/// Save and reload a drawing through the document format.
pub fn through_document(spec: &DrawingSpec, name: &str) -> Result<DrawingSpec, HarnessError> {
    let json = save_drawing(spec, &DrawingMetadata::new(name)).map_err(|e| HarnessError::Document(e.to_string()))?;
    let (loaded, _) = load_drawing(&json).map_err(|e| HarnessError::Document(e.to_string()))?;
    Ok(loaded)
}
