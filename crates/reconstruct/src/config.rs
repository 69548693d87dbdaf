//! Tunable constants of the reconstruction pipeline.

use serde::{Deserialize, Serialize};

/// Tolerances for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Points closer than this are coincident; also the extent-matching tolerance.
    pub coincidence: f64,
    /// Used when comparing folded 3D coordinates against box extents.
    pub fold: f64,
    /// Normalized tangents whose cross product is below this are collinear.
    pub angular: f64,
    /// Minimum component of a folded view normal that selects its plane.
    pub plane: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-6,
            fold: 1e-5,
            angular: 1e-4,
            plane: 0.1,
        }
    }
}

impl Tolerance {
    pub fn is_zero(&self, value: f64) -> bool {
        value.abs() < self.coincidence
    }

    pub fn same(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.coincidence
    }
}

/// Beliefs attached to proposed view relations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceConfig {
    /// Belief of Parallel, Perpendicular and Center relations.
    pub geometric_belief: f64,
    /// Belief of Name relations (section view named after a cutting plane).
    pub name_belief: f64,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            geometric_belief: 0.3,
            name_belief: 0.8,
        }
    }
}

/// Pruning thresholds of the loop formation constructor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    /// Formations with fewer loops are dropped.
    pub min_loops: usize,
    /// Without a disjoint loop, formations need this many loops...
    pub sparse_min_loops: usize,
    /// ...once the drawing has more views than this.
    pub sparse_view_threshold: usize,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            min_loops: 2,
            sparse_min_loops: 3,
            sparse_view_threshold: 2,
        }
    }
}

/// Tessellation density and boolean retry budget of the extruders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrusionConfig {
    /// Segments each arc edge is sampled into.
    pub arc_segments: usize,
    pub sphere_stacks: usize,
    pub sphere_slices: usize,
    pub cone_slices: usize,
    /// Intersection attempts per formation before it yields no solid.
    pub max_attempts: usize,
    /// Seed of the retry shuffle. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ExtrusionConfig {
    fn default() -> Self {
        Self {
            arc_segments: 10,
            sphere_stacks: 16,
            sphere_slices: 32,
            cone_slices: 32,
            max_attempts: 64,
            seed: Some(0),
        }
    }
}

/// Complete configuration of a reconstruction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructionConfig {
    pub tolerance: Tolerance,
    pub evidence: EvidenceConfig,
    pub formation: FormationConfig,
    pub extrusion: ExtrusionConfig,
}

impl ReconstructionConfig {
    /// Coarse arcs and a single boolean attempt, for fast tests.
    pub fn fast() -> Self {
        Self {
            extrusion: ExtrusionConfig {
                arc_segments: 4,
                sphere_stacks: 6,
                sphere_slices: 8,
                cone_slices: 8,
                max_attempts: 1,
                seed: Some(0),
            },
            ..Self::default()
        }
    }

    /// Production settings: default densities, nondeterministic retry shuffle.
    pub fn production() -> Self {
        Self {
            extrusion: ExtrusionConfig {
                seed: None,
                ..ExtrusionConfig::default()
            },
            ..Self::default()
        }
    }

    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
