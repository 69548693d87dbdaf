//! Structured text reports of a reconstruction.
//!
//! Reports are plain text, not JSON, because they are read in test failure
//! output next to the assertion that tripped.

use std::fmt;

use ortho_types::FormationKind;
use reconstruct::{FormationClass, Reconstruction};

use crate::oracle::{run_solid_checks, OracleVerdict};

/// A complete reconstruction report with all sections.
pub struct ReconstructionReport {
    pub view_entries: Vec<ViewEntry>,
    pub formation_entries: Vec<FormationEntry>,
    pub solid: Option<SolidSummary>,
    pub oracle_results: Vec<OracleVerdict>,
    pub warnings: Vec<String>,
}

/// One folded view.
pub struct ViewEntry {
    pub index: usize,
    pub plane: String,
    pub sectional: bool,
    pub name: Option<String>,
    pub bounds: ([f64; 2], [f64; 2]),
    pub loop_count: usize,
    pub adjacent: Vec<usize>,
}

/// One loop formation.
pub struct FormationEntry {
    pub index: usize,
    pub kind: FormationKind,
    pub class: String,
    pub loops: Vec<usize>,
}

/// Size and extent of the result solid.
pub struct SolidSummary {
    pub vertex_count: usize,
    pub face_count: usize,
    pub volume: f64,
    pub bounding_box: Option<([f64; 3], [f64; 3])>,
}

impl ReconstructionReport {
    pub fn new(r: &Reconstruction) -> Self {
        let view_entries = r
            .view_box
            .views
            .iter()
            .map(|v| ViewEntry {
                index: v.id.0,
                plane: v.plane.map_or("unfolded".to_string(), |p| format!("{p:?}")),
                sectional: v.is_sectional(),
                name: v.name.clone(),
                bounds: ([v.bounds.min.x, v.bounds.min.y], [v.bounds.max.x, v.bounds.max.y]),
                loop_count: v.loops.len(),
                adjacent: v.adjacent.iter().map(|a| a.0).collect(),
            })
            .collect();

        let formation_entries = r
            .view_box
            .formations
            .iter()
            .enumerate()
            .map(|(index, f)| FormationEntry {
                index,
                kind: f.kind,
                class: match f.class {
                    FormationClass::Normal => "Normal".to_string(),
                    FormationClass::Sphere { radius, .. } => format!("Sphere r={radius:.3}"),
                    FormationClass::Cone(_) => "Cone".to_string(),
                },
                loops: f.loops.iter().map(|l| l.view.0).collect(),
            })
            .collect();

        let solid = (!r.solid.is_empty()).then(|| SolidSummary {
            vertex_count: r.solid.vertices.len(),
            face_count: r.solid.faces.len(),
            volume: r.solid.volume(),
            bounding_box: r.solid.bounds().map(|(lo, hi)| ([lo.x, lo.y, lo.z], [hi.x, hi.y, hi.z])),
        });

        Self {
            view_entries,
            formation_entries,
            solid,
            oracle_results: run_solid_checks(&r.solid),
            warnings: r.warnings.clone(),
        }
    }

    /// Format the report as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Orthographic Reconstruction Report ===\n\n");

        out.push_str(&format!("Views ({}):\n", self.view_entries.len()));
        for v in &self.view_entries {
            let sec = if v.sectional { " [SECTION]" } else { "" };
            let name = v.name.as_deref().map(|n| format!(" \"{n}\"")).unwrap_or_default();
            out.push_str(&format!("  [{}] {}{}{}\n", v.index, v.plane, name, sec));
            let (min, max) = v.bounds;
            out.push_str(&format!(
                "      Box: ({:.1}, {:.1}) -> ({:.1}, {:.1}) | loops={} | adjacent={:?}\n",
                min[0], min[1], max[0], max[1], v.loop_count, v.adjacent,
            ));
        }

        let depressions = self
            .formation_entries
            .iter()
            .filter(|f| f.kind == FormationKind::Depression)
            .count();
        out.push_str(&format!(
            "\nFormations ({}, {} protrusions, {} depressions):\n",
            self.formation_entries.len(),
            self.formation_entries.len() - depressions,
            depressions,
        ));
        for f in &self.formation_entries {
            out.push_str(&format!(
                "  [{}] {:?} {} | views {:?}\n",
                f.index, f.kind, f.class, f.loops
            ));
        }

        match &self.solid {
            Some(s) => {
                out.push_str(&format!(
                    "\nSolid: V={} F={} | volume={:.3}\n",
                    s.vertex_count, s.face_count, s.volume
                ));
                if let Some((min, max)) = s.bounding_box {
                    out.push_str(&format!(
                        "Bounding Box: ({:.1}, {:.1}, {:.1}) -> ({:.1}, {:.1}, {:.1})\n",
                        min[0], min[1], min[2], max[0], max[1], max[2],
                    ));
                }
            }
            None => out.push_str("\nSolid: none\n"),
        }

        if !self.oracle_results.is_empty() {
            out.push_str(&format!("\nOracle Results ({} checks):\n", self.oracle_results.len()));
            for v in &self.oracle_results {
                let status = if v.passed { "PASS" } else { "FAIL" };
                out.push_str(&format!("  [{}] {}: {}\n", status, v.oracle_name, v.detail));
            }
        }

        if self.warnings.is_empty() {
            out.push_str("\nWarnings: none\n");
        } else {
            out.push_str(&format!("\nWarnings ({}):\n", self.warnings.len()));
            for w in &self.warnings {
                out.push_str(&format!("  {w}\n"));
            }
        }
        out
    }

    pub fn all_passed(&self) -> bool {
        self.oracle_results.iter().all(|v| v.passed)
    }
}

impl fmt::Display for ReconstructionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}
