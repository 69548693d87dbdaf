//! Dempster-Shafer mass functions over a finite frame of hypotheses.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::ReconstructError;

/// Mass function: focal sets of the frame mapped to their mass.
#[derive(Debug, Clone, PartialEq)]
pub struct EvidenceSet<T: Ord + Clone> {
    frame: BTreeSet<T>,
    masses: BTreeMap<BTreeSet<T>, f64>,
}

impl<T: Ord + Clone> EvidenceSet<T> {
    /// Total ignorance: all mass on the whole frame.
    pub fn vacuous(frame: BTreeSet<T>) -> Self {
        let mut masses = BTreeMap::new();
        masses.insert(frame.clone(), 1.0);
        Self { frame, masses }
    }

    /// A source that supports `focus` with `belief` and leaves the rest on the frame.
    pub fn simple_support(frame: BTreeSet<T>, focus: BTreeSet<T>, belief: f64) -> Self {
        let belief = belief.clamp(0.0, 1.0);
        if focus == frame || belief == 0.0 {
            return Self::vacuous(frame);
        }
        let mut masses = BTreeMap::new();
        masses.insert(focus, belief);
        if belief < 1.0 {
            masses.insert(frame.clone(), 1.0 - belief);
        }
        Self { frame, masses }
    }

    pub fn frame(&self) -> &BTreeSet<T> {
        &self.frame
    }

    /// Mass assigned to exactly `set`.
    pub fn mass(&self, set: &BTreeSet<T>) -> f64 {
        self.masses.get(set).copied().unwrap_or(0.0)
    }

    /// Sum of the masses of all focal sets inside `set`.
    pub fn belief(&self, set: &BTreeSet<T>) -> f64 {
        self.masses
            .iter()
            .filter(|(focal, _)| focal.is_subset(set))
            .map(|(_, m)| m)
            .sum()
    }

    /// Sum of the masses of all focal sets meeting `set`.
    pub fn plausibility(&self, set: &BTreeSet<T>) -> f64 {
        self.masses
            .iter()
            .filter(|(focal, _)| !focal.is_disjoint(set))
            .map(|(_, m)| m)
            .sum()
    }

    pub fn total_mass(&self) -> f64 {
        self.masses.values().sum()
    }

    pub fn focal_sets(&self) -> impl Iterator<Item = (&BTreeSet<T>, f64)> {
        self.masses.iter().map(|(s, m)| (s, *m))
    }

    /// Dempster's rule: products over intersections, renormalized by the
    /// non-conflicting mass.
    pub fn combine(&self, other: &Self) -> Result<Self, ReconstructError> {
        let mut masses: BTreeMap<BTreeSet<T>, f64> = BTreeMap::new();
        let mut conflict = 0.0;
        for (a, ma) in &self.masses {
            for (b, mb) in &other.masses {
                let product = ma * mb;
                let meet: BTreeSet<T> = a.intersection(b).cloned().collect();
                if meet.is_empty() {
                    conflict += product;
                } else {
                    *masses.entry(meet).or_insert(0.0) += product;
                }
            }
        }
        let norm = 1.0 - conflict;
        if norm <= 1e-12 {
            return Err(ReconstructError::TotalConflict);
        }
        for m in masses.values_mut() {
            *m /= norm;
        }
        let frame = self.frame.union(&other.frame).cloned().collect();
        Ok(Self { frame, masses })
    }
}
