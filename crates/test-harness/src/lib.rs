//! Test harness for orthographic reconstruction.
//!
//! Provides drawing builders, verification oracles over result solids and
//! text reports of a reconstruction, so scenario tests read as a sequence of
//! sheet edits followed by checks with useful failure output.
//!
//! # Key Components
//!
//! - [`DrawingBuilder`]: Fluent API for laying out classified drawings
//! - [`oracle`]: Verification functions returning pass/fail verdicts
//! - [`report`]: Structured text description of a reconstruction
//! - [`assertions`]: Assertion helpers with diagnostics

pub mod assertions;
pub mod helpers;
pub mod oracle;
pub mod report;

pub use helpers::{DrawingBuilder, HarnessError};
pub use oracle::OracleVerdict;
pub use report::ReconstructionReport;
