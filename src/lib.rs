//! Humdrum structure
//!
//! Parses Humdrum text into a graph of tokens and analyzes its structure:
//! spine links through splits and merges, track and subtrack numbering,
//! strands, and rhythmic timing in quarter notes.
//!
//! ```text
//! let file = HumdrumFile::parse("**kern\n4c\n4d\n*-");
//! assert!(file.is_valid());
//! assert_eq!(file.total_duration(), HumNum::from_integer(2));
//! ```
//!
//! Malformed input never fails to parse. Problems are recorded as
//! [`Diagnostic`]s on the file, and any error-level diagnostic clears
//! [`HumdrumFile::is_valid`].

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod models;
pub mod parse;
pub mod structure;

// Re-export commonly used types
pub use config::{AnalysisConfig, TieBreak};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics, IssueKind};
pub use error::{HumdrumError, Result};
pub use models::*;
pub use parse::{HumNum, Manipulator};
pub use structure::Timeline;
