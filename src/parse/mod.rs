//! Parsing layer
//!
//! Pure functions over raw text: splitting a line into fields, classifying
//! spine manipulators and planning their effect on a line, and reading recip
//! durations. Nothing here touches the token graph.

pub mod manipulators;
pub mod recip;
pub mod splitter;

// Re-export commonly used types
pub use manipulators::{plan_line, LinePlan, Manipulator, PlanIssue, Step};
pub use recip::{recip_to_duration, HumNum, RecipError};
pub use splitter::{classify_line, split_line, SplitLine, FIELD_SEPARATOR};
