//! Analysis configuration
//!
//! Controls which spine data types carry rhythm and how the duration analyzer
//! settles disagreements between spines. Defaults match common `**kern`
//! practice, so most callers never build one by hand.

use serde::{Deserialize, Serialize};

use crate::error::{HumdrumError, Result};

/// Which value wins when active spines disagree on the start time of a line
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Adopt the start time implied by the leftmost spine with a new event
    #[default]
    LowestColumn,
    /// Keep the shared timeline value (the minimum pending note end)
    Timeline,
}

/// Settings for one analysis pass
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Exclusive interpretations whose data tokens carry recip durations
    pub rhythmic_types: Vec<String>,

    /// Policy applied on rhythm inconsistencies
    pub tie_break: TieBreak,
}

impl AnalysisConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a configuration from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| HumdrumError::Config(e.to_string()))
    }

    /// Builder-style override of the tie-break policy
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Check whether a data type (e.g. `**kern`) is parsed for durations
    pub fn is_rhythmic(&self, data_type: &str) -> bool {
        self.rhythmic_types.iter().any(|t| t == data_type)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rhythmic_types: vec!["**kern".to_string(), "**recip".to_string()],
            tie_break: TieBreak::LowestColumn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rhythmic_types() {
        let config = AnalysisConfig::default();
        assert!(config.is_rhythmic("**kern"));
        assert!(config.is_rhythmic("**recip"));
        assert!(!config.is_rhythmic("**text"));
        assert_eq!(config.tie_break, TieBreak::LowestColumn);
    }

    #[test]
    fn test_from_json_partial() {
        let config = AnalysisConfig::from_json(r#"{"tie_break": "timeline"}"#).unwrap();
        assert_eq!(config.tie_break, TieBreak::Timeline);
        assert!(config.is_rhythmic("**kern"));
    }

    #[test]
    fn test_from_json_custom_types() {
        let config = AnalysisConfig::from_json(r#"{"rhythmic_types": ["**mens"]}"#).unwrap();
        assert!(config.is_rhythmic("**mens"));
        assert!(!config.is_rhythmic("**kern"));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = AnalysisConfig::from_json(r#"{"tie_break": "coin_flip"}"#).unwrap_err();
        assert!(matches!(err, HumdrumError::Config(_)));
    }
}
