//! Diagnostics collected during structural analysis
//!
//! Nothing found inside Humdrum data aborts an analysis pass. Structural
//! errors, rhythm inconsistencies and duration-parse failures are recorded
//! here instead, and the caller decides what to trust. Structural errors are
//! `Error` severity and clear the file's validity flag; the rest are warnings.

pub mod issues;

pub use issues::IssueKind;

use serde::{Deserialize, Serialize};

/// Severity level for a diagnostic
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// One issue found at a specific line (and optionally field) of the file
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Diagnostic {
    /// Line index in the file
    pub line: usize,
    /// Field index within the line, when the issue belongs to one token
    pub field: Option<usize>,
    /// Severity level
    pub severity: DiagnosticSeverity,
    /// What went wrong
    pub kind: IssueKind,
}

impl Diagnostic {
    /// Create a line-level diagnostic; severity follows from the issue kind
    pub fn new(line: usize, kind: IssueKind) -> Self {
        Self {
            line,
            field: None,
            severity: kind.severity(),
            kind,
        }
    }

    /// Attach a field index
    pub fn with_field(mut self, field: usize) -> Self {
        self.field = Some(field);
        self
    }

    /// Short machine-readable identifier (e.g. "unpaired_merge")
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn is_structural(&self) -> bool {
        self.kind.is_structural()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.field {
            Some(field) => write!(f, "line {}, field {}: {}", self.line + 1, field + 1, self.kind),
            None => write!(f, "line {}: {}", self.line + 1, self.kind),
        }
    }
}

/// Collection of diagnostics for an entire file
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Diagnostics {
    /// All diagnostics, in the order they were recorded
    pub marks: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create empty diagnostics
    pub fn new() -> Self {
        Self { marks: Vec::new() }
    }

    /// Add a diagnostic
    pub fn add(&mut self, mark: Diagnostic) {
        self.marks.push(mark);
    }

    /// Drop everything (start of a fresh pass)
    pub fn clear(&mut self) {
        self.marks.clear();
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.marks
            .iter()
            .any(|m| m.severity == DiagnosticSeverity::Error)
    }

    /// Structural errors only
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.marks
            .iter()
            .filter(|m| m.severity == DiagnosticSeverity::Error)
    }

    /// Rhythm and duration warnings only
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.marks
            .iter()
            .filter(|m| m.severity == DiagnosticSeverity::Warning)
    }

    /// Diagnostics attached to one line
    pub fn for_line(&self, line: usize) -> impl Iterator<Item = &Diagnostic> {
        self.marks.iter().filter(move |m| m.line == line)
    }

    /// Check if there are any diagnostics
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.marks.iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.marks.iter()
    }
}

/// Record a diagnostic and echo it to the log
pub(crate) fn record(diagnostics: &mut Diagnostics, mark: Diagnostic) {
    match mark.severity {
        DiagnosticSeverity::Error => log::warn!("structural error at {}", mark),
        DiagnosticSeverity::Warning => log::debug!("analysis warning at {}", mark),
    }
    diagnostics.add(mark);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let mark = Diagnostic::new(3, IssueKind::UnpairedMerge).with_field(1);

        assert_eq!(mark.line, 3);
        assert_eq!(mark.field, Some(1));
        assert_eq!(mark.severity, DiagnosticSeverity::Error);
        assert_eq!(mark.code(), "unpaired_merge");
        assert!(mark.is_structural());
    }

    #[test]
    fn test_display_is_one_based() {
        let mark = Diagnostic::new(0, IssueKind::UnpairedExchange).with_field(2);
        assert!(mark.to_string().starts_with("line 1, field 3:"));
    }

    #[test]
    fn test_diagnostics_has_errors() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_errors());

        diags.add(Diagnostic::new(
            0,
            IssueKind::DurationParse {
                text: "c".to_string(),
                reason: "no rhythm".to_string(),
            },
        ));
        assert!(!diags.has_errors());
        assert_eq!(diags.warnings().count(), 1);

        diags.add(Diagnostic::new(1, IssueKind::UnpairedMerge));
        assert!(diags.has_errors());
        assert_eq!(diags.errors().count(), 1);
        assert_eq!(diags.for_line(1).count(), 1);
    }
}
