//! Line splitter
//!
//! Splits one raw line into fields and tags the line's kind from its leading
//! characters. Never fails: malformed content is left for the graph builder.

use crate::models::LineKind;

/// Separator between spine fields
pub const FIELD_SEPARATOR: char = '\t';

/// Result of splitting one raw line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitLine {
    pub fields: Vec<String>,
    pub kind: LineKind,
}

/// Classify a whole line by its first characters
pub fn classify_line(text: &str) -> LineKind {
    if text.is_empty() {
        LineKind::Blank
    } else if text.starts_with("!!") {
        LineKind::GlobalComment
    } else {
        field_kind(text)
    }
}

/// Classify a single field of a spined line
pub(crate) fn field_kind(text: &str) -> LineKind {
    match text.as_bytes().first() {
        Some(b'!') => LineKind::LocalComment,
        Some(b'*') => LineKind::Interpretation,
        Some(b'=') => LineKind::Barline,
        _ => LineKind::Data,
    }
}

/// Split a raw line into fields and classify it
///
/// Global comments and blank lines are not spined: they keep the whole text
/// as their only field, tabs included.
pub fn split_line(text: &str) -> SplitLine {
    let kind = classify_line(text);
    let fields = if kind.has_spines() {
        text.split(FIELD_SEPARATOR).map(str::to_string).collect()
    } else {
        vec![text.to_string()]
    };
    SplitLine { fields, kind }
}
