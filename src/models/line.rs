//! Lines
//!
//! A line lists its fields as token ids and keeps its raw text in sync with
//! edits made to those tokens. Timing fields are written by the duration
//! analyzer.

use serde::{Deserialize, Serialize};

use crate::models::{Token, TokenId};
use crate::parse::recip::HumNum;
use crate::parse::splitter::FIELD_SEPARATOR;

/// Line classification from its leading characters
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    GlobalComment,
    LocalComment,
    Interpretation,
    Barline,
    Data,
    Blank,
}

impl LineKind {
    /// Whether the line participates in the spine graph
    pub fn has_spines(self) -> bool {
        !matches!(self, LineKind::GlobalComment | LineKind::Blank)
    }
}

impl std::fmt::Display for LineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LineKind::GlobalComment => "global-comment",
            LineKind::LocalComment => "local-comment",
            LineKind::Interpretation => "interpretation",
            LineKind::Barline => "barline",
            LineKind::Data => "data",
            LineKind::Blank => "blank",
        };
        f.write_str(name)
    }
}

/// One line of a Humdrum file
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub(crate) index: usize,
    pub(crate) kind: LineKind,
    pub(crate) text: String,
    pub(crate) fields: Vec<TokenId>,

    /// Start time of the line in quarter notes
    pub(crate) duration_from_start: HumNum,
    /// Time until the next line starts
    pub(crate) duration: HumNum,
    /// For barlines: time until the next barline (or the end)
    pub(crate) barline_duration: Option<HumNum>,
}

impl Line {
    pub(crate) fn new(index: usize, kind: LineKind, text: String, fields: Vec<TokenId>) -> Self {
        Self {
            index,
            kind,
            text,
            fields,
            duration_from_start: HumNum::from_integer(0),
            duration: HumNum::from_integer(0),
            barline_duration: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn kind(&self) -> LineKind {
        self.kind
    }

    /// Raw text, fields joined by tabs
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn fields(&self) -> &[TokenId] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<TokenId> {
        self.fields.get(index).copied()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn has_spines(&self) -> bool {
        self.kind.has_spines()
    }

    pub fn is_global_comment(&self) -> bool {
        self.kind == LineKind::GlobalComment
    }

    /// `!!!key: value` reference records
    pub fn is_reference(&self) -> bool {
        self.text.starts_with("!!!")
    }

    /// Key of a reference record (`COM` for `!!!COM: Bach`)
    pub fn reference_key(&self) -> Option<&str> {
        let body = self.text.strip_prefix("!!!")?;
        let (key, _) = body.split_once(':')?;
        Some(key.trim())
    }

    /// Value of a reference record
    pub fn reference_value(&self) -> Option<&str> {
        let body = self.text.strip_prefix("!!!")?;
        let (_, value) = body.split_once(':')?;
        Some(value.trim())
    }

    pub fn is_local_comment(&self) -> bool {
        self.kind == LineKind::LocalComment
    }

    pub fn is_interpretation(&self) -> bool {
        self.kind == LineKind::Interpretation
    }

    pub fn is_barline(&self) -> bool {
        self.kind == LineKind::Barline
    }

    pub fn is_data(&self) -> bool {
        self.kind == LineKind::Data
    }

    pub fn is_blank(&self) -> bool {
        self.kind == LineKind::Blank
    }

    pub fn duration_from_start(&self) -> HumNum {
        self.duration_from_start
    }

    pub fn duration(&self) -> HumNum {
        self.duration
    }

    pub fn barline_duration(&self) -> Option<HumNum> {
        self.barline_duration
    }

    pub(crate) fn reset_timing(&mut self) {
        self.duration_from_start = HumNum::from_integer(0);
        self.duration = HumNum::from_integer(0);
        self.barline_duration = None;
    }

    /// Rebuild the raw text from the line's tokens
    pub(crate) fn sync_text_from_tokens(&mut self, tokens: &[Token]) {
        let separator = FIELD_SEPARATOR.to_string();
        self.text = self
            .fields
            .iter()
            .map(|id| tokens[id.0].text())
            .collect::<Vec<_>>()
            .join(&separator);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Address;

    #[test]
    fn test_reference_record() {
        let line = Line::new(0, LineKind::GlobalComment, "!!!COM: Bach, J.S.".to_string(), vec![]);
        assert!(line.is_reference());
        assert_eq!(line.reference_key(), Some("COM"));
        assert_eq!(line.reference_value(), Some("Bach, J.S."));

        let plain = Line::new(0, LineKind::GlobalComment, "!! remark".to_string(), vec![]);
        assert!(!plain.is_reference());
        assert_eq!(plain.reference_key(), None);
    }

    #[test]
    fn test_sync_text_from_tokens() {
        let tokens = vec![
            Token::new("4c", Address::new(0, 0)),
            Token::new("4e", Address::new(0, 1)),
        ];
        let mut line = Line::new(0, LineKind::Data, String::new(), vec![TokenId(0), TokenId(1)]);
        line.sync_text_from_tokens(&tokens);
        assert_eq!(line.text(), "4c\t4e");
    }

    #[test]
    fn test_spined_kinds() {
        assert!(LineKind::Data.has_spines());
        assert!(LineKind::LocalComment.has_spines());
        assert!(!LineKind::GlobalComment.has_spines());
        assert!(!LineKind::Blank.has_spines());
    }
}
