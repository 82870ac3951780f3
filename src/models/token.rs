//! Tokens
//!
//! A token is one field of a line: immutable-by-analysis text plus the
//! structural metadata the analysis passes write (track, subtrack, strand,
//! durations) and its links to neighbouring tokens in the spine graph.

use serde::{Deserialize, Serialize};

use crate::models::LineKind;
use crate::parse::manipulators::Manipulator;
use crate::parse::recip::HumNum;
use crate::parse::splitter::field_kind;

/// Stable index of a token in its file's arena
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub usize);

impl TokenId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a token: owning line index and field index within it
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    pub line: usize,
    pub field: usize,
}

impl Address {
    pub fn new(line: usize, field: usize) -> Self {
        Self { line, field }
    }
}

/// One field of a Humdrum line
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    text: String,
    pub(crate) address: Address,

    /// Tokens that follow this one in the spine. Two after `*^`, none after `*-`
    pub(crate) next: Vec<TokenId>,

    /// Tokens that precede this one. Several after a `*v` run, none for `**name`
    pub(crate) previous: Vec<TokenId>,

    pub(crate) track: Option<usize>,
    pub(crate) subtrack: usize,
    pub(crate) subtrack_count: usize,
    pub(crate) spine_info: String,
    pub(crate) strand: Option<usize>,

    /// Local duration; `None` for non-rhythmic or unparseable tokens
    pub(crate) duration: Option<HumNum>,
    pub(crate) duration_from_start: HumNum,
    pub(crate) duration_to_end: HumNum,
}

impl Token {
    /// Create an unlinked token
    pub fn new(text: impl Into<String>, address: Address) -> Self {
        Self {
            text: text.into(),
            address,
            next: Vec::new(),
            previous: Vec::new(),
            track: None,
            subtrack: 0,
            subtrack_count: 0,
            spine_info: String::new(),
            strand: None,
            duration: None,
            duration_from_start: HumNum::from_integer(0),
            duration_to_end: HumNum::from_integer(0),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Clear everything an analysis pass writes
    pub(crate) fn reset_analysis(&mut self) {
        self.next.clear();
        self.previous.clear();
        self.track = None;
        self.subtrack = 0;
        self.subtrack_count = 0;
        self.spine_info.clear();
        self.strand = None;
        self.duration = None;
        self.duration_from_start = HumNum::from_integer(0);
        self.duration_to_end = HumNum::from_integer(0);
    }

    // ------------------------------------------------------------------
    // Address and graph links
    // ------------------------------------------------------------------

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn line_index(&self) -> usize {
        self.address.line
    }

    /// One-based line number, as editors show it
    pub fn line_number(&self) -> usize {
        self.address.line + 1
    }

    pub fn field_index(&self) -> usize {
        self.address.field
    }

    pub fn next_tokens(&self) -> &[TokenId] {
        &self.next
    }

    pub fn previous_tokens(&self) -> &[TokenId] {
        &self.previous
    }

    pub fn next_token(&self, index: usize) -> Option<TokenId> {
        self.next.get(index).copied()
    }

    pub fn previous_token(&self, index: usize) -> Option<TokenId> {
        self.previous.get(index).copied()
    }

    pub fn next_token_count(&self) -> usize {
        self.next.len()
    }

    pub fn previous_token_count(&self) -> usize {
        self.previous.len()
    }

    // ------------------------------------------------------------------
    // Derived structure
    // ------------------------------------------------------------------

    /// Track id (1-based); `None` for unspined tokens or unreachable ones
    pub fn track(&self) -> Option<usize> {
        self.track
    }

    /// Position among same-track tokens on this line, from 1
    pub fn subtrack(&self) -> usize {
        self.subtrack
    }

    /// Number of same-track tokens on this line
    pub fn subtrack_count(&self) -> usize {
        self.subtrack_count
    }

    /// Spine lineage string such as `1`, `(1)a` or `((2)b)a`
    pub fn spine_info(&self) -> &str {
        &self.spine_info
    }

    /// Track and subtrack as text, e.g. `2` or `2.1`
    pub fn track_string(&self) -> String {
        match self.track {
            Some(track) if self.subtrack_count > 1 => format!("{}.{}", track, self.subtrack),
            Some(track) => track.to_string(),
            None => String::new(),
        }
    }

    pub fn strand(&self) -> Option<usize> {
        self.strand
    }

    // ------------------------------------------------------------------
    // Durations
    // ------------------------------------------------------------------

    /// Local duration in quarter notes, `None` when undefined
    pub fn duration(&self) -> Option<HumNum> {
        self.duration
    }

    /// Local duration multiplied by `scale` (e.g. `1/4` for whole notes)
    pub fn duration_scaled(&self, scale: HumNum) -> Option<HumNum> {
        self.duration.map(|d| d * scale)
    }

    /// Local duration with undefined treated as zero, as sums need it
    pub fn duration_or_zero(&self) -> HumNum {
        self.duration.unwrap_or_else(|| HumNum::from_integer(0))
    }

    pub fn has_rhythm(&self) -> bool {
        self.duration.is_some()
    }

    pub fn duration_from_start(&self) -> HumNum {
        self.duration_from_start
    }

    pub fn duration_from_start_scaled(&self, scale: HumNum) -> HumNum {
        self.duration_from_start * scale
    }

    pub fn duration_to_end(&self) -> HumNum {
        self.duration_to_end
    }

    pub fn duration_to_end_scaled(&self, scale: HumNum) -> HumNum {
        self.duration_to_end * scale
    }

    // ------------------------------------------------------------------
    // Classification by text
    // ------------------------------------------------------------------

    /// Kind of line this field would belong on
    pub fn kind(&self) -> LineKind {
        field_kind(&self.text)
    }

    pub fn manipulator(&self) -> Manipulator {
        Manipulator::classify(&self.text)
    }

    /// `.`, `*` or `!`: a placeholder with no content
    pub fn is_null(&self) -> bool {
        matches!(self.text.as_str(), "." | "*" | "!")
    }

    pub fn is_manipulator(&self) -> bool {
        self.manipulator().is_manipulator()
    }

    pub fn is_exclusive_interpretation(&self) -> bool {
        self.text.starts_with("**")
    }

    pub fn is_split(&self) -> bool {
        self.text == "*^"
    }

    pub fn is_merge(&self) -> bool {
        self.text == "*v"
    }

    pub fn is_exchange(&self) -> bool {
        self.text == "*x"
    }

    pub fn is_terminator(&self) -> bool {
        self.text == "*-"
    }

    pub fn is_add(&self) -> bool {
        self.text == "*+"
    }

    pub fn is_barline(&self) -> bool {
        self.text.starts_with('=')
    }

    pub fn is_local_comment(&self) -> bool {
        self.text.starts_with('!') && !self.text.starts_with("!!")
    }

    pub fn is_comment(&self) -> bool {
        self.text.starts_with('!')
    }

    pub fn is_interpretation(&self) -> bool {
        self.text.starts_with('*')
    }

    pub fn is_data(&self) -> bool {
        self.kind() == LineKind::Data
    }

    pub fn is_null_data(&self) -> bool {
        self.text == "."
    }

    pub fn is_non_null_data(&self) -> bool {
        self.is_data() && !self.is_null_data()
    }

    // ------------------------------------------------------------------
    // Subtokens (chords)
    // ------------------------------------------------------------------

    pub fn is_chord(&self, separator: &str) -> bool {
        self.is_non_null_data() && self.text.contains(separator)
    }

    pub fn subtoken_count(&self, separator: &str) -> usize {
        self.text.split(separator).count()
    }

    pub fn subtoken(&self, index: usize, separator: &str) -> Option<&str> {
        self.text.split(separator).nth(index)
    }

    // ------------------------------------------------------------------
    // Kern conventions the duration analyzer relies on
    // ------------------------------------------------------------------

    /// Grace notes (`q` / `Q`) take no performed time
    pub fn is_grace(&self) -> bool {
        self.is_non_null_data() && self.text.contains(['q', 'Q'])
    }

    pub fn is_rest(&self) -> bool {
        self.is_non_null_data() && self.text.contains('r')
    }

    pub fn is_note(&self) -> bool {
        self.is_non_null_data()
            && !self.is_rest()
            && self.text.chars().any(|c| matches!(c, 'a'..='g' | 'A'..='G'))
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
