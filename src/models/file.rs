//! Humdrum file
//!
//! [`HumdrumFile`] owns the lines and the token arena and runs the analysis
//! passes over them. Parsing never fails; structural problems end up in the
//! file's diagnostics and clear the validity flag.
//!
//! Edits that touch the line layout or spine topology mark the file as
//! unanalyzed. Call [`HumdrumFile::analyze`] to rebuild everything; there is
//! no partial re-analysis.

use std::collections::{BTreeSet, VecDeque};
use std::ops::Index;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{HumdrumError, Result};
use crate::models::{Address, Line, LineKind, Token, TokenId};
use crate::parse::manipulators::Manipulator;
use crate::parse::recip::{HumNum, RecipError};
use crate::parse::splitter::{classify_line, split_line};
use crate::structure::graph::GraphBuilder;
use crate::structure::rhythm::{local_duration, RhythmAnalyzer};
use crate::structure::{strands, tracks};

/// One entry of the track table
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TrackInfo {
    /// 1-based track number
    pub id: usize,
    /// First token of the track
    pub root: TokenId,
    /// Exclusive interpretation that opened the track, empty if none
    pub data_type: String,
    /// Terminators (or last tokens) of every spine of the track
    pub ends: Vec<TokenId>,
}

impl TrackInfo {
    pub fn new(id: usize, root: TokenId, data_type: impl Into<String>) -> Self {
        Self {
            id,
            root,
            data_type: data_type.into(),
            ends: Vec::new(),
        }
    }
}

/// A maximal run of linked tokens within one track
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strand {
    /// 0-based strand number
    pub id: usize,
    pub start: TokenId,
    pub end: TokenId,
    pub track: Option<usize>,
}

/// Serializable summary of an analyzed file
#[derive(Serialize, Clone, Debug)]
pub struct AnalysisReport {
    pub valid: bool,
    pub line_count: usize,
    pub track_count: usize,
    pub strand_count: usize,
    pub total_duration: HumNum,
    pub tracks: Vec<TrackInfo>,
    pub strands: Vec<Strand>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| HumdrumError::Report(e.to_string()))
    }
}

/// A parsed Humdrum file with its token graph
#[derive(Clone, Debug)]
pub struct HumdrumFile {
    lines: Vec<Line>,
    tokens: Vec<Token>,
    tracks: Vec<TrackInfo>,
    strands: Vec<Strand>,
    diagnostics: Diagnostics,
    config: AnalysisConfig,
    total_duration: HumNum,
    valid: bool,
    analyzed: bool,
}

impl Default for HumdrumFile {
    fn default() -> Self {
        Self::with_config(AnalysisConfig::default())
    }
}

impl HumdrumFile {
    /// Empty file; trivially valid once analyzed
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            lines: Vec::new(),
            tokens: Vec::new(),
            tracks: Vec::new(),
            strands: Vec::new(),
            diagnostics: Diagnostics::new(),
            config,
            total_duration: HumNum::from_integer(0),
            valid: false,
            analyzed: false,
        }
    }

    /// Parse and analyze with the default configuration
    pub fn parse(text: &str) -> Self {
        Self::parse_with_config(text, AnalysisConfig::default())
    }

    pub fn parse_with_config(text: &str, config: AnalysisConfig) -> Self {
        let mut file = Self::with_config(config);
        for raw in text.lines() {
            file.push_raw_line(raw);
        }
        file.analyze();
        file
    }

    fn push_raw_line(&mut self, raw: &str) {
        let index = self.lines.len();
        let split = split_line(raw);
        let mut fields = Vec::with_capacity(split.fields.len());
        for (field, text) in split.fields.into_iter().enumerate() {
            let id = TokenId(self.tokens.len());
            self.tokens.push(Token::new(text, Address::new(index, field)));
            fields.push(id);
        }
        self.lines
            .push(Line::new(index, split.kind, raw.to_string(), fields));
    }

    /// Run every pass from scratch: graph, tracks, strands, rhythm
    pub fn analyze(&mut self) {
        self.diagnostics.clear();
        for token in &mut self.tokens {
            token.reset_analysis();
        }
        for line in &mut self.lines {
            line.reset_timing();
        }

        self.tracks =
            GraphBuilder::new(&mut self.tokens, &mut self.diagnostics).build(&self.lines);
        tracks::assign(&self.lines, &mut self.tokens, &self.tracks);
        self.strands = strands::index(&self.lines, &mut self.tokens);
        self.total_duration = RhythmAnalyzer::new(
            &mut self.tokens,
            &self.tracks,
            &self.config,
            &mut self.diagnostics,
        )
        .analyze(&mut self.lines);

        self.valid = !self.diagnostics.has_errors();
        self.analyzed = true;
        log::debug!(
            "analyzed {} lines: {} tracks, {} strands, valid={}",
            self.lines.len(),
            self.tracks.len(),
            self.strands.len(),
            self.valid
        );
    }

    // ------------------------------------------------------------------
    // Lines and tokens
    // ------------------------------------------------------------------

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    pub fn get_token(&self, id: TokenId) -> Option<&Token> {
        self.tokens.get(id.0)
    }

    /// Every token in the arena, in creation order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    // ------------------------------------------------------------------
    // Tracks
    // ------------------------------------------------------------------

    pub fn tracks(&self) -> &[TrackInfo] {
        &self.tracks
    }

    pub fn track_info(&self, track: usize) -> Option<&TrackInfo> {
        track.checked_sub(1).and_then(|i| self.tracks.get(i))
    }

    pub fn max_track(&self) -> usize {
        self.tracks.len()
    }

    pub fn track_start(&self, track: usize) -> Option<TokenId> {
        self.track_info(track).map(|info| info.root)
    }

    pub fn track_ends(&self, track: usize) -> &[TokenId] {
        self.track_info(track)
            .map(|info| info.ends.as_slice())
            .unwrap_or(&[])
    }

    /// Root tokens of all tracks, in track order
    pub fn spine_starts(&self) -> Vec<TokenId> {
        self.tracks.iter().map(|info| info.root).collect()
    }

    pub fn data_type(&self, track: usize) -> Option<&str> {
        self.track_info(track).map(|info| info.data_type.as_str())
    }

    // ------------------------------------------------------------------
    // Strands
    // ------------------------------------------------------------------

    pub fn strands(&self) -> &[Strand] {
        &self.strands
    }

    pub fn strand(&self, index: usize) -> Option<&Strand> {
        self.strands.get(index)
    }

    pub fn strand_count(&self) -> usize {
        self.strands.len()
    }

    pub fn strand_start(&self, index: usize) -> Option<TokenId> {
        self.strand(index).map(|s| s.start)
    }

    pub fn strand_end(&self, index: usize) -> Option<TokenId> {
        self.strand(index).map(|s| s.end)
    }

    pub fn strands_for_track(&self, track: usize) -> impl Iterator<Item = &Strand> + '_ {
        self.strands.iter().filter(move |s| s.track == Some(track))
    }

    /// Tokens of a strand from start to end
    pub fn tokens_in_strand(&self, index: usize) -> Vec<TokenId> {
        let Some(strand) = self.strand(index) else {
            return Vec::new();
        };
        let mut run = vec![strand.start];
        let mut current = strand.start;
        while current != strand.end {
            match self.tokens[current.0].next.first() {
                Some(&next) if self.tokens[next.0].strand == Some(strand.id) => {
                    run.push(next);
                    current = next;
                }
                _ => break,
            }
        }
        run
    }

    // ------------------------------------------------------------------
    // Graph navigation
    // ------------------------------------------------------------------

    /// Nearest non-null data tokens reachable forward from `id`
    pub fn next_non_null_data_tokens(&self, id: TokenId) -> Vec<TokenId> {
        self.nearest_data(id, |token| token.next_tokens())
    }

    /// Nearest non-null data tokens reachable backward from `id`
    pub fn previous_non_null_data_tokens(&self, id: TokenId) -> Vec<TokenId> {
        self.nearest_data(id, |token| token.previous_tokens())
    }

    fn nearest_data<'a, F>(&'a self, id: TokenId, step: F) -> Vec<TokenId>
    where
        F: Fn(&'a Token) -> &'a [TokenId],
    {
        let Some(origin) = self.get_token(id) else {
            return Vec::new();
        };
        let mut found = BTreeSet::new();
        let mut visited = BTreeSet::new();
        let mut queue: VecDeque<TokenId> = step(origin).iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let token = &self.tokens[current.0];
            if token.is_non_null_data() {
                found.insert((token.address, current));
            } else {
                queue.extend(step(token).iter().copied());
            }
        }
        found.into_iter().map(|(_, id)| id).collect()
    }

    // ------------------------------------------------------------------
    // Analysis results
    // ------------------------------------------------------------------

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// False after an edit that needs [`HumdrumFile::analyze`] to be rerun
    pub fn is_analyzed(&self) -> bool {
        self.analyzed
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Diagnostics attached to one token's line and field
    pub fn token_diagnostics(&self, id: TokenId) -> Vec<&Diagnostic> {
        let Some(token) = self.get_token(id) else {
            return Vec::new();
        };
        self.diagnostics
            .for_line(token.line_index())
            .filter(|d| d.field == Some(token.field_index()))
            .collect()
    }

    /// Total duration in quarter notes
    pub fn total_duration(&self) -> HumNum {
        self.total_duration
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn report(&self) -> AnalysisReport {
        AnalysisReport {
            valid: self.valid,
            line_count: self.lines.len(),
            track_count: self.tracks.len(),
            strand_count: self.strands.len(),
            total_duration: self.total_duration,
            tracks: self.tracks.clone(),
            strands: self.strands.clone(),
            diagnostics: self.diagnostics.iter().cloned().collect(),
        }
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Replace a token's text and resync its line
    ///
    /// Edits that keep every derived attribute (a pitch change, say) leave
    /// the analysis in place. Edits that change a manipulator, an exclusive
    /// interpretation, the token's kind or null status, its line's kind, or
    /// the duration of a rhythmic data token mark the file as unanalyzed.
    pub fn set_token_text(&mut self, id: TokenId, text: &str) -> Result<()> {
        if text.contains(['\t', '\n', '\r']) {
            return Err(HumdrumError::SeparatorInText(text.to_string()));
        }
        let rhythmic = self.is_rhythmic_token(id);
        let token = self
            .tokens
            .get_mut(id.0)
            .ok_or(HumdrumError::UnknownToken(id))?;

        let before = EditFootprint::of(token, rhythmic);
        token.set_text(text);
        let after = EditFootprint::of(token, rhythmic);
        let line_index = token.line_index();

        let line = &mut self.lines[line_index];
        line.sync_text_from_tokens(&self.tokens);
        let kind = classify_line(line.text());
        let line_changed = kind != line.kind;
        line.kind = kind;

        if before != after || line_changed {
            log::debug!("token {} edit changes derived attributes, analysis is stale", id);
            self.analyzed = false;
        }
        Ok(())
    }

    fn is_rhythmic_token(&self, id: TokenId) -> bool {
        self.get_token(id)
            .and_then(|token| token.track)
            .and_then(|track| self.track_info(track))
            .map_or(false, |info| self.config.is_rhythmic(&info.data_type))
    }

    /// Append a raw line; the file needs [`HumdrumFile::analyze`] afterwards
    pub fn append_line(&mut self, raw: &str) -> Result<()> {
        if raw.contains(['\n', '\r']) {
            return Err(HumdrumError::MultilineInput);
        }
        self.push_raw_line(raw);
        self.analyzed = false;
        Ok(())
    }

    /// Insert a raw line before `index` (or at the end when `index` equals
    /// the line count)
    pub fn insert_line(&mut self, index: usize, raw: &str) -> Result<()> {
        if raw.contains(['\n', '\r']) {
            return Err(HumdrumError::MultilineInput);
        }
        let count = self.lines.len();
        if index > count {
            return Err(HumdrumError::LineOutOfRange { index, count });
        }

        self.push_raw_line(raw);
        if let Some(line) = self.lines.pop() {
            self.lines.insert(index, line);
        }
        for (i, line) in self.lines.iter_mut().enumerate().skip(index) {
            line.index = i;
            for id in &line.fields {
                self.tokens[id.0].address.line = i;
            }
        }
        self.analyzed = false;
        Ok(())
    }
}

/// What an analysis pass reads from a token's text
#[derive(PartialEq)]
struct EditFootprint {
    manipulator: Manipulator,
    kind: LineKind,
    null: bool,
    exclusive: Option<String>,
    duration: Option<std::result::Result<HumNum, RecipError>>,
}

impl EditFootprint {
    fn of(token: &Token, rhythmic: bool) -> Self {
        Self {
            manipulator: token.manipulator(),
            kind: token.kind(),
            null: token.is_null(),
            exclusive: token
                .is_exclusive_interpretation()
                .then(|| token.text().to_string()),
            duration: if rhythmic { local_duration(token) } else { None },
        }
    }
}

impl Index<TokenId> for HumdrumFile {
    type Output = Token;

    fn index(&self, id: TokenId) -> &Token {
        &self.tokens[id.0]
    }
}

impl FromStr for HumdrumFile {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Writes the lines back out, one per row
impl std::fmt::Display for HumdrumFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line.text())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHORALE: &str = concat!(
        "!!!COM: Bach\n",
        "**kern\t**kern\n",
        "*M4/4\t*M4/4\n",
        "=1\t=1\n",
        "4c\t4e\n",
        "4d\t.\n",
        "*-\t*-"
    );

    #[test]
    fn test_empty_file() {
        let file = HumdrumFile::parse("");
        assert_eq!(file.line_count(), 0);
        assert_eq!(file.max_track(), 0);
        assert!(file.is_valid());
        assert!(file.is_analyzed());
        assert_eq!(file.total_duration(), HumNum::from_integer(0));
    }

    #[test]
    fn test_new_file_is_not_analyzed() {
        let file = HumdrumFile::new();
        assert!(!file.is_analyzed());
        assert_eq!(file.strand_count(), 0);
    }

    #[test]
    fn test_display_round_trips_text() {
        let file: HumdrumFile = CHORALE.parse().unwrap();
        assert_eq!(file.to_string(), format!("{}\n", CHORALE));
    }

    #[test]
    fn test_track_queries() {
        let file = HumdrumFile::parse(CHORALE);
        assert_eq!(file.max_track(), 2);
        assert_eq!(file.data_type(1), Some("**kern"));
        assert_eq!(file.data_type(3), None);
        assert_eq!(file.track_info(0), None);
        assert_eq!(file.spine_starts(), file.line(1).unwrap().fields().to_vec());
        assert!(file.track_ends(9).is_empty());
    }

    #[test]
    fn test_global_comment_token_is_unlinked() {
        let file = HumdrumFile::parse(CHORALE);
        let comment = file.line(0).unwrap().fields()[0];
        assert_eq!(file[comment].track(), None);
        assert_eq!(file[comment].next_token_count(), 0);
        assert_eq!(file[comment].previous_token_count(), 0);
    }

    #[test]
    fn test_next_non_null_data_skips_nulls_and_barlines() {
        let file = HumdrumFile::parse(CHORALE);
        let top = file.line(1).unwrap().fields()[1];
        let e = file.line(4).unwrap().fields()[1];
        assert_eq!(file.next_non_null_data_tokens(top), vec![e]);

        let terminator = file.line(6).unwrap().fields()[1];
        assert_eq!(file.previous_non_null_data_tokens(terminator), vec![e]);
    }

    #[test]
    fn test_report_to_json() {
        let file = HumdrumFile::parse("**kern\n4c\n*-");
        let report = file.report();
        assert!(report.valid);
        assert_eq!(report.track_count, 1);
        assert_eq!(report.strand_count, 1);

        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["line_count"], 3);
        assert_eq!(value["tracks"][0]["data_type"], "**kern");
    }

    #[test]
    fn test_set_token_text_keeps_analysis_for_plain_edit() {
        let mut file = HumdrumFile::parse(CHORALE);
        let note = file.line(4).unwrap().fields()[0];
        file.set_token_text(note, "4cc").unwrap();
        assert!(file.is_analyzed());
        assert_eq!(file.line(4).unwrap().text(), "4cc\t4e");
        assert_eq!(file[note].text(), "4cc");
    }

    #[test]
    fn test_set_token_text_marks_structural_edit_stale() {
        let mut file = HumdrumFile::parse(CHORALE);
        let interp = file.line(2).unwrap().fields()[0];
        file.set_token_text(interp, "*^").unwrap();
        assert!(!file.is_analyzed());

        file.analyze();
        assert!(file.is_analyzed());
        assert!(!file.is_valid());
    }

    #[test]
    fn test_set_token_text_rejects_separators() {
        let mut file = HumdrumFile::parse(CHORALE);
        let note = file.line(4).unwrap().fields()[0];
        assert_eq!(
            file.set_token_text(note, "4c\t4d"),
            Err(HumdrumError::SeparatorInText("4c\t4d".to_string()))
        );
        assert_eq!(
            file.set_token_text(TokenId(999), "4c"),
            Err(HumdrumError::UnknownToken(TokenId(999)))
        );
    }

    #[test]
    fn test_insert_line_reindexes() {
        let mut file = HumdrumFile::parse(CHORALE);
        file.insert_line(5, "4e\t4g").unwrap();
        assert!(!file.is_analyzed());
        assert_eq!(file.line(5).unwrap().text(), "4e\t4g");

        let moved = file.line(6).unwrap();
        assert_eq!(moved.index(), 6);
        assert_eq!(file[moved.fields()[0]].line_index(), 6);

        assert_eq!(
            file.insert_line(42, "4c\t4c"),
            Err(HumdrumError::LineOutOfRange { index: 42, count: 8 })
        );
        assert_eq!(file.insert_line(0, "a\nb"), Err(HumdrumError::MultilineInput));
    }
}
