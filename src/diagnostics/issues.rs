//! Issue taxonomy
//!
//! Three families: structural errors (spine topology), rhythm
//! inconsistencies (spines disagree on the timeline) and duration-parse
//! failures (one token's recip cannot be read).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::LineKind;
use crate::parse::recip::HumNum;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Error)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    /// Field count differs from the number of active spines
    #[error("line has {found} fields but {expected} spines are active")]
    ColumnCount { expected: usize, found: usize },

    /// A `*v` with no adjacent `*v`
    #[error("merge marker `*v` has no adjacent partner")]
    UnpairedMerge,

    /// A `*x` with no adjacent `*x`
    #[error("exchange marker `*x` has no adjacent partner")]
    UnpairedExchange,

    /// A merge run joins spines from different tracks
    #[error("merge joins spines of different tracks {tracks:?}")]
    CrossTrackMerge { tracks: Vec<usize> },

    /// `**name` in a column that already carries a spine
    #[error("exclusive interpretation `{text}` re-declared inside an active spine")]
    ExclusiveMidSpine { text: String },

    /// A new column was opened but the token there is not `**name`
    #[error("expected an exclusive interpretation to open a spine, found `{text}`")]
    MissingExclusive { text: String },

    /// A field whose kind disagrees with the rest of its line
    #[error("field `{text}` does not match line kind {line_kind}")]
    FieldKindMismatch { text: String, line_kind: LineKind },

    /// A spine still open when the input ended
    #[error("spine {spine_info} is not terminated at end of input")]
    UnterminatedSpine { spine_info: String },

    /// A `*+` column that never received its exclusive interpretation
    #[error("spine added by `*+` was never given an exclusive interpretation")]
    UnfilledAdd,

    /// A new event whose spine implies a different start time than the line
    #[error("track {track} implies start time {implied} but the line is placed at {placed}")]
    RhythmInconsistency {
        track: usize,
        implied: HumNum,
        placed: HumNum,
    },

    /// A spine whose last note ended before the line's time with no new event
    #[error("track {track} has nothing sounding: last note ended at {ended}, line is at {placed}")]
    RhythmGap {
        track: usize,
        ended: HumNum,
        placed: HumNum,
    },

    /// A rhythmic data token without a readable duration
    #[error("cannot parse a duration from `{text}`: {reason}")]
    DurationParse { text: String, reason: String },
}

impl IssueKind {
    /// Short machine-readable identifier
    pub fn code(&self) -> &'static str {
        match self {
            IssueKind::ColumnCount { .. } => "column_count",
            IssueKind::UnpairedMerge => "unpaired_merge",
            IssueKind::UnpairedExchange => "unpaired_exchange",
            IssueKind::CrossTrackMerge { .. } => "cross_track_merge",
            IssueKind::ExclusiveMidSpine { .. } => "exclusive_mid_spine",
            IssueKind::MissingExclusive { .. } => "missing_exclusive",
            IssueKind::FieldKindMismatch { .. } => "field_kind_mismatch",
            IssueKind::UnterminatedSpine { .. } => "unterminated_spine",
            IssueKind::UnfilledAdd => "unfilled_add",
            IssueKind::RhythmInconsistency { .. } => "rhythm_inconsistency",
            IssueKind::RhythmGap { .. } => "rhythm_gap",
            IssueKind::DurationParse { .. } => "duration_parse",
        }
    }

    /// Whether the issue concerns spine topology (and invalidates the file)
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            IssueKind::RhythmInconsistency { .. }
                | IssueKind::RhythmGap { .. }
                | IssueKind::DurationParse { .. }
        )
    }

    pub fn severity(&self) -> super::DiagnosticSeverity {
        if self.is_structural() {
            super::DiagnosticSeverity::Error
        } else {
            super::DiagnosticSeverity::Warning
        }
    }
}
