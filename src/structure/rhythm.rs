//! Rhythm and duration analysis
//!
//! Three steps over the finished graph:
//!
//! 1. Local durations: data tokens of rhythmic tracks get their recip value,
//!    grace notes get zero, everything else stays undefined.
//! 2. Timeline sweep: data lines are placed one after another on a shared
//!    timeline. Every token carries the end time of the last event on its
//!    path through the graph; after a data line the timeline advances to the
//!    earliest of those end times. Non-data lines take the time of the next
//!    data line.
//! 3. Durations to the end, line durations and barline durations, once the
//!    total duration is known.
//!
//! Spines that disagree on when a line starts produce a rhythm warning; the
//! [`TieBreak`] policy picks the working value and the sweep goes on.

use crate::config::{AnalysisConfig, TieBreak};
use crate::diagnostics::{record, Diagnostic, Diagnostics, IssueKind};
use crate::models::{Line, LineKind, Token, TokenId, TrackInfo};
use crate::parse::recip::{checked_add, checked_sub, recip_to_duration, HumNum, RecipError};

/// File-wide timeline threaded through the sweep
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeline {
    /// Start time of the next data line
    pub now: HumNum,
    /// Start time of the most recent data line
    pub last_data: HumNum,
}

impl Timeline {
    pub fn start() -> Self {
        Self {
            now: HumNum::from_integer(0),
            last_data: HumNum::from_integer(0),
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::start()
    }
}

/// A token on a data line that starts a new event
struct Event {
    field: usize,
    track: usize,
    /// When the spine's previous event ended, if it had one
    implied: Option<HumNum>,
}

pub(crate) struct RhythmAnalyzer<'a> {
    tokens: &'a mut [Token],
    diagnostics: &'a mut Diagnostics,
    tie_break: TieBreak,
    /// Indexed by track id - 1
    rhythmic: Vec<bool>,
    /// Per token: end time of the last event on its path
    pending: Vec<Option<HumNum>>,
}

impl<'a> RhythmAnalyzer<'a> {
    pub(crate) fn new(
        tokens: &'a mut [Token],
        tracks: &[TrackInfo],
        config: &AnalysisConfig,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        let pending = vec![None; tokens.len()];
        Self {
            tokens,
            diagnostics,
            tie_break: config.tie_break,
            rhythmic: tracks.iter().map(|t| config.is_rhythmic(&t.data_type)).collect(),
            pending,
        }
    }

    /// Run all three steps; returns the total duration of the file
    pub(crate) fn analyze(mut self, lines: &mut [Line]) -> HumNum {
        for line in lines.iter().filter(|l| l.kind() == LineKind::Data) {
            self.assign_local_durations(line);
        }

        let timeline = self.sweep(lines, Timeline::start());
        let total = timeline.now;
        self.finalize(lines, total);

        log::debug!("rhythm analyzed: total duration {}", total);
        total
    }

    fn is_rhythmic(&self, id: TokenId) -> bool {
        self.tokens[id.0]
            .track
            .and_then(|track| self.rhythmic.get(track - 1).copied())
            .unwrap_or(false)
    }

    fn assign_local_durations(&mut self, line: &Line) {
        for (field, &id) in line.fields().iter().enumerate() {
            if !self.is_rhythmic(id) {
                continue;
            }
            let token = &mut self.tokens[id.0];
            match local_duration(token) {
                None => {}
                Some(Ok(duration)) => token.duration = Some(duration),
                Some(Err(err)) => {
                    let kind = IssueKind::DurationParse {
                        text: token.text().to_string(),
                        reason: err.to_string(),
                    };
                    self.warn(line.index(), field, kind);
                }
            }
        }
    }

    /// Place every line on the timeline; returns the timeline after the last line
    fn sweep(&mut self, lines: &mut [Line], mut timeline: Timeline) -> Timeline {
        let mut waiting = Vec::<usize>::new();

        for index in 0..lines.len() {
            if lines[index].kind() == LineKind::Data {
                let (placed, next) = self.place_data_line(&lines[index], timeline);
                for w in waiting.drain(..) {
                    lines[w].duration_from_start = placed;
                }
                lines[index].duration_from_start = placed;
                timeline = next;
            } else {
                if lines[index].has_spines() {
                    self.carry_pending(&lines[index]);
                }
                waiting.push(index);
            }
        }

        for w in waiting {
            lines[w].duration_from_start = timeline.now;
        }
        timeline
    }

    /// End time inherited from the first predecessor that has one
    fn inherited(&self, id: TokenId) -> Option<HumNum> {
        self.tokens[id.0]
            .previous
            .iter()
            .find_map(|pred| self.pending[pred.0])
    }

    fn carry_pending(&mut self, line: &Line) {
        for &id in line.fields() {
            if self.is_rhythmic(id) {
                self.pending[id.0] = self.inherited(id);
            }
        }
    }

    /// Place one data line; returns its start time and the advanced timeline
    fn place_data_line(&mut self, line: &Line, timeline: Timeline) -> (HumNum, Timeline) {
        let mut events = Vec::new();
        for (field, &id) in line.fields().iter().enumerate() {
            if !self.is_rhythmic(id) || self.tokens[id.0].duration.is_none() {
                continue;
            }
            if let Some(track) = self.tokens[id.0].track {
                events.push(Event {
                    field,
                    track,
                    implied: self.inherited(id),
                });
            }
        }

        let placed = self.resolve_line_time(&events, timeline);
        for event in &events {
            if let Some(implied) = event.implied.filter(|v| *v != placed) {
                let kind = IssueKind::RhythmInconsistency {
                    track: event.track,
                    implied,
                    placed,
                };
                self.warn(line.index(), event.field, kind);
            }
        }

        let mut next: Option<HumNum> = None;
        for (field, &id) in line.fields().iter().enumerate() {
            if !self.is_rhythmic(id) {
                continue;
            }
            let inherited = self.inherited(id);
            match self.tokens[id.0].duration {
                Some(duration) => match checked_add(placed, duration) {
                    Some(end) => {
                        self.pending[id.0] = Some(end);
                        next = Some(next.map_or(end, |n| n.min(end)));
                    }
                    None => {
                        let token = &mut self.tokens[id.0];
                        token.duration = None;
                        let kind = IssueKind::DurationParse {
                            text: token.text().to_string(),
                            reason: "note end does not fit the timeline".to_string(),
                        };
                        self.pending[id.0] = None;
                        self.warn(line.index(), field, kind);
                    }
                },
                None => match inherited {
                    Some(end) if end < placed => {
                        let track = self.tokens[id.0].track.unwrap_or(0);
                        let kind = IssueKind::RhythmGap {
                            track,
                            ended: end,
                            placed,
                        };
                        self.warn(line.index(), field, kind);
                        // Reported once; the spine restarts with its next event
                        self.pending[id.0] = None;
                    }
                    Some(end) => {
                        self.pending[id.0] = Some(end);
                        if end > placed {
                            next = Some(next.map_or(end, |n| n.min(end)));
                        }
                    }
                    None => self.pending[id.0] = None,
                },
            }
        }

        let advanced = Timeline {
            now: next.unwrap_or(placed),
            last_data: placed,
        };
        (placed, advanced)
    }

    /// Start time of a data line under the configured tie-break policy
    fn resolve_line_time(&self, events: &[Event], timeline: Timeline) -> HumNum {
        match self.tie_break {
            TieBreak::Timeline => timeline.now,
            TieBreak::LowestColumn => events
                .iter()
                .find_map(|e| e.implied)
                .filter(|v| *v >= timeline.last_data)
                .unwrap_or(timeline.now),
        }
    }

    /// Copy line times onto tokens and derive end-relative durations
    fn finalize(&mut self, lines: &mut [Line], total: HumNum) {
        let starts: Vec<HumNum> = lines.iter().map(|l| l.duration_from_start).collect();

        for (index, line) in lines.iter_mut().enumerate() {
            let start = starts[index];
            let next_start = starts.get(index + 1).copied().unwrap_or(total);
            line.duration = span(start, next_start);
            for id in line.fields() {
                let token = &mut self.tokens[id.0];
                token.duration_from_start = start;
                token.duration_to_end = span(start, total);
            }
        }

        let mut next_barline = total;
        for line in lines.iter_mut().rev() {
            if line.kind() == LineKind::Barline {
                line.barline_duration = Some(span(line.duration_from_start, next_barline));
                next_barline = line.duration_from_start;
            }
        }
    }

    fn warn(&mut self, line: usize, field: usize, kind: IssueKind) {
        record(self.diagnostics, Diagnostic::new(line, kind).with_field(field));
    }
}

/// Local duration of a data token in a rhythmic spine
///
/// `None` for nulls and non-data tokens; grace notes take no time.
pub(crate) fn local_duration(token: &Token) -> Option<Result<HumNum, RecipError>> {
    if !token.is_non_null_data() {
        return None;
    }
    if token.is_grace() {
        return Some(Ok(HumNum::from_integer(0)));
    }
    Some(recip_to_duration(token.text()))
}

/// Time from `start` to `end`; zero if the difference does not fit
fn span(start: HumNum, end: HumNum) -> HumNum {
    checked_sub(end, start).unwrap_or_else(|| {
        log::warn!("time span {} to {} does not fit, using zero", start, end);
        HumNum::from_integer(0)
    })
}
