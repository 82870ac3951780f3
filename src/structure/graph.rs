//! Token graph builder
//!
//! Walks spined lines in file order, keeping one slot per active spine
//! column. Every field is linked back to the token(s) its slot carries from
//! the previous spined line; interpretation lines then rebuild the slot list
//! from their manipulators (see [`plan_line`]).
//!
//! Problems are recorded as structural errors and the builder continues with
//! whatever columns are still consistent:
//! - field count differs from the slot count: the overlapping columns are
//!   linked, extra fields stay unlinked, missing ones carry their slot over
//! - unpaired `*v` / `*x`: treated as plain interpretations
//! - `**name` inside an active spine: linked as an ordinary continuation
//! - opened column without `**name`: the token starts an untyped track
//! - merge across tracks: merged anyway, the lowest track id is kept

use crate::diagnostics::{record, Diagnostic, Diagnostics, IssueKind};
use crate::models::{Line, LineKind, Token, TokenId, TrackInfo};
use crate::parse::manipulators::{plan_line, Manipulator, Step};

/// Column state between two spined lines
#[derive(Clone, Debug, PartialEq)]
struct Slot {
    /// Tokens the next field in this column links back to
    preds: Vec<TokenId>,
    /// Owning track; `None` while the column waits for `**name`
    track: Option<usize>,
    spine_info: String,
}

impl Slot {
    fn open() -> Self {
        Self {
            preds: Vec::new(),
            track: None,
            spine_info: String::new(),
        }
    }

    fn after(column: &Column) -> Self {
        Self {
            preds: vec![column.token],
            track: Some(column.track),
            spine_info: column.spine_info.clone(),
        }
    }
}

/// A field attached to a spine on the current line
#[derive(Clone, Debug)]
struct Column {
    token: TokenId,
    track: usize,
    spine_info: String,
}

pub(crate) struct GraphBuilder<'a> {
    tokens: &'a mut [Token],
    diagnostics: &'a mut Diagnostics,
    tracks: Vec<TrackInfo>,
    slots: Vec<Slot>,
}

impl<'a> GraphBuilder<'a> {
    pub(crate) fn new(tokens: &'a mut [Token], diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            tokens,
            diagnostics,
            tracks: Vec::new(),
            slots: Vec::new(),
        }
    }

    /// Link every spined line and return the track table
    pub(crate) fn build(mut self, lines: &[Line]) -> Vec<TrackInfo> {
        let mut last_spined = None;
        for line in lines.iter().filter(|l| l.has_spines()) {
            self.process_line(line);
            last_spined = Some(line.index());
        }
        if let Some(last) = last_spined {
            self.finish(last);
        }
        log::debug!("graph built: {} tracks", self.tracks.len());
        self.tracks
    }

    fn process_line(&mut self, line: &Line) {
        self.check_field_kinds(line);

        // No active spines: every field must open one
        if self.slots.is_empty() {
            self.slots = vec![Slot::open(); line.field_count()];
        }

        let expected = self.slots.len();
        let found = line.field_count();
        if expected != found {
            self.error(line.index(), None, IssueKind::ColumnCount { expected, found });
        }

        let linked = expected.min(found);
        let mut slots = std::mem::take(&mut self.slots);
        let carried = slots.split_off(linked);

        let mut columns = Vec::with_capacity(linked);
        for (field, (slot, &token)) in slots.into_iter().zip(line.fields()).enumerate() {
            columns.push(self.attach(line.index(), field, slot, token));
        }

        let mut next = if line.kind() == LineKind::Interpretation {
            self.apply_manipulators(line.index(), &columns)
        } else {
            columns.iter().map(Slot::after).collect()
        };
        next.extend(carried);
        self.slots = next;
    }

    /// Connect one field to its column's slot
    fn attach(&mut self, line: usize, field: usize, slot: Slot, token: TokenId) -> Column {
        let exclusive = self.tokens[token.0].is_exclusive_interpretation();

        match slot.track {
            None => {
                if !exclusive {
                    let text = self.tokens[token.0].text().to_string();
                    self.error(line, Some(field), IssueKind::MissingExclusive { text });
                }
                self.open_track(token)
            }
            Some(track) => {
                if exclusive {
                    let text = self.tokens[token.0].text().to_string();
                    self.error(line, Some(field), IssueKind::ExclusiveMidSpine { text });
                }
                self.link(&slot.preds, token);
                self.tokens[token.0].spine_info = slot.spine_info.clone();
                Column {
                    token,
                    track,
                    spine_info: slot.spine_info,
                }
            }
        }
    }

    fn open_track(&mut self, root: TokenId) -> Column {
        let id = self.tracks.len() + 1;
        let token = &mut self.tokens[root.0];
        let data_type = if token.is_exclusive_interpretation() {
            token.text().to_string()
        } else {
            String::new()
        };
        let spine_info = id.to_string();
        token.spine_info = spine_info.clone();
        self.tracks.push(TrackInfo::new(id, root, data_type));
        Column {
            token: root,
            track: id,
            spine_info,
        }
    }

    fn link(&mut self, preds: &[TokenId], token: TokenId) {
        for &pred in preds {
            self.tokens[pred.0].next.push(token);
            self.tokens[token.0].previous.push(pred);
        }
    }

    /// Build the slot list for the next line from this line's manipulators
    fn apply_manipulators(&mut self, line: usize, columns: &[Column]) -> Vec<Slot> {
        let kinds: Vec<Manipulator> = columns
            .iter()
            .map(|c| self.tokens[c.token.0].manipulator())
            .collect();
        let plan = plan_line(&kinds);
        debug_assert_eq!(plan.input_width(), columns.len());
        for issue in plan.issues.iter().cloned() {
            self.error(line, Some(issue.field), issue.kind);
        }

        let mut next = Vec::with_capacity(plan.output_width());
        for step in plan.steps {
            match step {
                Step::Keep { field } => next.push(Slot::after(&columns[field])),
                Step::Split { field } => {
                    let column = &columns[field];
                    for branch in ["a", "b"] {
                        next.push(Slot {
                            preds: vec![column.token],
                            track: Some(column.track),
                            spine_info: format!("({}){}", column.spine_info, branch),
                        });
                    }
                }
                Step::Merge { start, len } => {
                    let run = &columns[start..start + len];
                    let mut tracks: Vec<usize> = run.iter().map(|c| c.track).collect();
                    tracks.sort_unstable();
                    tracks.dedup();
                    let track = tracks[0];
                    if tracks.len() > 1 {
                        self.error(line, Some(start), IssueKind::CrossTrackMerge { tracks });
                    }
                    let infos: Vec<&str> = run.iter().map(|c| c.spine_info.as_str()).collect();
                    next.push(Slot {
                        preds: run.iter().map(|c| c.token).collect(),
                        track: Some(track),
                        spine_info: merged_spine_info(&infos),
                    });
                }
                Step::Exchange { field } => {
                    next.push(Slot::after(&columns[field + 1]));
                    next.push(Slot::after(&columns[field]));
                }
                Step::Add { field } => {
                    next.push(Slot::after(&columns[field]));
                    next.push(Slot::open());
                }
                Step::Terminate { field } => {
                    let column = &columns[field];
                    self.tracks[column.track - 1].ends.push(column.token);
                }
            }
        }
        next
    }

    fn check_field_kinds(&mut self, line: &Line) {
        for (field, id) in line.fields().iter().enumerate() {
            let token = &self.tokens[id.0];
            if token.kind() != line.kind() {
                let text = token.text().to_string();
                self.error(
                    line.index(),
                    Some(field),
                    IssueKind::FieldKindMismatch {
                        text,
                        line_kind: line.kind(),
                    },
                );
            }
        }
    }

    /// Report spines left open at the end of input
    fn finish(&mut self, last_line: usize) {
        for slot in std::mem::take(&mut self.slots) {
            let issue = match slot.track {
                None => IssueKind::UnfilledAdd,
                Some(_) => IssueKind::UnterminatedSpine {
                    spine_info: slot.spine_info,
                },
            };
            self.error(last_line, None, issue);
        }
    }

    fn error(&mut self, line: usize, field: Option<usize>, kind: IssueKind) {
        let mut mark = Diagnostic::new(line, kind);
        if let Some(field) = field {
            mark = mark.with_field(field);
        }
        record(self.diagnostics, mark);
    }
}

/// Spine info after a merge: `(s)a` + `(s)b` collapses back to `s`
fn merged_spine_info(infos: &[&str]) -> String {
    if let [first, second] = infos {
        if let (Some(a), Some(b)) = (first.strip_suffix('a'), second.strip_suffix('b')) {
            if a == b {
                if let Some(inner) = unwrap_parens(a) {
                    return inner.to_string();
                }
            }
        }
    }
    infos.join(" ")
}

/// Strip one pair of enclosing parentheses, if they enclose the whole string
fn unwrap_parens(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    let mut depth = 0i32;
    for ch in inner.chars() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}
