//! Spine manipulators
//!
//! A manipulator is a control token on an interpretation line that changes
//! spine topology. `plan_line` validates the manipulators of one line and
//! turns them into a list of steps the graph builder applies to its columns.
//! It is a pure function of the line's manipulator sequence.

use serde::{Deserialize, Serialize};

use crate::diagnostics::IssueKind;

/// Closed set of manipulator kinds
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Manipulator {
    /// `**name`: opens a spine and a new track
    Exclusive,
    /// `*-`: ends a spine
    Terminator,
    /// `*^`: splits a spine in two
    Split,
    /// `*v`: merges adjacent spines
    Merge,
    /// `*x`: exchanges two adjacent spines
    Exchange,
    /// `*+`: adds a new spine to the right
    Add,
    /// Anything else, including `*` and ordinary interpretations
    None,
}

impl Manipulator {
    /// Classify a token's text
    pub fn classify(text: &str) -> Self {
        if text.starts_with("**") {
            return Manipulator::Exclusive;
        }
        match text {
            "*-" => Manipulator::Terminator,
            "*^" => Manipulator::Split,
            "*v" => Manipulator::Merge,
            "*x" => Manipulator::Exchange,
            "*+" => Manipulator::Add,
            _ => Manipulator::None,
        }
    }

    pub fn is_manipulator(self) -> bool {
        self != Manipulator::None
    }
}

/// One unit of work on the column list. Field indices refer to the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Column continues unchanged
    Keep { field: usize },
    /// Column becomes two columns
    Split { field: usize },
    /// `len` adjacent columns become one
    Merge { start: usize, len: usize },
    /// Columns `field` and `field + 1` swap places
    Exchange { field: usize },
    /// Column continues and an empty column opens to its right
    Add { field: usize },
    /// Column ends
    Terminate { field: usize },
}

impl Step {
    /// Number of line fields this step consumes
    pub fn input_width(&self) -> usize {
        match self {
            Step::Merge { len, .. } => *len,
            Step::Exchange { .. } => 2,
            _ => 1,
        }
    }

    /// Number of columns this step produces for the next line
    pub fn output_width(&self) -> usize {
        match self {
            Step::Keep { .. } | Step::Merge { .. } => 1,
            Step::Split { .. } | Step::Exchange { .. } | Step::Add { .. } => 2,
            Step::Terminate { .. } => 0,
        }
    }
}

/// A pairing problem found while planning a line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanIssue {
    pub field: usize,
    pub kind: IssueKind,
}

/// Validated steps for one interpretation line
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinePlan {
    pub steps: Vec<Step>,
    pub issues: Vec<PlanIssue>,
}

impl LinePlan {
    /// Fields consumed by the plan (always the full line)
    pub fn input_width(&self) -> usize {
        self.steps.iter().map(Step::input_width).sum()
    }

    /// Columns active on the following line
    pub fn output_width(&self) -> usize {
        self.steps.iter().map(Step::output_width).sum()
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Validate a line's manipulators and plan their effect
///
/// Every maximal adjacent run of `*v` must have at least two members, and
/// `*x` markers must come in adjacent pairs. Markers that fail these rules
/// are reported and downgraded to `Keep`, so the plan always accounts for
/// every field exactly once.
pub fn plan_line(kinds: &[Manipulator]) -> LinePlan {
    let mut plan = LinePlan::default();
    let mut i = 0;

    while i < kinds.len() {
        match kinds[i] {
            Manipulator::Merge => {
                let run = kinds[i..]
                    .iter()
                    .take_while(|k| **k == Manipulator::Merge)
                    .count();
                if run >= 2 {
                    plan.steps.push(Step::Merge { start: i, len: run });
                } else {
                    plan.issues.push(PlanIssue {
                        field: i,
                        kind: IssueKind::UnpairedMerge,
                    });
                    plan.steps.push(Step::Keep { field: i });
                }
                i += run;
            }
            Manipulator::Exchange => {
                if kinds.get(i + 1) == Some(&Manipulator::Exchange) {
                    plan.steps.push(Step::Exchange { field: i });
                    i += 2;
                } else {
                    plan.issues.push(PlanIssue {
                        field: i,
                        kind: IssueKind::UnpairedExchange,
                    });
                    plan.steps.push(Step::Keep { field: i });
                    i += 1;
                }
            }
            Manipulator::Split => {
                plan.steps.push(Step::Split { field: i });
                i += 1;
            }
            Manipulator::Add => {
                plan.steps.push(Step::Add { field: i });
                i += 1;
            }
            Manipulator::Terminator => {
                plan.steps.push(Step::Terminate { field: i });
                i += 1;
            }
            Manipulator::Exclusive | Manipulator::None => {
                plan.steps.push(Step::Keep { field: i });
                i += 1;
            }
        }
    }

    plan
}
