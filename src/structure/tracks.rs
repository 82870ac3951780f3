//! Track and subtrack assignment
//!
//! Tracks are stamped by a breadth-first walk from each track root in
//! ascending id order; a token already claimed by a lower track keeps it.
//! Subtracks number the same-track tokens of each line 1..k from left to
//! right, which renumbers naturally after splits and merges.

use std::collections::{HashMap, VecDeque};

use crate::models::{Line, Token, TrackInfo};

pub(crate) fn assign(lines: &[Line], tokens: &mut [Token], tracks: &[TrackInfo]) {
    for info in tracks {
        let mut queue = VecDeque::from([info.root]);
        while let Some(id) = queue.pop_front() {
            let token = &mut tokens[id.0];
            if token.track.is_some() {
                continue;
            }
            token.track = Some(info.id);
            queue.extend(token.next.iter().copied());
        }
    }

    assign_subtracks(lines, tokens);
}

fn assign_subtracks(lines: &[Line], tokens: &mut [Token]) {
    for line in lines.iter().filter(|l| l.has_spines()) {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for id in line.fields() {
            if let Some(track) = tokens[id.0].track {
                *counts.entry(track).or_default() += 1;
            }
        }

        let mut seen: HashMap<usize, usize> = HashMap::new();
        for id in line.fields() {
            let token = &mut tokens[id.0];
            if let Some(track) = token.track {
                let position = seen.entry(track).or_default();
                *position += 1;
                token.subtrack = *position;
                token.subtrack_count = counts[&track];
            }
        }
    }
}
