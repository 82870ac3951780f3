//! Strand indexing
//!
//! A strand is a maximal run of tokens inside one track. A token opens a new
//! strand when it has no predecessor (track root), several predecessors
//! (merge successor), or when it is a later branch of a split. A strand
//! follows first successors until it reaches a terminator or a token that
//! opens a strand of its own. The first branch of a split therefore stays in
//! the strand that reached the split, and a merge closes every incoming
//! strand.
//!
//! Strands are numbered in the order their start tokens appear when the file
//! is scanned top to bottom, left to right. The index is always rebuilt in
//! full.

use crate::models::{Line, Strand, Token, TokenId};

pub(crate) fn index(lines: &[Line], tokens: &mut [Token]) -> Vec<Strand> {
    let mut strands = Vec::new();

    for line in lines.iter().filter(|l| l.has_spines()) {
        for &start in line.fields() {
            if tokens[start.0].strand.is_some() {
                continue;
            }
            let id = strands.len();
            let end = walk(tokens, start, id);
            strands.push(Strand {
                id,
                start,
                end,
                track: tokens[start.0].track,
            });
        }
    }

    log::debug!("indexed {} strands", strands.len());
    strands
}

/// Stamp `id` on the run beginning at `start`; returns the run's last token
fn walk(tokens: &mut [Token], start: TokenId, id: usize) -> TokenId {
    let mut current = start;
    loop {
        tokens[current.0].strand = Some(id);
        match tokens[current.0].next.first().copied() {
            Some(next) if tokens[next.0].strand.is_none() && !opens_strand(tokens, next) => {
                current = next;
            }
            _ => return current,
        }
    }
}

fn opens_strand(tokens: &[Token], id: TokenId) -> bool {
    match tokens[id.0].previous.as_slice() {
        [pred] => tokens[pred.0].next.first() != Some(&id),
        _ => true,
    }
}
