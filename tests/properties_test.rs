//! Property-based tests over generated Humdrum text
//!
//! Arbitrary field soup must never panic and must analyze the same way twice.
//! Well-formed rhythmic input must produce a monotonic timeline with no
//! diagnostics.

use humdrum_structure::{HumNum, HumdrumFile, TokenId};
use proptest::prelude::*;

fn field_strategy() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "**kern", "**dynam", "*^", "*v", "*x", "*+", "*-", "*", "*M4/4", "4c", "8.d", "2r",
        ".", "=1", "!", "q", "c",
    ])
}

fn soup_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => prop::collection::vec(field_strategy(), 1..5).prop_map(|f| f.join("\t")),
        1 => Just("!! comment".to_string()),
        1 => Just(String::new()),
    ]
}

fn recip_strategy() -> impl Strategy<Value = (&'static str, HumNum)> {
    prop::sample::select(vec![
        ("1", HumNum::from_integer(4)),
        ("2", HumNum::from_integer(2)),
        ("4", HumNum::from_integer(1)),
        ("8", HumNum::new(1, 2)),
        ("16", HumNum::new(1, 4)),
        ("4.", HumNum::new(3, 2)),
        ("12", HumNum::new(1, 3)),
    ])
}

proptest! {
    #[test]
    fn test_soup_analysis_is_stable(lines in prop::collection::vec(soup_line_strategy(), 0..16)) {
        let text = lines.join("\n");
        let mut file = HumdrumFile::parse(&text);
        let first = file.report().to_json().unwrap();

        prop_assert_eq!(file.is_valid(), !file.diagnostics().has_errors());
        prop_assert_eq!(file.to_string().lines().count(), file.line_count());

        for (index, token) in file.tokens().iter().enumerate() {
            let id = TokenId(index);
            for next in token.next_tokens() {
                prop_assert!(file[*next].previous_tokens().contains(&id));
            }
        }

        // Only terminators end a path and only track roots start one
        if file.is_valid() {
            let roots = file.spine_starts();
            for line in file.lines().iter().filter(|l| l.has_spines()) {
                for id in line.fields() {
                    let token = &file[*id];
                    prop_assert!(token.is_terminator() || token.next_token_count() > 0);
                    prop_assert!(roots.contains(id) || token.previous_token_count() > 0);
                }
            }
        }

        file.analyze();
        prop_assert_eq!(file.report().to_json().unwrap(), first);
    }

    #[test]
    fn test_single_spine_timeline(notes in prop::collection::vec(recip_strategy(), 1..24)) {
        let mut text = String::from("**kern\n");
        for (recip, _) in &notes {
            text.push_str(recip);
            text.push_str("c\n");
        }
        text.push_str("*-");

        let file = HumdrumFile::parse(&text);
        prop_assert!(file.is_valid());
        prop_assert!(file.diagnostics().is_empty());

        let total = notes
            .iter()
            .fold(HumNum::from_integer(0), |acc, (_, value)| acc + value);
        prop_assert_eq!(file.total_duration(), total);
        prop_assert_eq!(file.strand_count(), 1);
    }

    #[test]
    fn test_split_voices_are_monotonic(
        notes in prop::collection::vec(recip_strategy(), 1..16),
        split_at in 0usize..16,
    ) {
        // Same rhythm in both voices of a split spine
        let split_at = split_at.min(notes.len());
        let mut text = String::from("**kern\n");
        for (i, (recip, _)) in notes.iter().enumerate() {
            if i == split_at {
                text.push_str("*^\n");
            }
            if i >= split_at {
                text.push_str(&format!("{recip}c\t{recip}e\n"));
            } else {
                text.push_str(&format!("{recip}c\n"));
            }
        }
        if split_at == notes.len() {
            text.push_str("*^\n");
        }
        text.push_str("*v\t*v\n*-");

        let file = HumdrumFile::parse(&text);
        prop_assert!(file.is_valid(), "{:?}", file.diagnostics());
        prop_assert!(file.diagnostics().is_empty());

        let starts: Vec<HumNum> = file.lines().iter().map(|l| l.duration_from_start()).collect();
        prop_assert!(starts.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(file.max_track(), 1);

        let last = file.line(file.line_count() - 1).unwrap().fields()[0];
        prop_assert_eq!(file[last].subtrack(), 1);
        prop_assert_eq!(file[last].spine_info(), "1");
    }
}
