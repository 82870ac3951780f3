use humdrum_structure::{HumdrumFile, TokenId};

fn field(file: &HumdrumFile, line: usize, field: usize) -> TokenId {
    file.line(line).unwrap().fields()[field]
}

#[test]
fn test_split_then_merge_strands() {
    let file = HumdrumFile::parse("**kern\n*^\n4c\t4e\n*v\t*v\n4d\n*-");

    assert_eq!(file.strand_count(), 3);
    assert_eq!(file.strands_for_track(1).count(), 3);

    // First branch stays in the strand that reached the split
    let first = file.tokens_in_strand(0);
    assert_eq!(
        first,
        vec![
            field(&file, 0, 0),
            field(&file, 1, 0),
            field(&file, 2, 0),
            field(&file, 3, 0),
        ]
    );
    assert_eq!(file.strand_start(1), Some(field(&file, 2, 1)));
    assert_eq!(file.strand_end(1), Some(field(&file, 3, 1)));

    // Merge successor opens the last strand
    assert_eq!(file.strand_start(2), Some(field(&file, 4, 0)));
    assert_eq!(file.strand_end(2), Some(field(&file, 5, 0)));
}

#[test]
fn test_two_strands_between_split_and_merge() {
    let file = HumdrumFile::parse("**kern\n*^\n4c\t4e\n4d\t4f\n*v\t*v\n*-");
    let line = file.line(3).unwrap();
    let strands: Vec<Option<usize>> = line.fields().iter().map(|id| file[*id].strand()).collect();
    assert_eq!(strands, vec![Some(0), Some(1)]);

    let after = field(&file, 5, 0);
    assert_eq!(file[after].strand(), Some(2));
}

#[test]
fn test_every_spined_token_has_one_strand() {
    let text = "**kern\t**dynam\n*^\t*\n4c\t4e\tp\n*\t*^\t*\n4d\t4f\t4a\tf\n*v\t*v\t*v\t*\n*-\t*-";
    let file = HumdrumFile::parse(text);
    assert!(file.is_valid(), "{:?}", file.diagnostics());

    let mut covered = 0;
    for index in 0..file.strand_count() {
        let run = file.tokens_in_strand(index);
        assert!(!run.is_empty());
        for id in &run {
            assert_eq!(file[*id].strand(), Some(index));
        }
        covered += run.len();
    }

    let spined: usize = file
        .lines()
        .iter()
        .filter(|l| l.has_spines())
        .map(|l| l.field_count())
        .sum();
    assert_eq!(covered, spined);
}

#[test]
fn test_out_of_range_strand() {
    let file = HumdrumFile::parse("**kern\n4c\n*-");
    assert_eq!(file.strand(5), None);
    assert_eq!(file.strand_start(5), None);
    assert!(file.tokens_in_strand(5).is_empty());
}
