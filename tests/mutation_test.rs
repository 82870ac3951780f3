use std::sync::{Arc, RwLock};
use std::thread;

use humdrum_structure::{HumNum, HumdrumError, HumdrumFile};

#[test]
fn test_append_then_analyze() {
    let mut file = HumdrumFile::parse("**kern\n4c");
    assert!(!file.is_valid());

    file.append_line("*-").unwrap();
    assert!(!file.is_analyzed());
    file.analyze();
    assert!(file.is_valid(), "{:?}", file.diagnostics());
    assert_eq!(file.line_count(), 3);
    assert_eq!(file.to_string(), "**kern\n4c\n*-\n");
}

#[test]
fn test_insert_line_then_analyze() {
    let mut file = HumdrumFile::parse("**kern\n4c\n*-");
    file.insert_line(2, "4d").unwrap();
    file.analyze();

    assert!(file.is_valid());
    assert_eq!(file.total_duration(), HumNum::from_integer(2));
    let d = file.line(2).unwrap().fields()[0];
    assert_eq!(file[d].line_index(), 2);
    assert_eq!(file[d].text(), "4d");
}

#[test]
fn test_edit_pitch_keeps_analysis() {
    let mut file = HumdrumFile::parse("**kern\t**kern\n4c\t4e\n*-\t*-");
    let c = file.line(1).unwrap().fields()[0];
    file.set_token_text(c, "4cc").unwrap();

    assert!(file.is_analyzed());
    assert_eq!(file.line(1).unwrap().text(), "4cc\t4e");
    assert_eq!(file[c].track(), Some(1));
}

#[test]
fn test_duration_edit_needs_analysis() {
    let mut file = HumdrumFile::parse("**kern\n4c\n4d\n*-");
    let c = file.line(1).unwrap().fields()[0];
    file.set_token_text(c, "2c").unwrap();
    assert!(!file.is_analyzed());

    file.analyze();
    assert_eq!(file[c].duration(), Some(HumNum::from_integer(2)));
    assert_eq!(file.total_duration(), HumNum::from_integer(3));
}

#[test]
fn test_null_edit_needs_analysis() {
    let mut file = HumdrumFile::parse("**kern\t**kern\n2c\t4e\n.\t4f\n*-\t*-");
    let null = file.line(2).unwrap().fields()[0];
    file.set_token_text(null, "4d").unwrap();
    assert!(!file.is_analyzed());
}

#[test]
fn test_exclusive_rename_needs_analysis() {
    let mut file = HumdrumFile::parse("**kern\n4c\n4d\n*-");
    let root = file.line(0).unwrap().fields()[0];
    file.set_token_text(root, "**text").unwrap();
    assert!(!file.is_analyzed());

    file.analyze();
    assert_eq!(file.data_type(1), Some("**text"));
    assert_eq!(file.total_duration(), HumNum::from_integer(0));
}

#[test]
fn test_non_rhythmic_edit_keeps_analysis() {
    let mut file = HumdrumFile::parse("**kern\t**text\n4c\tla\n*-\t*-");
    let syllable = file.line(1).unwrap().fields()[1];
    file.set_token_text(syllable, "4lo").unwrap();
    assert!(file.is_analyzed());
    assert_eq!(file[syllable].duration(), None);
}

#[test]
fn test_edit_to_terminator_needs_analysis() {
    let mut file = HumdrumFile::parse("**kern\t**kern\n*\t*\n4c\t4e\n*-\t*-");
    let interp = file.line(1).unwrap().fields()[1];
    file.set_token_text(interp, "*-").unwrap();
    assert!(!file.is_analyzed());

    file.analyze();
    assert!(!file.is_valid());
    let codes: Vec<&str> = file.diagnostics().errors().map(|d| d.code()).collect();
    assert!(codes.contains(&"column_count"), "{:?}", codes);
}

#[test]
fn test_bad_edits_are_rejected() {
    let mut file = HumdrumFile::parse("**kern\n4c\n*-");
    let c = file.line(1).unwrap().fields()[0];

    assert!(matches!(
        file.set_token_text(c, "4c\n4d"),
        Err(HumdrumError::SeparatorInText(_))
    ));
    assert_eq!(file.append_line("4d\n4e"), Err(HumdrumError::MultilineInput));
    assert_eq!(
        file.insert_line(10, "4d"),
        Err(HumdrumError::LineOutOfRange { index: 10, count: 3 })
    );
    assert!(file.is_analyzed());
}

#[test]
fn test_shared_reads_and_exclusive_edits() {
    let file = Arc::new(RwLock::new(HumdrumFile::parse("**kern\n4c\n*-")));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let file = Arc::clone(&file);
            thread::spawn(move || {
                let guard = file.read().unwrap();
                guard.max_track()
            })
        })
        .collect();
    for reader in readers {
        assert_eq!(reader.join().unwrap(), 1);
    }

    {
        let mut guard = file.write().unwrap();
        guard.insert_line(2, "4d").unwrap();
        guard.analyze();
    }
    assert_eq!(file.read().unwrap().total_duration(), HumNum::from_integer(2));
}
