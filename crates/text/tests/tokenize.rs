use contextionary_text::{is_red_flagged, ClauseTokenizer, Tokenizer};
use pretty_assertions::assert_eq;

#[test]
fn sentence_case_and_acronyms() {
    let tokenized = ClauseTokenizer::new()
        .tokenize("NASA launched a probe. Probes travel far!", 3)
        .unwrap();
    assert_eq!(
        tokenized.words,
        vec!["NASA", "launched", "a", "probe", "probes", "travel", "far"]
    );
    // sentences bound n-grams just like clauses do
    assert_eq!(tokenized.count(2, "probe probes"), 0);
    assert_eq!(tokenized.count(3, "NASA launched a"), 1);
}

#[test]
fn phrase_table_lists_every_length() {
    let tokenized = ClauseTokenizer::new().tokenize("water polo", 3).unwrap();
    let rows: Vec<(usize, String, u32)> = tokenized
        .phrases()
        .map(|(length, phrase, count)| (length, phrase.to_string(), count))
        .collect();
    assert_eq!(
        rows,
        vec![
            (1, "polo".to_string(), 1),
            (1, "water".to_string(), 1),
            (2, "water polo".to_string(), 1),
        ]
    );
    assert_eq!(tokenized.sizes[&3], 0);
}

#[test]
fn fragments_are_flagged() {
    assert!(is_red_flagged("of two or"));
    assert!(is_red_flagged("the museum"));
    assert!(is_red_flagged("museum in"));
    assert!(is_red_flagged("x"));
    assert!(!is_red_flagged("grammatical construction"));
    assert!(!is_red_flagged("oil painting"));
}
