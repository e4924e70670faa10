use crate::error::{Result, TextError};
use std::collections::BTreeMap;
use unicode_segmentation::UnicodeSegmentation;

/// Phrase length → phrase text → occurrence count.
pub type PhraseCounts = BTreeMap<usize, BTreeMap<String, u32>>;

/// Output of the tokenizer collaborator for one input text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizedText {
    pub clauses: Vec<String>,

    /// Normalised tokens of every clause, in reading order
    pub words: Vec<String>,

    pub phrase_counts: PhraseCounts,

    /// Number of n-grams extracted per phrase length
    pub sizes: BTreeMap<usize, usize>,
}

impl TokenizedText {
    pub fn count(&self, length: usize, phrase: &str) -> u32 {
        self.phrase_counts
            .get(&length)
            .and_then(|phrases| phrases.get(phrase))
            .copied()
            .unwrap_or(0)
    }

    /// Iterate `(length, phrase, count)` tuples
    pub fn phrases(&self) -> impl Iterator<Item = (usize, &str, u32)> {
        self.phrase_counts.iter().flat_map(|(&length, phrases)| {
            phrases
                .iter()
                .map(move |(phrase, &count)| (length, phrase.as_str(), count))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Splits text into a word list and a phrase-count table.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str, phrase_max_length: usize) -> Result<TokenizedText>;
}

/// Default tokenizer: clause-bounded n-grams over UAX #29 words.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClauseTokenizer;

impl ClauseTokenizer {
    pub fn new() -> Self {
        Self
    }

    /// Commas, semicolons and opening parentheses close a clause like a full stop.
    pub fn split_clauses(text: &str) -> Vec<String> {
        let modified = text
            .replace(',', ". .")
            .replace(';', ". .")
            .replace('(', ". .");
        modified
            .unicode_sentences()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Word segments of a clause; hyphen-joined segments ("well-known")
    /// stay one word.
    pub fn split_words(clause: &str) -> Vec<String> {
        let mut tokens: Vec<String> = Vec::new();
        // the last token touches the next segment with no break in between
        let mut open = false;
        for segment in clause.split_word_bounds() {
            if open {
                if let Some(last) = tokens.last_mut() {
                    if segment == "-" {
                        last.push('-');
                        continue;
                    }
                    if last.ends_with('-') && is_word_segment(segment) {
                        last.push_str(segment);
                        continue;
                    }
                }
            }
            open = is_word_segment(segment);
            tokens.push(segment.to_string());
        }

        tokens
            .iter()
            .filter(|token| is_word(token))
            .map(|token| normalize_case(token))
            .collect()
    }
}

impl Tokenizer for ClauseTokenizer {
    fn tokenize(&self, text: &str, phrase_max_length: usize) -> Result<TokenizedText> {
        if phrase_max_length == 0 {
            return Err(TextError::InvalidPhraseLength(phrase_max_length));
        }

        let clauses = Self::split_clauses(text);
        let mut words = Vec::new();
        let mut phrase_counts: PhraseCounts = (1..=phrase_max_length)
            .map(|length| (length, BTreeMap::new()))
            .collect();
        let mut sizes: BTreeMap<usize, usize> =
            (1..=phrase_max_length).map(|length| (length, 0)).collect();

        for clause in &clauses {
            let clause_words = Self::split_words(clause);
            for length in 1..=phrase_max_length {
                let mut extracted = 0usize;
                let counter = phrase_counts.entry(length).or_default();
                for window in clause_words.windows(length) {
                    *counter.entry(window.join(" ")).or_insert(0) += 1;
                    extracted += 1;
                }
                *sizes.entry(length).or_insert(0) += extracted;
            }
            words.extend(clause_words);
        }

        log::debug!(
            "Tokenized {} clauses into {} words (max phrase length {})",
            clauses.len(),
            words.len(),
            phrase_max_length
        );

        Ok(TokenizedText {
            clauses,
            words,
            phrase_counts,
            sizes,
        })
    }
}

fn is_word_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_word(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !token.starts_with(['-', '_'])
        && !token.ends_with(['-', '_'])
}

/// Lower-case a word capitalised only because it opens a sentence; words
/// with further capitals ("NASA", "McDonald") stay case sensitive.
fn normalize_case(word: &str) -> String {
    let starts_upper = word.chars().next().is_some_and(char::is_uppercase);
    let upper_count = word.chars().filter(|c| c.is_uppercase()).count();
    if starts_upper && upper_count == 1 {
        word.to_lowercase()
    } else {
        word.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_word_filter() {
        assert!(is_word("polo"));
        assert!(is_word("x86_64"));
        assert!(!is_word("-x"));
        assert!(!is_word("x_"));
        assert!(!is_word("."));
        assert!(!is_word(" "));
        assert!(!is_word("café"));
    }

    #[test]
    fn test_case_normalisation() {
        assert_eq!(normalize_case("Water"), "water");
        assert_eq!(normalize_case("NASA"), "NASA");
        assert_eq!(normalize_case("McDonald"), "McDonald");
        assert_eq!(normalize_case("polo"), "polo");
    }

    #[test]
    fn test_clause_breaks() {
        let clauses = ClauseTokenizer::split_clauses("Pope and church, bishops; saints (relics)");
        let words: Vec<Vec<String>> = clauses
            .iter()
            .map(|c| ClauseTokenizer::split_words(c))
            .filter(|w| !w.is_empty())
            .collect();
        assert_eq!(
            words,
            vec![
                vec!["pope".to_string(), "and".to_string(), "church".to_string()],
                vec!["bishops".to_string()],
                vec!["saints".to_string()],
                vec!["relics".to_string()],
            ]
        );
    }

    #[test]
    fn test_ngrams_do_not_cross_clauses() {
        let tokenized = ClauseTokenizer::new()
            .tokenize("water polo, polo shirt", 2)
            .unwrap();
        assert_eq!(tokenized.count(1, "polo"), 2);
        assert_eq!(tokenized.count(2, "water polo"), 1);
        assert_eq!(tokenized.count(2, "polo polo"), 0);
        assert_eq!(tokenized.sizes[&1], 4);
        assert_eq!(tokenized.sizes[&2], 2);
    }

    #[test]
    fn test_hyphenated_words_stay_whole() {
        assert_eq!(
            ClauseTokenizer::split_words("A well-known state-of-the-art pool"),
            vec!["a", "well-known", "state-of-the-art", "pool"]
        );
        // dangling hyphens are not part of a word
        assert_eq!(
            ClauseTokenizer::split_words("pre- and post-match - talk"),
            vec!["and", "post-match", "talk"]
        );
    }

    #[test]
    fn test_zero_length_rejected() {
        assert!(ClauseTokenizer::new().tokenize("text", 0).is_err());
    }
}
