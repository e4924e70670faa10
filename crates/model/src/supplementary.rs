//! Optional relations over the lexical vocabulary: shared words, spelling
//! similarity of context names and phrases, and a frequency/distance profile.

use crate::catalog::PhraseCatalog;
use crate::config::ModelConfig;
use crate::taxonomy::Taxonomy;
use crate::vector_space::{relative_frequency, VectorSpace};
use contextionary_store::{
    ContextSpellingRecord, PhraseFrequencyDistanceRecord, PhraseSpellingRecord, SharedWordRecord,
};
use contextionary_text::phrase_tokens;
use rayon::prelude::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplementaryRelations {
    pub shared_words: Vec<SharedWordRecord>,
    pub context_spelling: Vec<ContextSpellingRecord>,
    pub phrase_spelling: Vec<PhraseSpellingRecord>,
    pub frequency_distance: Vec<PhraseFrequencyDistanceRecord>,
}

impl SupplementaryRelations {
    pub fn build(
        taxonomy: &Taxonomy,
        catalog: &PhraseCatalog,
        space: &VectorSpace,
        config: &ModelConfig,
    ) -> Self {
        let lexical = lexical_vocabulary(taxonomy);
        let relations = Self {
            shared_words: shared_words(catalog, &lexical),
            context_spelling: context_spelling(taxonomy, config.spelling_similarity_max_edits),
            phrase_spelling: phrase_spelling(
                catalog,
                &lexical,
                config.spelling_similarity_max_edits,
            ),
            frequency_distance: frequency_distance(taxonomy, catalog, space, &lexical),
        };
        log::info!(
            "Supplementary relations: {} shared words, {} similar contexts, {} similar phrases, {} profiles",
            relations.shared_words.len(),
            relations.context_spelling.len(),
            relations.phrase_spelling.len(),
            relations.frequency_distance.len()
        );
        relations
    }
}

/// Catalog indices present in any lexical set, ascending
fn lexical_vocabulary(taxonomy: &Taxonomy) -> Vec<usize> {
    taxonomy
        .contexts()
        .iter()
        .flat_map(|c| c.lexical_set.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// One record per distinct token shared by two multi-word phrases, with the
/// token's first position in each.
pub fn shared_words(catalog: &PhraseCatalog, lexical: &[usize]) -> Vec<SharedWordRecord> {
    let candidates: Vec<(usize, Vec<&str>)> = lexical
        .iter()
        .map(|&p| &catalog.phrases()[p])
        .filter(|p| p.length >= 2 && !p.red_flag())
        .map(|p| (p.index, phrase_tokens(&p.text)))
        .collect();

    candidates
        .par_iter()
        .enumerate()
        .flat_map_iter(|(i, (phrase_idx, tokens))| {
            let mut seen = BTreeSet::new();
            let distinct: Vec<(usize, &str)> = tokens
                .iter()
                .enumerate()
                .filter(|(_, token)| seen.insert(**token))
                .map(|(pos, token)| (pos, *token))
                .collect();

            candidates[i + 1..]
                .iter()
                .flat_map(move |(sibling_idx, sibling_tokens)| {
                    let distinct = distinct.clone();
                    distinct.into_iter().filter_map(move |(pos, token)| {
                        sibling_tokens
                            .iter()
                            .position(|t| *t == token)
                            .map(|sibling_pos| SharedWordRecord {
                                phrase_id: catalog.phrases()[*phrase_idx].id,
                                sibling_id: catalog.phrases()[*sibling_idx].id,
                                shared_word: token.to_string(),
                                position_in_phrase: pos,
                                position_in_sibling: sibling_pos,
                            })
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Ordered pairs of distinct contexts whose lower-cased names are close
pub fn context_spelling(taxonomy: &Taxonomy, max_edits: usize) -> Vec<ContextSpellingRecord> {
    let names: Vec<String> = taxonomy
        .contexts()
        .iter()
        .map(|c| c.name.to_lowercase())
        .collect();
    let contexts = taxonomy.contexts();

    (0..names.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let names = &names;
            (0..names.len()).filter(move |&j| j != i).filter_map(move |j| {
                let edits = levenshtein(&names[i], &names[j]);
                (edits <= max_edits).then(|| ContextSpellingRecord {
                    context_id: contexts[i].id,
                    similar_context_id: contexts[j].id,
                    edits,
                })
            })
        })
        .collect()
}

/// Ordered pairs of distinct lexical phrases (not red-flagged) with close spelling
pub fn phrase_spelling(
    catalog: &PhraseCatalog,
    lexical: &[usize],
    max_edits: usize,
) -> Vec<PhraseSpellingRecord> {
    let phrases: Vec<_> = lexical
        .iter()
        .map(|&p| &catalog.phrases()[p])
        .filter(|p| !p.red_flag())
        .collect();

    (0..phrases.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            let phrases = &phrases;
            (0..phrases.len()).filter(move |&j| j != i).filter_map(move |j| {
                let edits = levenshtein(&phrases[i].text, &phrases[j].text);
                (edits <= max_edits).then(|| PhraseSpellingRecord {
                    phrase_id: phrases[i].id,
                    similar_phrase_id: phrases[j].id,
                    edits,
                })
            })
        })
        .collect()
}

/// Relative frequency and distance of lexical phrases wherever they occur
pub fn frequency_distance(
    taxonomy: &Taxonomy,
    catalog: &PhraseCatalog,
    space: &VectorSpace,
    lexical: &[usize],
) -> Vec<PhraseFrequencyDistanceRecord> {
    lexical
        .par_iter()
        .flat_map_iter(|&p| {
            let phrase = &catalog.phrases()[p];
            taxonomy
                .contexts()
                .iter()
                .filter_map(move |context| {
                    let frequency = relative_frequency(taxonomy, phrase, context.regular_index);
                    (frequency > 0.0).then(|| PhraseFrequencyDistanceRecord {
                        phrase_id: phrase.id,
                        context_id: context.id,
                        relative_frequency: frequency,
                        distance: space.distance(p, context.regular_index),
                        difficulty: difficulty(frequency),
                    })
                })
        })
        .collect()
}

/// 1 (common) ..= 4 (rare), from occurrences per hundred thousand
pub fn difficulty(relative_frequency: f64) -> u8 {
    let index = relative_frequency * 100_000.0;
    if index >= 40.0 {
        1
    } else if index >= 20.0 {
        2
    } else if index >= 1.0 {
        3
    } else {
        4
    }
}

/// Character-level edit distance
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::LexicalSetEngine;
    use contextionary_store::SourceRelations;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("sport", "sports"), 1);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn test_difficulty_grades() {
        assert_eq!(difficulty(0.001), 1);
        assert_eq!(difficulty(0.0003), 2);
        assert_eq!(difficulty(0.00005), 3);
        assert_eq!(difficulty(0.000001), 4);
    }

    #[test]
    fn test_relations_over_lexical_vocabulary() {
        let mut source = SourceRelations::default();
        source.add_context(1, None, "Games");
        source.add_context(2, Some(1), "Sport");
        source.add_context(3, Some(1), "Sports");
        source.link_children();
        source.add_document(20, 2, "a");
        source.add_document(30, 3, "b");
        source.record_occurrence("water polo", 20, 10).unwrap();
        source.record_occurrence("polo shirt", 30, 10).unwrap();

        let config = ModelConfig {
            min_phrase_frequency: 1,
            supplementary_relations: true,
            ..ModelConfig::default()
        };
        let mut taxonomy = Taxonomy::from_records(&source.contexts).unwrap();
        taxonomy
            .attach_phrase_counts(&source.phrases, &source.phrase_meanings)
            .unwrap();
        let catalog = PhraseCatalog::build(
            &taxonomy,
            &source.phrases,
            &source.documents,
            &source.phrase_origins,
            &source.phrase_meanings,
            &config,
        )
        .unwrap();
        let space = VectorSpace::build(&taxonomy, &catalog);
        LexicalSetEngine::new(&config).derive_lexical_sets(&mut taxonomy, &catalog, &space);
        let relations = SupplementaryRelations::build(&taxonomy, &catalog, &space, &config);

        assert_eq!(
            relations.shared_words,
            vec![SharedWordRecord {
                phrase_id: 1,
                sibling_id: 2,
                shared_word: "polo".to_string(),
                position_in_phrase: 1,
                position_in_sibling: 0,
            }]
        );
        assert_eq!(
            relations.context_spelling,
            vec![
                ContextSpellingRecord {
                    context_id: 2,
                    similar_context_id: 3,
                    edits: 1
                },
                ContextSpellingRecord {
                    context_id: 3,
                    similar_context_id: 2,
                    edits: 1
                },
            ]
        );
        assert!(relations.phrase_spelling.is_empty());
        // each phrase is the only 2-gram of its leaf and half of the root's
        assert_eq!(relations.frequency_distance.len(), 4);
        assert!(relations.frequency_distance.iter().all(|r| r.difficulty == 1));
    }
}
