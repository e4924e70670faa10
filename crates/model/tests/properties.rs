use contextionary_model::bonding::bonding_scores;
use contextionary_model::percentile::percentile;
use contextionary_model::vector_space::projection_distances;
use contextionary_model::{ModelBuilder, ModelConfig};
use contextionary_store::{MemoryStore, SourceRelations};
use ndarray::Array2;
use proptest::prelude::*;
use std::collections::BTreeSet;

const TEXTS: [&str; 6] = [
    "water polo",
    "goal",
    "painting",
    "gallery",
    "opera house",
    "ticket",
];

fn matrix(rows: usize, cols: usize, values: Vec<f64>) -> Array2<f64> {
    Array2::from_shape_vec((rows, cols), values).unwrap()
}

/// Root 1 with leaves 2, 3, 4; documents 10..16, two per leaf
fn corpus(occurrences: &[(usize, u32, u64)]) -> SourceRelations {
    let mut source = SourceRelations::default();
    source.add_context(1, None, "Root");
    source.add_context(2, Some(1), "Sports");
    source.add_context(3, Some(1), "Arts");
    source.add_context(4, Some(1), "Music");
    source.link_children();
    for document in 10..16u32 {
        source.add_document(document, 2 + (document - 10) / 2, "doc");
    }
    for &(text, document, count) in occurrences {
        source
            .record_occurrence(TEXTS[text], document, count)
            .unwrap();
    }
    source
}

proptest! {
    #[test]
    fn distances_are_non_negative(
        vectors in prop::collection::vec(0.0f64..1.0, 12),
        axes in prop::collection::vec(0u8..2, 9),
    ) {
        let vectors = matrix(4, 3, vectors);
        let axes = matrix(3, 3, axes.into_iter().map(f64::from).collect());
        let distances = projection_distances(&vectors, &axes);
        prop_assert!(distances.iter().all(|&d| d >= 0.0 && d.is_finite()));
    }

    #[test]
    fn collinear_vectors_have_zero_distance(
        scale in 0.0f64..10.0,
        axis in prop::collection::vec(0u8..2, 1..9),
    ) {
        let dim = axis.len();
        let axis: Vec<f64> = axis.into_iter().map(f64::from).collect();
        let vector: Vec<f64> = axis.iter().map(|x| x * scale).collect();
        let distances = projection_distances(&matrix(1, dim, vector), &matrix(1, dim, axis));
        prop_assert!(distances[[0, 0]] < 1e-12);
    }

    #[test]
    fn bonding_is_symmetric_and_bounded(
        sets in prop::collection::vec(prop::collection::btree_set(0u32..8, 0..5), 1..6),
    ) {
        let refs: Vec<&BTreeSet<u32>> = sets.iter().collect();
        let scores = bonding_scores(&refs);
        for (row, row_scores) in scores.iter().enumerate() {
            for &(col, score) in row_scores {
                prop_assert!((0.0..=1.0).contains(&score));
                let mirrored = scores[col].iter().find(|&&(c, _)| c == row).map(|&(_, s)| s);
                prop_assert_eq!(mirrored, Some(score));
            }
        }
    }

    #[test]
    fn percentile_stays_within_sample(
        values in prop::collection::vec(-100.0f64..100.0, 1..30),
        p in 0.0f64..=100.0,
    ) {
        let result = percentile(&values, p);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(result >= min - 1e-9 && result <= max + 1e-9);
    }

    #[test]
    fn built_models_respect_invariants(
        occurrences in prop::collection::vec((0usize..6, 10u32..16, 1u64..20), 1..25),
    ) {
        let mut store = MemoryStore::from_source(corpus(&occurrences));
        let config = ModelConfig { min_phrase_frequency: 1, ..ModelConfig::default() };
        let model = ModelBuilder::new(&mut store, config).build().unwrap();
        let taxonomy = &model.taxonomy;

        // leaves own exactly their coordinate, the root owns all
        for context in taxonomy.contexts() {
            let ones = context.axis.iter().filter(|&&x| x == 1).count();
            match context.independent_index {
                Some(k) => {
                    prop_assert_eq!(ones, 1);
                    prop_assert_eq!(context.axis[k], 1);
                }
                None => {
                    prop_assert_eq!(ones, taxonomy.dimension());
                }
            }
        }

        for phrase in model.catalog.phrases() {
            for (j, leaf) in taxonomy.independent_contexts().enumerate() {
                if leaf.phrase_count(phrase.length) == 0 {
                    prop_assert_eq!(model.space.phrase_vectors[[phrase.index, j]], 0.0);
                }
            }
            for c in 0..taxonomy.len() {
                let weight = model.weights.weight(phrase.index, c);
                prop_assert!((0.0..=1.0).contains(&weight));
                if taxonomy.contexts()[c].lexical_set.contains_key(&phrase.index) {
                    prop_assert_eq!(weight, 1.0);
                }
                prop_assert!(model.space.distance(phrase.index, c) >= 0.0);
            }
        }
    }
}
