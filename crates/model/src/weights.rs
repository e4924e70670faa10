use crate::catalog::PhraseCatalog;
use crate::taxonomy::Taxonomy;
use crate::vector_space::{relative_frequency, VectorSpace};
use contextionary_store::PhraseWeightRecord;
use ndarray::{Array2, Zip};

/// Phrase × context relevance weights in `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMatrix {
    pub weights: Array2<f64>,
}

impl WeightMatrix {
    /// Lexical-set members weigh 1; every other phrase falls back to its
    /// relative frequency scaled by the largest phrase-vector entry.
    pub fn build(taxonomy: &Taxonomy, catalog: &PhraseCatalog, space: &VectorSpace) -> Self {
        let max_frequency = space.max_frequency();
        if max_frequency == 0.0 && !catalog.is_empty() {
            log::warn!("All phrase vectors are zero; fallback weights are 0");
        }

        let contexts = taxonomy.contexts();
        let phrases = catalog.phrases();
        let mut weights = Array2::<f64>::zeros((phrases.len(), contexts.len()));
        Zip::indexed(&mut weights).par_for_each(|(p, c), weight| {
            *weight = if contexts[c].lexical_set.contains_key(&p) {
                1.0
            } else if max_frequency > 0.0 {
                (relative_frequency(taxonomy, &phrases[p], c) / max_frequency).clamp(0.0, 1.0)
            } else {
                0.0
            };
        });

        log::info!(
            "Weight matrix: {} x {} ({} non-zero)",
            weights.nrows(),
            weights.ncols(),
            weights.iter().filter(|&&w| w != 0.0).count()
        );
        Self { weights }
    }

    pub fn weight(&self, phrase_idx: usize, context_idx: usize) -> f64 {
        self.weights[[phrase_idx, context_idx]]
    }

    /// Non-zero cells
    pub fn records(&self, taxonomy: &Taxonomy, catalog: &PhraseCatalog) -> Vec<PhraseWeightRecord> {
        self.weights
            .indexed_iter()
            .filter(|(_, weight)| **weight != 0.0)
            .map(|((p, c), &weight)| PhraseWeightRecord {
                phrase_id: catalog.phrases()[p].id,
                context_id: taxonomy.contexts()[c].id,
                weight,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelConfig;
    use crate::lexical::LexicalSetEngine;
    use contextionary_store::SourceRelations;

    #[test]
    fn test_members_weigh_one_and_others_scale() {
        let mut source = SourceRelations::default();
        source.add_context(1, None, "Human activity");
        source.add_context(2, Some(1), "Sports");
        source.add_context(3, Some(1), "Arts");
        source.link_children();
        source.add_document(20, 2, "match report");
        source.add_document(30, 3, "gallery notes");
        source.record_occurrence("stadium", 20, 8).unwrap();
        source.record_occurrence("ticket", 20, 2).unwrap();
        source.record_occurrence("ticket", 30, 2).unwrap();
        source.record_occurrence("canvas", 30, 8).unwrap();

        let config = ModelConfig {
            min_phrase_frequency: 1,
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
        let matrix = WeightMatrix::build(&taxonomy, &catalog, &space);

        let sports = taxonomy.index_of(2).unwrap();
        let stadium = catalog.find_by_text("stadium").unwrap().index;
        let ticket = catalog.find_by_text("ticket").unwrap().index;
        assert_eq!(matrix.weight(stadium, sports), 1.0);
        // ticket: 2/10 in Sports, max frequency 0.8
        assert!((matrix.weight(ticket, sports) - 0.25).abs() < 1e-12);
        assert!(matrix.weights.iter().all(|&w| (0.0..=1.0).contains(&w)));
        assert!(matrix
            .records(&taxonomy, &catalog)
            .iter()
            .all(|r| r.weight > 0.0));
    }
}
