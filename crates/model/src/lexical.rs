use crate::catalog::PhraseCatalog;
use crate::config::ModelConfig;
use crate::percentile::percentile;
use crate::taxonomy::Taxonomy;
use crate::vector_space::VectorSpace;
use contextionary_store::ContextPhraseRecord;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Derives lexical sets and, in [`crate::bonding`], the related-phrase networks.
#[derive(Debug, Clone, Copy)]
pub struct LexicalSetEngine<'a> {
    pub(crate) config: &'a ModelConfig,
}

/// Boundary and members of one context's lexical set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexicalSet {
    pub boundary: f64,
    /// Catalog index → distance
    pub members: BTreeMap<usize, f64>,
}

impl<'a> LexicalSetEngine<'a> {
    pub fn new(config: &'a ModelConfig) -> Self {
        Self { config }
    }

    /// Fill `lexical_boundary` and `lexical_set` of every context.
    pub fn derive_lexical_sets(
        &self,
        taxonomy: &mut Taxonomy,
        catalog: &PhraseCatalog,
        space: &VectorSpace,
    ) {
        let sets: Vec<LexicalSet> = {
            let taxonomy = &*taxonomy;
            (0..taxonomy.len())
                .into_par_iter()
                .map(|c| self.lexical_set(taxonomy, catalog, space, c))
                .collect()
        };

        let mut members = 0usize;
        for (context, set) in taxonomy.contexts_mut().iter_mut().zip(sets) {
            log::debug!(
                "Context {} ({}): boundary {:.6}, {} lexical phrases",
                context.id,
                context.name,
                set.boundary,
                set.members.len()
            );
            members += set.members.len();
            context.lexical_boundary = set.boundary;
            context.lexical_set = set.members;
        }
        log::info!(
            "Lexical sets: {} memberships over {} contexts",
            members,
            taxonomy.len()
        );
    }

    /// Lexical set of the context at `context_idx`.
    ///
    /// Independent contexts keep cross-present phrases within the distance
    /// boundary. Dependent contexts keep cross-present phrases that no
    /// ancestor claims, so a phrase lands on its most specific topic only.
    pub fn lexical_set(
        &self,
        taxonomy: &Taxonomy,
        catalog: &PhraseCatalog,
        space: &VectorSpace,
        context_idx: usize,
    ) -> LexicalSet {
        let context = &taxonomy.contexts()[context_idx];
        let observed: Vec<f64> = catalog
            .phrases()
            .iter()
            .filter(|p| p.count_at(context_idx) > 0)
            .map(|p| space.distance(p.index, context_idx))
            .collect();
        let boundary = percentile(&observed, self.config.distance_percentile);

        let ancestors = taxonomy.ancestor_indices(context_idx);
        let members = catalog
            .phrases()
            .iter()
            .filter(|p| p.is_cross_present(context_idx))
            .filter(|p| catalog.is_eligible(p.index, self.config))
            .filter(|p| {
                if context.independent {
                    space.distance(p.index, context_idx) <= boundary
                } else {
                    !ancestors.iter().any(|&a| p.is_cross_present(a))
                }
            })
            .map(|p| (p.index, space.distance(p.index, context_idx)))
            .collect();

        LexicalSet { boundary, members }
    }
}

pub fn lexical_records(taxonomy: &Taxonomy, catalog: &PhraseCatalog) -> Vec<ContextPhraseRecord> {
    taxonomy
        .contexts()
        .iter()
        .flat_map(|context| {
            context
                .lexical_set
                .iter()
                .map(move |(&p, &distance)| ContextPhraseRecord {
                    context_id: context.id,
                    phrase_id: catalog.phrases()[p].id,
                    distance,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use contextionary_store::SourceRelations;
    use pretty_assertions::assert_eq;

    /// Root 1 → Science 2 → {Physics 3, Chemistry 4}; Root 1 → Music 5
    fn build(source: &SourceRelations, config: &ModelConfig) -> (Taxonomy, PhraseCatalog) {
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
            config,
        )
        .unwrap();
        let space = VectorSpace::build(&taxonomy, &catalog);
        LexicalSetEngine::new(config).derive_lexical_sets(&mut taxonomy, &catalog, &space);
        (taxonomy, catalog)
    }

    fn source() -> SourceRelations {
        let mut source = SourceRelations::default();
        source.add_context(1, None, "Root");
        source.add_context(2, Some(1), "Science");
        source.add_context(3, Some(2), "Physics");
        source.add_context(4, Some(2), "Chemistry");
        source.add_context(5, Some(1), "Music");
        source.link_children();
        source.add_document(30, 3, "optics");
        source.add_document(40, 4, "reactions");
        source.add_document(50, 5, "symphony");
        source
    }

    fn members(taxonomy: &Taxonomy, catalog: &PhraseCatalog, id: u32) -> Vec<String> {
        taxonomy
            .get(id)
            .unwrap()
            .lexical_set
            .keys()
            .map(|&p| catalog.phrases()[p].text.clone())
            .collect()
    }

    #[test]
    fn test_independent_context_keeps_closest_phrases() {
        let mut source = source();
        source.record_occurrence("photon", 30, 10).unwrap();
        source.record_occurrence("laboratory", 30, 5).unwrap();
        source.record_occurrence("laboratory", 40, 5).unwrap();
        let config = ModelConfig {
            min_phrase_frequency: 1,
            ..ModelConfig::default()
        };
        let (taxonomy, catalog) = build(&source, &config);

        // photon lies on the Physics axis, laboratory does not
        assert_eq!(members(&taxonomy, &catalog, 3), vec!["photon"]);
        // distances in Physics are 0 (photon) and 1 (laboratory)
        assert!((taxonomy.get(3).unwrap().lexical_boundary - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_dependent_context_takes_unclaimed_shared_phrases() {
        let mut source = source();
        source.record_occurrence("laboratory", 30, 5).unwrap();
        source.record_occurrence("laboratory", 40, 5).unwrap();
        source.record_occurrence("melody", 50, 10).unwrap();
        let config = ModelConfig {
            min_phrase_frequency: 1,
            ..ModelConfig::default()
        };
        let (taxonomy, catalog) = build(&source, &config);

        // both Science leaves carry it, and 2 of the root's 3 leaves is above the threshold
        let root = taxonomy.index_of(1).unwrap();
        let lab = catalog.find_by_text("laboratory").unwrap();
        assert!(lab.is_cross_present(root));
        assert_eq!(members(&taxonomy, &catalog, 2), Vec::<String>::new());
        assert_eq!(members(&taxonomy, &catalog, 1), vec!["laboratory"]);
        assert_eq!(members(&taxonomy, &catalog, 5), vec!["melody"]);
    }

    #[test]
    fn test_empty_context_has_zero_boundary() {
        let mut source = source();
        source.record_occurrence("photon", 30, 10).unwrap();
        let config = ModelConfig {
            min_phrase_frequency: 1,
            ..ModelConfig::default()
        };
        let (taxonomy, _) = build(&source, &config);
        let music = taxonomy.get(5).unwrap();
        assert_eq!(music.lexical_boundary, 0.0);
        assert!(music.lexical_set.is_empty());
    }

    #[test]
    fn test_red_flagged_phrase_never_joins() {
        let mut source = source();
        source.record_occurrence("of light", 30, 10).unwrap();
        let config = ModelConfig {
            min_phrase_frequency: 1,
            ..ModelConfig::default()
        };
        let (taxonomy, catalog) = build(&source, &config);
        assert!(members(&taxonomy, &catalog, 3).is_empty());
        assert_eq!(lexical_records(&taxonomy, &catalog), Vec::new());
    }
}
