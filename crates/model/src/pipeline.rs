use crate::bonding::related_records;
use crate::catalog::PhraseCatalog;
use crate::config::ModelConfig;
use crate::error::Result;
use crate::lexical::{lexical_records, LexicalSetEngine};
use crate::snapshot::ModelSnapshot;
use crate::supplementary::SupplementaryRelations;
use crate::taxonomy::Taxonomy;
use crate::vector_space::VectorSpace;
use crate::weights::WeightMatrix;
use contextionary_store::{ContextionaryStore, DerivedRelation};
use std::time::Instant;

/// Output of one full build
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub taxonomy: Taxonomy,
    pub catalog: PhraseCatalog,
    pub space: VectorSpace,
    pub weights: WeightMatrix,
    pub supplementary: Option<SupplementaryRelations>,
}

impl Model {
    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot::from_model(self)
    }
}

/// Runs the build stages in order against an explicit store handle.
///
/// Each stage consumes the complete output of the previous one and then
/// replaces the derived relations it owns.
pub struct ModelBuilder<'a, S: ContextionaryStore + ?Sized> {
    store: &'a mut S,
    config: ModelConfig,
}

impl<'a, S: ContextionaryStore + ?Sized> ModelBuilder<'a, S> {
    pub fn new(store: &'a mut S, config: ModelConfig) -> Self {
        Self { store, config }
    }

    pub fn build(self) -> Result<Model> {
        let Self { store, config } = self;
        config.validate()?;
        let started = Instant::now();

        // Stage 1: taxonomy
        let stage = Instant::now();
        let mut taxonomy = Taxonomy::load(&*store)?;
        log::info!("Taxonomy stage done in {} ms", stage.elapsed().as_millis());

        // Stage 2: phrase catalog
        let stage = Instant::now();
        let mut catalog = PhraseCatalog::load(&*store, &taxonomy, &config)?;
        store.replace(DerivedRelation::PhraseFlags(catalog.flag_records()))?;
        log::info!("Catalog stage done in {} ms", stage.elapsed().as_millis());

        // Stage 3: vectors, axes, distances
        let stage = Instant::now();
        let space = VectorSpace::build(&taxonomy, &catalog);
        store.replace(DerivedRelation::PhraseVectors(
            space.vector_records(&taxonomy, &catalog),
        ))?;
        store.replace(DerivedRelation::ContextAxes(space.axis_records(&taxonomy)))?;
        store.replace(DerivedRelation::PhraseDistances(
            space.distance_records(&taxonomy, &catalog),
        ))?;
        log::info!("Vector space stage done in {} ms", stage.elapsed().as_millis());

        // Stage 4: lexical sets, then the bonding network over them
        let stage = Instant::now();
        let engine = LexicalSetEngine::new(&config);
        engine.derive_lexical_sets(&mut taxonomy, &catalog, &space);
        store.replace(DerivedRelation::ContextPhrases(lexical_records(
            &taxonomy, &catalog,
        )))?;
        engine.derive_bonding(&taxonomy, &mut catalog);
        store.replace(DerivedRelation::RelatedPhrases(related_records(&catalog)))?;
        log::info!("Lexical set stage done in {} ms", stage.elapsed().as_millis());

        // Stage 5: weights
        let stage = Instant::now();
        let weights = WeightMatrix::build(&taxonomy, &catalog, &space);
        store.replace(DerivedRelation::PhraseWeights(
            weights.records(&taxonomy, &catalog),
        ))?;
        log::info!("Weight stage done in {} ms", stage.elapsed().as_millis());

        let supplementary = if config.supplementary_relations {
            let stage = Instant::now();
            let relations = SupplementaryRelations::build(&taxonomy, &catalog, &space, &config);
            store.replace(DerivedRelation::SharedWords(relations.shared_words.clone()))?;
            store.replace(DerivedRelation::ContextSpelling(
                relations.context_spelling.clone(),
            ))?;
            store.replace(DerivedRelation::PhraseSpelling(
                relations.phrase_spelling.clone(),
            ))?;
            store.replace(DerivedRelation::PhraseFrequencyDistance(
                relations.frequency_distance.clone(),
            ))?;
            log::info!(
                "Supplementary stage done in {} ms",
                stage.elapsed().as_millis()
            );
            Some(relations)
        } else {
            // a previous build may have left rows behind
            store.replace(DerivedRelation::SharedWords(Vec::new()))?;
            store.replace(DerivedRelation::ContextSpelling(Vec::new()))?;
            store.replace(DerivedRelation::PhraseSpelling(Vec::new()))?;
            store.replace(DerivedRelation::PhraseFrequencyDistance(Vec::new()))?;
            None
        };

        log::info!(
            "Model built: {} contexts, {} phrases in {} ms",
            taxonomy.len(),
            catalog.len(),
            started.elapsed().as_millis()
        );

        Ok(Model {
            taxonomy,
            catalog,
            space,
            weights,
            supplementary,
        })
    }
}
