use crate::bonding::RelatedPhrases;
use crate::config::{ModelConfig, CROSS_PRESENCE_SIGNIFICANCE};
use crate::error::{ModelError, Result};
use crate::taxonomy::Taxonomy;
use contextionary_protocol::{ContextId, DocumentId, PhraseId};
use contextionary_store::{
    ContextionaryStore, DocumentRecord, PhraseFlagRecord, PhraseMeaningRecord, PhraseOriginRecord,
    PhraseRecord,
};
use contextionary_text::is_red_flagged;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A catalog phrase with its per-context statistics.
///
/// Per-context vectors are indexed by the context's regular index.
#[derive(Debug, Clone, PartialEq)]
pub struct Phrase {
    pub id: PhraseId,
    pub text: String,
    pub length: usize,

    /// Position in the catalog (row of every phrase matrix)
    pub index: usize,

    pub count_by_context: Vec<u64>,
    pub documents_by_context: Vec<BTreeSet<DocumentId>>,

    /// False when the phrase is a fragment (red-flagged)
    pub valid: bool,

    pub cross_presence: Vec<bool>,

    /// Filled by the bonding stage
    pub related_by_context: BTreeMap<ContextId, RelatedPhrases>,
}

impl Phrase {
    pub fn red_flag(&self) -> bool {
        !self.valid
    }

    pub fn count_at(&self, context_idx: usize) -> u64 {
        self.count_by_context[context_idx]
    }

    pub fn is_cross_present(&self, context_idx: usize) -> bool {
        self.cross_presence[context_idx]
    }
}

/// Frequency-filtered phrases in ascending id order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhraseCatalog {
    phrases: Vec<Phrase>,
    by_id: HashMap<PhraseId, usize>,
    by_text: HashMap<String, usize>,
}

/// Per-context raw rows for one phrase, before propagation
#[derive(Default)]
struct RawRows {
    counts: Vec<(usize, u64)>,
    documents: Vec<(usize, DocumentId)>,
}

impl PhraseCatalog {
    pub fn load<S: ContextionaryStore + ?Sized>(
        store: &S,
        taxonomy: &Taxonomy,
        config: &ModelConfig,
    ) -> Result<Self> {
        Self::build(
            taxonomy,
            &store.phrases()?,
            &store.documents()?,
            &store.phrase_origins()?,
            &store.phrase_meanings()?,
            config,
        )
    }

    pub fn build(
        taxonomy: &Taxonomy,
        phrases: &[PhraseRecord],
        documents: &[DocumentRecord],
        origins: &[PhraseOriginRecord],
        meanings: &[PhraseMeaningRecord],
        config: &ModelConfig,
    ) -> Result<Self> {
        // Phase 1: admission by global occurrence count
        let mut totals: HashMap<PhraseId, u64> = HashMap::new();
        let mut raw: HashMap<PhraseId, RawRows> = HashMap::new();
        for meaning in meanings {
            let context_idx = taxonomy.index_of(meaning.context_id).ok_or_else(|| {
                ModelError::dangling(format!(
                    "phrase meaning references unknown context {}",
                    meaning.context_id
                ))
            })?;
            *totals.entry(meaning.phrase_id).or_insert(0) += meaning.count;
            raw.entry(meaning.phrase_id)
                .or_default()
                .counts
                .push((context_idx, meaning.count));
        }

        let mut admitted: Vec<&PhraseRecord> = phrases
            .iter()
            .filter(|p| p.length <= config.phrase_length)
            .filter(|p| totals.get(&p.id).copied().unwrap_or(0) >= config.min_phrase_frequency)
            .collect();
        admitted.sort_by_key(|p| p.id);

        // Phase 2: origin documents resolved to their contexts
        let document_contexts: HashMap<DocumentId, usize> = documents
            .iter()
            .map(|d| {
                taxonomy
                    .index_of(d.context_id)
                    .map(|idx| (d.id, idx))
                    .ok_or_else(|| {
                        ModelError::dangling(format!(
                            "document {} references unknown context {}",
                            d.id, d.context_id
                        ))
                    })
            })
            .collect::<Result<_>>()?;
        for origin in origins {
            let context_idx = *document_contexts.get(&origin.document_id).ok_or_else(|| {
                ModelError::dangling(format!(
                    "phrase origin references unknown document {}",
                    origin.document_id
                ))
            })?;
            if origin.count > 0 {
                raw.entry(origin.phrase_id)
                    .or_default()
                    .documents
                    .push((context_idx, origin.document_id));
            }
        }

        // Phase 3: propagate and flag, one phrase per task
        let descendants: Vec<Vec<usize>> = taxonomy
            .contexts()
            .iter()
            .map(|c| {
                c.independent_descendants
                    .iter()
                    .filter_map(|&id| taxonomy.index_of(id))
                    .collect()
            })
            .collect();
        let empty = RawRows::default();

        let phrases: Vec<Phrase> = admitted
            .par_iter()
            .enumerate()
            .map(|(index, record)| {
                let rows = raw.get(&record.id).unwrap_or(&empty);
                build_phrase(taxonomy, &descendants, record, index, rows)
            })
            .collect();

        let by_id = phrases.iter().map(|p| (p.id, p.index)).collect();
        let mut by_text = HashMap::with_capacity(phrases.len());
        for phrase in &phrases {
            by_text.entry(phrase.text.clone()).or_insert(phrase.index);
        }

        let flagged = phrases.iter().filter(|p| p.red_flag()).count();
        if phrases.is_empty() {
            log::warn!(
                "No phrase reaches the minimum frequency {}; catalog is empty",
                config.min_phrase_frequency
            );
        }
        log::info!(
            "Phrase catalog: {} of {} phrases admitted ({} red-flagged)",
            phrases.len(),
            totals.len(),
            flagged
        );

        Ok(Self {
            phrases,
            by_id,
            by_text,
        })
    }

    pub fn phrases(&self) -> &[Phrase] {
        &self.phrases
    }

    pub(crate) fn phrases_mut(&mut self) -> &mut [Phrase] {
        &mut self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Phrase> {
        self.phrases.get(index)
    }

    pub fn index_of(&self, id: PhraseId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn find_by_text(&self, text: &str) -> Option<&Phrase> {
        self.by_text.get(text).map(|&idx| &self.phrases[idx])
    }

    /// Whether the phrase may enter a lexical set
    pub fn is_eligible(&self, index: usize, config: &ModelConfig) -> bool {
        !(config.exclude_red_flagged && self.phrases[index].red_flag())
    }

    pub fn flag_records(&self) -> Vec<PhraseFlagRecord> {
        self.phrases
            .iter()
            .map(|p| PhraseFlagRecord {
                phrase_id: p.id,
                red_flag: p.red_flag(),
            })
            .collect()
    }
}

fn build_phrase(
    taxonomy: &Taxonomy,
    descendants: &[Vec<usize>],
    record: &PhraseRecord,
    index: usize,
    rows: &RawRows,
) -> Phrase {
    let contexts = taxonomy.contexts();

    let mut counts = vec![0u64; contexts.len()];
    for &(context_idx, count) in &rows.counts {
        counts[context_idx] += count;
        if contexts[context_idx].independent {
            for &ancestor in taxonomy.ancestor_indices(context_idx) {
                counts[ancestor] += count;
            }
        }
    }

    // Independent sets per context, never one shared container
    let mut documents: Vec<BTreeSet<DocumentId>> = vec![BTreeSet::new(); contexts.len()];
    for &(context_idx, document_id) in &rows.documents {
        documents[context_idx].insert(document_id);
        for &ancestor in taxonomy.ancestor_indices(context_idx) {
            documents[ancestor].insert(document_id);
        }
    }

    let cross_presence = contexts
        .iter()
        .enumerate()
        .map(|(idx, context)| {
            if counts[idx] == 0 {
                false
            } else if context.independent {
                true
            } else {
                let below = &descendants[idx];
                let present = below.iter().filter(|&&d| counts[d] > 0).count();
                !below.is_empty()
                    && present as f64 / below.len() as f64 > CROSS_PRESENCE_SIGNIFICANCE
            }
        })
        .collect();

    Phrase {
        id: record.id,
        text: record.text.clone(),
        length: record.length,
        index,
        count_by_context: counts,
        documents_by_context: documents,
        valid: !is_red_flagged(&record.text),
        cross_presence,
        related_by_context: BTreeMap::new(),
    }
}
