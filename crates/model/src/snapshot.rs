use crate::error::{ModelError, Result};
use crate::pipeline::Model;
use contextionary_protocol::{ContextId, PhraseId};
use contextionary_store::ContextionaryStore;
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotContext {
    pub id: ContextId,
    pub name: String,
    /// Snapshot phrase indices, ascending
    pub lexical_set: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotPhrase {
    pub id: PhraseId,
    pub text: String,
    pub length: usize,
}

/// Immutable view the classifier scores against.
///
/// Holds no interior mutability, so one snapshot can serve any number of
/// concurrent classifications.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSnapshot {
    contexts: Vec<SnapshotContext>,
    phrases: Vec<SnapshotPhrase>,
    by_text: HashMap<String, usize>,
    /// Phrases × contexts
    weights: Array2<f64>,
}

impl ModelSnapshot {
    pub fn from_model(model: &Model) -> Self {
        let contexts = model
            .taxonomy
            .contexts()
            .iter()
            .map(|c| SnapshotContext {
                id: c.id,
                name: c.name.clone(),
                lexical_set: c.lexical_set.keys().copied().collect(),
            })
            .collect();
        let phrases = model
            .catalog
            .phrases()
            .iter()
            .map(|p| SnapshotPhrase {
                id: p.id,
                text: p.text.clone(),
                length: p.length,
            })
            .collect();
        Self::assemble(contexts, phrases, model.weights.weights.clone())
    }

    /// Rebuild the view from the derived relations of a previous build.
    ///
    /// Only phrases that carry a weight or a lexical-set membership are kept;
    /// every other catalog phrase scores 0 everywhere anyway.
    pub fn from_store<S: ContextionaryStore + ?Sized>(store: &S) -> Result<Self> {
        let context_records = store.contexts()?;
        let weight_records = store.phrase_weights()?;
        let lexical_records = store.context_phrases()?;

        let context_index: HashMap<ContextId, usize> = context_records
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.id, idx))
            .collect();

        let referenced: BTreeSet<PhraseId> = weight_records
            .iter()
            .map(|w| w.phrase_id)
            .chain(lexical_records.iter().map(|r| r.phrase_id))
            .collect();
        let texts: HashMap<PhraseId, (String, usize)> = store
            .phrases()?
            .into_iter()
            .filter(|p| referenced.contains(&p.id))
            .map(|p| (p.id, (p.text, p.length)))
            .collect();

        let mut phrases = Vec::with_capacity(referenced.len());
        let mut phrase_index: HashMap<PhraseId, usize> = HashMap::with_capacity(referenced.len());
        for id in referenced {
            let (text, length) = texts.get(&id).cloned().ok_or_else(|| {
                ModelError::dangling(format!("derived relation references unknown phrase {id}"))
            })?;
            phrase_index.insert(id, phrases.len());
            phrases.push(SnapshotPhrase { id, text, length });
        }

        let resolve_context = |id: ContextId| {
            context_index.get(&id).copied().ok_or_else(|| {
                ModelError::dangling(format!("derived relation references unknown context {id}"))
            })
        };

        let mut weights = Array2::<f64>::zeros((phrases.len(), context_records.len()));
        for record in &weight_records {
            let c = resolve_context(record.context_id)?;
            weights[[phrase_index[&record.phrase_id], c]] = record.weight;
        }

        let mut lexical_sets: BTreeMap<usize, BTreeSet<usize>> = BTreeMap::new();
        for record in &lexical_records {
            let c = resolve_context(record.context_id)?;
            lexical_sets
                .entry(c)
                .or_default()
                .insert(phrase_index[&record.phrase_id]);
        }

        let contexts = context_records
            .into_iter()
            .enumerate()
            .map(|(idx, c)| SnapshotContext {
                id: c.id,
                name: c.name,
                lexical_set: lexical_sets
                    .remove(&idx)
                    .map(|set| set.into_iter().collect())
                    .unwrap_or_default(),
            })
            .collect();

        let snapshot = Self::assemble(contexts, phrases, weights);
        log::info!(
            "Loaded model snapshot: {} contexts, {} phrases",
            snapshot.contexts.len(),
            snapshot.phrases.len()
        );
        Ok(snapshot)
    }

    fn assemble(
        contexts: Vec<SnapshotContext>,
        phrases: Vec<SnapshotPhrase>,
        weights: Array2<f64>,
    ) -> Self {
        let mut by_text = HashMap::with_capacity(phrases.len());
        for (idx, phrase) in phrases.iter().enumerate() {
            by_text.entry(phrase.text.clone()).or_insert(idx);
        }
        Self {
            contexts,
            phrases,
            by_text,
            weights,
        }
    }

    pub fn contexts(&self) -> &[SnapshotContext] {
        &self.contexts
    }

    pub fn phrases(&self) -> &[SnapshotPhrase] {
        &self.phrases
    }

    pub fn phrase_index(&self, text: &str) -> Option<usize> {
        self.by_text.get(text).copied()
    }

    pub fn weight(&self, phrase_idx: usize, context_idx: usize) -> f64 {
        self.weights[[phrase_idx, context_idx]]
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }
}
