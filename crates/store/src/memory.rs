use crate::error::{Result, StoreError};
use crate::store::{ContextionaryStore, DerivedRelation};
use crate::types::{
    ContextAxisRecord, ContextPhraseRecord, ContextRecord, ContextSpellingRecord, DocumentRecord,
    PhraseDistanceRecord, PhraseFlagRecord, PhraseFrequencyDistanceRecord, PhraseMeaningRecord,
    PhraseOriginRecord, PhraseRecord, PhraseSpellingRecord, PhraseVectorRecord,
    PhraseWeightRecord, RelatedPhraseRecord, SharedWordRecord,
};
use contextionary_protocol::{ContextId, DocumentId, PhraseId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const STORE_SCHEMA_VERSION: u32 = 1;

/// Relations owned by the ingestion side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRelations {
    pub contexts: Vec<ContextRecord>,
    pub phrases: Vec<PhraseRecord>,
    pub documents: Vec<DocumentRecord>,
    pub phrase_origins: Vec<PhraseOriginRecord>,
    pub phrase_meanings: Vec<PhraseMeaningRecord>,
}

/// Relations produced by a model build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedRelations {
    pub phrase_flags: Vec<PhraseFlagRecord>,
    pub phrase_vectors: Vec<PhraseVectorRecord>,
    pub context_axes: Vec<ContextAxisRecord>,
    pub phrase_distances: Vec<PhraseDistanceRecord>,
    pub context_phrases: Vec<ContextPhraseRecord>,
    pub related_phrases: Vec<RelatedPhraseRecord>,
    pub phrase_weights: Vec<PhraseWeightRecord>,
    #[serde(default)]
    pub shared_words: Vec<SharedWordRecord>,
    #[serde(default)]
    pub context_spelling: Vec<ContextSpellingRecord>,
    #[serde(default)]
    pub phrase_spelling: Vec<PhraseSpellingRecord>,
    #[serde(default)]
    pub phrase_frequency_distance: Vec<PhraseFrequencyDistanceRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedStore {
    schema_version: u32,
    source: SourceRelations,
    #[serde(default)]
    derived: DerivedRelations,
}

/// In-memory store, persisted as a single JSON document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    source: SourceRelations,
    derived: DerivedRelations,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_source(source: SourceRelations) -> Self {
        Self {
            source,
            derived: DerivedRelations::default(),
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading store from {:?}", path);
        let bytes = tokio::fs::read(path).await?;
        let persisted: PersistedStore = serde_json::from_slice(&bytes)?;
        if persisted.schema_version != STORE_SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema {
                expected: STORE_SCHEMA_VERSION,
                actual: persisted.schema_version,
            });
        }
        log::info!(
            "Loaded {} contexts, {} phrases, {} documents",
            persisted.source.contexts.len(),
            persisted.source.phrases.len(),
            persisted.source.documents.len()
        );
        Ok(Self {
            source: persisted.source,
            derived: persisted.derived,
        })
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let persisted = PersistedStore {
            schema_version: STORE_SCHEMA_VERSION,
            source: self.source.clone(),
            derived: self.derived.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&persisted)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        log::info!("Store saved to {:?}", path);
        Ok(())
    }

    #[must_use]
    pub const fn source(&self) -> &SourceRelations {
        &self.source
    }

    #[must_use]
    pub const fn derived(&self) -> &DerivedRelations {
        &self.derived
    }
}

impl SourceRelations {
    /// Add a context; children lists are rebuilt by [`Self::link_children`].
    pub fn add_context(&mut self, id: ContextId, parent_id: Option<ContextId>, name: &str) {
        self.contexts.push(ContextRecord {
            id,
            parent_id,
            name: name.to_string(),
            children: Vec::new(),
        });
    }

    /// Recompute every serialized children list from the parent links
    pub fn link_children(&mut self) {
        let mut children: BTreeMap<ContextId, Vec<ContextId>> = BTreeMap::new();
        for context in &self.contexts {
            if let Some(parent) = context.parent_id {
                children.entry(parent).or_default().push(context.id);
            }
        }
        for context in &mut self.contexts {
            context.children = children.remove(&context.id).unwrap_or_default();
        }
    }

    pub fn add_document(&mut self, id: DocumentId, context_id: ContextId, title: &str) {
        self.documents.push(DocumentRecord {
            id,
            context_id,
            title: title.to_string(),
        });
    }

    /// Record `count` occurrences of a phrase in a document, creating the
    /// phrase on first sight and keeping the per-context meaning count in
    /// step with the per-document origin count.
    pub fn record_occurrence(
        &mut self,
        text: &str,
        document_id: DocumentId,
        count: u64,
    ) -> Result<PhraseId> {
        let context_id = self
            .documents
            .iter()
            .find(|d| d.id == document_id)
            .map(|d| d.context_id)
            .ok_or_else(|| StoreError::NotFound(format!("document {document_id}")))?;

        let phrase_id = match self.phrases.iter().find(|p| p.text == text) {
            Some(phrase) => phrase.id,
            None => {
                let id = self.phrases.iter().map(|p| p.id).max().map_or(1, |max| max + 1);
                self.phrases.push(PhraseRecord {
                    id,
                    text: text.to_string(),
                    length: text.split_whitespace().count(),
                });
                id
            }
        };

        match self
            .phrase_origins
            .iter_mut()
            .find(|o| o.phrase_id == phrase_id && o.document_id == document_id)
        {
            Some(origin) => origin.count += count,
            None => self.phrase_origins.push(PhraseOriginRecord {
                phrase_id,
                document_id,
                count,
            }),
        }

        match self
            .phrase_meanings
            .iter_mut()
            .find(|m| m.phrase_id == phrase_id && m.context_id == context_id)
        {
            Some(meaning) => meaning.count += count,
            None => self.phrase_meanings.push(PhraseMeaningRecord {
                phrase_id,
                context_id,
                count,
            }),
        }

        Ok(phrase_id)
    }
}

impl ContextionaryStore for MemoryStore {
    fn contexts(&self) -> Result<Vec<ContextRecord>> {
        Ok(self.source.contexts.clone())
    }

    fn phrases(&self) -> Result<Vec<PhraseRecord>> {
        Ok(self.source.phrases.clone())
    }

    fn documents(&self) -> Result<Vec<DocumentRecord>> {
        Ok(self.source.documents.clone())
    }

    fn phrase_origins(&self) -> Result<Vec<PhraseOriginRecord>> {
        Ok(self.source.phrase_origins.clone())
    }

    fn phrase_meanings(&self) -> Result<Vec<PhraseMeaningRecord>> {
        Ok(self.source.phrase_meanings.clone())
    }

    fn phrase_weights(&self) -> Result<Vec<PhraseWeightRecord>> {
        Ok(self.derived.phrase_weights.clone())
    }

    fn context_phrases(&self) -> Result<Vec<ContextPhraseRecord>> {
        Ok(self.derived.context_phrases.clone())
    }

    fn related_phrases(&self) -> Result<Vec<RelatedPhraseRecord>> {
        Ok(self.derived.related_phrases.clone())
    }

    fn replace(&mut self, relation: DerivedRelation) -> Result<()> {
        log::debug!("Replacing {} ({} rows)", relation.name(), relation.len());
        let derived = &mut self.derived;
        match relation {
            DerivedRelation::PhraseFlags(rows) => derived.phrase_flags = rows,
            DerivedRelation::PhraseVectors(rows) => derived.phrase_vectors = rows,
            DerivedRelation::ContextAxes(rows) => derived.context_axes = rows,
            DerivedRelation::PhraseDistances(rows) => derived.phrase_distances = rows,
            DerivedRelation::ContextPhrases(rows) => derived.context_phrases = rows,
            DerivedRelation::RelatedPhrases(rows) => derived.related_phrases = rows,
            DerivedRelation::PhraseWeights(rows) => derived.phrase_weights = rows,
            DerivedRelation::SharedWords(rows) => derived.shared_words = rows,
            DerivedRelation::ContextSpelling(rows) => derived.context_spelling = rows,
            DerivedRelation::PhraseSpelling(rows) => derived.phrase_spelling = rows,
            DerivedRelation::PhraseFrequencyDistance(rows) => {
                derived.phrase_frequency_distance = rows;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_source() -> SourceRelations {
        let mut source = SourceRelations::default();
        source.add_context(1, None, "Human activity");
        source.add_context(2, Some(1), "Sports");
        source.add_context(3, Some(1), "Arts");
        source.link_children();
        source.add_document(10, 2, "pool report");
        source
    }

    #[test]
    fn link_children_follows_parent_links() {
        let source = sample_source();
        assert_eq!(source.contexts[0].children, vec![2, 3]);
        assert!(source.contexts[1].children.is_empty());
    }

    #[test]
    fn record_occurrence_accumulates_origin_and_meaning() {
        let mut source = sample_source();
        let first = source.record_occurrence("water polo", 10, 4).unwrap();
        let second = source.record_occurrence("water polo", 10, 6).unwrap();
        assert_eq!(first, second);
        assert_eq!(source.phrases[0].length, 2);
        assert_eq!(source.phrase_origins[0].count, 10);
        assert_eq!(
            source.phrase_meanings,
            vec![PhraseMeaningRecord {
                phrase_id: first,
                context_id: 2,
                count: 10
            }]
        );
    }

    #[test]
    fn record_occurrence_rejects_unknown_document() {
        let mut source = sample_source();
        assert!(matches!(
            source.record_occurrence("polo", 99, 1),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn replace_drops_previous_rows() {
        let mut store = MemoryStore::from_source(sample_source());
        store
            .replace(DerivedRelation::PhraseFlags(vec![
                PhraseFlagRecord {
                    phrase_id: 1,
                    red_flag: true,
                },
                PhraseFlagRecord {
                    phrase_id: 2,
                    red_flag: false,
                },
            ]))
            .unwrap();
        store
            .replace(DerivedRelation::PhraseFlags(vec![PhraseFlagRecord {
                phrase_id: 3,
                red_flag: false,
            }]))
            .unwrap();
        assert_eq!(store.derived().phrase_flags.len(), 1);
        assert_eq!(store.derived().phrase_flags[0].phrase_id, 3);
    }
}
