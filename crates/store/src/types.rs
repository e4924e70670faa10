use contextionary_protocol::{ContextId, DocumentId, PhraseId};
use serde::{Deserialize, Serialize};

/// A taxonomy node as persisted: parent link plus serialized children ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRecord {
    pub id: ContextId,
    /// `None` for the root
    pub parent_id: Option<ContextId>,
    pub name: String,
    /// Empty for independent (leaf) contexts
    #[serde(default)]
    pub children: Vec<ContextId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseRecord {
    pub id: PhraseId,
    pub text: String,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub context_id: ContextId,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseOriginRecord {
    pub phrase_id: PhraseId,
    pub document_id: DocumentId,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseMeaningRecord {
    pub phrase_id: PhraseId,
    pub context_id: ContextId,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseFlagRecord {
    pub phrase_id: PhraseId,
    pub red_flag: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseVectorRecord {
    pub phrase_id: PhraseId,
    pub context_id: ContextId,
    pub relative_frequency: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextAxisRecord {
    pub context_id: ContextId,
    pub independent_context_id: ContextId,
    pub coordinate: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseDistanceRecord {
    pub phrase_id: PhraseId,
    pub context_id: ContextId,
    pub distance: f64,
}

/// Membership of a phrase in a context's lexical set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextPhraseRecord {
    pub context_id: ContextId,
    pub phrase_id: PhraseId,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedPhraseRecord {
    pub context_id: ContextId,
    pub phrase_id: PhraseId,
    pub related_phrase_id: PhraseId,
    pub bonding_index: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseWeightRecord {
    pub phrase_id: PhraseId,
    pub context_id: ContextId,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedWordRecord {
    pub phrase_id: PhraseId,
    pub sibling_id: PhraseId,
    pub shared_word: String,
    pub position_in_phrase: usize,
    pub position_in_sibling: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSpellingRecord {
    pub context_id: ContextId,
    pub similar_context_id: ContextId,
    pub edits: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseSpellingRecord {
    pub phrase_id: PhraseId,
    pub similar_phrase_id: PhraseId,
    pub edits: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseFrequencyDistanceRecord {
    pub phrase_id: PhraseId,
    pub context_id: ContextId,
    pub relative_frequency: f64,
    pub distance: f64,
    /// 1 (common) ..= 4 (rare)
    pub difficulty: u8,
}
