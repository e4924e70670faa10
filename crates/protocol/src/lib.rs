use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const CLASSIFY_SCHEMA_VERSION: u32 = 1;

/// Placeholder the HTTP layer substitutes for spaces in path-encoded text.
pub const SPACE_PLACEHOLDER: char = '_';

pub type ContextId = u32;
pub type PhraseId = u32;
pub type DocumentId = u32;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct ClassifyRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phrase_max_length: Option<usize>,
}

impl ClassifyRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            top_count: None,
            phrase_max_length: None,
        }
    }

    /// Build a request from placeholder-encoded text (`water_polo_is_fun`).
    pub fn from_encoded(encoded: &str) -> Self {
        Self::new(decode_placeholder(encoded, SPACE_PLACEHOLDER))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ContextRank {
    pub context_id: ContextId,
    pub name: String,
    pub score: f64,
}

/// One lexical-set phrase of a selected context found verbatim in the input.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
pub struct KeywordRecord {
    pub context_id: ContextId,
    /// Running id, starting at 1 within each context.
    pub keyword_id: u32,
    /// Word positions (0-based) of every occurrence, one inner list per match.
    pub locations: Vec<Vec<usize>>,
    pub text: String,
    pub phrase_id: PhraseId,
}

impl KeywordRecord {
    /// Start position of each occurrence.
    pub fn starts(&self) -> Vec<usize> {
        self.locations
            .iter()
            .filter_map(|span| span.first().copied())
            .collect()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ClassifyResponse {
    pub schema_version: u32,
    pub contexts: Vec<ContextRank>,
    pub keywords: Vec<KeywordRecord>,
}

impl ClassifyResponse {
    pub fn new(contexts: Vec<ContextRank>, keywords: Vec<KeywordRecord>) -> Self {
        Self {
            schema_version: CLASSIFY_SCHEMA_VERSION,
            contexts,
            keywords,
        }
    }

    pub fn keywords_for(&self, context_id: ContextId) -> impl Iterator<Item = &KeywordRecord> {
        self.keywords
            .iter()
            .filter(move |k| k.context_id == context_id)
    }

    pub fn top_context(&self) -> Option<&ContextRank> {
        self.contexts.first()
    }
}

pub fn decode_placeholder(encoded: &str, placeholder: char) -> String {
    encoded.replace(placeholder, " ")
}
