use crate::error::Result;
use crate::types::{
    ContextAxisRecord, ContextPhraseRecord, ContextRecord, ContextSpellingRecord, DocumentRecord,
    PhraseDistanceRecord, PhraseFlagRecord, PhraseFrequencyDistanceRecord, PhraseMeaningRecord,
    PhraseOriginRecord, PhraseRecord, PhraseSpellingRecord, PhraseVectorRecord,
    PhraseWeightRecord, RelatedPhraseRecord, SharedWordRecord,
};

/// A derived relation together with its complete new contents.
///
/// Build stages never patch rows: they hand over the full relation and the
/// store drops whatever it held before.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedRelation {
    PhraseFlags(Vec<PhraseFlagRecord>),
    PhraseVectors(Vec<PhraseVectorRecord>),
    ContextAxes(Vec<ContextAxisRecord>),
    PhraseDistances(Vec<PhraseDistanceRecord>),
    ContextPhrases(Vec<ContextPhraseRecord>),
    RelatedPhrases(Vec<RelatedPhraseRecord>),
    PhraseWeights(Vec<PhraseWeightRecord>),
    SharedWords(Vec<SharedWordRecord>),
    ContextSpelling(Vec<ContextSpellingRecord>),
    PhraseSpelling(Vec<PhraseSpellingRecord>),
    PhraseFrequencyDistance(Vec<PhraseFrequencyDistanceRecord>),
}

impl DerivedRelation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PhraseFlags(_) => "phrase_flags",
            Self::PhraseVectors(_) => "phrase_vectors",
            Self::ContextAxes(_) => "context_axes",
            Self::PhraseDistances(_) => "phrase_distances",
            Self::ContextPhrases(_) => "context_phrases",
            Self::RelatedPhrases(_) => "related_phrases",
            Self::PhraseWeights(_) => "phrase_weights",
            Self::SharedWords(_) => "shared_words",
            Self::ContextSpelling(_) => "context_spelling",
            Self::PhraseSpelling(_) => "phrase_spelling",
            Self::PhraseFrequencyDistance(_) => "phrase_frequency_distance",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::PhraseFlags(rows) => rows.len(),
            Self::PhraseVectors(rows) => rows.len(),
            Self::ContextAxes(rows) => rows.len(),
            Self::PhraseDistances(rows) => rows.len(),
            Self::ContextPhrases(rows) => rows.len(),
            Self::RelatedPhrases(rows) => rows.len(),
            Self::PhraseWeights(rows) => rows.len(),
            Self::SharedWords(rows) => rows.len(),
            Self::ContextSpelling(rows) => rows.len(),
            Self::PhraseSpelling(rows) => rows.len(),
            Self::PhraseFrequencyDistance(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Storage handle passed explicitly into every build stage.
///
/// Source relations are read-only to the core; derived relations are read
/// back by the classifier and replaced wholesale by the builder.
pub trait ContextionaryStore: Send {
    fn contexts(&self) -> Result<Vec<ContextRecord>>;
    fn phrases(&self) -> Result<Vec<PhraseRecord>>;
    fn documents(&self) -> Result<Vec<DocumentRecord>>;
    fn phrase_origins(&self) -> Result<Vec<PhraseOriginRecord>>;
    fn phrase_meanings(&self) -> Result<Vec<PhraseMeaningRecord>>;

    fn phrase_weights(&self) -> Result<Vec<PhraseWeightRecord>>;
    fn context_phrases(&self) -> Result<Vec<ContextPhraseRecord>>;
    fn related_phrases(&self) -> Result<Vec<RelatedPhraseRecord>>;

    /// Delete every row of the relation and repopulate it
    fn replace(&mut self, relation: DerivedRelation) -> Result<()>;
}
