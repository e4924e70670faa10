//! # Contextionary Store
//!
//! The storage contract shared by the model builder and the classifier.
//!
//! ## Relations
//!
//! ```text
//! source (ingestion-owned, read-only here)
//!     contexts ── phrases ── documents ── phrase_origins ── phrase_meanings
//!
//! derived (replaced wholesale by each build stage)
//!     phrase_flags        ← catalog
//!     phrase_vectors      ┐
//!     context_axes        ├ vector space
//!     phrase_distances    ┘
//!     context_phrases     ← lexical sets
//!     related_phrases     ← bonding network
//!     phrase_weights      ← weight matrix
//!     shared_words, context_spelling, phrase_spelling,
//!     phrase_frequency_distance ← supplementary relations
//! ```
//!
//! [`MemoryStore`] keeps every relation in memory and persists them as one
//! JSON document with a schema version.

mod error;
mod memory;
mod store;
mod types;

pub use error::{Result, StoreError};
pub use memory::{DerivedRelations, MemoryStore, SourceRelations, STORE_SCHEMA_VERSION};
pub use store::{ContextionaryStore, DerivedRelation};
pub use types::{
    ContextAxisRecord, ContextPhraseRecord, ContextRecord, ContextSpellingRecord, DocumentRecord,
    PhraseDistanceRecord, PhraseFlagRecord, PhraseFrequencyDistanceRecord, PhraseMeaningRecord,
    PhraseOriginRecord, PhraseRecord, PhraseSpellingRecord, PhraseVectorRecord,
    PhraseWeightRecord, RelatedPhraseRecord, SharedWordRecord,
};
