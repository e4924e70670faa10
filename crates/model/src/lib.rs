//! # Contextionary Model
//!
//! Builds the geometric topic model: every independent (leaf) context is a
//! basis axis, every phrase a frequency vector over those axes.
//!
//! ## Architecture
//!
//! ```text
//! Store (contexts, phrases, documents, origins, meanings)
//!     │
//!     ├──> Taxonomy        ancestor chains, independence, 0/1 axes
//!     │
//!     ├──> PhraseCatalog   propagated counts and documents, cross-presence, red flags
//!     │
//!     ├──> VectorSpace     phrase vectors, context axes, projection distances
//!     │
//!     ├──> LexicalSetEngine
//!     │        ├─> lexical sets (distance percentile, most specific topic)
//!     │        └─> bonding network (document Jaccard, per-phrase percentile)
//!     │
//!     ├──> WeightMatrix    1 for lexical phrases, scaled frequency otherwise
//!     │
//!     └──> ModelSnapshot   immutable view for the classifier
//! ```
//!
//! Stages run strictly in order through [`ModelBuilder`]; work inside a stage
//! is spread over rayon and collected in index order, so a rebuild from an
//! unchanged store is bit-identical.
//!
//! ## Example
//!
//! ```rust
//! use contextionary_model::{ModelBuilder, ModelConfig};
//! use contextionary_store::{MemoryStore, SourceRelations};
//!
//! let mut source = SourceRelations::default();
//! source.add_context(1, None, "Human activity");
//! source.add_context(2, Some(1), "Sports");
//! source.add_context(3, Some(1), "Arts");
//! source.link_children();
//! source.add_document(20, 2, "match report");
//! source.record_occurrence("water polo", 20, 10).unwrap();
//!
//! let mut store = MemoryStore::from_source(source);
//! let model = ModelBuilder::new(&mut store, ModelConfig::default()).build().unwrap();
//! assert_eq!(model.taxonomy.get(1).unwrap().axis, vec![1, 1]);
//! ```

pub mod bonding;
pub mod catalog;
pub mod config;
pub mod error;
pub mod lexical;
pub mod percentile;
pub mod pipeline;
pub mod snapshot;
pub mod supplementary;
pub mod taxonomy;
pub mod vector_space;
pub mod weights;

pub use bonding::{bonding_index, RelatedPhrases};
pub use catalog::{Phrase, PhraseCatalog};
pub use config::{ModelConfig, CROSS_PRESENCE_SIGNIFICANCE};
pub use error::{ModelError, Result, TaxonomyError};
pub use lexical::{LexicalSet, LexicalSetEngine};
pub use pipeline::{Model, ModelBuilder};
pub use snapshot::{ModelSnapshot, SnapshotContext, SnapshotPhrase};
pub use supplementary::SupplementaryRelations;
pub use taxonomy::{Context, Taxonomy};
pub use vector_space::VectorSpace;
pub use weights::WeightMatrix;
