//! # Contextionary Classifier
//!
//! Read-only consumer of a [`ModelSnapshot`](contextionary_model::ModelSnapshot):
//! ranks contexts for an input text and points at the words that drove each
//! selected context.
//!
//! ```text
//! Input text
//!     │
//!     ├──> Tokenizer         words + phrase table (length → phrase → count)
//!     │
//!     ├──> Scoring           Σ weight[phrase][context] × count
//!     │
//!     ├──> Top selection     distinct scores, ties at the cutoff included
//!     │
//!     └──> Keyword location  lexical phrases of each selected context
//!                            matched as contiguous word runs
//! ```

mod classifier;
mod config;
mod error;
mod locator;

pub use classifier::{select_top, Classifier};
pub use config::ClassifierConfig;
pub use error::{ClassifierError, Result};
pub use locator::locate;
