//! # Contextionary Text
//!
//! Tokenization primitives consumed by the model builder and the classifier.
//!
//! ## Architecture
//!
//! ```text
//! Input text
//!     │
//!     ├──> Clause splitting (`,` `;` `(` and sentence bounds)
//!     │
//!     ├──> Word segmentation (UAX #29) + token filter + case folding
//!     │
//!     └──> Phrase table
//!          ├─> n-grams of length 1..=max, never crossing a clause
//!          └─> length → phrase → occurrence count
//! ```
//!
//! The closed-class word list in [`function_words`] decides whether a phrase
//! is a self-contained grammatical unit or a fragment.
//!
//! ## Example
//!
//! ```rust
//! use contextionary_text::{ClauseTokenizer, Tokenizer};
//!
//! let tokenized = ClauseTokenizer::new().tokenize("Water polo is fun.", 2).unwrap();
//! assert_eq!(tokenized.words, vec!["water", "polo", "is", "fun"]);
//! assert_eq!(tokenized.count(2, "water polo"), 1);
//! ```

mod error;
pub mod function_words;
mod tokenizer;

pub use error::{Result, TextError};
pub use function_words::{is_function_word, is_red_flagged, phrase_tokens};
pub use tokenizer::{ClauseTokenizer, PhraseCounts, TokenizedText, Tokenizer};
