use thiserror::Error;

/// Result type for text processing operations
pub type Result<T> = std::result::Result<T, TextError>;

/// Errors that can occur while splitting text into phrases
#[derive(Error, Debug)]
pub enum TextError {
    /// Phrase length bound must allow at least single words
    #[error("Invalid phrase max length: {0} (must be >= 1)")]
    InvalidPhraseLength(usize),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
