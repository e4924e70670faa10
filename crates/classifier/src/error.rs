use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClassifierError>;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Tokenizer error: {0}")]
    Text(#[from] contextionary_text::TextError),

    #[error("Model error: {0}")]
    Model(#[from] contextionary_model::ModelError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
