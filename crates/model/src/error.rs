use contextionary_protocol::ContextId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ModelError>;

/// Fatal problems in the context tree; no matrix is built past one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyError {
    #[error("Duplicate context id {0}")]
    DuplicateContext(ContextId),

    #[error("Context {context} references missing parent {parent}")]
    MissingParent { context: ContextId, parent: ContextId },

    #[error("Ancestor chain of context {0} never reaches a root (cycle)")]
    Cycle(ContextId),

    #[error("Context {context} lists children {listed:?} but {actual:?} name it as parent")]
    ChildMarkerMismatch {
        context: ContextId,
        listed: Vec<ContextId>,
        actual: Vec<ContextId>,
    },

    #[error("Taxonomy has no independent contexts")]
    NoIndependentContexts,
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Taxonomy error: {0}")]
    Taxonomy(#[from] TaxonomyError),

    #[error("Store error: {0}")]
    Store(#[from] contextionary_store::StoreError),

    #[error("Dangling reference: {0}")]
    DanglingReference(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl ModelError {
    pub fn dangling(msg: impl Into<String>) -> Self {
        Self::DanglingReference(msg.into())
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
