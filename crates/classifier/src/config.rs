use crate::error::{ClassifierError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Distinct score levels to keep; ties at the cutoff are all returned
    pub top_count: usize,

    /// Longest n-gram extracted from the input
    pub phrase_max_length: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            top_count: 4,
            phrase_max_length: 5,
        }
    }
}

impl ClassifierConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_count == 0 {
            return Err(ClassifierError::InvalidConfig(
                "top_count must be > 0".to_string(),
            ));
        }
        if self.phrase_max_length == 0 {
            return Err(ClassifierError::InvalidConfig(
                "phrase_max_length must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
