use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Share of a context's independent descendants a phrase must appear in to
/// count as present at that context.
pub const CROSS_PRESENCE_SIGNIFICANCE: f64 = 0.5;

/// Configuration for a model build
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Longest n-gram admitted to the catalog
    pub phrase_length: usize,

    /// Low percentile of phrase distances that bounds a lexical set
    pub distance_percentile: f64,

    /// High percentile of a phrase's bonding scores kept as related phrases
    pub bonding_index_percentile: f64,

    /// Minimum total occurrence count for a phrase to enter the catalog
    pub min_phrase_frequency: u64,

    /// Keep red-flagged (fragment) phrases out of lexical sets
    pub exclude_red_flagged: bool,

    /// Also build shared-word, spelling-similarity and frequency/distance relations
    pub supplementary_relations: bool,

    /// Largest Levenshtein distance reported as a spelling similarity
    pub spelling_similarity_max_edits: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            phrase_length: 5,
            distance_percentile: 10.0,
            bonding_index_percentile: 90.0,
            min_phrase_frequency: 10,
            exclude_red_flagged: true,
            supplementary_relations: false,
            spelling_similarity_max_edits: 3,
        }
    }
}

impl ModelConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.phrase_length == 0 {
            return Err(ModelError::invalid_config("phrase_length must be > 0"));
        }

        for (name, value) in [
            ("distance_percentile", self.distance_percentile),
            ("bonding_index_percentile", self.bonding_index_percentile),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ModelError::invalid_config(format!(
                    "{name} ({value}) must lie in [0, 100]"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_valid() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.phrase_length, 5);
        assert_eq!(config.min_phrase_frequency, 10);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ModelConfig::from_toml_str("distance_percentile = 25.0\n").unwrap();
        assert_eq!(config.distance_percentile, 25.0);
        assert_eq!(config.bonding_index_percentile, 90.0);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ModelConfig {
            distance_percentile: 120.0,
            ..ModelConfig::default()
        };
        assert!(config.validate().is_err());

        config.distance_percentile = 10.0;
        config.phrase_length = 0;
        assert!(config.validate().is_err());

        assert!(ModelConfig::from_toml_str("bonding_index_percentile = -1.0").is_err());
    }
}
