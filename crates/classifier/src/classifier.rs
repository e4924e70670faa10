use crate::config::ClassifierConfig;
use crate::error::Result;
use crate::locator::locate;
use contextionary_model::ModelSnapshot;
use contextionary_protocol::{ClassifyRequest, ClassifyResponse, ContextRank, KeywordRecord};
use contextionary_text::{ClauseTokenizer, TokenizedText, Tokenizer};
use ndarray::Array1;
use std::cmp::Ordering;
use std::sync::Arc;

/// Scores text against every context of a model snapshot.
///
/// Stateless between calls: every classification is a pure function of the
/// input, the shared snapshot and the configuration.
#[derive(Debug, Clone)]
pub struct Classifier<T: Tokenizer = ClauseTokenizer> {
    snapshot: Arc<ModelSnapshot>,
    tokenizer: T,
    config: ClassifierConfig,
}

impl Classifier<ClauseTokenizer> {
    pub fn new(snapshot: Arc<ModelSnapshot>, config: ClassifierConfig) -> Result<Self> {
        Self::with_tokenizer(snapshot, ClauseTokenizer::new(), config)
    }
}

impl<T: Tokenizer> Classifier<T> {
    pub fn with_tokenizer(
        snapshot: Arc<ModelSnapshot>,
        tokenizer: T,
        config: ClassifierConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            snapshot,
            tokenizer,
            config,
        })
    }

    pub fn snapshot(&self) -> &ModelSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify with the configured top count and phrase length
    pub fn classify(&self, text: &str) -> Result<ClassifyResponse> {
        self.classify_with(text, self.config.top_count, self.config.phrase_max_length)
    }

    /// Classify a query-surface request; unset fields fall back to the configuration.
    pub fn handle(&self, request: &ClassifyRequest) -> Result<ClassifyResponse> {
        let config = ClassifierConfig {
            top_count: request.top_count.unwrap_or(self.config.top_count),
            phrase_max_length: request
                .phrase_max_length
                .unwrap_or(self.config.phrase_max_length),
        };
        config.validate()?;
        self.classify_with(&request.text, config.top_count, config.phrase_max_length)
    }

    pub fn classify_with(
        &self,
        text: &str,
        top_count: usize,
        phrase_max_length: usize,
    ) -> Result<ClassifyResponse> {
        let tokenized = self.tokenizer.tokenize(text, phrase_max_length)?;
        let scores = self.score(&tokenized).to_vec();
        let selected = select_top(&scores, top_count);

        let contexts = self.snapshot.contexts();
        let ranks = selected
            .iter()
            .map(|&c| ContextRank {
                context_id: contexts[c].id,
                name: contexts[c].name.clone(),
                score: scores[c],
            })
            .collect();

        let mut keywords = Vec::new();
        for &c in &selected {
            let context = &contexts[c];
            let mut keyword_id = 0u32;
            for &p in &context.lexical_set {
                let phrase = &self.snapshot.phrases()[p];
                let locations = locate(&tokenized.words, &phrase.text);
                if locations.is_empty() {
                    continue;
                }
                keyword_id += 1;
                keywords.push(KeywordRecord {
                    context_id: context.id,
                    keyword_id,
                    locations,
                    text: phrase.text.clone(),
                    phrase_id: phrase.id,
                });
            }
        }

        log::debug!(
            "Classified {} words: {} contexts selected, {} keywords",
            tokenized.words.len(),
            selected.len(),
            keywords.len()
        );
        Ok(ClassifyResponse::new(ranks, keywords))
    }

    /// `Σ weight × count` per context over the input's phrase table.
    /// Phrases outside the catalog contribute nothing.
    pub fn score(&self, tokenized: &TokenizedText) -> Array1<f64> {
        let weights = self.snapshot.weights();
        let mut scores = Array1::<f64>::zeros(self.snapshot.contexts().len());
        for (_, phrase, count) in tokenized.phrases() {
            if let Some(p) = self.snapshot.phrase_index(phrase) {
                scores.scaled_add(f64::from(count), &weights.row(p));
            }
        }
        scores
    }
}

/// Indices of the contexts whose score reaches the `top_count`-th highest
/// distinct score, best first, ties in index order.
///
/// Ties at the cutoff are all kept, so more than `top_count` contexts may
/// come back; with any contexts at all, at least one does.
pub fn select_top(scores: &[f64], top_count: usize) -> Vec<usize> {
    let mut distinct = scores.to_vec();
    distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    distinct.dedup();

    let Some(&cutoff) = distinct
        .len()
        .checked_sub(top_count.max(1))
        .map_or(distinct.first(), |skip| distinct.get(skip))
    else {
        return Vec::new();
    };

    let mut selected: Vec<usize> = (0..scores.len())
        .filter(|&c| scores[c] >= cutoff)
        .collect();
    selected.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(Ordering::Equal)
            .then(a.cmp(&b))
    });
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_select_top_is_tie_inclusive() {
        let scores = [1.0, 3.0, 2.0, 3.0, 0.5];
        assert_eq!(select_top(&scores, 1), vec![1, 3]);
        assert_eq!(select_top(&scores, 2), vec![1, 3, 2]);
        assert_eq!(select_top(&scores, 10), vec![1, 3, 2, 0, 4]);
    }

    #[test]
    fn test_select_top_degenerate() {
        assert_eq!(select_top(&[0.0, 0.0, 0.0], 1), vec![0, 1, 2]);
        assert!(select_top(&[], 3).is_empty());
    }
}
