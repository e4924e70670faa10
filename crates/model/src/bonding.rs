//! Related-phrase networks from document co-occurrence.
//!
//! Within one context every pair of lexical-set phrases gets a bonding index,
//! the Jaccard index of their origin-document sets. Each phrase keeps the
//! partners that score strictly above its own high percentile.

use crate::catalog::PhraseCatalog;
use crate::lexical::LexicalSetEngine;
use crate::percentile::percentile;
use crate::taxonomy::Taxonomy;
use contextionary_protocol::DocumentId;
use contextionary_store::RelatedPhraseRecord;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A phrase's retained partners within one context
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelatedPhrases {
    /// Percentile of all the phrase's bonding scores in the context
    pub boundary: f64,
    /// Catalog index → bonding index
    pub related: BTreeMap<usize, f64>,
}

impl LexicalSetEngine<'_> {
    /// Fill `related_by_context` of every lexical-set phrase.
    pub fn derive_bonding(&self, taxonomy: &Taxonomy, catalog: &mut PhraseCatalog) {
        let networks: Vec<Vec<(usize, RelatedPhrases)>> = {
            let catalog = &*catalog;
            taxonomy
                .contexts()
                .par_iter()
                .map(|context| {
                    let members: Vec<usize> = context.lexical_set.keys().copied().collect();
                    let documents: Vec<&BTreeSet<DocumentId>> = members
                        .iter()
                        .map(|&p| &catalog.phrases()[p].documents_by_context[context.regular_index])
                        .collect();
                    bonding_network(&documents, self.config.bonding_index_percentile)
                        .into_iter()
                        .map(|(row, related)| {
                            let related = RelatedPhrases {
                                boundary: related.boundary,
                                related: related
                                    .related
                                    .into_iter()
                                    .map(|(col, score)| (members[col], score))
                                    .collect(),
                            };
                            (members[row], related)
                        })
                        .collect()
                })
                .collect()
        };

        let mut pairs = 0usize;
        for (context, network) in taxonomy.contexts().iter().zip(networks) {
            for (phrase_idx, related) in network {
                pairs += related.related.len();
                catalog.phrases_mut()[phrase_idx]
                    .related_by_context
                    .insert(context.id, related);
            }
        }
        log::info!("Bonding network: {} related pairs", pairs);
    }
}

/// Jaccard index of two document sets; `None` when both are empty.
pub fn bonding_index(a: &BTreeSet<DocumentId>, b: &BTreeSet<DocumentId>) -> Option<f64> {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    (union > 0).then(|| intersection as f64 / union as f64)
}

/// Bonding scores of every row against every other row.
///
/// Computes the rows of `M·Mᵀ` for the sparse phrase × document incidence
/// matrix `M` through a document → rows posting list, so each row costs the
/// postings it touches instead of a full pass over all pairs. Pairs with an
/// empty union are left out.
pub fn bonding_scores(documents: &[&BTreeSet<DocumentId>]) -> Vec<Vec<(usize, f64)>> {
    let mut postings: HashMap<DocumentId, Vec<usize>> = HashMap::new();
    for (row, docs) in documents.iter().enumerate() {
        for &doc in docs.iter() {
            postings.entry(doc).or_default().push(row);
        }
    }

    (0..documents.len())
        .into_par_iter()
        .map(|row| {
            let mut intersections = vec![0usize; documents.len()];
            for doc in documents[row].iter() {
                if let Some(rows) = postings.get(doc) {
                    for &other in rows {
                        intersections[other] += 1;
                    }
                }
            }

            let size = documents[row].len();
            intersections
                .iter()
                .enumerate()
                .filter(|&(other, _)| other != row)
                .filter_map(|(other, &shared)| {
                    let union = size + documents[other].len() - shared;
                    (union > 0).then(|| (other, shared as f64 / union as f64))
                })
                .collect()
        })
        .collect()
}

/// Per row: the percentile boundary of its scores and the rows above it.
/// Rows without any score are omitted.
pub fn bonding_network(
    documents: &[&BTreeSet<DocumentId>],
    percentile_rank: f64,
) -> Vec<(usize, RelatedPhrases)> {
    bonding_scores(documents)
        .into_iter()
        .enumerate()
        .filter(|(_, scores)| !scores.is_empty())
        .map(|(row, scores)| {
            let values: Vec<f64> = scores.iter().map(|&(_, score)| score).collect();
            let boundary = percentile(&values, percentile_rank);
            let related = scores
                .into_iter()
                .filter(|&(_, score)| score > boundary)
                .collect();
            (row, RelatedPhrases { boundary, related })
        })
        .collect()
}

pub fn related_records(catalog: &PhraseCatalog) -> Vec<RelatedPhraseRecord> {
    catalog
        .phrases()
        .iter()
        .flat_map(|phrase| {
            phrase
                .related_by_context
                .iter()
                .flat_map(move |(&context_id, related)| {
                    related
                        .related
                        .iter()
                        .map(move |(&other, &score)| RelatedPhraseRecord {
                            context_id,
                            phrase_id: phrase.id,
                            related_phrase_id: catalog.phrases()[other].id,
                            bonding_index: score,
                        })
                })
        })
        .collect()
}
