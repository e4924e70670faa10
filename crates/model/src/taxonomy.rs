use crate::error::{ModelError, Result, TaxonomyError};
use contextionary_protocol::{ContextId, PhraseId};
use contextionary_store::{ContextRecord, ContextionaryStore, PhraseMeaningRecord, PhraseRecord};
use std::collections::{BTreeMap, HashMap};

/// A topic node with its basis encoding
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    pub id: ContextId,
    pub name: String,

    /// Immediate parent first, root last
    pub ancestors: Vec<ContextId>,

    /// True iff the context has no children
    pub independent: bool,

    /// Position among independent contexts, i.e. the basis coordinate
    pub independent_index: Option<usize>,

    /// Position among all contexts
    pub regular_index: usize,

    pub independent_descendants: Vec<ContextId>,

    /// Phrase length → occurrences attributed here, independent descendants included
    pub phrase_count_by_length: BTreeMap<usize, u64>,

    /// 0/1 indicator over the independent contexts
    pub axis: Vec<u8>,

    pub lexical_boundary: f64,

    /// Catalog index → distance; filled by the lexical-set stage
    pub lexical_set: BTreeMap<usize, f64>,
}

impl Context {
    pub fn phrase_count(&self, length: usize) -> u64 {
        self.phrase_count_by_length.get(&length).copied().unwrap_or(0)
    }

    pub fn axis_norm_sq(&self) -> f64 {
        self.axis.iter().map(|&x| f64::from(x)).sum()
    }
}

/// The loaded context tree
#[derive(Debug, Clone, PartialEq)]
pub struct Taxonomy {
    contexts: Vec<Context>,
    by_id: HashMap<ContextId, usize>,
    /// Regular indices of every context's ancestors, parent first
    ancestor_indices: Vec<Vec<usize>>,
    /// Regular index of each independent context, by independent index
    independent: Vec<usize>,
}

impl Taxonomy {
    /// Load the tree plus per-length phrase totals from the store
    pub fn load<S: ContextionaryStore + ?Sized>(store: &S) -> Result<Self> {
        let mut taxonomy = Self::from_records(&store.contexts()?)?;
        taxonomy.attach_phrase_counts(&store.phrases()?, &store.phrase_meanings()?)?;
        Ok(taxonomy)
    }

    /// Build the tree: ancestor chains, independence, axes.
    pub fn from_records(records: &[ContextRecord]) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(records.len());
        for (idx, record) in records.iter().enumerate() {
            if by_id.insert(record.id, idx).is_some() {
                return Err(TaxonomyError::DuplicateContext(record.id).into());
            }
        }

        // Phase 1: ancestor chains, bounded by the context count
        let mut ancestor_indices = Vec::with_capacity(records.len());
        for record in records {
            let mut chain = Vec::new();
            let mut current = record;
            while let Some(parent_id) = current.parent_id {
                let parent_idx = *by_id.get(&parent_id).ok_or(TaxonomyError::MissingParent {
                    context: current.id,
                    parent: parent_id,
                })?;
                if chain.len() >= records.len() {
                    return Err(TaxonomyError::Cycle(record.id).into());
                }
                chain.push(parent_idx);
                current = &records[parent_idx];
            }
            ancestor_indices.push(chain);
        }

        // Phase 2: the serialized children lists must agree with the parent links
        let mut actual_children: Vec<Vec<ContextId>> = vec![Vec::new(); records.len()];
        for record in records {
            if let Some(parent_id) = record.parent_id {
                actual_children[by_id[&parent_id]].push(record.id);
            }
        }
        for (record, actual) in records.iter().zip(&actual_children) {
            let mut listed = record.children.clone();
            listed.sort_unstable();
            let mut expected = actual.clone();
            expected.sort_unstable();
            if listed != expected {
                return Err(TaxonomyError::ChildMarkerMismatch {
                    context: record.id,
                    listed: record.children.clone(),
                    actual: actual.clone(),
                }
                .into());
            }
        }

        // Phase 3: independent contexts become basis coordinates, in store order
        let independent: Vec<usize> = actual_children
            .iter()
            .enumerate()
            .filter(|(_, children)| children.is_empty())
            .map(|(idx, _)| idx)
            .collect();
        if independent.is_empty() {
            return Err(TaxonomyError::NoIndependentContexts.into());
        }
        let dimension = independent.len();

        let mut contexts: Vec<Context> = records
            .iter()
            .enumerate()
            .map(|(idx, record)| Context {
                id: record.id,
                name: record.name.clone(),
                ancestors: ancestor_indices[idx].iter().map(|&a| records[a].id).collect(),
                independent: actual_children[idx].is_empty(),
                independent_index: None,
                regular_index: idx,
                independent_descendants: Vec::new(),
                phrase_count_by_length: BTreeMap::new(),
                axis: vec![0; dimension],
                lexical_boundary: 0.0,
                lexical_set: BTreeMap::new(),
            })
            .collect();

        // Phase 4: each independent context sets its coordinate on itself and every ancestor
        for (k, &idx) in independent.iter().enumerate() {
            let id = contexts[idx].id;
            contexts[idx].independent_index = Some(k);
            contexts[idx].axis[k] = 1;
            for &ancestor in &ancestor_indices[idx] {
                contexts[ancestor].axis[k] = 1;
                contexts[ancestor].independent_descendants.push(id);
            }
        }

        log::info!(
            "Loaded taxonomy: {} contexts, {} independent",
            contexts.len(),
            dimension
        );

        Ok(Self {
            contexts,
            by_id,
            ancestor_indices,
            independent,
        })
    }

    /// Sum raw phrase-meaning counts per context and length, then add each
    /// independent context's totals to all of its ancestors.
    pub fn attach_phrase_counts(
        &mut self,
        phrases: &[PhraseRecord],
        meanings: &[PhraseMeaningRecord],
    ) -> Result<()> {
        let lengths: HashMap<PhraseId, usize> = phrases.iter().map(|p| (p.id, p.length)).collect();

        let mut raw: Vec<BTreeMap<usize, u64>> = vec![BTreeMap::new(); self.contexts.len()];
        for &length in lengths.values() {
            for totals in &mut raw {
                totals.entry(length).or_insert(0);
            }
        }

        for meaning in meanings {
            let length = *lengths.get(&meaning.phrase_id).ok_or_else(|| {
                ModelError::dangling(format!(
                    "phrase meaning references unknown phrase {}",
                    meaning.phrase_id
                ))
            })?;
            let idx = self.index_of(meaning.context_id).ok_or_else(|| {
                ModelError::dangling(format!(
                    "phrase meaning references unknown context {}",
                    meaning.context_id
                ))
            })?;
            *raw[idx].entry(length).or_insert(0) += meaning.count;
        }

        let mut totals = raw.clone();
        for &idx in &self.independent {
            for &ancestor in &self.ancestor_indices[idx] {
                for (&length, &count) in &raw[idx] {
                    *totals[ancestor].entry(length).or_insert(0) += count;
                }
            }
        }

        for (context, totals) in self.contexts.iter_mut().zip(totals) {
            context.phrase_count_by_length = totals;
        }
        Ok(())
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub(crate) fn contexts_mut(&mut self) -> &mut [Context] {
        &mut self.contexts
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Number of independent contexts (basis dimension)
    pub fn dimension(&self) -> usize {
        self.independent.len()
    }

    pub fn index_of(&self, id: ContextId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    pub fn get(&self, id: ContextId) -> Option<&Context> {
        self.index_of(id).map(|idx| &self.contexts[idx])
    }

    /// Regular indices of the ancestors of the context at `idx`, parent first
    pub fn ancestor_indices(&self, idx: usize) -> &[usize] {
        &self.ancestor_indices[idx]
    }

    /// Regular indices of independent contexts, in basis order
    pub fn independent_indices(&self) -> &[usize] {
        &self.independent
    }

    pub fn independent_contexts(&self) -> impl Iterator<Item = &Context> {
        self.independent.iter().map(|&idx| &self.contexts[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(id: ContextId, parent_id: Option<ContextId>, name: &str) -> ContextRecord {
        ContextRecord {
            id,
            parent_id,
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    fn linked(mut records: Vec<ContextRecord>) -> Vec<ContextRecord> {
        let links: Vec<(ContextId, ContextId)> = records
            .iter()
            .filter_map(|r| r.parent_id.map(|p| (p, r.id)))
            .collect();
        for (parent, child) in links {
            if let Some(r) = records.iter_mut().find(|r| r.id == parent) {
                r.children.push(child);
            }
        }
        records
    }

    fn human_activity() -> Vec<ContextRecord> {
        linked(vec![
            record(1, None, "Human activity"),
            record(2, Some(1), "Sports"),
            record(3, Some(1), "Arts"),
        ])
    }

    #[test]
    fn test_axes_for_two_leaves() {
        let taxonomy = Taxonomy::from_records(&human_activity()).unwrap();
        assert_eq!(taxonomy.dimension(), 2);
        assert_eq!(taxonomy.get(2).unwrap().axis, vec![1, 0]);
        assert_eq!(taxonomy.get(3).unwrap().axis, vec![0, 1]);
        assert_eq!(taxonomy.get(1).unwrap().axis, vec![1, 1]);
        assert_eq!(taxonomy.get(1).unwrap().independent_descendants, vec![2, 3]);
        assert!(!taxonomy.get(1).unwrap().independent);
        assert_eq!(taxonomy.get(3).unwrap().independent_index, Some(1));
    }

    #[test]
    fn test_deep_tree_ancestors_and_axes() {
        let records = linked(vec![
            record(1, None, "Root"),
            record(2, Some(1), "Science"),
            record(3, Some(2), "Physics"),
            record(4, Some(2), "Chemistry"),
            record(5, Some(1), "Music"),
        ]);
        let taxonomy = Taxonomy::from_records(&records).unwrap();

        assert_eq!(taxonomy.get(3).unwrap().ancestors, vec![2, 1]);
        assert_eq!(taxonomy.get(1).unwrap().ancestors, Vec::<ContextId>::new());
        assert_eq!(taxonomy.get(2).unwrap().axis, vec![1, 1, 0]);
        assert_eq!(taxonomy.get(1).unwrap().axis, vec![1, 1, 1]);
        assert_eq!(taxonomy.get(5).unwrap().axis, vec![0, 0, 1]);
        assert_eq!(taxonomy.independent_indices(), &[2, 3, 4]);
    }

    #[test]
    fn test_cycle_is_fatal() {
        let records = linked(vec![
            record(1, Some(3), "A"),
            record(2, Some(1), "B"),
            record(3, Some(2), "C"),
            record(4, Some(3), "Leaf"),
        ]);
        assert!(matches!(
            Taxonomy::from_records(&records),
            Err(ModelError::Taxonomy(TaxonomyError::Cycle(_)))
        ));
    }

    #[test]
    fn test_missing_parent_is_fatal() {
        let records = vec![record(1, None, "Root"), record(2, Some(9), "Orphan")];
        assert!(matches!(
            Taxonomy::from_records(&records),
            Err(ModelError::Taxonomy(TaxonomyError::MissingParent {
                context: 2,
                parent: 9
            }))
        ));
    }

    #[test]
    fn test_duplicate_and_marker_mismatch() {
        let duplicate = vec![record(1, None, "Root"), record(1, None, "Again")];
        assert!(matches!(
            Taxonomy::from_records(&duplicate),
            Err(ModelError::Taxonomy(TaxonomyError::DuplicateContext(1)))
        ));

        // Root claims no children although Sports and Arts point to it
        let unlinked = vec![
            record(1, None, "Human activity"),
            record(2, Some(1), "Sports"),
            record(3, Some(1), "Arts"),
        ];
        assert!(matches!(
            Taxonomy::from_records(&unlinked),
            Err(ModelError::Taxonomy(TaxonomyError::ChildMarkerMismatch { context: 1, .. }))
        ));
    }

    #[test]
    fn test_empty_taxonomy_has_no_basis() {
        assert!(matches!(
            Taxonomy::from_records(&[]),
            Err(ModelError::Taxonomy(TaxonomyError::NoIndependentContexts))
        ));
    }

    #[test]
    fn test_phrase_counts_propagate_from_independent_contexts() {
        let mut taxonomy = Taxonomy::from_records(&human_activity()).unwrap();
        let phrases = vec![
            PhraseRecord {
                id: 1,
                text: "water polo".to_string(),
                length: 2,
            },
            PhraseRecord {
                id: 2,
                text: "paint".to_string(),
                length: 1,
            },
        ];
        let meanings = vec![
            PhraseMeaningRecord {
                phrase_id: 1,
                context_id: 2,
                count: 10,
            },
            PhraseMeaningRecord {
                phrase_id: 2,
                context_id: 3,
                count: 4,
            },
            // Counted at the root itself but never pushed anywhere
            PhraseMeaningRecord {
                phrase_id: 2,
                context_id: 1,
                count: 1,
            },
        ];
        taxonomy.attach_phrase_counts(&phrases, &meanings).unwrap();

        assert_eq!(taxonomy.get(2).unwrap().phrase_count(2), 10);
        assert_eq!(taxonomy.get(2).unwrap().phrase_count(1), 0);
        assert_eq!(taxonomy.get(3).unwrap().phrase_count(1), 4);
        assert_eq!(taxonomy.get(1).unwrap().phrase_count(1), 5);
        assert_eq!(taxonomy.get(1).unwrap().phrase_count(2), 10);
    }

    #[test]
    fn test_dangling_meaning_rejected() {
        let mut taxonomy = Taxonomy::from_records(&human_activity()).unwrap();
        let meanings = vec![PhraseMeaningRecord {
            phrase_id: 7,
            context_id: 2,
            count: 1,
        }];
        assert!(matches!(
            taxonomy.attach_phrase_counts(&[], &meanings),
            Err(ModelError::DanglingReference(_))
        ));
    }
}
