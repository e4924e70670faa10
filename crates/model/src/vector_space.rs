use crate::catalog::{Phrase, PhraseCatalog};
use crate::taxonomy::Taxonomy;
use contextionary_store::{ContextAxisRecord, PhraseDistanceRecord, PhraseVectorRecord};
use ndarray::{Array1, Array2, Axis, Zip};

/// Phrase vectors, context axes and the phrase→context distance matrix
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSpace {
    /// Phrases × independent contexts, relative frequencies
    pub phrase_vectors: Array2<f64>,

    /// Contexts × independent contexts, 0/1 indicators
    pub context_axes: Array2<f64>,

    /// Phrases × contexts
    pub distances: Array2<f64>,
}

impl VectorSpace {
    pub fn build(taxonomy: &Taxonomy, catalog: &PhraseCatalog) -> Self {
        let phrase_vectors = phrase_vectors(taxonomy, catalog);
        let context_axes = context_axes(taxonomy);

        for context in taxonomy.contexts() {
            if context.axis_norm_sq() == 0.0 {
                log::warn!(
                    "Context {} has a zero axis; every phrase projects to the origin",
                    context.id
                );
            }
        }

        let distances = projection_distances(&phrase_vectors, &context_axes);
        log::info!(
            "Vector space: {} phrases x {} axes, {} distances",
            phrase_vectors.nrows(),
            phrase_vectors.ncols(),
            distances.len()
        );

        Self {
            phrase_vectors,
            context_axes,
            distances,
        }
    }

    pub fn distance(&self, phrase_idx: usize, context_idx: usize) -> f64 {
        self.distances[[phrase_idx, context_idx]]
    }

    /// Largest entry of the phrase-vector matrix (0 when empty)
    pub fn max_frequency(&self) -> f64 {
        self.phrase_vectors.iter().copied().fold(0.0, f64::max)
    }

    /// Non-zero phrase-vector cells
    pub fn vector_records(
        &self,
        taxonomy: &Taxonomy,
        catalog: &PhraseCatalog,
    ) -> Vec<PhraseVectorRecord> {
        let independent: Vec<_> = taxonomy.independent_contexts().map(|c| c.id).collect();
        self.phrase_vectors
            .indexed_iter()
            .filter(|(_, value)| **value != 0.0)
            .map(|((p, j), &value)| PhraseVectorRecord {
                phrase_id: catalog.phrases()[p].id,
                context_id: independent[j],
                relative_frequency: value,
            })
            .collect()
    }

    pub fn axis_records(&self, taxonomy: &Taxonomy) -> Vec<ContextAxisRecord> {
        let independent: Vec<_> = taxonomy.independent_contexts().map(|c| c.id).collect();
        taxonomy
            .contexts()
            .iter()
            .flat_map(|context| {
                let independent = &independent;
                context
                    .axis
                    .iter()
                    .enumerate()
                    .map(move |(k, &coordinate)| ContextAxisRecord {
                        context_id: context.id,
                        independent_context_id: independent[k],
                        coordinate,
                    })
            })
            .collect()
    }

    pub fn distance_records(
        &self,
        taxonomy: &Taxonomy,
        catalog: &PhraseCatalog,
    ) -> Vec<PhraseDistanceRecord> {
        self.distances
            .indexed_iter()
            .map(|((p, c), &distance)| PhraseDistanceRecord {
                phrase_id: catalog.phrases()[p].id,
                context_id: taxonomy.contexts()[c].id,
                distance,
            })
            .collect()
    }
}

/// `count / total occurrences of phrases of that length` at the context, 0
/// when the context has no phrases of that length.
pub fn relative_frequency(taxonomy: &Taxonomy, phrase: &Phrase, context_idx: usize) -> f64 {
    let total = taxonomy.contexts()[context_idx].phrase_count(phrase.length);
    if total == 0 {
        0.0
    } else {
        phrase.count_at(context_idx) as f64 / total as f64
    }
}

pub fn phrase_vectors(taxonomy: &Taxonomy, catalog: &PhraseCatalog) -> Array2<f64> {
    let independent = taxonomy.independent_indices();
    let phrases = catalog.phrases();
    Array2::from_shape_fn((phrases.len(), independent.len()), |(p, j)| {
        relative_frequency(taxonomy, &phrases[p], independent[j])
    })
}

pub fn context_axes(taxonomy: &Taxonomy) -> Array2<f64> {
    let contexts = taxonomy.contexts();
    Array2::from_shape_fn((contexts.len(), taxonomy.dimension()), |(c, k)| {
        f64::from(contexts[c].axis[k])
    })
}

/// Distance of every row of `vectors` to the line spanned by every row of `axes`.
///
/// One product `V·Aᵀ` gives the projection scale `s = (a·v) / ‖a‖²`; the
/// distance is then the norm of the residual `v − s·a`, which does not cancel
/// to noise for collinear vectors. A zero axis leaves `d = ‖v‖`.
pub fn projection_distances(vectors: &Array2<f64>, axes: &Array2<f64>) -> Array2<f64> {
    let gram = vectors.dot(&axes.t());
    let axis_norms: Array1<f64> = axes.map_axis(Axis(1), |row| row.dot(&row));

    let mut distances = Array2::<f64>::zeros(gram.raw_dim());
    Zip::indexed(&mut distances)
        .and(&gram)
        .par_for_each(|(p, c), distance, &dot| {
            let norm = axis_norms[c];
            let scale = if norm > 0.0 { dot / norm } else { 0.0 };
            let squared: f64 = vectors
                .row(p)
                .iter()
                .zip(axes.row(c))
                .map(|(v, a)| {
                    let residual = v - scale * a;
                    residual * residual
                })
                .sum();
            *distance = squared.sqrt();
        });
    distances
}
