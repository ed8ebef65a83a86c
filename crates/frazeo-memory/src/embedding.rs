use crate::model::SvdModel;
use crate::normalize::Normalizer;
use crate::tokenizer::PieceTokenizer;
use frazeo_core::{BoundedCache, FrazeoResult};
use std::sync::Arc;

/// A query vector in the neighbor index's space.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// The projected vector.
    pub vector: Vec<f64>,
    /// True when no piece of the query was in the vocabulary (or the query
    /// was empty). Retrieval still runs, but its neighbors carry no signal.
    pub degenerate: bool,
}

/// Trait for computing query embeddings.
pub trait EmbeddingProvider: Send + Sync {
    /// Compute the embedding for a single text. Deterministic for a fixed model.
    fn embed(&self, text: &str) -> FrazeoResult<Arc<Embedding>>;

    /// Dimension of the vectors produced by this provider.
    fn dimension(&self) -> usize;
}

/// Embedding pipeline: normalize, tokenize, IDF-weight, project.
///
/// Results are memoized per normalized query in a small LRU, since users
/// repeat searches while navigating back and forth.
pub struct SvdEmbedder {
    normalizer: Normalizer,
    tokenizer: Arc<dyn PieceTokenizer>,
    model: Arc<SvdModel>,
    cache: BoundedCache<String, Arc<Embedding>>,
}

impl SvdEmbedder {
    /// Build the pipeline from a tokenizer and model; `cache_capacity` bounds
    /// the number of memoized queries.
    pub fn new(
        tokenizer: Arc<dyn PieceTokenizer>,
        model: Arc<SvdModel>,
        cache_capacity: usize,
    ) -> FrazeoResult<Self> {
        Ok(Self {
            normalizer: Normalizer::new()?,
            tokenizer,
            model,
            cache: BoundedCache::new("embeddings", cache_capacity),
        })
    }

    /// The vocabulary indices a query resolves to, after normalization and
    /// tokenization.
    pub fn resolve(&self, text: &str) -> FrazeoResult<Vec<usize>> {
        let normalized = self.normalizer.normalize(text);
        self.resolve_normalized(&normalized)
    }

    fn resolve_normalized(&self, normalized: &str) -> FrazeoResult<Vec<usize>> {
        let pieces = self.tokenizer.tokenize(normalized)?;
        Ok(pieces.iter().map(|p| self.model.vocab_index(p)).collect())
    }

    fn compute(&self, normalized: &str) -> FrazeoResult<Arc<Embedding>> {
        let indices = self.resolve_normalized(normalized)?;
        let unknown = self.model.unknown_index();
        let degenerate = indices.iter().all(|&i| i == unknown);
        if degenerate {
            tracing::debug!(
                query = normalized,
                pieces = indices.len(),
                "Degenerate query: no known pieces"
            );
        }
        let vector = self.model.project(&indices).to_vec();
        Ok(Arc::new(Embedding { vector, degenerate }))
    }

    /// Number of memoized queries.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl EmbeddingProvider for SvdEmbedder {
    fn embed(&self, text: &str) -> FrazeoResult<Arc<Embedding>> {
        let normalized = self.normalizer.normalize(text);
        self.cache
            .get_or_try_insert_with(normalized.clone(), || self.compute(&normalized))
    }

    fn dimension(&self) -> usize {
        self.model.output_dim()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::model::tests::tiny_model_file;
    use crate::tokenizer::WhitespaceTokenizer;

    fn embedder(capacity: usize) -> SvdEmbedder {
        let model = Arc::new(SvdModel::from_file(tiny_model_file()).unwrap());
        SvdEmbedder::new(Arc::new(WhitespaceTokenizer), model, capacity).unwrap()
    }

    #[test]
    fn test_embed_dimension() {
        let emb = embedder(8);
        assert_eq!(emb.dimension(), 2);
        assert_eq!(emb.embed("a b").unwrap().vector.len(), 2);
    }

    #[test]
    fn test_embed_deterministic_bitwise() {
        let a = embedder(0);
        let b = embedder(0);
        let v1 = a.embed("A, b!").unwrap();
        let v2 = b.embed("A, b!").unwrap();
        let bits1: Vec<u64> = v1.vector.iter().map(|x| x.to_bits()).collect();
        let bits2: Vec<u64> = v2.vector.iter().map(|x| x.to_bits()).collect();
        assert_eq!(bits1, bits2);
    }

    #[test]
    fn test_normalization_shares_cache_entry() {
        let emb = embedder(8);
        let v1 = emb.embed("A b").unwrap();
        let v2 = emb.embed("  a, B ").unwrap();
        assert!(Arc::ptr_eq(&v1, &v2));
        assert_eq!(emb.cached(), 1);
    }

    #[test]
    fn test_degenerate_queries_do_not_fail() {
        let emb = embedder(8);
        let empty = emb.embed("").unwrap();
        let unknown = emb.embed("zzz qqq").unwrap();
        assert!(empty.degenerate);
        assert!(unknown.degenerate);
        assert!(empty.vector.iter().all(|x| x.is_finite()));
        assert_eq!(empty.vector, unknown.vector);
    }

    #[test]
    fn test_known_query_not_degenerate() {
        let emb = embedder(8);
        let e = emb.embed("a zzz").unwrap();
        assert!(!e.degenerate);
    }

    #[test]
    fn test_resolve_maps_unknown() {
        let emb = embedder(8);
        assert_eq!(emb.resolve("B, zzz a").unwrap(), vec![2, 0, 1]);
    }
}
