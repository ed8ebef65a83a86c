use crate::embedding::EmbeddingProvider;
use crate::index::{Neighbor, NeighborIndex};
use frazeo_core::{BoundedCache, Corpus, FrazeoError, FrazeoResult, IdiomId, IdiomRecord};
use serde::Serialize;
use std::sync::Arc;

/// A neighbor paired with its corpus record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    /// Corpus id.
    pub id: IdiomId,
    /// Distance to the query.
    pub distance: f64,
    /// The idiom itself.
    pub record: IdiomRecord,
}

/// Retrieval orchestration over the corpus, embedder, and neighbor index.
///
/// Both lookups are memoized per `(input, k)`: interactive navigation
/// replays the same searches and drill-downs over and over.
pub struct Retriever {
    corpus: Arc<Corpus>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn NeighborIndex>,
    by_text: BoundedCache<(String, usize), Arc<Vec<Neighbor>>>,
    by_item: BoundedCache<(IdiomId, usize), Arc<Vec<Neighbor>>>,
}

impl Retriever {
    /// Wire the pipeline together, checking that the embedder, index, and
    /// corpus agree on dimension and size.
    pub fn new(
        corpus: Arc<Corpus>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn NeighborIndex>,
        cache_capacity: usize,
    ) -> FrazeoResult<Self> {
        if embedder.dimension() != index.dimension() {
            return Err(FrazeoError::IndexUnavailable(format!(
                "embedding dimension {} does not match index dimension {}",
                embedder.dimension(),
                index.dimension()
            )));
        }
        if index.len() != corpus.len() {
            return Err(FrazeoError::IndexUnavailable(format!(
                "index holds {} items but the corpus has {} records",
                index.len(),
                corpus.len()
            )));
        }
        Ok(Self {
            corpus,
            embedder,
            index,
            by_text: BoundedCache::new("search_by_text", cache_capacity),
            by_item: BoundedCache::new("search_by_id", cache_capacity),
        })
    }

    /// The corpus this retriever searches.
    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    /// The `k` idioms closest to a free-text query.
    pub fn search_by_text(&self, text: &str, k: usize) -> FrazeoResult<Vec<Hit>> {
        let neighbors = self
            .by_text
            .get_or_try_insert_with((text.to_string(), k), || {
                let embedding = self.embedder.embed(text)?;
                self.index
                    .query_by_vector(&embedding.vector, k)
                    .map(Arc::new)
            })?;
        Ok(self.attach(&neighbors))
    }

    /// The `k` idioms closest to item `id`, including `id` itself first.
    pub fn search_by_id(&self, id: IdiomId, k: usize) -> FrazeoResult<Vec<Hit>> {
        if self.corpus.get(id).is_none() {
            return Err(FrazeoError::IndexUnavailable(format!(
                "item {id} is outside the corpus (size {})",
                self.corpus.len()
            )));
        }
        let neighbors = self
            .by_item
            .get_or_try_insert_with((id, k), || {
                self.index.query_by_item(id, k).map(Arc::new)
            })?;
        Ok(self.attach(&neighbors))
    }

    /// Up to `k` neighbors of item `id`, excluding the item itself.
    pub fn neighbors_of(&self, id: IdiomId, k: usize) -> FrazeoResult<Vec<Hit>> {
        let mut hits = self.search_by_id(id, k + 1)?;
        hits.retain(|h| h.id != id);
        hits.truncate(k);
        Ok(hits)
    }

    fn attach(&self, neighbors: &[Neighbor]) -> Vec<Hit> {
        neighbors
            .iter()
            .filter_map(|n| match self.corpus.get(n.id) {
                Some(record) => Some(Hit {
                    id: n.id,
                    distance: n.distance,
                    record: record.clone(),
                }),
                None => {
                    tracing::warn!(id = n.id, "Index returned an id outside the corpus");
                    None
                }
            })
            .collect()
    }
}
