use frazeo_core::{FrazeoError, FrazeoResult, IdiomId};
use serde::Serialize;
use std::path::Path;

/// One entry of a neighbor query result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    /// Corpus id of the neighbor.
    pub id: IdiomId,
    /// Distance to the query; smaller is more similar.
    pub distance: f64,
}

/// Trait for nearest-neighbor lookups over the corpus's item vectors.
///
/// Results are ordered by non-decreasing distance and hold at most `k` entries.
/// Implementations must be safe for concurrent read-only queries.
pub trait NeighborIndex: Send + Sync {
    /// Dimensionality of item and query vectors.
    fn dimension(&self) -> usize;

    /// Number of indexed items. Item ids are `0..len()`.
    fn len(&self) -> usize;

    /// Whether the index holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `k` items nearest to `vector`.
    fn query_by_vector(&self, vector: &[f64], k: usize) -> FrazeoResult<Vec<Neighbor>>;

    /// The `k` items nearest to item `id`, with `id` itself first at distance 0.
    fn query_by_item(&self, id: IdiomId, k: usize) -> FrazeoResult<Vec<Neighbor>>;
}

/// Exact angular-distance index held in memory.
///
/// Distance is `sqrt(2 - 2·cos)`, the metric Annoy calls "angular", so
/// distances range from 0 (same direction) to 2 (opposite). Zero vectors have
/// no direction and sit at `sqrt(2)` from everything.
pub struct AngularIndex {
    dimension: usize,
    /// Unit-normalized item vectors (zero vectors stay zero).
    items: Vec<Vec<f64>>,
}

fn unit(vector: &[f64]) -> Vec<f64> {
    let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        vector.iter().map(|x| x / norm).collect()
    } else {
        vec![0.0; vector.len()]
    }
}

fn angular_distance(a: &[f64], b: &[f64]) -> f64 {
    let cos: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    (2.0 - 2.0 * cos.clamp(-1.0, 1.0)).max(0.0).sqrt()
}

impl AngularIndex {
    /// Build an index from item vectors, all of length `dimension`.
    pub fn from_vectors(dimension: usize, vectors: Vec<Vec<f64>>) -> FrazeoResult<Self> {
        if dimension == 0 {
            return Err(FrazeoError::IndexUnavailable(
                "index dimension must be positive".into(),
            ));
        }
        let mut items = Vec::with_capacity(vectors.len());
        for (id, vector) in vectors.iter().enumerate() {
            if vector.len() != dimension {
                return Err(FrazeoError::IndexUnavailable(format!(
                    "item {id} has dimension {}, expected {dimension}",
                    vector.len()
                )));
            }
            if vector.iter().any(|x| !x.is_finite()) {
                return Err(FrazeoError::IndexUnavailable(format!(
                    "item {id} has non-finite components"
                )));
            }
            items.push(unit(vector));
        }
        Ok(Self { dimension, items })
    }

    /// Load item vectors from a JSON-lines file, one array of numbers per item.
    ///
    /// Blank lines are skipped. When `dimension` is `None` it is taken from the
    /// first vector.
    pub fn load(path: &Path, dimension: Option<usize>) -> FrazeoResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            FrazeoError::IndexUnavailable(format!(
                "Failed to read index '{}': {e}",
                path.display()
            ))
        })?;
        let mut vectors = Vec::new();
        for (lineno, line) in data.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let vector: Vec<f64> = serde_json::from_str(line).map_err(|e| {
                FrazeoError::IndexUnavailable(format!(
                    "Invalid vector at line {}: {e}",
                    lineno + 1
                ))
            })?;
            vectors.push(vector);
        }
        let dimension = dimension
            .or_else(|| vectors.first().map(Vec::len))
            .unwrap_or(0);
        let index = Self::from_vectors(dimension, vectors)?;
        tracing::info!(
            path = %path.display(),
            items = index.len(),
            dimension = index.dimension,
            "Neighbor index loaded"
        );
        Ok(index)
    }

    /// Rank all items against a unit query, keeping the best `k`. A `pinned`
    /// item is forced to the front at distance 0.
    fn rank(&self, query: &[f64], k: usize, pinned: Option<IdiomId>) -> Vec<Neighbor> {
        if k == 0 {
            return Vec::new();
        }
        let mut scored: Vec<Neighbor> = self
            .items
            .iter()
            .enumerate()
            .map(|(id, item)| Neighbor {
                id,
                distance: if Some(id) == pinned {
                    0.0
                } else {
                    angular_distance(query, item)
                },
            })
            .collect();

        let order = |a: &Neighbor, b: &Neighbor| {
            (Some(a.id) != pinned)
                .cmp(&(Some(b.id) != pinned))
                .then(a.distance.total_cmp(&b.distance))
                .then(a.id.cmp(&b.id))
        };
        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, order);
            scored.truncate(k);
        }
        scored.sort_by(order);
        scored
    }

    fn check_query(&self, vector: &[f64]) -> FrazeoResult<()> {
        if vector.len() != self.dimension {
            return Err(FrazeoError::IndexUnavailable(format!(
                "query has dimension {}, index expects {}",
                vector.len(),
                self.dimension
            )));
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(FrazeoError::IndexUnavailable(
                "query has non-finite components".into(),
            ));
        }
        Ok(())
    }
}

impl NeighborIndex for AngularIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn query_by_vector(&self, vector: &[f64], k: usize) -> FrazeoResult<Vec<Neighbor>> {
        self.check_query(vector)?;
        Ok(self.rank(&unit(vector), k, None))
    }

    fn query_by_item(&self, id: IdiomId, k: usize) -> FrazeoResult<Vec<Neighbor>> {
        let item = self.items.get(id).ok_or_else(|| {
            FrazeoError::IndexUnavailable(format!(
                "item {id} out of range (index has {})",
                self.items.len()
            ))
        })?;
        Ok(self.rank(item, k, Some(id)))
    }
}
