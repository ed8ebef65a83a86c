//! Semantic retrieval for Frazeo: from free text to ranked idioms.
//!
//! Provides query normalization, subword tokenization, the truncated-SVD
//! embedding pipeline, an angular nearest-neighbor index, and the memoized
//! retrieval layer that ties them to the corpus.
//!
//! # Main types
//!
//! - [`EmbeddingProvider`] — Trait for turning text into index-space vectors.
//! - [`SvdEmbedder`] — IDF-weighted SVD projection with a bounded memo cache.
//! - [`PieceTokenizer`] — Trait for subword tokenizers ([`HfTokenizer`], [`WhitespaceTokenizer`]).
//! - [`NeighborIndex`] — Trait for nearest-neighbor lookups by vector or by item.
//! - [`AngularIndex`] — Exact in-memory index using the angular metric.
//! - [`Retriever`] — `search_by_text` / `search_by_id` over the corpus.

/// Embedding provider trait and SVD pipeline.
pub mod embedding;
/// Neighbor index trait and angular implementation.
pub mod index;
/// Truncated-SVD model asset.
pub mod model;
/// Query normalization.
pub mod normalize;
/// Retrieval orchestration.
pub mod retrieval;
/// Subword tokenizer adapters.
pub mod tokenizer;

pub use embedding::{Embedding, EmbeddingProvider, SvdEmbedder};
pub use index::{AngularIndex, Neighbor, NeighborIndex};
pub use model::{SvdModel, SvdModelFile};
pub use normalize::Normalizer;
pub use retrieval::{Hit, Retriever};
pub use tokenizer::{HfTokenizer, PieceTokenizer, WhitespaceTokenizer};
