//! A tiny, fully in-memory deployment for tests.
//!
//! Two idioms on two orthogonal latent axes ("idleness" and "scarcity"),
//! a whitespace tokenizer, a hand-made SVD model mapping each known word
//! onto its axis, and an exact angular index holding the two axis vectors.

use crate::navigator::{Navigator, SearchSettings};
use frazeo_core::{Corpus, FrazeoResult};
use frazeo_memory::{AngularIndex, Retriever, SvdEmbedder, SvdModel, SvdModelFile, WhitespaceTokenizer};
use frazeo_session::{Salt, SessionLimits, SessionStore, TokenRegistry};
use std::sync::Arc;

/// Corpus in the on-disk TSV layout.
pub const CORPUS: &str = "бить баклуши\tto idle\nкот наплакал\tvery little\n";

/// Salt every fixture registry is keyed with.
pub const SALT: &str = "-";

/// The embedding model as it would appear on disk.
pub fn model_json() -> serde_json::Value {
    serde_json::json!({
        "map": {
            "<unk>": 0, "бить": 1, "баклуши": 2, "ничего": 3, "не": 4,
            "делать": 5, "кот": 6, "наплакал": 7, "мало": 8, "очень": 9
        },
        "idf": [0.0, 1.0, 1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 1.0, 0.5],
        "u_rank": [
            [0.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0],
            [1.0, 0.0], [0.0, 1.0], [0.0, 1.0], [0.0, 1.0], [0.0, 1.0]
        ],
        "s_rank": [1.0, 1.0],
        "vh_rank": [[1.0, 0.0], [0.0, 1.0]],
        "bias": [0.0, 0.0],
        "inverse": [[1.0, 0.0], [0.0, 1.0]]
    })
}

/// Index vectors in the on-disk JSON-lines layout, one per corpus id.
pub const INDEX: &str = "[1.0, 0.0]\n[0.0, 1.0]\n";

/// The scenario's retriever.
pub fn retriever(settings: &SearchSettings) -> FrazeoResult<Arc<Retriever>> {
    let corpus = Arc::new(Corpus::parse(CORPUS)?);
    let file: SvdModelFile = serde_json::from_value(model_json())?;
    let model = Arc::new(SvdModel::from_file(file)?);
    let embedder = Arc::new(SvdEmbedder::new(
        Arc::new(WhitespaceTokenizer),
        model,
        settings.cache_capacity,
    )?);
    let index = Arc::new(AngularIndex::from_vectors(
        2,
        vec![vec![1.0, 0.0], vec![0.0, 1.0]],
    )?);
    Ok(Arc::new(Retriever::new(
        corpus,
        embedder,
        index,
        settings.cache_capacity,
    )?))
}

/// A navigator over the scenario with the given session bounds.
pub fn navigator_with(limits: &SessionLimits) -> FrazeoResult<Navigator> {
    let settings = SearchSettings::default();
    let retriever = retriever(&settings)?;
    let registry = Arc::new(TokenRegistry::for_corpus(
        &Salt::new(SALT),
        retriever.corpus().len(),
    )?);
    let store = Arc::new(SessionStore::new(registry, limits));
    Ok(Navigator::new(retriever, store, settings))
}

/// A navigator over the scenario with default session bounds.
pub fn navigator() -> FrazeoResult<Navigator> {
    navigator_with(&SessionLimits::default())
}
