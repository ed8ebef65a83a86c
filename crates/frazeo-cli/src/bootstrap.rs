//! Asset loading and component wiring shared by every subcommand.

use crate::config::{DataConfig, FrazeoConfig};
use frazeo_bot::{Navigator, SearchSettings};
use frazeo_core::{Corpus, FrazeoResult};
use frazeo_memory::{
    AngularIndex, HfTokenizer, PieceTokenizer, Retriever, SvdEmbedder, SvdModel,
    WhitespaceTokenizer,
};
use frazeo_session::{SessionStore, TokenRegistry};
use std::sync::Arc;
use tracing::{info, warn};

/// Load the corpus, tokenizer, model, and index, and check they agree.
pub fn load_retriever(data: &DataConfig, search: &SearchSettings) -> FrazeoResult<Arc<Retriever>> {
    let corpus = Arc::new(Corpus::load(&data.corpus)?);

    let tokenizer: Arc<dyn PieceTokenizer> = match &data.tokenizer {
        Some(path) => Arc::new(HfTokenizer::from_file(path)?),
        None => {
            warn!("No tokenizer configured, splitting queries on whitespace");
            Arc::new(WhitespaceTokenizer)
        }
    };

    let model = Arc::new(SvdModel::load(&data.model)?);
    let index = Arc::new(AngularIndex::load(&data.index, Some(model.output_dim()))?);
    let embedder = Arc::new(SvdEmbedder::new(tokenizer, model, search.cache_capacity)?);

    let retriever = Retriever::new(corpus, embedder, index, search.cache_capacity)?;
    info!(
        idioms = retriever.corpus().len(),
        "Retrieval pipeline ready"
    );
    Ok(Arc::new(retriever))
}

/// Build the navigator: retrieval, the precomputed token registry, and an
/// empty session store.
pub fn build_navigator(config: &FrazeoConfig) -> FrazeoResult<Arc<Navigator>> {
    let retriever = load_retriever(&config.data, &config.search)?;
    let registry = Arc::new(TokenRegistry::for_corpus(
        &config.session.salt(),
        retriever.corpus().len(),
    )?);
    let store = Arc::new(SessionStore::new(registry, &config.session.limits()));
    Ok(Arc::new(Navigator::new(
        retriever,
        store,
        config.search.clone(),
    )))
}
