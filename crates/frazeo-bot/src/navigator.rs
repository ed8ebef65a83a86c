use crate::presenter::{
    render_detail, render_list, render_search, Presenter, RANDOM_PAYLOAD, SEARCH_AGAIN_PAYLOAD,
};
use frazeo_core::{escape_markdown, FrazeoError, FrazeoResult, IdiomId, IdiomRecord, Reply};
use frazeo_memory::Retriever;
use frazeo_session::{ConversationId, LastQuery, SessionStore, Snapshot};
use serde::Deserialize;
use std::sync::Arc;

/// Toast shown when a button outlived the state it pointed at.
pub const EXPIRED_NOTICE: &str = "This view has expired, please search again.";

/// Usage text for `/start` and `/help`.
pub const USAGE: &str = "Send me a few words describing what you mean and I will find \
idioms with a similar meaning.\n\nTap a number to open an idiom and see similar ones, \
⬅ to go back, 🎲 for a random idiom.";

fn default_results() -> usize {
    10
}
fn default_neighbors() -> usize {
    5
}
fn default_cache_capacity() -> usize {
    100
}

/// Result counts and retrieval memo size.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    /// Items on a top-level search screen.
    #[serde(default = "default_results")]
    pub results: usize,
    /// Similar items on a detail screen (self excluded).
    #[serde(default = "default_neighbors")]
    pub neighbors: usize,
    /// Capacity of each retrieval and embedding memo cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            results: default_results(),
            neighbors: default_neighbors(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

/// What a callback payload addresses.
#[derive(Debug)]
pub enum Target {
    /// The conversation's last top-level search.
    SearchAgain(Arc<LastQuery>),
    /// A corpus item to drill into (list entries and the random control).
    Item(IdiomId),
    /// A previous screen to restore.
    Back(Arc<Snapshot>),
}

/// The interactive-disclosure state machine.
///
/// Every handler is synchronous and returns the [`Reply`] to show. The
/// navigator never talks to the transport; all state lives in the shared
/// [`SessionStore`], so one instance serves every conversation.
pub struct Navigator {
    retriever: Arc<Retriever>,
    store: Arc<SessionStore>,
    presenter: Presenter,
    settings: SearchSettings,
}

impl Navigator {
    /// Assemble a navigator from its collaborators.
    pub fn new(retriever: Arc<Retriever>, store: Arc<SessionStore>, settings: SearchSettings) -> Self {
        Self {
            presenter: Presenter::new(store.clone()),
            retriever,
            store,
            settings,
        }
    }

    /// The retriever searches go through.
    pub fn retriever(&self) -> &Arc<Retriever> {
        &self.retriever
    }

    /// The session store navigation state lives in.
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Greeting for `/start`.
    pub fn handle_start(&self, first_name: Option<&str>) -> FrazeoResult<Reply> {
        let greeting = match first_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => format!("Hello, {}!", escape_markdown(name)),
            None => "Hello!".to_string(),
        };
        Ok(Reply::screen(
            format!("{greeting}\n\n{USAGE}"),
            self.presenter.random_only()?,
        ))
    }

    /// Usage text for `/help`.
    pub fn handle_help(&self) -> FrazeoResult<Reply> {
        Ok(Reply::screen(USAGE, self.presenter.random_only()?))
    }

    /// Answer a free-text query with a fresh top-level result list.
    ///
    /// Overwrites the conversation's last search.
    pub fn handle_query(&self, conversation: &ConversationId, text: &str) -> FrazeoResult<Reply> {
        let query = text.trim();
        if query.is_empty() {
            return self.handle_help();
        }

        let hits = self.retriever.search_by_text(query, self.settings.results)?;
        let ids: Vec<IdiomId> = hits.iter().map(|h| h.id).collect();
        tracing::debug!(
            conversation = %conversation,
            results = ids.len(),
            "Query answered"
        );
        self.store.remember_query(
            conversation,
            LastQuery {
                query: query.to_string(),
                ids: ids.clone(),
            },
        );

        let records: Vec<&IdiomRecord> = hits.iter().map(|h| &h.record).collect();
        Ok(Reply::screen(
            render_search(query, &records),
            self.presenter.build_controls(&ids, None, false)?,
        ))
    }

    /// Answer a button press.
    ///
    /// `current` is the screen the button was attached to, as reported by the
    /// transport. It becomes the back target of a drill-down and is what the
    /// user keeps seeing if the payload has expired.
    pub fn handle_select(
        &self,
        conversation: &ConversationId,
        payload: &str,
        current: Snapshot,
    ) -> FrazeoResult<Reply> {
        match self.resolve(conversation, payload) {
            Ok(Target::SearchAgain(last)) => self.search_again(&last),
            Ok(Target::Item(id)) => self.detail(conversation, id, current),
            Ok(Target::Back(snapshot)) => Ok(snapshot.to_reply()),
            Err(FrazeoError::TokenNotFound(token)) => {
                tracing::info!(conversation = %conversation, token = %token, "Expired callback");
                Ok(Self::expired(current))
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve a payload: the search-again and random literals, then the
    /// static id table, then the snapshot cache.
    pub fn resolve(&self, conversation: &ConversationId, payload: &str) -> FrazeoResult<Target> {
        if payload == SEARCH_AGAIN_PAYLOAD {
            return self
                .store
                .last_query(conversation)
                .map(Target::SearchAgain)
                .ok_or_else(|| FrazeoError::TokenNotFound(payload.to_string()));
        }
        let registry = self.store.registry();
        if payload == RANDOM_PAYLOAD {
            return registry
                .random_token()
                .and_then(|token| registry.resolve_id(token.as_str()))
                .map(Target::Item)
                .ok_or_else(|| FrazeoError::TokenNotFound(payload.to_string()));
        }
        if let Some(id) = registry.resolve_id(payload) {
            return Ok(Target::Item(id));
        }
        self.store.snapshot(payload).map(Target::Back)
    }

    /// The reply for a payload that no longer resolves: the screen as the
    /// user sees it, stripped of its stale controls, plus a notice.
    ///
    /// When the transport could not report the screen, the notice doubles as
    /// the text, since an empty message cannot be sent.
    pub fn expired(current: Snapshot) -> Reply {
        let text = if current.text.trim().is_empty() {
            EXPIRED_NOTICE.to_string()
        } else {
            current.text
        };
        Reply::text(text).with_notice(EXPIRED_NOTICE)
    }

    fn search_again(&self, last: &LastQuery) -> FrazeoResult<Reply> {
        let corpus = self.retriever.corpus();
        let records: Vec<&IdiomRecord> = last.ids.iter().filter_map(|&id| corpus.get(id)).collect();
        Ok(Reply::screen(
            render_search(&last.query, &records),
            self.presenter.build_controls(&last.ids, None, false)?,
        ))
    }

    fn detail(
        &self,
        conversation: &ConversationId,
        id: IdiomId,
        current: Snapshot,
    ) -> FrazeoResult<Reply> {
        let record = self.retriever.corpus().get(id).ok_or_else(|| {
            FrazeoError::IndexUnavailable(format!("token resolved to unknown item {id}"))
        })?;
        let hits = self.retriever.neighbors_of(id, self.settings.neighbors)?;
        let ids: Vec<IdiomId> = hits.iter().map(|h| h.id).collect();

        let mut text = render_detail(record);
        if !hits.is_empty() {
            text.push_str("\n\nSimilar:\n");
            text.push_str(&render_list(hits.iter().map(|h| &h.record)));
        }

        let search_again = self.store.last_query(conversation).is_some();
        let controls = self
            .presenter
            .build_controls(&ids, Some(current), search_again)?;
        Ok(Reply::screen(text, controls))
    }
}
