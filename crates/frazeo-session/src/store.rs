use crate::session::{ConversationId, LastQuery, Snapshot};
use crate::token::{Token, TokenRegistry, TokenValue};
use frazeo_core::{BoundedCache, FrazeoError, FrazeoResult};
use serde::Deserialize;
use std::sync::Arc;

fn default_snapshot_capacity() -> usize {
    1000
}
fn default_conversation_capacity() -> usize {
    1000
}

/// Capacities of the session cache roles.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionLimits {
    /// Maximum number of back-navigation snapshots retained.
    #[serde(default = "default_snapshot_capacity")]
    pub snapshot_capacity: usize,
    /// Maximum number of conversations whose last search is retained.
    #[serde(default = "default_conversation_capacity")]
    pub conversation_capacity: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            snapshot_capacity: default_snapshot_capacity(),
            conversation_capacity: default_conversation_capacity(),
        }
    }
}

/// In-memory, bounded navigation state shared by all conversations.
///
/// Two LRU roles: snapshots keyed by their content token (what back buttons
/// point at) and the last search keyed by conversation. Entries can vanish
/// at any time under load; lookups report that as `TokenNotFound` or `None`,
/// never as a fault. Nothing survives a restart.
pub struct SessionStore {
    registry: Arc<TokenRegistry>,
    snapshots: BoundedCache<Token, Arc<Snapshot>>,
    conversations: BoundedCache<ConversationId, Arc<LastQuery>>,
}

impl SessionStore {
    /// Create an empty store deriving snapshot tokens from `registry`.
    pub fn new(registry: Arc<TokenRegistry>, limits: &SessionLimits) -> Self {
        Self {
            registry,
            snapshots: BoundedCache::new("snapshots", limits.snapshot_capacity),
            conversations: BoundedCache::new("conversations", limits.conversation_capacity),
        }
    }

    /// The registry tokens are derived with.
    pub fn registry(&self) -> &Arc<TokenRegistry> {
        &self.registry
    }

    /// Store a snapshot under its content token and return the token.
    ///
    /// Stashing identical content again yields the same token and refreshes
    /// its recency.
    pub fn stash(&self, snapshot: Snapshot) -> FrazeoResult<Token> {
        let bytes = snapshot.encode()?;
        let token = self.registry.token_for(TokenValue::Snapshot(&bytes));
        self.snapshots.insert(token.clone(), Arc::new(snapshot));
        Ok(token)
    }

    /// Look up a snapshot by token.
    pub fn snapshot(&self, token: &str) -> FrazeoResult<Arc<Snapshot>> {
        self.snapshots
            .get(token)
            .ok_or_else(|| FrazeoError::TokenNotFound(token.to_string()))
    }

    /// Record a conversation's latest top-level search, replacing the old one.
    pub fn remember_query(&self, conversation: &ConversationId, last: LastQuery) {
        self.conversations.insert(conversation.clone(), Arc::new(last));
    }

    /// The latest top-level search of a conversation, if still retained.
    pub fn last_query(&self, conversation: &ConversationId) -> Option<Arc<LastQuery>> {
        self.conversations.get(conversation)
    }

    /// Number of retained snapshots.
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Number of conversations with a retained search.
    pub fn conversation_count(&self) -> usize {
        self.conversations.len()
    }
}
