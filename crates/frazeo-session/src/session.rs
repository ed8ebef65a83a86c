use frazeo_core::{ControlLayout, FrazeoResult, IdiomId, Reply};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one chat (conversation) on the transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Wrap a transport-specific conversation identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A screen captured before navigating away from it, so "back" can restore
/// it exactly instead of recomputing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Message text as it was shown.
    pub text: String,
    /// Buttons as they were shown.
    pub controls: Option<ControlLayout>,
}

impl Snapshot {
    /// Capture a screen.
    pub fn new(text: impl Into<String>, controls: Option<ControlLayout>) -> Self {
        Self {
            text: text.into(),
            controls,
        }
    }

    /// Canonical byte form the snapshot token is derived from.
    pub fn encode(&self) -> FrazeoResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// The reply that re-renders this screen.
    pub fn to_reply(&self) -> Reply {
        Reply {
            text: self.text.clone(),
            controls: self.controls.clone(),
            notice: None,
        }
    }
}

/// The last top-level search of a conversation, for "back to search".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastQuery {
    /// The query text as the user typed it.
    pub query: String,
    /// Result ids in rank order.
    pub ids: Vec<IdiomId>,
}
