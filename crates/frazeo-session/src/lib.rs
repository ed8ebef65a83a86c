//! Opaque tokens and bounded navigation state for Frazeo.
//!
//! # Main types
//!
//! - [`TokenRegistry`] — Salted token derivation and the corpus-id reverse table.
//! - [`SessionStore`] — LRU-bounded snapshots and per-conversation last searches.
//! - [`Snapshot`] — A captured screen that a back button restores.

/// Snapshots, last searches, and conversation ids.
pub mod session;
/// The bounded session store.
pub mod store;
/// Token derivation and the id reverse table.
pub mod token;

pub use session::{ConversationId, LastQuery, Snapshot};
pub use store::{SessionLimits, SessionStore};
pub use token::{Salt, Token, TokenRegistry, TokenValue};
