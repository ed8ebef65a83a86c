//! Core types and error definitions for Frazeo.
//!
//! This crate provides the foundational types shared across all Frazeo crates:
//! the unified error type, the immutable idiom corpus, the bounded LRU cache
//! used for every memoization and session role, and the screen types the bot
//! renders into chat messages.
//!
//! # Main types
//!
//! - [`FrazeoError`] — Unified error enum for all Frazeo subsystems.
//! - [`FrazeoResult`] — Convenience alias for `Result<T, FrazeoError>`.
//! - [`Corpus`] — Read-only table of [`IdiomRecord`]s addressed by [`IdiomId`].
//! - [`BoundedCache`] — Thread-safe, capacity-bounded LRU map.
//! - [`Reply`] — Text plus optional [`ControlLayout`] produced for one interaction.

/// Capacity-bounded, thread-safe LRU cache.
pub mod cache;
/// Idiom records and the corpus store.
pub mod corpus;
/// Screens, controls, and replies rendered to the chat transport.
pub mod screen;

pub use cache::BoundedCache;
pub use corpus::{Corpus, IdiomId, IdiomRecord};
pub use screen::{emphasize, escape_markdown, Control, ControlLayout, Reply};

// --- Error types ---

/// Top-level error type for Frazeo.
///
/// Each variant corresponds to a subsystem that can produce errors. Degenerate
/// queries (empty or fully out-of-vocabulary input) are deliberately absent:
/// they embed to a low-information vector and are not failures.
#[derive(Debug, thiserror::Error)]
pub enum FrazeoError {
    /// A callback token is neither a corpus id nor a live session entry.
    #[error("Token not found: {0}")]
    TokenNotFound(String),

    /// The neighbor index failed to load or to answer a query.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// A corpus line could not be parsed into a (phrase, definition) pair.
    #[error("Malformed corpus at line {line}: {reason}")]
    MalformedCorpus {
        /// 1-based line number in the corpus file (0 for whole-file problems).
        line: usize,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// The embedding model asset is missing or inconsistent.
    #[error("Model error: {0}")]
    Model(String),

    /// The subword tokenizer failed to load or to tokenize.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// An error in the token registry or session store.
    #[error("Session error: {0}")]
    Session(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error from the chat transport (e.g. Telegram Bot API).
    #[error("Channel error: {0}")]
    Channel(String),

    /// An error from an outbound HTTP request.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`FrazeoError`].
pub type FrazeoResult<T> = Result<T, FrazeoError>;
