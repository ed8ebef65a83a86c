//! Telegram transport for Frazeo.
//!
//! Provides the Bot API client, the [`BotTransport`] abstraction the
//! dispatcher talks to, classification of raw updates into [`Inbound`]
//! events, and a long-polling receiver.
//!
//! # Main types
//!
//! - [`TelegramClient`] — Bot API calls (send, edit, answer, webhook, updates).
//! - [`BotTransport`] — Trait for delivering replies.
//! - [`Inbound`] — What an update asks the bot to do.
//! - [`UpdatePoller`] — `getUpdates` loop feeding an mpsc channel.

/// Inbound update classification.
pub mod inbound;
/// Entities back to legacy Markdown.
pub mod markdown;
/// Long-polling receiver.
pub mod poll;
/// Telegram Bot API client.
pub mod telegram;
/// Outbound transport trait.
pub mod transport;
/// Bot API wire types.
pub mod types;

pub use inbound::{Inbound, Selection};
pub use markdown::entities_to_markdown;
pub use poll::UpdatePoller;
pub use telegram::{TelegramClient, DEFAULT_API_BASE};
pub use transport::BotTransport;
pub use types::{
    CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Message, MessageEntity,
    Update, User,
};
