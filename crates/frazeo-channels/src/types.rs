//! The subset of the Telegram Bot API object model the bot uses.

use frazeo_core::{Control, ControlLayout};
use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the call succeeded.
    pub ok: bool,
    /// Human-readable error when `ok` is false.
    #[serde(default)]
    pub description: Option<String>,
    /// Numeric error code when `ok` is false.
    #[serde(default)]
    pub error_code: Option<i64>,
    /// The payload when `ok` is true.
    pub result: Option<T>,
}

/// An incoming update (webhook body or `getUpdates` element).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    /// Monotonic update identifier.
    pub update_id: i64,
    /// A new incoming message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// A button press on an inline keyboard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_query: Option<CallbackQuery>,
}

/// A chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Identifier unique within the chat.
    pub message_id: i64,
    /// Sender; absent for channel posts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    /// The chat the message belongs to.
    pub chat: Chat,
    /// Plain text with formatting stripped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Formatting of `text`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<MessageEntity>,
    /// Attached inline keyboard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

/// A Telegram user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: i64,
    /// First name as set by the user.
    #[serde(default)]
    pub first_name: String,
    /// Username without the leading `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// A chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    /// Chat identifier.
    pub id: i64,
}

/// A press of an inline keyboard button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackQuery {
    /// Identifier to answer the query with.
    pub id: String,
    /// Who pressed.
    pub from: User,
    /// The message the button was attached to, if still accessible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// The button's callback data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// A formatting span. Offsets and lengths are in UTF-16 code units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEntity {
    /// Entity type: `bold`, `italic`, `code`, `pre`, `url`, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Start, in UTF-16 code units.
    pub offset: usize,
    /// Length, in UTF-16 code units.
    pub length: usize,
}

impl MessageEntity {
    /// Create an entity.
    pub fn new(kind: impl Into<String>, offset: usize, length: usize) -> Self {
        Self {
            kind: kind.into(),
            offset,
            length,
        }
    }
}

/// An inline keyboard attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    /// Button rows, top to bottom.
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// One inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    /// Caption.
    pub text: String,
    /// Data sent back on press (at most 64 bytes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
}

impl From<&ControlLayout> for InlineKeyboardMarkup {
    fn from(layout: &ControlLayout) -> Self {
        Self {
            inline_keyboard: layout
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|c| InlineKeyboardButton {
                            text: c.label.clone(),
                            callback_data: Some(c.payload.clone()),
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

impl InlineKeyboardMarkup {
    /// The keyboard as a control layout. Buttons without callback data
    /// (URL buttons and the like) are dropped.
    pub fn to_layout(&self) -> ControlLayout {
        let mut layout = ControlLayout::new();
        for row in &self.inline_keyboard {
            layout.push_row(
                row.iter()
                    .filter_map(|b| {
                        b.callback_data
                            .as_ref()
                            .map(|data| Control::new(b.text.clone(), data.clone()))
                    })
                    .collect(),
            );
        }
        layout
    }
}
