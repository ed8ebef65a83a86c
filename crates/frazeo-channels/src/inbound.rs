use crate::markdown::entities_to_markdown;
use crate::types::{InlineKeyboardMarkup, Update};
use frazeo_core::ControlLayout;

/// A button press together with the screen it was pressed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Chat the press happened in.
    pub chat_id: i64,
    /// Message carrying the keyboard; `None` when Telegram did not include it.
    pub message_id: Option<i64>,
    /// Identifier to acknowledge the press with.
    pub callback_id: String,
    /// The button's callback data.
    pub payload: String,
    /// The message text, rebuilt as legacy Markdown.
    pub screen_text: String,
    /// The keyboard the message carried.
    pub screen_controls: Option<ControlLayout>,
}

/// An update classified into what the bot reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `/start`.
    Start {
        /// Chat to greet.
        chat_id: i64,
        /// Sender's first name, if known.
        first_name: Option<String>,
    },
    /// `/help` or any other command.
    Help {
        /// Chat to answer.
        chat_id: i64,
    },
    /// Free text to search for.
    Query {
        /// Chat to answer.
        chat_id: i64,
        /// The text as sent.
        text: String,
    },
    /// An inline button press.
    Select(Selection),
    /// Anything else (stickers, edits, channel posts, ...).
    Ignored,
}

impl Inbound {
    /// Classify an update.
    pub fn from_update(update: &Update) -> Self {
        if let Some(cb) = &update.callback_query {
            let Some(payload) = cb.data.clone() else {
                return Self::Ignored;
            };
            let (chat_id, message_id, screen_text, screen_controls) = match &cb.message {
                Some(m) => (
                    m.chat.id,
                    Some(m.message_id),
                    m.text
                        .as_deref()
                        .map(|t| entities_to_markdown(t, &m.entities))
                        .unwrap_or_default(),
                    m.reply_markup.as_ref().map(InlineKeyboardMarkup::to_layout),
                ),
                None => (cb.from.id, None, String::new(), None),
            };
            return Self::Select(Selection {
                chat_id,
                message_id,
                callback_id: cb.id.clone(),
                payload,
                screen_text,
                screen_controls,
            });
        }

        let Some(message) = &update.message else {
            return Self::Ignored;
        };
        let Some(text) = message.text.as_deref() else {
            return Self::Ignored;
        };
        let chat_id = message.chat.id;
        let trimmed = text.trim();

        if let Some(command) = command_name(trimmed) {
            return match command {
                "start" => Self::Start {
                    chat_id,
                    first_name: message
                        .from
                        .as_ref()
                        .map(|u| u.first_name.clone())
                        .filter(|n| !n.is_empty()),
                },
                _ => Self::Help { chat_id },
            };
        }
        if trimmed.is_empty() {
            return Self::Ignored;
        }
        Self::Query {
            chat_id,
            text: trimmed.to_string(),
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Help { .. } => "help",
            Self::Query { .. } => "query",
            Self::Select(_) => "select",
            Self::Ignored => "ignored",
        }
    }
}

/// `"/start@frazeo_bot payload"` -> `"start"`.
fn command_name(text: &str) -> Option<&str> {
    let first = text.strip_prefix('/')?.split_whitespace().next()?;
    Some(first.split('@').next().unwrap_or(first))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    fn text_update(text: &str) -> Update {
        update(serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 3,
                "from": {"id": 9, "first_name": "Ivan"},
                "chat": {"id": 42},
                "text": text
            }
        }))
    }

    #[test]
    fn test_commands() {
        assert_eq!(
            Inbound::from_update(&text_update("/start")),
            Inbound::Start {
                chat_id: 42,
                first_name: Some("Ivan".into())
            }
        );
        assert!(matches!(
            Inbound::from_update(&text_update("/start@frazeo_bot hi")),
            Inbound::Start { .. }
        ));
        assert_eq!(
            Inbound::from_update(&text_update("/help")),
            Inbound::Help { chat_id: 42 }
        );
        assert_eq!(
            Inbound::from_update(&text_update("/whatever")),
            Inbound::Help { chat_id: 42 }
        );
    }

    #[test]
    fn test_query_text_is_trimmed() {
        assert_eq!(
            Inbound::from_update(&text_update("  ничего не делать \n")),
            Inbound::Query {
                chat_id: 42,
                text: "ничего не делать".into()
            }
        );
        assert_eq!(Inbound::from_update(&text_update("   ")), Inbound::Ignored);
    }

    #[test]
    fn test_callback_rebuilds_screen() {
        let inbound = Inbound::from_update(&update(serde_json::json!({
            "update_id": 2,
            "callback_query": {
                "id": "cb",
                "from": {"id": 9, "first_name": "Ivan"},
                "message": {
                    "message_id": 77,
                    "chat": {"id": 42},
                    "text": "TITLE\n\tdef_x",
                    "entities": [{"type": "bold", "offset": 0, "length": 5}],
                    "reply_markup": {"inline_keyboard": [[{"text": "⬅ Back", "callback_data": "t"}]]}
                },
                "data": "payload"
            }
        })));
        let Inbound::Select(selection) = inbound else {
            panic!("expected a selection");
        };
        assert_eq!(selection.chat_id, 42);
        assert_eq!(selection.message_id, Some(77));
        assert_eq!(selection.payload, "payload");
        assert_eq!(selection.screen_text, "*TITLE*\n\tdef\\_x");
        assert_eq!(selection.screen_controls.unwrap().len(), 1);
    }

    #[test]
    fn test_callback_without_message_uses_sender_chat() {
        let inbound = Inbound::from_update(&update(serde_json::json!({
            "update_id": 3,
            "callback_query": {"id": "cb", "from": {"id": 9, "first_name": "I"}, "data": "p"}
        })));
        let Inbound::Select(selection) = inbound else {
            panic!("expected a selection");
        };
        assert_eq!(selection.chat_id, 9);
        assert_eq!(selection.message_id, None);
        assert!(selection.screen_text.is_empty());
    }

    #[test]
    fn test_ignored_updates() {
        let no_text = update(serde_json::json!({
            "update_id": 4,
            "message": {"message_id": 1, "chat": {"id": 1}}
        }));
        assert_eq!(Inbound::from_update(&no_text), Inbound::Ignored);
        let empty = update(serde_json::json!({"update_id": 5}));
        assert_eq!(Inbound::from_update(&empty).kind(), "ignored");
    }
}
