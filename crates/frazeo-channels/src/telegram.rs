use crate::transport::BotTransport;
use crate::types::{ApiResponse, InlineKeyboardMarkup, Message, Update};
use async_trait::async_trait;
use frazeo_core::{ControlLayout, FrazeoError, FrazeoResult, Reply};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Public Bot API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Formatting mode every outgoing text uses.
const PARSE_MODE: &str = "Markdown";

/// Fragment of the error Telegram returns when an edit changes nothing.
const NOT_MODIFIED: &str = "message is not modified";

// ── Request bodies ──────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct EditMessageTextRequest<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    parse_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize)]
struct AnswerCallbackQueryRequest<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SetWebhookRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_token: Option<&'a str>,
    allowed_updates: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct GetUpdatesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

// ── Client ──────────────────────────────────────────────────────────────────

/// Thin async client for the Telegram Bot HTTP API.
///
/// Every method posts a JSON body to `<base>/bot<token>/<method>` and
/// unwraps the `{ok, result, description}` envelope.
#[derive(Clone)]
pub struct TelegramClient {
    bot_token: String,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Create a client for the public Bot API.
    ///
    /// * `bot_token` – The bot token obtained from @BotFather.
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at another API server (a local Bot API server or a
    /// test double).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send a new message.
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        controls: Option<&ControlLayout>,
    ) -> FrazeoResult<Message> {
        let body = SendMessageRequest {
            chat_id,
            text,
            parse_mode: PARSE_MODE,
            reply_markup: controls.map(InlineKeyboardMarkup::from),
        };
        self.call("sendMessage", &body).await
    }

    /// Replace the text and keyboard of an existing message. Passing no
    /// controls removes the keyboard. An edit that changes nothing succeeds.
    pub async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        controls: Option<&ControlLayout>,
    ) -> FrazeoResult<()> {
        let body = EditMessageTextRequest {
            chat_id,
            message_id,
            text,
            parse_mode: PARSE_MODE,
            reply_markup: controls.map(InlineKeyboardMarkup::from),
        };
        let response: ApiResponse<serde_json::Value> = self.call_raw("editMessageText", &body).await?;
        if response.ok {
            return Ok(());
        }
        let description = response.description.unwrap_or_default();
        if description.contains(NOT_MODIFIED) {
            tracing::debug!(chat_id, message_id, "Edit left message unchanged");
            return Ok(());
        }
        Err(FrazeoError::Channel(format!(
            "Telegram editMessageText failed: {description}"
        )))
    }

    /// Acknowledge a button press, optionally with a toast.
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
    ) -> FrazeoResult<()> {
        let body = AnswerCallbackQueryRequest {
            callback_query_id,
            text,
        };
        self.call::<bool>("answerCallbackQuery", &body).await.map(drop)
    }

    /// Register `url` as the webhook.
    pub async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> FrazeoResult<()> {
        let body = SetWebhookRequest {
            url,
            secret_token,
            allowed_updates: ALLOWED_UPDATES,
        };
        self.call::<bool>("setWebhook", &body).await?;
        tracing::info!(url = %redact_token(url, &self.bot_token), "Webhook registered");
        Ok(())
    }

    /// Remove the webhook so `getUpdates` can be used.
    pub async fn delete_webhook(&self) -> FrazeoResult<()> {
        self.call::<bool>("deleteWebhook", &serde_json::json!({}))
            .await
            .map(drop)
    }

    /// Long-poll for updates after `offset`, waiting up to `timeout_secs`.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> FrazeoResult<Vec<Update>> {
        let body = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: ALLOWED_UPDATES,
        };
        self.call("getUpdates", &body).await
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.bot_token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &impl Serialize) -> FrazeoResult<T> {
        let response: ApiResponse<T> = self.call_raw(method, body).await?;
        if !response.ok {
            return Err(FrazeoError::Channel(format!(
                "Telegram {method} failed: {}",
                response.description.unwrap_or_default()
            )));
        }
        response
            .result
            .ok_or_else(|| FrazeoError::Channel(format!("Telegram {method} returned no result")))
    }

    async fn call_raw<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
    ) -> FrazeoResult<ApiResponse<T>> {
        // Telegram answers errors with a non-2xx status and the same JSON
        // envelope, so the body is parsed regardless of status.
        let response = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| FrazeoError::Http(format!("Telegram {method} error: {}", e.without_url())))?;

        response
            .json()
            .await
            .map_err(|e| FrazeoError::Channel(format!("Telegram {method} parse error: {}", e.without_url())))
    }
}

/// Replace the bot token in a URL for logging.
fn redact_token(url: &str, token: &str) -> String {
    if token.is_empty() {
        url.to_string()
    } else {
        url.replace(token, "<token>")
    }
}

#[async_trait]
impl BotTransport for TelegramClient {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> FrazeoResult<()> {
        self.send_message(chat_id, &reply.text, reply.controls.as_ref())
            .await
            .map(drop)
    }

    async fn edit_reply(&self, chat_id: i64, message_id: i64, reply: &Reply) -> FrazeoResult<()> {
        self.edit_message_text(chat_id, message_id, &reply.text, reply.controls.as_ref())
            .await
    }

    async fn answer_callback(&self, callback_id: &str, notice: Option<&str>) -> FrazeoResult<()> {
        self.answer_callback_query(callback_id, notice).await
    }
}
