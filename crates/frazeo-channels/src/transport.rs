use async_trait::async_trait;
use frazeo_core::{FrazeoResult, Reply};

/// Outbound side of a chat transport.
///
/// The dispatcher only ever needs these three operations, so tests can swap
/// the Telegram client for a recording double.
#[async_trait]
pub trait BotTransport: Send + Sync {
    /// Transport name for logs.
    fn name(&self) -> &str;

    /// Post `reply` as a new message in `chat_id`.
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> FrazeoResult<()>;

    /// Replace message `message_id` in `chat_id` with `reply`.
    async fn edit_reply(&self, chat_id: i64, message_id: i64, reply: &Reply) -> FrazeoResult<()>;

    /// Acknowledge a button press, showing `notice` as a toast if given.
    async fn answer_callback(&self, callback_id: &str, notice: Option<&str>) -> FrazeoResult<()>;
}
