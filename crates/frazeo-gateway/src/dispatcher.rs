use frazeo_bot::Navigator;
use frazeo_channels::{BotTransport, Inbound, Selection, Update};
use frazeo_core::{FrazeoError, FrazeoResult, Reply};
use frazeo_session::{ConversationId, Snapshot};
use std::sync::Arc;
use tracing::{debug, error};

/// What the user sees when a request fails for a reason other than expiry.
pub const FAILURE_TEXT: &str = "Sorry, something went wrong. Please try again.";

/// Routes classified updates to the navigator and delivers the replies.
///
/// The navigator is synchronous (embedding and index lookups are CPU work),
/// so every call runs on the blocking pool. Navigator errors never escape:
/// they are logged and answered with [`FAILURE_TEXT`], as a message for
/// text input or as a toast over the unchanged screen for button presses.
/// Only transport failures are returned to the caller.
pub struct Dispatcher {
    navigator: Arc<Navigator>,
    transport: Arc<dyn BotTransport>,
}

impl Dispatcher {
    /// Create a dispatcher.
    pub fn new(navigator: Arc<Navigator>, transport: Arc<dyn BotTransport>) -> Self {
        Self {
            navigator,
            transport,
        }
    }

    /// The navigator behind this dispatcher.
    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    /// Classify and handle a raw update.
    pub async fn handle_update(&self, update: Update) -> FrazeoResult<()> {
        let inbound = Inbound::from_update(&update);
        debug!(update_id = update.update_id, kind = inbound.kind(), "Update received");
        self.dispatch(inbound).await
    }

    /// Handle a classified update.
    pub async fn dispatch(&self, inbound: Inbound) -> FrazeoResult<()> {
        match inbound {
            Inbound::Start {
                chat_id,
                first_name,
            } => {
                let reply = self
                    .run(move |nav| nav.handle_start(first_name.as_deref()))
                    .await
                    .unwrap_or_else(|_| Reply::text(FAILURE_TEXT));
                self.transport.send_reply(chat_id, &reply).await
            }
            Inbound::Help { chat_id } => {
                let reply = self
                    .run(Navigator::handle_help)
                    .await
                    .unwrap_or_else(|_| Reply::text(FAILURE_TEXT));
                self.transport.send_reply(chat_id, &reply).await
            }
            Inbound::Query { chat_id, text } => {
                let conversation = ConversationId::from(chat_id);
                let reply = self
                    .run(move |nav| nav.handle_query(&conversation, &text))
                    .await
                    .unwrap_or_else(|_| Reply::text(FAILURE_TEXT));
                self.transport.send_reply(chat_id, &reply).await
            }
            Inbound::Select(selection) => self.select(selection).await,
            Inbound::Ignored => Ok(()),
        }
    }

    async fn select(&self, selection: Selection) -> FrazeoResult<()> {
        let Selection {
            chat_id,
            message_id,
            callback_id,
            payload,
            screen_text,
            screen_controls,
        } = selection;
        let conversation = ConversationId::from(chat_id);
        let current = Snapshot::new(screen_text, screen_controls);
        let fallback = current.clone();

        let reply = self
            .run(move |nav| nav.handle_select(&conversation, &payload, current))
            .await
            .unwrap_or_else(|_| {
                // The screen may be unknown, and an empty message is rejected.
                let screen = if fallback.text.trim().is_empty() {
                    Reply::text(FAILURE_TEXT)
                } else {
                    fallback.to_reply()
                };
                screen.with_notice(FAILURE_TEXT)
            });

        let delivered = match message_id {
            Some(message_id) => self.transport.edit_reply(chat_id, message_id, &reply).await,
            None => self.transport.send_reply(chat_id, &reply).await,
        };
        // Always acknowledge, or the client keeps showing a spinner.
        let acknowledged = self
            .transport
            .answer_callback(&callback_id, reply.notice.as_deref())
            .await;
        delivered.and(acknowledged)
    }

    /// Run a navigator call on the blocking pool, logging any failure.
    async fn run<F>(&self, call: F) -> FrazeoResult<Reply>
    where
        F: FnOnce(&Navigator) -> FrazeoResult<Reply> + Send + 'static,
    {
        let navigator = self.navigator.clone();
        let outcome = tokio::task::spawn_blocking(move || call(&navigator))
            .await
            .map_err(|e| FrazeoError::Session(format!("navigator task failed: {e}")))
            .and_then(|result| result);
        if let Err(e) = &outcome {
            error!(error = %e, transport = self.transport.name(), "Request failed");
        }
        outcome
    }
}
