use crate::telegram::TelegramClient;
use crate::types::Update;
use frazeo_core::FrazeoResult;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Long-polling receiver for environments without a public webhook URL.
///
/// Updates are forwarded through a `tokio::sync::mpsc` channel; the loop
/// ends when the receiving half is dropped.
pub struct UpdatePoller {
    client: Arc<TelegramClient>,
    timeout_secs: u64,
    retry_delay: Duration,
}

impl UpdatePoller {
    /// Create a poller with a 30 s long-poll timeout and 1 s retry delay.
    pub fn new(client: Arc<TelegramClient>) -> Self {
        Self {
            client,
            timeout_secs: 30,
            retry_delay: Duration::from_secs(1),
        }
    }

    /// Override the long-poll timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Override the pause after a failed poll.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Remove any webhook, then poll until `tx` is closed.
    ///
    /// Poll failures are logged and retried; only the initial webhook
    /// removal is fatal.
    pub async fn run(&self, tx: mpsc::Sender<Update>) -> FrazeoResult<()> {
        self.client.delete_webhook().await?;
        tracing::info!(timeout_secs = self.timeout_secs, "Long polling started");

        let mut offset: Option<i64> = None;
        while !tx.is_closed() {
            match self.client.get_updates(offset, self.timeout_secs).await {
                Ok(updates) => {
                    for update in updates {
                        // Advance the offset so we do not receive this update again.
                        offset = Some(update.update_id + 1);
                        if tx.send(update).await.is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "getUpdates failed, retrying");
                    tokio::time::sleep(self.retry_delay).await;
                }
            }
        }

        tracing::info!("Long polling stopped");
        Ok(())
    }
}
