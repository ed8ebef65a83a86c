use crate::dispatcher::Dispatcher;
use frazeo_channels::UpdatePoller;
use frazeo_core::{FrazeoError, FrazeoResult};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::error;

/// Feed updates from a long-poll loop to the dispatcher until polling stops.
///
/// Each update is handled on its own task, so a slow reply never holds up
/// the next poll.
pub async fn run_polling(
    dispatcher: Arc<Dispatcher>,
    poller: UpdatePoller,
    buffer: usize,
) -> FrazeoResult<()> {
    let (tx, mut rx) = mpsc::channel(buffer.max(1));
    let poll_task = tokio::spawn(async move { poller.run(tx).await });

    while let Some(update) = rx.recv().await {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            let update_id = update.update_id;
            if let Err(e) = dispatcher.handle_update(update).await {
                error!(update_id, error = %e, "Failed to deliver reply");
            }
        });
    }

    poll_task
        .await
        .map_err(|e| FrazeoError::Channel(format!("poller task failed: {e}")))?
}
