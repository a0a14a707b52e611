use std::sync::Arc;

use tokio::sync::mpsc;

use super::{Notifier, ProgressEvent};
use crate::llm::RetryPolicy;
use crate::store::EntityStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// No notifier, no such user, or the user has no chat handle.
    Skipped,
    Failed,
}

/// Sends `text` to the user's chat, if they have one, retrying under `retry`.
/// Problems are logged and reported through the return value, never raised.
pub async fn deliver(
    store: &dyn EntityStore,
    notifier: Option<&dyn Notifier>,
    retry: &RetryPolicy,
    user_id: uuid::Uuid,
    text: &str,
) -> Delivery {
    let Some(notifier) = notifier else {
        tracing::debug!(user_id = %user_id, "No notifier configured, skipping message");
        return Delivery::Skipped;
    };
    let user = match store.find_user(user_id) {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(user_id = %user_id, "Notification target no longer exists");
            return Delivery::Skipped;
        }
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Failed to load notification target");
            return Delivery::Failed;
        }
    };
    let Some(handle) = user.notification_handle() else {
        return Delivery::Skipped;
    };

    match retry
        .run("send_notification", move || notifier.send_message(handle, text))
        .await
    {
        Ok(()) => Delivery::Sent,
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "Notification delivery failed");
            Delivery::Failed
        }
    }
}

/// Drains progress events until every sender is dropped.
pub async fn run_dispatcher(
    mut rx: mpsc::UnboundedReceiver<ProgressEvent>,
    store: Arc<dyn EntityStore>,
    notifier: Option<Arc<dyn Notifier>>,
    retry: RetryPolicy,
) {
    while let Some(event) = rx.recv().await {
        let user_id = event.user_id();
        tracing::info!(user_id = %user_id, event = ?event, "Dispatching progress event");
        deliver(
            store.as_ref(),
            notifier.as_deref(),
            &retry,
            user_id,
            &event.message(),
        )
        .await;
    }
    tracing::info!("Progress event channel closed");
}
