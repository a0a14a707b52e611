//! Progress events and their delivery to chat.
//!
//! Services emit [`ProgressEvent`]s on an [`EventSink`]. In the server the sink
//! is a channel drained by [`dispatcher::run_dispatcher`], which resolves the
//! owner's chat handle and hands the text to a [`Notifier`].

pub mod dispatcher;
pub mod events;
pub mod telegram;

use async_trait::async_trait;

use crate::error::AppResult;

pub use dispatcher::{Delivery, deliver, run_dispatcher};
pub use events::{ChannelSink, EventSink, ProgressEvent, RecordingSink};
pub use telegram::TelegramNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, chat_handle: &str, text: &str) -> AppResult<()>;
}
