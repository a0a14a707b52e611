use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    GoalCompleted {
        user_id: Uuid,
        goal_id: Uuid,
        roadmap_id: Uuid,
        title: String,
        completed_at: DateTime<Utc>,
    },
}

impl ProgressEvent {
    pub fn user_id(&self) -> Uuid {
        match self {
            ProgressEvent::GoalCompleted { user_id, .. } => *user_id,
        }
    }

    /// Chat text announcing the event.
    pub fn message(&self) -> String {
        match self {
            ProgressEvent::GoalCompleted { title, .. } => {
                format!("🎉 Goal completed: {}! Every milestone is done.", title)
            }
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: ProgressEvent) -> AppResult<()>;
}

/// Forwards events to the dispatcher task.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) -> AppResult<()> {
        self.tx
            .send(event)
            .map_err(|_| AppError::internal("event dispatcher has shut down"))
    }
}

/// Keeps every emitted event in memory.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) -> AppResult<()> {
        self.events
            .lock()
            .map_err(|_| AppError::internal("recording sink lock poisoned"))?
            .push(event);
        Ok(())
    }
}
