//! Realtime notification feed.
//!
//! The realtime channel delivers JSON messages. `notification.created`
//! messages are appended to the feed and bump the unread counter; other
//! events are ignored. The feed stops applying messages once its
//! cancellation token fires.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};

/// The event name of a new notification.
pub const NOTIFICATION_CREATED: &str = "notification.created";

/// A notification shown in the inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique identifier.
    pub id: String,
    /// Short headline.
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub message: String,
    /// When the backend created it.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

#[derive(Debug, Default)]
struct FeedState {
    notifications: Vec<Notification>,
    unread: usize,
}

/// In-memory notification list fed by the realtime channel.
#[derive(Debug, Clone)]
pub struct NotificationFeed {
    state: Arc<RwLock<FeedState>>,
    token: CancellationToken,
}

impl NotificationFeed {
    /// Creates an empty feed that stops when `token` is cancelled.
    pub fn new(token: CancellationToken) -> Self {
        Self {
            state: Arc::new(RwLock::new(FeedState::default())),
            token,
        }
    }

    /// Applies one raw message.
    ///
    /// Returns true if a notification was added.
    ///
    /// # Errors
    ///
    /// `MalformedNotification` when the message is not a valid envelope or a
    /// `notification.created` payload is malformed.
    pub fn handle_message(&self, raw: &str) -> EngineResult<bool> {
        if self.token.is_cancelled() {
            return Ok(false);
        }

        let envelope: Envelope =
            serde_json::from_str(raw).map_err(|e| EngineError::MalformedNotification {
                message: e.to_string(),
            })?;
        if envelope.event != NOTIFICATION_CREATED {
            debug!(event = %envelope.event, "Ignoring realtime event");
            return Ok(false);
        }

        let notification: Notification = serde_json::from_value(envelope.data).map_err(|e| {
            EngineError::MalformedNotification {
                message: e.to_string(),
            }
        })?;

        let mut state = self.state.write();
        state.notifications.push(notification);
        state.unread += 1;
        Ok(true)
    }

    /// Consumes `messages` on a tokio task until the channel closes or the
    /// token is cancelled.
    pub fn spawn(&self, mut messages: mpsc::Receiver<String>) -> JoinHandle<()> {
        let feed = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = feed.token.cancelled() => {
                        debug!("Notification feed cancelled");
                        break;
                    }
                    message = messages.recv() => match message {
                        Some(raw) => {
                            if let Err(err) = feed.handle_message(&raw) {
                                warn!(error = %err, "Dropping realtime message");
                            }
                        }
                        None => {
                            debug!("Realtime channel closed");
                            break;
                        }
                    },
                }
            }
        })
    }

    /// Stops the feed.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// All notifications, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.state.read().notifications.clone()
    }

    /// Notifications received since the last [`mark_all_read`](Self::mark_all_read).
    pub fn unread_count(&self) -> usize {
        self.state.read().unread
    }

    /// Resets the unread counter.
    pub fn mark_all_read(&self) {
        self.state.write().unread = 0;
    }
}
