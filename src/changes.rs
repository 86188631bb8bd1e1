//! Row-level change notifications for the `crewmates` table.
//!
//! [`ChangeBus`] fans every write out to any number of listeners through a
//! `tokio::sync::broadcast` channel. It is shared as `Arc<ChangeBus>` between
//! the HTTP service and in-process clients.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub const CREWMATES_TABLE: &str = "crewmates";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// A single change on the table.
///
/// Listeners should not depend on `id`; the expected reaction to any event
/// is to refetch the whole table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub table: String,
    #[serde(default)]
    pub id: Option<String>,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            table: CREWMATES_TABLE.to_string(),
            id: Some(id.into()),
            at: Utc::now(),
        }
    }

    /// Event carrying no row id, emitted when a listener may have missed
    /// changes and has to refetch.
    #[must_use]
    pub fn resync() -> Self {
        Self {
            kind: ChangeKind::Update,
            table: CREWMATES_TABLE.to_string(),
            id: None,
            at: Utc::now(),
        }
    }
}

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    /// When the buffer is full the oldest events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current listeners. Dropped silently when nobody listens.
    pub fn publish(&self, event: ChangeEvent) {
        tracing::debug!(kind = %event.kind, id = ?event.id, "Publishing change");
        let _ = self.sender.send(event);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
