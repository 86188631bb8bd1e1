//! Typed boundary to the `crewmates` table.
//!
//! [`RecordStore`] is what the roster view-model talks to. [`HttpRecordStore`]
//! reaches a running `teamforge serve` instance; [`LocalRecordStore`] drives a
//! [`Store`](crate::store::Store) and [`ChangeBus`](crate::changes::ChangeBus)
//! in-process.

mod http;
mod local;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

pub use http::HttpRecordStore;
pub use local::LocalRecordStore;

use crate::changes::ChangeEvent;
use crate::error::Result;
use crate::types::{CrewMember, CrewMemberPayload};

/// Callback run for every change notification. Delivery is at-least-once and
/// unordered across writers; the event contents are advisory.
pub type ChangeHandler = Arc<dyn Fn(ChangeEvent) + Send + Sync>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Full table, newest `created_at` first.
    async fn list_all(&self) -> Result<Vec<CrewMember>>;

    async fn get_by_id(&self, id: &str) -> Result<Option<CrewMember>>;

    /// Returns the stored record with its generated id and timestamps.
    async fn insert(&self, payload: &CrewMemberPayload) -> Result<CrewMember>;

    /// Overwrites all mutable fields. Fails with `Error::NotFound` for an
    /// unknown id.
    async fn update(&self, id: &str, payload: &CrewMemberPayload) -> Result<CrewMember>;

    /// Deleting an id that does not exist is reported however the store
    /// reports it; the client adds no special case.
    async fn delete(&self, id: &str) -> Result<()>;

    async fn subscribe_to_changes(&self, handler: ChangeHandler) -> Result<Subscription>;
}

/// Live registration on the change channel.
///
/// Released by [`Subscription::dispose`] or on drop, whichever comes first;
/// the listener task is aborted exactly once either way.
#[must_use = "dropping a Subscription releases it immediately"]
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub(crate) fn new(task: JoinHandle<()>) -> Self {
        Self { task: Some(task) }
    }

    pub fn dispose(mut self) {
        self.release();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn release(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("Change subscription released");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_dispose_aborts_listener() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let task = tokio::spawn(async move {
            loop {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        let subscription = Subscription::new(task);
        assert!(subscription.is_active());
        subscription.dispose();

        tokio::time::sleep(Duration::from_millis(20)).await;
        let after_dispose = hits.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(hits.load(Ordering::SeqCst), after_dispose);
    }
}
