use std::sync::Arc;

use tokio::sync::mpsc;

use super::filter::{CategoryFilter, filter_members};
use crate::changes::ChangeEvent;
use crate::client::{ChangeHandler, RecordStore, Subscription};
use crate::error::Result;
use crate::types::CrewMember;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Failed(String),
}

/// Why the filtered listing came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyHint {
    /// The table itself is empty.
    NoMembers,
    /// Search or category selection excludes everything.
    NoMatches,
}

/// Listing view-model.
///
/// Holds the last fetched collection and the search/category criteria. While
/// active it owns one change subscription; every notification it receives is
/// answered with exactly one full refetch via [`RosterView::sync_once`].
pub struct RosterView {
    store: Arc<dyn RecordStore>,
    members: Vec<CrewMember>,
    query: String,
    category: CategoryFilter,
    state: LoadState,
    subscription: Option<Subscription>,
    notifications: Option<mpsc::UnboundedReceiver<ChangeEvent>>,
}

impl RosterView {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            members: Vec::new(),
            query: String::new(),
            category: CategoryFilter::All,
            state: LoadState::Idle,
            subscription: None,
            notifications: None,
        }
    }

    /// Registers the change subscription, then populates the collection.
    ///
    /// The subscription stays registered when the initial fetch fails; the
    /// error is returned and recorded in [`RosterView::state`].
    pub async fn activate(&mut self) -> Result<()> {
        if self.subscription.is_none() {
            let (tx, rx) = mpsc::unbounded_channel();
            let handler: ChangeHandler = Arc::new(move |event: ChangeEvent| {
                // The receiver is gone once the view deactivates.
                let _ = tx.send(event);
            });
            match self.store.subscribe_to_changes(handler).await {
                Ok(subscription) => {
                    self.subscription = Some(subscription);
                    self.notifications = Some(rx);
                }
                Err(e) => {
                    self.state = LoadState::Failed(e.to_string());
                    return Err(e);
                }
            }
        }
        self.refresh().await
    }

    /// Releases the change subscription. Safe to call more than once; only
    /// the first call disposes anything.
    pub fn deactivate(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.dispose();
        }
        self.notifications = None;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Replaces the working collection with a full `list_all`. On failure the
    /// previous collection is kept.
    pub async fn refresh(&mut self) -> Result<()> {
        self.state = LoadState::Loading;
        match self.store.list_all().await {
            Ok(members) => {
                self.members = members;
                self.state = LoadState::Idle;
                Ok(())
            }
            Err(e) => {
                self.state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Waits for the next change notification. `None` once deactivated or
    /// when the channel has closed.
    pub async fn next_change(&mut self) -> Option<ChangeEvent> {
        self.notifications.as_mut()?.recv().await
    }

    /// Waits for one notification and refetches once. A failed refetch is
    /// logged and left for the next notification or a manual refresh.
    /// Returns `false` when there is nothing left to wait for.
    pub async fn sync_once(&mut self) -> bool {
        let Some(event) = self.next_change().await else {
            return false;
        };
        tracing::debug!(kind = %event.kind, "Change received, refetching roster");
        if let Err(e) = self.refresh().await {
            tracing::warn!("Refetch after change notification failed: {e}");
        }
        true
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    #[must_use]
    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// The whole working collection, unfiltered.
    #[must_use]
    pub fn members(&self) -> &[CrewMember] {
        &self.members
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.members.len()
    }

    /// Members matching the current query and category selection.
    #[must_use]
    pub fn visible(&self) -> Vec<&CrewMember> {
        filter_members(&self.members, &self.query, &self.category)
    }

    #[must_use]
    pub fn empty_hint(&self) -> Option<EmptyHint> {
        if !self.visible().is_empty() {
            None
        } else if self.query.is_empty() && self.category.is_all() {
            Some(EmptyHint::NoMembers)
        } else {
            Some(EmptyHint::NoMatches)
        }
    }
}

impl Drop for RosterView {
    fn drop(&mut self) {
        self.deactivate();
    }
}
