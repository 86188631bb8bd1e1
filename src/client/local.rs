use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use super::{ChangeHandler, RecordStore, Subscription};
use crate::changes::{ChangeBus, ChangeEvent, ChangeKind};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{CrewMember, CrewMemberPayload};

/// In-process record store: table operations go straight to a [`Store`] and
/// every successful write is published on the [`ChangeBus`].
///
/// This is also what the HTTP service runs its handlers against, so both
/// paths enforce the same invariants.
#[derive(Clone)]
pub struct LocalRecordStore {
    store: Arc<dyn Store>,
    changes: Arc<ChangeBus>,
}

impl LocalRecordStore {
    pub fn new(store: Arc<dyn Store>, changes: Arc<ChangeBus>) -> Self {
        Self { store, changes }
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    #[must_use]
    pub fn changes(&self) -> &Arc<ChangeBus> {
        &self.changes
    }
}

/// Timestamps are stored with microsecond precision. Records handed back from
/// a write must equal what a later read returns.
fn at_stored_precision(mut member: CrewMember) -> CrewMember {
    member.created_at = member.created_at.trunc_subsecs(6);
    member.updated_at = member.updated_at.trunc_subsecs(6);
    member
}

#[async_trait]
impl RecordStore for LocalRecordStore {
    async fn list_all(&self) -> Result<Vec<CrewMember>> {
        self.store.list_crewmates()
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<CrewMember>> {
        self.store.get_crewmate(id)
    }

    async fn insert(&self, payload: &CrewMemberPayload) -> Result<CrewMember> {
        payload.validate()?;

        let member = at_stored_precision(CrewMember::from_payload(
            Uuid::new_v4().to_string(),
            Utc::now(),
            payload.clone(),
        ));
        self.store.create_crewmate(&member)?;

        tracing::info!(id = %member.id, name = %member.name, "Created crewmate");
        self.changes
            .publish(ChangeEvent::new(ChangeKind::Insert, member.id.clone()));
        Ok(member)
    }

    async fn update(&self, id: &str, payload: &CrewMemberPayload) -> Result<CrewMember> {
        payload.validate()?;

        let mut member = self
            .store
            .get_crewmate(id)?
            .ok_or(Error::NotFound)?;
        member.apply(payload.clone());
        let member = at_stored_precision(member);
        self.store.update_crewmate(&member)?;

        tracing::info!(id = %member.id, "Updated crewmate");
        self.changes
            .publish(ChangeEvent::new(ChangeKind::Update, member.id.clone()));
        Ok(member)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.store.delete_crewmate(id)? {
            tracing::info!(id = %id, "Deleted crewmate");
            self.changes.publish(ChangeEvent::new(ChangeKind::Delete, id));
        } else {
            tracing::debug!(id = %id, "Delete matched no crewmate");
        }
        Ok(())
    }

    async fn subscribe_to_changes(&self, handler: ChangeHandler) -> Result<Subscription> {
        // Registered before returning so no write after this call is missed.
        let mut rx = self.changes.subscribe();

        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => handler(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Change listener lagged");
                        handler(ChangeEvent::resync());
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Ok(Subscription::new(task))
    }
}
