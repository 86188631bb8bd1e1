use crate::client::RecordStore;
use crate::types::CrewMember;

#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Loading,
    Loaded(CrewMember),
    NotFound,
    Failed(String),
}

/// Detail view-model. Always fetches its record by id rather than reading
/// from a listing that may not be loaded.
pub struct MemberDetail {
    id: String,
    state: DetailState,
}

impl MemberDetail {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: DetailState::Loading,
        }
    }

    pub async fn load(&mut self, store: &dyn RecordStore) -> &DetailState {
        self.state = DetailState::Loading;
        self.state = match store.get_by_id(&self.id).await {
            Ok(Some(member)) => DetailState::Loaded(member),
            Ok(None) => DetailState::NotFound,
            Err(e) => DetailState::Failed(e.to_string()),
        };
        &self.state
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn state(&self) -> &DetailState {
        &self.state
    }

    #[must_use]
    pub fn member(&self) -> Option<&CrewMember> {
        match &self.state {
            DetailState::Loaded(member) => Some(member),
            _ => None,
        }
    }
}
