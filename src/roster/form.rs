use chrono::{DateTime, Utc};

use crate::client::RecordStore;
use crate::error::{Error, Result, ValidationError};
use crate::types::{Attributes, Category, CrewMember, CrewMemberPayload, Role};

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this team member?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

/// Lifecycle of one form instance.
///
/// `Failed` keeps the last error message; any field edit puts the form back
/// to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Loading,
    Submitting,
    NotFound,
    Failed(String),
}

/// Where the caller should go after a successful write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Listing,
    Detail(String),
}

/// Create/edit form view-model.
#[derive(Debug, Clone)]
pub struct CrewForm {
    mode: FormMode,
    name: String,
    category: Category,
    attributes: Attributes,
    state: FormState,
}

impl CrewForm {
    fn blank(mode: FormMode) -> Self {
        let category = Category::Dev;
        let mut attributes = Attributes::default();
        attributes.apply_category(&category);
        Self {
            mode,
            name: String::new(),
            category,
            attributes,
            state: FormState::Idle,
        }
    }

    #[must_use]
    pub fn create() -> Self {
        Self::blank(FormMode::Create)
    }

    /// Edit form for `id`. Fields stay blank until [`CrewForm::load`].
    pub fn edit(id: impl Into<String>) -> Self {
        Self::blank(FormMode::Edit { id: id.into() })
    }

    /// Fetches the record being edited. A no-op for create forms.
    pub async fn load(&mut self, store: &dyn RecordStore) -> Result<()> {
        let FormMode::Edit { id } = &self.mode else {
            return Ok(());
        };
        let id = id.clone();

        self.state = FormState::Loading;
        match store.get_by_id(&id).await {
            Ok(Some(member)) => {
                self.populate(member);
                self.state = FormState::Idle;
                Ok(())
            }
            Ok(None) => {
                self.state = FormState::NotFound;
                Err(Error::NotFound)
            }
            Err(e) => {
                self.state = FormState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn populate(&mut self, member: CrewMember) {
        self.name = member.name;
        // A record saved without a category edits as Dev.
        self.category = match member.category {
            Category::Other(raw) if raw.trim().is_empty() => Category::Dev,
            category => category,
        };
        self.attributes = member.attributes;
        self.attributes.apply_category(&self.category);
    }

    fn touch(&mut self) {
        if matches!(self.state, FormState::Failed(_)) {
            self.state = FormState::Idle;
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.touch();
        self.name = name.into();
    }

    /// Switches category. The level is filled with the new category's first
    /// level only when none is chosen; skills are never pruned.
    pub fn select_category(&mut self, category: Category) {
        self.touch();
        self.category = category;
        self.attributes.apply_category(&self.category);
    }

    pub fn select_role(&mut self, role: Role) {
        self.touch();
        self.attributes.role = Some(role);
    }

    pub fn toggle_skill(&mut self, skill: &str) {
        self.touch();
        self.attributes.toggle_skill(skill);
    }

    pub fn select_level(&mut self, level: impl Into<String>) {
        self.touch();
        self.attributes.level = Some(level.into());
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.touch();
        let notes = notes.into();
        self.attributes.notes = if notes.trim().is_empty() {
            None
        } else {
            Some(notes)
        };
    }

    #[must_use]
    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn category(&self) -> &Category {
        &self.category
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[must_use]
    pub fn state(&self) -> &FormState {
        &self.state
    }

    /// Skill vocabulary offered for the current category.
    #[must_use]
    pub fn skill_choices(&self) -> &'static [&'static str] {
        self.category.taxonomy().skills
    }

    #[must_use]
    pub fn level_choices(&self) -> &'static [&'static str] {
        self.category.taxonomy().levels
    }

    pub fn build_payload(&self) -> std::result::Result<CrewMemberPayload, ValidationError> {
        self.build_payload_at(Utc::now())
    }

    /// Validates and assembles the write payload: name first, then role.
    /// The name is trimmed and `updated_at` is stamped with `now`.
    pub fn build_payload_at(
        &self,
        now: DateTime<Utc>,
    ) -> std::result::Result<CrewMemberPayload, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if self.attributes.role.is_none() {
            return Err(ValidationError::MissingRole);
        }
        if !self.category.is_known() {
            return Err(ValidationError::UnknownCategory(
                self.category.as_str().to_string(),
            ));
        }

        let mut attributes = self.attributes.clone();
        attributes.dedup_skills();

        Ok(CrewMemberPayload {
            name: name.to_string(),
            category: self.category.clone(),
            attributes,
            updated_at: now,
        })
    }

    /// Validates locally, then inserts or updates depending on the mode.
    /// Validation failures leave the state untouched and never reach the store.
    pub async fn submit(&mut self, store: &dyn RecordStore) -> Result<Navigation> {
        let payload = self.build_payload()?;

        self.state = FormState::Submitting;
        let result = match &self.mode {
            FormMode::Create => store.insert(&payload).await.map(|_| Navigation::Listing),
            FormMode::Edit { id } => store
                .update(id, &payload)
                .await
                .map(|member| Navigation::Detail(member.id)),
        };

        match result {
            Ok(navigation) => {
                self.state = FormState::Idle;
                Ok(navigation)
            }
            Err(e) => {
                self.state = FormState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Deletes the record being edited once `confirm` approves
    /// [`DELETE_CONFIRMATION`]. Returns `None` when declined or when the form
    /// is in create mode.
    pub async fn delete<F>(&mut self, store: &dyn RecordStore, confirm: F) -> Result<Option<Navigation>>
    where
        F: FnOnce(&str) -> bool,
    {
        let FormMode::Edit { id } = &self.mode else {
            return Ok(None);
        };
        if !confirm(DELETE_CONFIRMATION) {
            return Ok(None);
        }
        let id = id.clone();

        self.state = FormState::Submitting;
        match store.delete(&id).await {
            Ok(()) => {
                self.state = FormState::Idle;
                Ok(Some(Navigation::Listing))
            }
            Err(e) => {
                self.state = FormState::Failed(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_form_defaults() {
        let form = CrewForm::create();
        assert_eq!(form.mode(), &FormMode::Create);
        assert_eq!(form.category(), &Category::Dev);
        assert_eq!(form.attributes().level.as_deref(), Some("Intern"));
        assert!(form.attributes().skills.is_empty());
        assert_eq!(form.attributes().role, None);
        assert_eq!(form.state(), &FormState::Idle);
    }

    #[test]
    fn test_missing_name_wins_over_everything() {
        let mut form = CrewForm::create();
        form.select_role(Role::Leader);
        form.toggle_skill("React");
        for name in ["", "   ", "\t\n"] {
            form.set_name(name);
            assert_eq!(form.build_payload(), Err(ValidationError::MissingName));
        }
    }

    #[test]
    fn test_missing_role() {
        let mut form = CrewForm::create();
        form.set_name("Nova");
        form.select_category(Category::Space);
        form.toggle_skill("Combat");
        assert_eq!(form.build_payload(), Err(ValidationError::MissingRole));
    }

    #[test]
    fn test_payload_is_trimmed_and_stamped() {
        let mut form = CrewForm::create();
        form.set_name("  Nova  ");
        form.select_role(Role::Pilot);
        form.set_notes("   ");
        let now = Utc::now();
        let payload = form.build_payload_at(now).unwrap();
        assert_eq!(payload.name, "Nova");
        assert_eq!(payload.updated_at, now);
        assert_eq!(payload.attributes.notes, None);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_category_change_keeps_skills() {
        let mut form = CrewForm::create();
        form.toggle_skill("React");
        form.toggle_skill("Node.js");
        form.select_category(Category::Space);
        assert_eq!(form.attributes().skills, ["React", "Node.js"]);
        // Level was filled on creation, so it is kept.
        assert_eq!(form.attributes().level.as_deref(), Some("Intern"));
        assert_eq!(form.skill_choices(), Category::Space.taxonomy().skills);
    }

    #[test]
    fn test_unknown_category_must_be_replaced_before_saving() {
        let mut form = CrewForm::create();
        form.set_name("Old Salt");
        form.select_role(Role::Scout);
        form.select_category(Category::from("Wizard"));
        assert_eq!(form.level_choices(), Category::Default.taxonomy().levels);
        assert_eq!(
            form.build_payload(),
            Err(ValidationError::UnknownCategory("Wizard".to_string()))
        );
    }

    #[test]
    fn test_edit_clears_failed_state() {
        let mut form = CrewForm::create();
        form.state = FormState::Failed("boom".to_string());
        form.set_name("Nova");
        assert_eq!(form.state(), &FormState::Idle);
    }
}
