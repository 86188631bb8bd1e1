use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::Category;
use crate::error::ValidationError;

/// Position a crewmate holds, independent of category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Leader,
    Engineer,
    Pilot,
    Medic,
    Scout,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Leader,
        Role::Engineer,
        Role::Pilot,
        Role::Medic,
        Role::Scout,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Leader => "Leader",
            Self::Engineer => "Engineer",
            Self::Pilot => "Pilot",
            Self::Medic => "Medic",
            Self::Scout => "Scout",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown role: {s}"))
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn blank_role_as_none<'de, D>(deserializer: D) -> Result<Option<Role>, D::Error>
where
    D: Deserializer<'de>,
{
    match blank_as_none(deserializer)? {
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Nested record carried by every crewmate. The shape is the same for all
/// categories; only the allowed skill and level values differ.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default, deserialize_with = "blank_role_as_none")]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub level: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub notes: Option<String>,
}

/// Returns `skills` with `skill` removed if present, or appended if absent.
#[must_use]
pub fn toggled_skills(skills: &[String], skill: &str) -> Vec<String> {
    if skills.iter().any(|s| s == skill) {
        skills.iter().filter(|s| *s != skill).cloned().collect()
    } else {
        let mut next = skills.to_vec();
        next.push(skill.to_string());
        next
    }
}

impl Attributes {
    pub fn toggle_skill(&mut self, skill: &str) {
        self.skills = toggled_skills(&self.skills, skill);
    }

    #[must_use]
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }

    /// Fills in the category's first level when no level is chosen yet.
    /// Skills are left alone even if they fall outside the new vocabulary.
    pub fn apply_category(&mut self, category: &Category) {
        if self.level.is_none() {
            self.level = Some(category.taxonomy().first_level().to_string());
        }
    }

    #[must_use]
    pub fn duplicate_skill(&self) -> Option<&str> {
        self.skills
            .iter()
            .enumerate()
            .find(|(i, skill)| self.skills[..*i].contains(*skill))
            .map(|(_, skill)| skill.as_str())
    }

    /// Drops repeated skills, keeping the first occurrence of each.
    pub fn dedup_skills(&mut self) {
        let mut seen: Vec<String> = Vec::with_capacity(self.skills.len());
        for skill in self.skills.drain(..) {
            if !seen.contains(&skill) {
                seen.push(skill);
            }
        }
        self.skills = seen;
    }

    #[must_use]
    pub fn role_label(&self) -> &'static str {
        self.role.map_or("No role assigned", Role::as_str)
    }

    #[must_use]
    pub fn level_label(&self) -> &str {
        self.level.as_deref().unwrap_or("Unranked")
    }

    /// The first `max` skills and how many more are hidden.
    #[must_use]
    pub fn skill_preview(&self, max: usize) -> (&[String], usize) {
        let shown = self.skills.len().min(max);
        (&self.skills[..shown], self.skills.len() - shown)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Attributes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CrewMember {
    /// Builds a stored record from a write payload.
    #[must_use]
    pub fn from_payload(id: String, created_at: DateTime<Utc>, payload: CrewMemberPayload) -> Self {
        Self {
            id,
            name: payload.name,
            category: payload.category,
            attributes: payload.attributes,
            created_at,
            updated_at: payload.updated_at,
        }
    }

    /// Overwrites every mutable field from `payload`.
    pub fn apply(&mut self, payload: CrewMemberPayload) {
        self.name = payload.name;
        self.category = payload.category;
        self.attributes = payload.attributes;
        self.updated_at = payload.updated_at;
    }

    /// Uppercased first letter of the name, or `?`.
    #[must_use]
    pub fn initial(&self) -> char {
        self.name
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('?')
    }
}

/// Client-supplied fields for an insert or a full update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMemberPayload {
    pub name: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Attributes,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl CrewMemberPayload {
    /// Checks the persisted-record invariants, name first and role second.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
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
        if let Some(skill) = self.attributes.duplicate_skill() {
            return Err(ValidationError::DuplicateSkill(skill.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn skills(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| (*s).to_string()).collect()
    }

    fn payload(name: &str, role: Option<Role>) -> CrewMemberPayload {
        CrewMemberPayload {
            name: name.to_string(),
            category: Category::Space,
            attributes: Attributes {
                role,
                skills: skills(&["Piloting"]),
                level: Some("Officer".to_string()),
                notes: None,
            },
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_toggle_appends_then_removes() {
        let start = skills(&["React"]);
        let added = toggled_skills(&start, "Go");
        assert_eq!(added, skills(&["React", "Go"]));
        let removed = toggled_skills(&added, "React");
        assert_eq!(removed, skills(&["Go"]));
    }

    #[test]
    fn test_toggle_twice_restores_members() {
        let start = skills(&["React", "Node.js", "SQL"]);
        for skill in ["Node.js", "Docker"] {
            let twice = toggled_skills(&toggled_skills(&start, skill), skill);
            let a: HashSet<_> = start.iter().collect();
            let b: HashSet<_> = twice.iter().collect();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_category_switch_keeps_skills_and_fills_level() {
        let mut attrs = Attributes {
            role: Some(Role::Engineer),
            skills: skills(&["React", "Node.js"]),
            level: None,
            notes: None,
        };
        attrs.apply_category(&Category::Space);
        assert_eq!(attrs.skills, skills(&["React", "Node.js"]));
        assert_eq!(attrs.level.as_deref(), Some("Cadet"));
    }

    #[test]
    fn test_category_switch_keeps_existing_level() {
        let mut attrs = Attributes {
            level: Some("Senior".to_string()),
            ..Attributes::default()
        };
        attrs.apply_category(&Category::Pirate);
        assert_eq!(attrs.level.as_deref(), Some("Senior"));
    }

    #[test]
    fn test_validation_order() {
        assert_eq!(payload("", None).validate(), Err(ValidationError::MissingName));
        assert_eq!(
            payload("   ", Some(Role::Pilot)).validate(),
            Err(ValidationError::MissingName)
        );
        assert_eq!(payload("Nova", None).validate(), Err(ValidationError::MissingRole));
        assert_eq!(payload("Nova", Some(Role::Pilot)).validate(), Ok(()));
    }

    #[test]
    fn test_validation_rejects_unknown_category_and_duplicates() {
        let mut p = payload("Nova", Some(Role::Pilot));
        p.category = Category::from("Wizard");
        assert_eq!(
            p.validate(),
            Err(ValidationError::UnknownCategory("Wizard".to_string()))
        );

        let mut p = payload("Nova", Some(Role::Pilot));
        p.attributes.skills = skills(&["Combat", "Repair", "Combat"]);
        assert_eq!(
            p.validate(),
            Err(ValidationError::DuplicateSkill("Combat".to_string()))
        );
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let mut attrs = Attributes {
            skills: skills(&["Go", "SQL", "Go", "AWS", "SQL"]),
            ..Attributes::default()
        };
        attrs.dedup_skills();
        assert_eq!(attrs.skills, skills(&["Go", "SQL", "AWS"]));
        assert_eq!(attrs.duplicate_skill(), None);
    }

    #[test]
    fn test_loose_attribute_blob_deserializes() {
        let attrs: Attributes =
            serde_json::from_str(r#"{"role": "", "skills": null, "level": "", "notes": ""}"#)
                .unwrap();
        assert_eq!(attrs, Attributes::default());

        let attrs: Attributes = serde_json::from_str(r#"{"role": "Medic"}"#).unwrap();
        assert_eq!(attrs.role, Some(Role::Medic));
        assert!(attrs.skills.is_empty());
    }

    #[test]
    fn test_null_attributes_on_member() {
        let member: CrewMember = serde_json::from_value(serde_json::json!({
            "id": "abc",
            "name": "Ghost",
            "category": "Pirate",
            "attributes": null,
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(member.attributes, Attributes::default());
        assert_eq!(member.attributes.role_label(), "No role assigned");
        assert_eq!(member.attributes.level_label(), "Unranked");
    }

    #[test]
    fn test_card_helpers() {
        let attrs = Attributes {
            skills: skills(&["React", "Go", "SQL", "AWS", "Docker"]),
            ..Attributes::default()
        };
        let (shown, hidden) = attrs.skill_preview(3);
        assert_eq!(shown, &skills(&["React", "Go", "SQL"])[..]);
        assert_eq!(hidden, 2);

        let now = Utc::now();
        let member = CrewMember::from_payload("id".into(), now, payload("nova", None));
        assert_eq!(member.initial(), 'N');
        let nameless = CrewMember::from_payload("id".into(), now, payload("", None));
        assert_eq!(nameless.initial(), '?');
    }
}
