mod category;
mod models;

pub use category::{Category, Taxonomy};
pub use models::{Attributes, CrewMember, CrewMemberPayload, Role, toggled_skills};
