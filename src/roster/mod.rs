//! Client-side view-models for the roster: the listing with its live
//! refetch loop, the detail view, and the create/edit form.

mod detail;
mod filter;
mod form;
mod listing;

pub use detail::{DetailState, MemberDetail};
pub use filter::{CategoryFilter, filter_members, matches_search};
pub use form::{CrewForm, DELETE_CONFIRMATION, FormMode, FormState, Navigation};
pub use listing::{EmptyHint, LoadState, RosterView};
