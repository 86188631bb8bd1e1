mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::CrewMember;

/// Store defines the database interface behind the `crewmates` table.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    /// All records, newest `created_at` first.
    fn list_crewmates(&self) -> Result<Vec<CrewMember>>;
    fn get_crewmate(&self, id: &str) -> Result<Option<CrewMember>>;
    fn create_crewmate(&self, member: &CrewMember) -> Result<()>;
    /// Overwrites name, category, attributes and `updated_at`. Fails with
    /// `Error::NotFound` when no row has the given id.
    fn update_crewmate(&self, member: &CrewMember) -> Result<()>;
    fn delete_crewmate(&self, id: &str) -> Result<bool>;
    fn count_crewmates(&self) -> Result<i64>;

    fn close(&self) -> Result<()>;
}
