use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::{Attributes, CrewMember};

const CREWMATE_COLUMNS: &str = "id, name, category, attributes, created_at, updated_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database. Nothing is persisted.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory()?),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

// Fixed width so that ORDER BY on the text column is chronological.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// A role outside the fixed set is dropped so the remaining fields survive an edit.
fn parse_attributes(id: &str, raw: &str) -> Attributes {
    let err = match serde_json::from_str(raw) {
        Ok(attributes) => return attributes,
        Err(e) => e,
    };

    let without_role = serde_json::from_str::<serde_json::Value>(raw)
        .ok()
        .and_then(|mut value| {
            let role = value.as_object_mut()?.remove("role")?;
            let attributes = serde_json::from_value::<Attributes>(value).ok()?;
            tracing::warn!("Ignoring unknown role {} for crewmate '{}'", role, id);
            Some(attributes)
        });

    without_role.unwrap_or_else(|| {
        tracing::error!("Invalid attributes for crewmate '{}': {}", id, err);
        Attributes::default()
    })
}

fn row_to_crewmate(row: &Row<'_>) -> rusqlite::Result<CrewMember> {
    let id: String = row.get(0)?;
    let category: String = row.get(2)?;
    let attributes = parse_attributes(&id, &row.get::<_, String>(3)?);
    Ok(CrewMember {
        name: row.get(1)?,
        category: category.into(),
        attributes,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
        id,
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    fn list_crewmates(&self) -> Result<Vec<CrewMember>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CREWMATE_COLUMNS} FROM crewmates ORDER BY created_at DESC, rowid DESC"
        ))?;

        let rows = stmt.query_map([], row_to_crewmate)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn get_crewmate(&self, id: &str) -> Result<Option<CrewMember>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {CREWMATE_COLUMNS} FROM crewmates WHERE id = ?1"),
            params![id],
            row_to_crewmate,
        )
        .optional()
        .map_err(Error::from)
    }

    fn create_crewmate(&self, member: &CrewMember) -> Result<()> {
        let attributes = serde_json::to_string(&member.attributes)?;
        self.conn().execute(
            "INSERT INTO crewmates (id, name, category, attributes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                member.id,
                member.name,
                member.category.as_str(),
                attributes,
                format_datetime(&member.created_at),
                format_datetime(&member.updated_at),
            ],
        )?;
        Ok(())
    }

    fn update_crewmate(&self, member: &CrewMember) -> Result<()> {
        let attributes = serde_json::to_string(&member.attributes)?;
        let rows = self.conn().execute(
            "UPDATE crewmates SET name = ?1, category = ?2, attributes = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                member.name,
                member.category.as_str(),
                attributes,
                format_datetime(&member.updated_at),
                member.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_crewmate(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM crewmates WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn count_crewmates(&self) -> Result<i64> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM crewmates", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Folds the WAL back into the main database file.
    fn close(&self) -> Result<()> {
        self.conn()
            .query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::types::{Category, Role};
    use tempfile::TempDir;

    fn member(id: &str, name: &str, created_at: DateTime<Utc>) -> CrewMember {
        CrewMember {
            id: id.to_string(),
            name: name.to_string(),
            category: Category::Space,
            attributes: Attributes {
                role: Some(Role::Pilot),
                skills: vec!["Piloting".to_string(), "Combat".to_string()],
                level: Some("Officer".to_string()),
                notes: Some("steady hands".to_string()),
            },
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn test_initialize_creates_tables() {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        // Idempotent
        store.initialize().unwrap();

        let conn = store.conn();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"crewmates".to_string()));
        drop(conn);

        store.close().unwrap();
    }

    #[test]
    fn test_crewmate_crud() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.initialize().unwrap();

        let original = member("cm-1", "Nova", Utc::now());
        store.create_crewmate(&original).unwrap();

        let fetched = store.get_crewmate("cm-1").unwrap().unwrap();
        assert_eq!(fetched.name, "Nova");
        assert_eq!(fetched.category, Category::Space);
        assert_eq!(fetched.attributes, original.attributes);

        let mut changed = fetched.clone();
        changed.name = "Nova Prime".to_string();
        changed.attributes.level = Some("Commander".to_string());
        changed.updated_at = Utc::now();
        store.update_crewmate(&changed).unwrap();

        let fetched = store.get_crewmate("cm-1").unwrap().unwrap();
        assert_eq!(fetched.name, "Nova Prime");
        assert_eq!(fetched.attributes.level.as_deref(), Some("Commander"));
        assert_eq!(
            format_datetime(&fetched.created_at),
            format_datetime(&original.created_at)
        );

        assert!(store.delete_crewmate("cm-1").unwrap());
        assert!(!store.delete_crewmate("cm-1").unwrap());
        assert!(store.get_crewmate("cm-1").unwrap().is_none());
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.initialize().unwrap();

        let err = store
            .update_crewmate(&member("ghost", "Ghost", Utc::now()))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_list_is_newest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.initialize().unwrap();

        let base = Utc::now();
        store
            .create_crewmate(&member("a", "Oldest", base - Duration::hours(2)))
            .unwrap();
        store.create_crewmate(&member("c", "Newest", base)).unwrap();
        store
            .create_crewmate(&member("b", "Middle", base - Duration::hours(1)))
            .unwrap();

        let names: Vec<String> = store
            .list_crewmates()
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["Newest", "Middle", "Oldest"]);
        assert_eq!(store.count_crewmates().unwrap(), 3);
    }

    #[test]
    fn test_same_instant_orders_by_insertion() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.initialize().unwrap();

        let now = Utc::now();
        store.create_crewmate(&member("x", "First", now)).unwrap();
        store.create_crewmate(&member("y", "Second", now)).unwrap();

        let listed = store.list_crewmates().unwrap();
        assert_eq!(listed[0].name, "Second");
        assert_eq!(listed[1].name, "First");
    }

    #[test]
    fn test_unknown_category_and_loose_attributes_survive() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.initialize().unwrap();

        store
            .conn()
            .execute(
                "INSERT INTO crewmates (id, name, category, attributes, created_at, updated_at)
                 VALUES ('legacy', 'Old Salt', 'Wizard', '{\"role\": \"\", \"skills\": null}',
                         '2024-05-01 10:00:00', '2024-05-01 10:00:00')",
                [],
            )
            .unwrap();

        let fetched = store.get_crewmate("legacy").unwrap().unwrap();
        assert_eq!(fetched.category, Category::Other("Wizard".to_string()));
        assert_eq!(fetched.attributes, Attributes::default());
        assert_eq!(fetched.created_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }

    #[test]
    fn test_unknown_stored_role_keeps_other_attributes() {
        let attrs = parse_attributes(
            "legacy",
            r#"{"role":"Wizard","skills":["Combat"],"level":"Officer","notes":"old"}"#,
        );
        assert_eq!(attrs.role, None);
        assert_eq!(attrs.skills, ["Combat"]);
        assert_eq!(attrs.level.as_deref(), Some("Officer"));
        assert_eq!(attrs.notes.as_deref(), Some("old"));

        assert_eq!(parse_attributes("broken", "not json"), Attributes::default());
    }
}
