pub const SCHEMA: &str = r#"
-- Roster records; attributes is a JSON blob {role, skills, level, notes}
CREATE TABLE IF NOT EXISTS crewmates (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    category TEXT NOT NULL DEFAULT 'Dev',
    attributes TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_crewmates_created ON crewmates(created_at);
"#;
