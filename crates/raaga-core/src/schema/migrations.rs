/// A schema migration.
#[derive(Debug)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

const MIGRATION_001: &str = r#"
-- Derived artifacts, one row per kind. A build replaces every row in a
-- single transaction.
CREATE TABLE IF NOT EXISTS artifacts (
    kind TEXT PRIMARY KEY,
    format_version INTEGER NOT NULL,
    n_rows INTEGER NOT NULL,
    dims INTEGER NOT NULL,
    built_at TEXT NOT NULL,
    payload BLOB NOT NULL
);
"#;

pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "artifacts",
    sql: MIGRATION_001,
}];
