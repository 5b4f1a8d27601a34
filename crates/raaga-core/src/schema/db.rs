use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::{Error, Result};

use super::artifact::{ArtifactBlob, ArtifactInfo, ArtifactKind, FORMAT_VERSION};
use super::migrations::MIGRATIONS;

/// A database connection holding persisted similarity artifacts.
#[derive(Debug)]
pub struct ArtifactStore {
    conn: Connection,
}

impl ArtifactStore {
    /// Open (or create) a store at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.apply_migrations()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.apply_migrations()?;
        Ok(store)
    }

    /// Get a reference to the underlying connection (for advanced queries).
    #[must_use]
    pub const fn conn(&self) -> &Connection {
        &self.conn
    }

    fn apply_migrations(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT version FROM schema_migrations ORDER BY version")?;
        let applied: Vec<u32> = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for migration in MIGRATIONS {
            if !applied.contains(&migration.version) {
                log::info!(
                    "Applying migration {} ({})",
                    migration.version,
                    migration.name
                );
                self.conn.execute_batch(migration.sql)?;
                self.conn.execute(
                    "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
                    rusqlite::params![migration.version, migration.name],
                )?;
            }
        }

        Ok(())
    }
}

// Writing
impl ArtifactStore {
    /// Replace the whole artifact set.
    ///
    /// Runs in one transaction: readers see either the previous set or the
    /// new one, never a mix.
    pub fn replace_all(&self, blobs: &[ArtifactBlob]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM artifacts", [])?;

        let built_at = Utc::now().to_rfc3339();
        for blob in blobs {
            tx.execute(
                "INSERT INTO artifacts (kind, format_version, n_rows, dims, built_at, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    blob.kind.as_str(),
                    FORMAT_VERSION,
                    to_sql_int(blob.n_rows)?,
                    to_sql_int(blob.dims)?,
                    built_at,
                    blob.payload,
                ],
            )?;
        }

        tx.commit()?;
        log::info!("Persisted {} artifacts", blobs.len());
        Ok(())
    }
}

// Reading
impl ArtifactStore {
    /// Header of one artifact, if present.
    pub fn info(&self, kind: ArtifactKind) -> Result<Option<ArtifactInfo>> {
        let info = self
            .conn
            .query_row(
                "SELECT kind, format_version, n_rows, dims, built_at, length(payload)
                 FROM artifacts WHERE kind = ?1",
                [kind.as_str()],
                |row| Self::row_to_info(row),
            )
            .optional()?;
        Ok(info)
    }

    /// Headers of every stored artifact, ordered by kind.
    pub fn list(&self) -> Result<Vec<ArtifactInfo>> {
        let mut stmt = self.conn.prepare(
            "SELECT kind, format_version, n_rows, dims, built_at, length(payload)
             FROM artifacts ORDER BY kind",
        )?;
        let infos = stmt
            .query_map([], |row| Self::row_to_info(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(infos)
    }

    /// Decode one artifact, checking it was written by this format version
    /// for a catalog of `expected_rows` tracks.
    ///
    /// # Errors
    /// `ModelNotFit` if the artifact is missing, has another format version or
    /// covers a different number of rows.
    pub fn load<T: DeserializeOwned>(
        &self,
        kind: ArtifactKind,
        expected_rows: usize,
    ) -> Result<(ArtifactInfo, T)> {
        let row = self
            .conn
            .query_row(
                "SELECT kind, format_version, n_rows, dims, built_at, length(payload), payload
                 FROM artifacts WHERE kind = ?1",
                [kind.as_str()],
                |row| Ok((Self::row_to_info(row)?, row.get::<_, Vec<u8>>(6)?)),
            )
            .optional()?;

        let (info, payload) = row.ok_or_else(|| {
            Error::ModelNotFit(format!("artifact {kind} has not been built"))
        })?;

        if info.format_version != FORMAT_VERSION {
            return Err(Error::ModelNotFit(format!(
                "artifact {kind} has format version {}, expected {FORMAT_VERSION}",
                info.format_version
            )));
        }
        if info.n_rows != expected_rows {
            return Err(Error::ModelNotFit(format!(
                "artifact {kind} covers {} rows, catalog has {expected_rows}",
                info.n_rows
            )));
        }

        let value = bincode::deserialize(&payload)?;
        Ok((info, value))
    }

    fn row_to_info(row: &rusqlite::Row) -> rusqlite::Result<ArtifactInfo> {
        use rusqlite::types::Type;

        let kind_str: String = row.get(0)?;
        let kind = ArtifactKind::from_name(&kind_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                Type::Text,
                format!("unknown artifact kind {kind_str}").into(),
            )
        })?;
        let built_at_str: String = row.get(4)?;
        let built_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&built_at_str)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?
            .into();

        Ok(ArtifactInfo {
            kind,
            format_version: row.get(1)?,
            n_rows: from_sql_int(row.get(2)?, 2)?,
            dims: from_sql_int(row.get(3)?, 3)?,
            built_at,
            payload_bytes: from_sql_int(row.get(5)?, 5)?,
        })
    }
}

fn to_sql_int(value: usize) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| Error::InvalidArgument(format!("{value} does not fit in an SQLite integer")))
}

fn from_sql_int(value: i64, column: usize) -> rusqlite::Result<usize> {
    usize::try_from(value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Integer, Box::new(e))
    })
}
