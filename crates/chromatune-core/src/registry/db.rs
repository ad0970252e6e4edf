use rusqlite::Connection;
use std::path::Path;

use crate::error::Result;
use crate::model::PlaylistRecord;

use super::migrations::MIGRATIONS;

/// A registry connection with CRUD methods for playlist records.
#[derive(Debug)]
pub struct Registry {
    conn: Connection,
}

impl Registry {
    /// Open (or create) a registry at the given path and apply migrations.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let registry = Self { conn };
        registry.apply_migrations()?;
        Ok(registry)
    }

    /// Open an in-memory registry (for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let registry = Self { conn };
        registry.apply_migrations()?;
        Ok(registry)
    }

    fn apply_migrations(&self) -> Result<()> {
        // Create migrations table if it doesn't exist
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
                    "Applying registry migration {} ({})",
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

    /// Insert or replace a playlist record by id.
    pub fn upsert_playlist(&self, record: &PlaylistRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO playlists (id, name, url, image, ingested_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                url = excluded.url,
                image = excluded.image,
                ingested_at = excluded.ingested_at",
            rusqlite::params![
                record.id,
                record.name,
                record.url,
                record.image,
                record.ingested_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Look up a playlist record by id.
    pub fn get_playlist(&self, id: &str) -> Result<Option<PlaylistRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, url, image, ingested_at FROM playlists WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map([id], row_to_playlist)?;
        match rows.next() {
            Some(record) => Ok(Some(record?)),
            None => Ok(None),
        }
    }

    /// List all ingested playlists, ordered by name.
    pub fn list_playlists(&self) -> Result<Vec<PlaylistRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, url, image, ingested_at FROM playlists ORDER BY name",
        )?;
        let records = stmt
            .query_map([], row_to_playlist)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Remove a playlist record. Returns whether a record was deleted.
    pub fn remove_playlist(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM playlists WHERE id = ?1", [id])?;
        Ok(deleted > 0)
    }
}

fn row_to_playlist(row: &rusqlite::Row) -> rusqlite::Result<PlaylistRecord> {
    use chrono::{DateTime, Utc};

    let ingested_at: String = row.get(4)?;
    let ingested_at = DateTime::parse_from_rfc3339(&ingested_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?;

    Ok(PlaylistRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        image: row.get(3)?,
        ingested_at,
    })
}
