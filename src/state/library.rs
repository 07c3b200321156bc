use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use super::data::{Photo, PhotoId, Tag};

const KIND_TAG: &str = "tag";
const KIND_PHOTO: &str = "photo";
const NEXT_PHOTO_ID: &str = "next_photo_id";

/// The Catalog persists tags and photos in a SQLite key-value table.
/// Each entity is a JSON document; cross-references are keys, so a load
/// rebuilds the exact same graph.
pub struct Catalog {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl Catalog {
    /// Open (or create) the catalog database at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        tracing::info!(path = %db_path.display(), "catalog opened");

        let catalog = Catalog {
            conn,
            db_path: Some(db_path.to_path_buf()),
        };
        catalog.init_schema()?;
        Ok(catalog)
    }

    /// Catalog that lives only as long as the connection
    pub fn in_memory() -> Result<Self> {
        let catalog = Catalog {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        catalog.init_schema()?;
        Ok(catalog)
    }

    /// Creates all necessary tables if they don't exist.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS entries (
                kind        TEXT NOT NULL,
                key         TEXT NOT NULL,
                value_json  TEXT NOT NULL,
                PRIMARY KEY (kind, key)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS meta (
                key     TEXT PRIMARY KEY,
                value   INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub fn load_tags(&self) -> Result<BTreeMap<String, Tag>> {
        self.load_kind(KIND_TAG)?
            .into_iter()
            .map(|(key, json)| -> Result<(String, Tag)> { Ok((key, Tag::from_json(&json)?)) })
            .collect()
    }

    pub fn save_tags(&mut self, tags: &BTreeMap<String, Tag>) -> Result<()> {
        let rows = tags
            .iter()
            .map(|(name, tag)| -> Result<(String, String)> { Ok((name.clone(), tag.to_json()?)) })
            .collect::<Result<Vec<_>>>()?;
        self.replace_kind(KIND_TAG, &rows, None)
    }

    /// Photos keyed by id, plus the id counter
    pub fn load_photos(&self) -> Result<(BTreeMap<PhotoId, Photo>, u64)> {
        let photos = self
            .load_kind(KIND_PHOTO)?
            .into_iter()
            .map(|(_, json)| -> Result<(PhotoId, Photo)> {
                let photo = Photo::from_json(&json)?;
                Ok((photo.id, photo))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        let next_id: Option<i64> = self
            .conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                [NEXT_PHOTO_ID],
                |row| row.get(0),
            )
            .optional()?;

        Ok((photos, next_id.unwrap_or(1).max(1) as u64))
    }

    pub fn save_photos(&mut self, photos: &BTreeMap<PhotoId, Photo>, next_id: u64) -> Result<()> {
        let rows = photos
            .iter()
            .map(|(id, photo)| -> Result<(String, String)> { Ok((id.to_string(), photo.to_json()?)) })
            .collect::<Result<Vec<_>>>()?;
        self.replace_kind(KIND_PHOTO, &rows, Some(next_id))
    }

    fn load_kind(&self, kind: &str) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value_json FROM entries WHERE kind = ?1 ORDER BY key")?;

        let rows = stmt
            .query_map([kind], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
        Ok(rows)
    }

    /// Replace every entry of `kind` in a single transaction
    fn replace_kind(&mut self, kind: &str, rows: &[(String, String)], next_id: Option<u64>) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM entries WHERE kind = ?1", [kind])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO entries (kind, key, value_json) VALUES (?1, ?2, ?3)",
            )?;
            for (key, json) in rows {
                insert.execute(params![kind, key, json])?;
            }
        }
        if let Some(next_id) = next_id {
            tx.execute(
                "INSERT INTO meta (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![NEXT_PHOTO_ID, next_id as i64],
            )?;
        }
        tx.commit()?;

        tracing::debug!(kind, count = rows.len(), "catalog saved");
        Ok(())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("db_path", &self.db_path)
            .finish()
    }
}
