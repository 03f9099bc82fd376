use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};
use uuid::Uuid;

use super::RecipeStore;
use crate::error::{CatalogError, Result};
use crate::models::{AssetKind, Recipe};

/// Metadata key for the last successful replace
const SYNCED_AT_KEY: &str = "synced_at";

const SELECT_RECIPES: &str = "SELECT id, cuisine, name, photo_url_small, photo_url_large,
        source_url, youtube_url, image_small, image_large
     FROM recipes ORDER BY rowid";

const INSERT_RECIPE: &str = "INSERT INTO recipes (id, cuisine, name, photo_url_small,
        photo_url_large, source_url, youtube_url, image_small, image_large)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

/// SQLite-backed recipe store.
///
/// The connection sits behind a mutex and every operation runs on the
/// blocking pool, so the handle can be shared freely across tasks.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open or create the database file, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CatalogError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        info!(path = %path.display(), "Recipe store opened");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Non-persistent store, used by tests and previews.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS recipes (
                id              TEXT PRIMARY KEY NOT NULL,
                cuisine         TEXT NOT NULL DEFAULT '',
                name            TEXT NOT NULL DEFAULT '',
                photo_url_small TEXT NOT NULL DEFAULT '',
                photo_url_large TEXT NOT NULL DEFAULT '',
                source_url      TEXT NOT NULL DEFAULT '',
                youtube_url     TEXT NOT NULL DEFAULT '',
                image_small     BLOB,
                image_large     BLOB
            );
            CREATE TABLE IF NOT EXISTS sync_meta (
                key   TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| CatalogError::Storage("connection lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await?
    }

    fn recipe_from_row(row: &Row<'_>) -> rusqlite::Result<Recipe> {
        let id: String = row.get(0)?;
        let id = Uuid::parse_str(&id)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

        Ok(Recipe {
            id,
            cuisine: row.get(1)?,
            name: row.get(2)?,
            photo_url_small: row.get(3)?,
            photo_url_large: row.get(4)?,
            source_url: row.get(5)?,
            youtube_url: row.get(6)?,
            image_small: row.get(7)?,
            image_large: row.get(8)?,
        })
    }

    /// Number of stored recipes
    pub async fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }
}

#[async_trait]
impl RecipeStore for SqliteStore {
    async fn read_all(&self) -> Result<Vec<Recipe>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(SELECT_RECIPES)?;
            let recipes = stmt
                .query_map([], Self::recipe_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(recipes)
        })
        .await
    }

    async fn replace_all(&self, recipes: &[Recipe]) -> Result<()> {
        let recipes = recipes.to_vec();
        self.with_conn(move |conn| {
            // Dropping the transaction on any error rolls it back
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM recipes", [])?;
            {
                let mut stmt = tx.prepare(INSERT_RECIPE)?;
                for recipe in &recipes {
                    stmt.execute(params![
                        recipe.id.to_string(),
                        recipe.cuisine,
                        recipe.name,
                        recipe.photo_url_small,
                        recipe.photo_url_large,
                        recipe.source_url,
                        recipe.youtube_url,
                        recipe.image_small,
                        recipe.image_large,
                    ])?;
                }
            }
            tx.execute(
                "INSERT INTO sync_meta (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![SYNCED_AT_KEY, Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;

            debug!(removed, inserted = recipes.len(), "Recipe store replaced");
            Ok(())
        })
        .await
    }

    async fn attach_asset(&self, id: Uuid, kind: AssetKind, payload: Vec<u8>) -> Result<bool> {
        let sql = match kind {
            AssetKind::Small => "UPDATE recipes SET image_small = ?1 WHERE id = ?2",
            AssetKind::Large => "UPDATE recipes SET image_large = ?1 WHERE id = ?2",
        };

        self.with_conn(move |conn| {
            let updated = conn.execute(sql, params![payload, id.to_string()])?;
            if updated == 0 {
                debug!(%id, kind = kind.label(), "No stored recipe for asset, skipping");
            }
            Ok(updated > 0)
        })
        .await
    }

    async fn last_synced(&self) -> Result<Option<DateTime<Utc>>> {
        self.with_conn(|conn| {
            let value: Option<String> = conn
                .query_row(
                    "SELECT value FROM sync_meta WHERE key = ?1",
                    [SYNCED_AT_KEY],
                    |row| row.get(0),
                )
                .optional()?;

            match value {
                Some(raw) => DateTime::parse_from_rfc3339(&raw)
                    .map(|dt| Some(dt.with_timezone(&Utc)))
                    .map_err(|e| CatalogError::Storage(format!("Invalid sync timestamp: {}", e))),
                None => Ok(None),
            }
        })
        .await
    }
}

// ============================================================================
// Tests
// ============================================================================
