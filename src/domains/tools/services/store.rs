//! SQLite-backed key/value item storage for the `store_*` tools.
//!
//! ```sql
//! CREATE TABLE items (
//!     key        TEXT PRIMARY KEY,
//!     value      TEXT NOT NULL,
//!     updated_at TEXT NOT NULL   -- RFC 3339
//! );
//! ```
//!
//! The database is opened on first use, so a server that never touches the
//! store never creates the file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use schemars::JsonSchema;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domains::tools::ToolError;

/// One stored item.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct StoredItem {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

pub struct ItemStore {
    path: PathBuf,
    conn: Mutex<Option<Connection>>,
}

impl std::fmt::Debug for ItemStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemStore").field("path", &self.path).finish()
    }
}

fn db_error(e: rusqlite::Error) -> ToolError {
    ToolError::failed(format!("Item store error: {}", e))
}

impl ItemStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conn: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(path: &Path) -> Result<Connection, ToolError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(db_error)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS items (
                key        TEXT PRIMARY KEY,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )
        .map_err(db_error)?;
        info!("Opened item store at {}", path.display());
        Ok(conn)
    }

    /// Run `f` against the open connection, opening it first if needed.
    async fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T, ToolError> {
        let mut guard = self.conn.lock().await;
        if guard.is_none() {
            *guard = Some(Self::open(&self.path)?);
        }
        match guard.as_ref() {
            Some(conn) => f(conn).map_err(db_error),
            None => Err(ToolError::fault("item store connection missing after open")),
        }
    }

    /// Insert or replace `key`. Returns `true` when an existing value was replaced.
    pub async fn put(&self, key: &str, value: &str) -> Result<bool, ToolError> {
        let now = Utc::now();
        self.with_conn(|conn| {
            let existed = conn
                .query_row("SELECT 1 FROM items WHERE key = ?1", params![key], |_| Ok(()))
                .optional()?
                .is_some();
            conn.execute(
                "INSERT INTO items (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now.to_rfc3339()],
            )?;
            debug!("Stored item '{}'", key);
            Ok(existed)
        })
        .await
    }

    pub async fn get(&self, key: &str) -> Result<Option<StoredItem>, ToolError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT key, value, updated_at FROM items WHERE key = ?1",
                params![key],
                row_to_item,
            )
            .optional()
        })
        .await
    }

    /// Items ordered by key, optionally restricted to a key prefix.
    pub async fn list(&self, prefix: Option<&str>, limit: usize) -> Result<Vec<StoredItem>, ToolError> {
        let pattern = format!("{}%", escape_like(prefix.unwrap_or("")));
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT key, value, updated_at FROM items
                 WHERE key LIKE ?1 ESCAPE '\\'
                 ORDER BY key LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![pattern, limit as i64], row_to_item)?;
            rows.collect()
        })
        .await
    }

    /// Delete `key`. Returns `true` when something was removed.
    pub async fn delete(&self, key: &str) -> Result<bool, ToolError> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM items WHERE key = ?1", params![key])?;
            Ok(removed > 0)
        })
        .await
    }
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredItem> {
    let updated_at: String = row.get(2)?;
    let updated_at = DateTime::parse_from_rfc3339(&updated_at)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?;
    Ok(StoredItem {
        key: row.get(0)?,
        value: row.get(1)?,
        updated_at,
    })
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> ItemStore {
        ItemStore::new(dir.path().join("nested").join("items.sqlite3"))
    }

    #[tokio::test]
    async fn test_opens_lazily() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(!store.path().exists());

        store.put("a", "1").await.unwrap();
        assert!(store.path().exists());
    }

    #[tokio::test]
    async fn test_put_get_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert!(!store.put("color", "red").await.unwrap());
        assert!(store.put("color", "blue").await.unwrap());

        let item = store.get("color").await.unwrap().unwrap();
        assert_eq!(item.value, "blue");
        assert!(store.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_prefix_and_limit() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for key in ["user:2", "user:1", "user_x", "other"] {
            store.put(key, "v").await.unwrap();
        }

        let keys: Vec<_> = store
            .list(Some("user:"), 10)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.key)
            .collect();
        assert_eq!(keys, vec!["user:1", "user:2"]);

        // `_` is literal, not a wildcard
        let keys: Vec<_> = store.list(Some("user_"), 10).await.unwrap();
        assert_eq!(keys.len(), 1);

        assert_eq!(store.list(None, 3).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.put("k", "v").await.unwrap();

        assert!(store.delete("k").await.unwrap());
        assert!(!store.delete("k").await.unwrap());
        assert!(store.get("k").await.unwrap().is_none());
    }
}
