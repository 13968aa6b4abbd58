//! SqliteItemStore - 永続化された item ストア
//!
//! # 実装詳細
//! - テーブル `instances_to_dispatch`（open 時に作成）
//! - rusqlite は同期 API なので spawn_blocking で実行
//! - 壊れた行は error を出して list から除外（スキャン全体は止めない、行はオペレーター対応まで残る）

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use tracing::{debug, error};

use crate::domain::{Deletion, DispatchItem, ItemId, PayloadType, StoreError, TargetUri};
use crate::ports::{Clock, IdGenerator, ItemStore, SystemClock, UlidGenerator};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS instances_to_dispatch (
    id                 TEXT PRIMARY KEY,
    target_uri         TEXT NOT NULL,
    payload_type       TEXT NOT NULL,
    serialized_payload TEXT NOT NULL,
    created_at         TEXT NOT NULL
)";

/// SQLite-backed store shared with the producers that write into it.
#[derive(Clone)]
pub struct SqliteItemStore {
    conn: Arc<Mutex<Connection>>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl SqliteItemStore {
    /// Opens (or creates) the database file and ensures the table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(backend)?;
        debug!(path = %path.display(), "opened sqlite store");
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory().map_err(backend)?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA).map_err(backend)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            ids: Arc::new(UlidGenerator::new(clock.clone())),
            clock,
        })
    }

    /// Producer side: stores a new item and returns it with its assigned id.
    pub async fn insert(
        &self,
        target_uri: TargetUri,
        payload_type: PayloadType,
        serialized_payload: impl Into<String>,
    ) -> Result<DispatchItem, StoreError> {
        let item = DispatchItem::new(
            self.ids.generate_item_id(),
            target_uri,
            payload_type,
            serialized_payload,
            self.clock.now(),
        );
        self.insert_item(item.clone()).await?;
        Ok(item)
    }

    pub async fn insert_item(&self, item: DispatchItem) -> Result<(), StoreError> {
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO instances_to_dispatch
                     (id, target_uri, payload_type, serialized_payload, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    item.id().as_ulid().to_string(),
                    item.target_uri().as_str(),
                    item.payload_type().as_str(),
                    item.serialized_payload(),
                    item.created_at().to_rfc3339(),
                ],
            )
            .map_err(backend)?;
            Ok(())
        })
        .await
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap_or_else(PoisonError::into_inner);
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Backend(format!("blocking task failed: {e}")))?
    }
}

struct Row {
    id: String,
    target_uri: String,
    payload_type: String,
    serialized_payload: String,
    created_at: String,
}

impl Row {
    fn into_item(self) -> Result<DispatchItem, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            id: self.id.clone(),
            reason,
        };
        let id: ItemId = self.id.parse().map_err(|e| corrupt(format!("bad id: {e}")))?;
        let target_uri =
            TargetUri::parse(self.target_uri.as_str()).map_err(|e| corrupt(e.to_string()))?;
        let payload_type =
            PayloadType::new(self.payload_type.as_str()).map_err(|e| corrupt(e.to_string()))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| corrupt(format!("bad created_at: {e}")))?
            .with_timezone(&Utc);

        Ok(DispatchItem::new(
            id,
            target_uri,
            payload_type,
            self.serialized_payload,
            created_at,
        ))
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn list_pending(&self) -> Result<Vec<DispatchItem>, StoreError> {
        let rows = self
            .with_conn(|conn| {
                let mut stmt = conn
                    .prepare(
                        "SELECT id, target_uri, payload_type, serialized_payload, created_at
                         FROM instances_to_dispatch
                         ORDER BY id",
                    )
                    .map_err(backend)?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(Row {
                            id: row.get(0)?,
                            target_uri: row.get(1)?,
                            payload_type: row.get(2)?,
                            serialized_payload: row.get(3)?,
                            created_at: row.get(4)?,
                        })
                    })
                    .map_err(backend)?
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(backend)?;
                Ok(rows)
            })
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let row_id = row.id.clone();
            match row.into_item() {
                Ok(item) => items.push(item),
                Err(e) => error!(
                    row_id = %row_id,
                    error = %e,
                    "unreadable row left in instances_to_dispatch, needs an operator"
                ),
            }
        }
        Ok(items)
    }

    async fn delete(&self, id: ItemId) -> Result<Deletion, StoreError> {
        let key = id.as_ulid().to_string();
        let removed = self
            .with_conn(move |conn| {
                conn.execute("DELETE FROM instances_to_dispatch WHERE id = ?1", params![key])
                    .map_err(backend)
            })
            .await?;

        Ok(if removed == 0 {
            Deletion::NotFound
        } else {
            Deletion::Deleted
        })
    }
}

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}
