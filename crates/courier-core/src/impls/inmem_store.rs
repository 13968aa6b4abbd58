//! InMemoryItemStore - テスト・開発用の item ストア
//!
//! # 実装詳細
//! - BTreeMap<ItemId, DispatchItem>（ULID 順 = 作成順で list される）
//! - tokio::sync::Mutex で排他制御（await をまたいでロックを保持しない）

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Deletion, DispatchItem, ItemId, PayloadType, StoreError, TargetUri};
use crate::ports::{Clock, IdGenerator, ItemStore, SystemClock, UlidGenerator};

/// InMemoryItemStore は開発用の item ストア
///
/// # 使用例
/// ```ignore
/// let store = InMemoryItemStore::new();
/// let item = store.insert(target, payload_type, r#"{"status":"open"}"#).await;
/// ```
pub struct InMemoryItemStore {
    items: Mutex<BTreeMap<ItemId, DispatchItem>>,
    ids: Box<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// `created_at` and the ULID timestamp both come from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            items: Mutex::new(BTreeMap::new()),
            ids: Box::new(UlidGenerator::new(clock.clone())),
            clock,
        }
    }

    /// Producer side: stores a new item and returns it with its assigned id.
    pub async fn insert(
        &self,
        target_uri: TargetUri,
        payload_type: PayloadType,
        serialized_payload: impl Into<String>,
    ) -> DispatchItem {
        let item = DispatchItem::new(
            self.ids.generate_item_id(),
            target_uri,
            payload_type,
            serialized_payload,
            self.clock.now(),
        );
        self.insert_item(item.clone()).await;
        item
    }

    /// Stores an item built elsewhere, replacing any item with the same id.
    pub async fn insert_item(&self, item: DispatchItem) {
        self.items.lock().await.insert(item.id(), item);
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn list_pending(&self) -> Result<Vec<DispatchItem>, StoreError> {
        Ok(self.items.lock().await.values().cloned().collect())
    }

    async fn delete(&self, id: ItemId) -> Result<Deletion, StoreError> {
        match self.items.lock().await.remove(&id) {
            Some(_) => Ok(Deletion::Deleted),
            None => Ok(Deletion::NotFound),
        }
    }
}
