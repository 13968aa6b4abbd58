//! ItemStore port - 送信待ち item の正本（source of truth）
//!
//! コアが必要とする操作は 2 つだけです：
//! - list_pending: スキャン時点の全 item
//! - delete: 送信成功後の削除（冪等）
//!
//! item の投入は producer 側の責務で、この trait には含めません。

use async_trait::async_trait;

use crate::domain::{Deletion, DispatchItem, ItemId, StoreError};

/// ItemStore は pending item の永続ストア
///
/// # 設計原則
/// - 削除は送信成功時のみ、item 単位で行う（部分削除なし）
/// - 既に削除済みの item の delete は `Deletion::NotFound`（エラーではない）
/// - リトライ中に item をロックしない
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn list_pending(&self) -> Result<Vec<DispatchItem>, StoreError>;

    async fn delete(&self, id: ItemId) -> Result<Deletion, StoreError>;
}
