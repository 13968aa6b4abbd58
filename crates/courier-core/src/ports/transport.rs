//! Transport port - リモートへの PATCH 送信
//!
//! # 実装
//! - **HttpTransport**: reqwest ベース（本番用）
//! - テストでは呼び出し回数を数える fake を使う

use async_trait::async_trait;

use crate::domain::{TargetUri, TransportError};
use crate::ports::DecodedPayload;

/// Transport は decoded payload を target に PATCH する
///
/// # 契約
/// - 2xx のみ成功。レスポンス body は不透明な文字列として返す
/// - timeout / 接続失敗 / 非 2xx はすべて `TransportError`
/// - リトライはしない（Dispatcher の責務）
#[async_trait]
pub trait Transport: Send + Sync {
    async fn patch(
        &self,
        target: &TargetUri,
        payload: &DecodedPayload,
    ) -> Result<String, TransportError>;
}
