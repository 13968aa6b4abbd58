//! Payload trait - 型付き payload の定義
//!
//! # 学習ポイント
//! - Associated Constants (`const TYPE`)
//! - Trait bounds の組み合わせ (Serialize + DeserializeOwned + Send + Sync + 'static)

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Payload は type tag と Rust の型を対応付ける
///
/// # 使用例
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct SakUpdate {
///     archive_case_id: String,
/// }
///
/// impl Payload for SakUpdate {
///     const TYPE: &'static str = "egrunnerverv.sak.v1";
/// }
/// ```
pub trait Payload: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// type tag の定義（`{namespace}.{name}.v{major}`）
    const TYPE: &'static str;
}
