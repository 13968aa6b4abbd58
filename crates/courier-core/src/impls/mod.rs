//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryItemStore**: テスト・開発用の item ストア
//! - **SqliteItemStore**: 本番用の永続ストア（rusqlite）
//! - **HttpTransport**: reqwest による PATCH 送信

pub mod http_transport;
pub mod inmem_store;
pub mod sqlite_store;

pub use self::http_transport::{HttpTransport, HttpTransportError};
pub use self::inmem_store::InMemoryItemStore;
pub use self::sqlite_store::SqliteItemStore;
