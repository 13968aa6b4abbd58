//! App - アプリケーション層
//!
//! ports を組み合わせて dispatch のロジックを実装します。
//!
//! # 主要コンポーネント
//! - **Dispatcher**: decode → PATCH → retry → delete
//! - **RetryPolicy**: 指数バックオフ + jitter
//! - **ScanScheduler**: 定期的に dispatch_all を呼ぶ
//! - **DispatcherBuilder**: ワイヤリングと起動時検証

pub mod builder;
pub mod dispatcher;
mod in_flight;
pub mod retry;
pub mod scheduler;
pub mod status;

pub use self::builder::{BuildError, DispatcherBuilder};
pub use self::dispatcher::Dispatcher;
pub use self::retry::RetryPolicy;
pub use self::scheduler::ScanScheduler;
pub use self::status::ScanReport;
