//! Ports - 抽象化レイヤー
//!
//! Hexagonal Architecture の「ポート」を定義します。
//! Dispatcher はこれらの trait だけに依存し、SQLite や HTTP の詳細は
//! `impls` 側に閉じ込めます。

pub mod clock;
pub mod decoder;
pub mod id_generator;
pub mod item_store;
pub mod transport;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::decoder::{DecodedPayload, PayloadDecoder};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::item_store::ItemStore;
pub use self::transport::Transport;
