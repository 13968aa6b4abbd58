//! Domain model (ids, items, outcomes, errors, ...).
//!
//! - ids: ULID ベースの ItemId
//! - item / payload_type: 保存された dispatch 単位
//! - attempt / outcome / state: 1 回の dispatch の結果と状態遷移
//! - errors: エラー分類

pub mod attempt;
pub mod errors;
pub mod ids;
pub mod item;
pub mod outcome;
pub mod payload_type;
pub mod state;

pub use attempt::AttemptRecord;
pub use errors::{DecodeError, DispatchError, DomainError, StoreError, TransportError};
pub use ids::{Id, IdMarker, ItemId};
pub use item::{DispatchItem, TargetUri};
pub use outcome::{Deletion, DispatchOutcome, DispatchReport, OutcomeKind};
pub use payload_type::PayloadType;
pub use state::DispatchState;
