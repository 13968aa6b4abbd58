//! State - item ごとの dispatch 状態
//!
//! # 状態遷移（1 回の attempt-run 内）
//! - Pending -> Sending -> Deleted
//! - Pending -> Sending -> RetryWait -> Sending ... -> Pending（リトライ上限）
//! - Pending -> Pending（decode 失敗、in-flight 重複）
//!
//! Pending に戻った item は次のスキャンで再度拾われます。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    /// In the store, waiting for a scan.
    Pending,

    /// A PATCH request is in flight.
    Sending,

    /// Last send failed; sleeping before the next attempt.
    RetryWait,

    /// Delivered and removed from the store.
    Deleted,
}

impl DispatchState {
    pub fn can_transition_to(self, next: DispatchState) -> bool {
        use DispatchState::*;
        matches!(
            (self, next),
            (Pending, Sending)
                | (Pending, Pending)
                | (Sending, Deleted)
                | (Sending, RetryWait)
                | (Sending, Pending)
                | (RetryWait, Sending)
        )
    }
}
