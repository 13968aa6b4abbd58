//! Outcome model: what happened to one item during one dispatch.

use serde::{Deserialize, Serialize};

use super::attempt::AttemptRecord;
use super::errors::{DecodeError, StoreError, TransportError};
use super::ids::ItemId;
use super::state::DispatchState;

/// Result of a delete-by-identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Deletion {
    Deleted,
    /// Someone else already removed it. Not an error.
    NotFound,
}

/// Classification of a `DispatchOutcome`, used for scan counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Delivered,
    DeliveredNotDeleted,
    DecodeFailed,
    RetryExhausted,
    AlreadyInFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Remote accepted the update and the item is gone from the store.
    Delivered { response: String, deletion: Deletion },

    /// Remote accepted the update but the delete failed. The item stays
    /// listed and will be sent again on the next scan.
    DeliveredNotDeleted { response: String, error: StoreError },

    /// Payload could not be decoded. Not retried; the item is kept for an
    /// operator to look at.
    DecodeFailed(DecodeError),

    /// Every attempt failed. The item is kept for the next scan.
    RetryExhausted { last_error: TransportError },

    /// Another send sequence in this process already owns the item.
    AlreadyInFlight,
}

impl DispatchOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            DispatchOutcome::Delivered { .. } => OutcomeKind::Delivered,
            DispatchOutcome::DeliveredNotDeleted { .. } => OutcomeKind::DeliveredNotDeleted,
            DispatchOutcome::DecodeFailed(_) => OutcomeKind::DecodeFailed,
            DispatchOutcome::RetryExhausted { .. } => OutcomeKind::RetryExhausted,
            DispatchOutcome::AlreadyInFlight => OutcomeKind::AlreadyInFlight,
        }
    }

    /// Where the item ends up after this outcome.
    pub fn final_state(&self) -> DispatchState {
        match self {
            DispatchOutcome::Delivered { .. } => DispatchState::Deleted,
            _ => DispatchState::Pending,
        }
    }
}

/// Everything `dispatch_one` learned about one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub item_id: ItemId,
    pub outcome: DispatchOutcome,
    pub attempts: Vec<AttemptRecord>,
}

impl DispatchReport {
    pub fn new(item_id: ItemId, outcome: DispatchOutcome, attempts: Vec<AttemptRecord>) -> Self {
        Self {
            item_id,
            outcome,
            attempts,
        }
    }

    /// Number of PATCH requests issued.
    pub fn sends(&self) -> usize {
        self.attempts.len()
    }
}
