//! Status - スキャン 1 回分の集計

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{DispatchReport, OutcomeKind};

/// Per-outcome counts for one `dispatch_all`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub listed: usize,
    pub delivered: usize,
    pub delivered_not_deleted: usize,
    pub decode_failed: usize,
    pub retry_exhausted: usize,
    pub skipped_in_flight: usize,
}

impl ScanReport {
    pub fn new(listed: usize) -> Self {
        Self {
            listed,
            ..Self::default()
        }
    }

    pub fn record(&mut self, report: &DispatchReport) {
        match report.outcome.kind() {
            OutcomeKind::Delivered => self.delivered += 1,
            OutcomeKind::DeliveredNotDeleted => self.delivered_not_deleted += 1,
            OutcomeKind::DecodeFailed => self.decode_failed += 1,
            OutcomeKind::RetryExhausted => self.retry_exhausted += 1,
            OutcomeKind::AlreadyInFlight => self.skipped_in_flight += 1,
        }
    }

    /// Items still in the store after this scan because of a failure.
    pub fn failed(&self) -> usize {
        self.delivered_not_deleted + self.decode_failed + self.retry_exhausted
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listed={} delivered={} delivered_not_deleted={} decode_failed={} retry_exhausted={} skipped_in_flight={}",
            self.listed,
            self.delivered,
            self.delivered_not_deleted,
            self.decode_failed,
            self.retry_exhausted,
            self.skipped_in_flight
        )
    }
}
