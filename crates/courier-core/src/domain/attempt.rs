//! Attempt history for one `dispatch_one` call.

use std::time::Duration;

use super::errors::TransportError;

/// A single PATCH attempt.
///
/// Records what we waited, how long the request took and what went wrong, so
/// a retry sequence can be explained after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based attempt number.
    pub attempt: u32,

    /// Backoff slept before this attempt (zero for the first one).
    pub waited: Duration,

    /// Wall time spent in the transport.
    pub elapsed: Duration,

    pub error: Option<TransportError>,
}

impl AttemptRecord {
    pub fn succeeded(attempt: u32, waited: Duration, elapsed: Duration) -> Self {
        Self {
            attempt,
            waited,
            elapsed,
            error: None,
        }
    }

    pub fn failed(attempt: u32, waited: Duration, elapsed: Duration, error: TransportError) -> Self {
        Self {
            attempt,
            waited,
            elapsed,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
