//! Errors - エラー型と分類
//!
//! 運用上の分類:
//! - DecodeError: 恒久的（item 単位で致命的、リトライしない）
//! - TransportError: 一時的（リトライ対象）
//! - StoreError: インフラ（送信成功後の削除失敗など）

use thiserror::Error;

/// Stored payload could not be turned into a value to transmit.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no decoder registered for payload type '{0}'")]
    UnknownType(String),

    #[error("malformed payload for type '{payload_type}': {reason}")]
    Malformed {
        payload_type: String,
        reason: String,
    },
}

/// A single send attempt failed. Always retryable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("corrupt row for {id}: {reason}")]
    Corrupt { id: String, reason: String },
}

/// Rejected while constructing a `DispatchItem`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("target uri must not be empty")]
    EmptyTargetUri,

    #[error("invalid target uri '{uri}': {reason}")]
    InvalidTargetUri { uri: String, reason: String },

    #[error("payload type must not be empty")]
    EmptyPayloadType,
}

/// Scan-level failure. Per-item failures never surface here.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to list pending items: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_message_includes_code_and_body() {
        let err = TransportError::Status {
            status: 503,
            body: "unavailable".into(),
        };
        assert_eq!(err.to_string(), "HTTP 503: unavailable");
    }
}
