//! DispatchItem: one pending outbound update, as stored by a producer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::DomainError;
use super::ids::ItemId;
use super::payload_type::PayloadType;

/// Absolute http(s) address an item is PATCHed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetUri(String);

impl TargetUri {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::EmptyTargetUri);
        }
        let parsed = url::Url::parse(&value).map_err(|e| DomainError::InvalidTargetUri {
            uri: value.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DomainError::InvalidTargetUri {
                uri: value,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TargetUri {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TargetUri> for String {
    fn from(value: TargetUri) -> Self {
        value.0
    }
}

impl fmt::Display for TargetUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The unit of work.
///
/// Fields are private: `target_uri` and `payload_type` never change after
/// creation, and the store only ever deletes whole items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchItem {
    id: ItemId,
    target_uri: TargetUri,
    payload_type: PayloadType,
    serialized_payload: String,
    created_at: DateTime<Utc>,
}

impl DispatchItem {
    pub fn new(
        id: ItemId,
        target_uri: TargetUri,
        payload_type: PayloadType,
        serialized_payload: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            target_uri,
            payload_type,
            serialized_payload: serialized_payload.into(),
            created_at,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn target_uri(&self) -> &TargetUri {
        &self.target_uri
    }

    pub fn payload_type(&self) -> &PayloadType {
        &self.payload_type
    }

    pub fn serialized_payload(&self) -> &str {
        &self.serialized_payload
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
