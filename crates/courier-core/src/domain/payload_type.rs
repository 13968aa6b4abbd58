//! PayloadType - payload の型タグ
//!
//! # 命名規約（推奨）
//! - `{namespace}.{name}.v{major}`
//! - 例: `egrunnerverv.sak.v1`
//!
//! 空文字以外は受け付けます（規約はチェックしない）。

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::DomainError;

/// Tag telling the decoder how to interpret a stored payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PayloadType(String);

impl PayloadType {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::EmptyPayloadType);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PayloadType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PayloadType> for String {
    fn from(value: PayloadType) -> Self {
        value.0
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
