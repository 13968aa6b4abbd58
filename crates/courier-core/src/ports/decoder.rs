//! PayloadDecoder port - 保存された payload を送信可能な値に変換
//!
//! 実装は `typed::PayloadRegistry`（type tag → decode 関数）。

use serde_json::Value;

use crate::domain::{DecodeError, PayloadType};

/// Decoded body ready to PATCH, tagged with the type it was decoded as.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPayload {
    payload_type: PayloadType,
    value: Value,
}

impl DecodedPayload {
    pub fn new(payload_type: PayloadType, value: Value) -> Self {
        Self {
            payload_type,
            value,
        }
    }

    pub fn payload_type(&self) -> &PayloadType {
        &self.payload_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// PayloadDecoder は serialized payload + type tag から値を作る
///
/// # 設計原則
/// - 同期・純粋（I/O なし）
/// - 失敗は `DecodeError` で返す（panic しない）
pub trait PayloadDecoder: Send + Sync {
    fn decode(
        &self,
        serialized: &str,
        payload_type: &PayloadType,
    ) -> Result<DecodedPayload, DecodeError>;
}
