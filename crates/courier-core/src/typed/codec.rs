//! PayloadCodec - 型付き payload と保存形式（JSON 文字列）の相互変換
//!
//! # デシリアライズフロー
//! 1. serde_json で T にデシリアライズ（スキーマ検証を兼ねる）
//!    T が知らないフィールドは黙って捨てず Malformed にする
//! 2. serde_json::Value に戻して送信用 body にする

use serde_json::Value;
use std::marker::PhantomData;

use super::payload::Payload;
use crate::domain::{DecodeError, DomainError, PayloadType};

/// DynDecoder は object-safe な decode 関数
///
/// `TypedDecoder<T>` を `Arc<dyn DynDecoder>` として registry に格納します。
pub trait DynDecoder: Send + Sync {
    fn decode_value(&self, serialized: &str) -> Result<Value, DecodeError>;
    fn payload_type(&self) -> &str;
}

/// T のスキーマで検証する decoder
pub struct TypedDecoder<T: Payload> {
    _marker: PhantomData<T>,
}

impl<T: Payload> TypedDecoder<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: Payload> Default for TypedDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Payload> DynDecoder for TypedDecoder<T> {
    fn decode_value(&self, serialized: &str) -> Result<Value, DecodeError> {
        let mut de = serde_json::Deserializer::from_str(serialized);
        let mut unknown = Vec::new();
        let typed: T = serde_ignored::deserialize(&mut de, |path| unknown.push(path.to_string()))
            .map_err(|e| malformed(T::TYPE, e))?;
        de.end().map_err(|e| malformed(T::TYPE, e))?;
        if !unknown.is_empty() {
            return Err(DecodeError::Malformed {
                payload_type: T::TYPE.to_string(),
                reason: format!("unknown fields: {}", unknown.join(", ")),
            });
        }
        serde_json::to_value(&typed).map_err(|e| malformed(T::TYPE, e))
    }

    fn payload_type(&self) -> &str {
        T::TYPE
    }
}

/// スキーマなしの tag 用。JSON として valid なら何でも通す
pub struct JsonDecoder {
    payload_type: String,
}

impl JsonDecoder {
    pub fn new(payload_type: impl Into<String>) -> Self {
        Self {
            payload_type: payload_type.into(),
        }
    }
}

impl DynDecoder for JsonDecoder {
    fn decode_value(&self, serialized: &str) -> Result<Value, DecodeError> {
        serde_json::from_str(serialized).map_err(|e| malformed(&self.payload_type, e))
    }

    fn payload_type(&self) -> &str {
        &self.payload_type
    }
}

/// Serializes a typed payload into the `(tag, text)` pair a producer stores.
pub fn encode<T: Payload>(payload: &T) -> Result<(PayloadType, String), CodecError> {
    let payload_type = PayloadType::new(T::TYPE)?;
    let serialized = serde_json::to_string(payload)?;
    Ok((payload_type, serialized))
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("invalid payload type: {0}")]
    PayloadType(#[from] DomainError),

    #[error("json encode: {0}")]
    Json(#[from] serde_json::Error),
}

fn malformed(payload_type: &str, err: serde_json::Error) -> DecodeError {
    DecodeError::Malformed {
        payload_type: payload_type.to_string(),
        reason: err.to_string(),
    }
}
