//! PayloadRegistry - type tag → decode 関数の対応表
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - Generic methods での登録と型安全性
//! - Arc による共有所有権
//!
//! 起動時に構築（mutable）、実行時は読み取りのみ。ロック不要です。

use std::collections::HashMap;
use std::sync::Arc;

use super::codec::{DynDecoder, JsonDecoder, TypedDecoder};
use super::payload::Payload;
use crate::domain::{DecodeError, PayloadType};
use crate::ports::{DecodedPayload, PayloadDecoder};

/// PayloadRegistry は payload type ごとの decoder を管理
///
/// # 使用例
/// ```ignore
/// let mut registry = PayloadRegistry::new();
/// registry.register::<SakUpdate>()?;
/// registry.register_json("egrunnerverv.raw.v1")?;
/// ```
#[derive(Default, Clone)]
pub struct PayloadRegistry {
    decoders: HashMap<String, Arc<dyn DynDecoder>>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("decoder for payload type '{0}' is already registered")]
    AlreadyRegistered(String),
}

impl PayloadRegistry {
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Registers `T`'s schema under `T::TYPE`.
    pub fn register<T: Payload>(&mut self) -> Result<(), RegistryError> {
        self.insert(Arc::new(TypedDecoder::<T>::new()))
    }

    /// Registers a schema-less tag: any valid JSON is accepted as-is.
    pub fn register_json(&mut self, payload_type: impl Into<String>) -> Result<(), RegistryError> {
        self.insert(Arc::new(JsonDecoder::new(payload_type)))
    }

    fn insert(&mut self, decoder: Arc<dyn DynDecoder>) -> Result<(), RegistryError> {
        let payload_type = decoder.payload_type().to_string();
        if self.decoders.contains_key(&payload_type) {
            return Err(RegistryError::AlreadyRegistered(payload_type));
        }
        self.decoders.insert(payload_type, decoder);
        Ok(())
    }

    pub fn contains(&self, payload_type: &str) -> bool {
        self.decoders.contains_key(payload_type)
    }

    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.decoders.keys().cloned().collect();
        types.sort();
        types
    }
}

impl PayloadDecoder for PayloadRegistry {
    fn decode(
        &self,
        serialized: &str,
        payload_type: &PayloadType,
    ) -> Result<DecodedPayload, DecodeError> {
        let decoder = self
            .decoders
            .get(payload_type.as_str())
            .ok_or_else(|| DecodeError::UnknownType(payload_type.to_string()))?;
        let value = decoder.decode_value(serialized)?;
        Ok(DecodedPayload::new(payload_type.clone(), value))
    }
}
