//! Typed - 型付き payload API
//!
//! type tag の typo を型で排除し、decode 関数との対応付けを静的に保証します。
//!
//! # 二層構造
//! - **表層（Typed）**: `Payload` trait - 型安全
//! - **内部（Dyn）**: `DynDecoder` trait - object-safe, type erasure

pub mod codec;
pub mod payload;
pub mod registry;

pub use self::codec::{encode, CodecError, DynDecoder, JsonDecoder, TypedDecoder};
pub use self::payload::Payload;
pub use self::registry::{PayloadRegistry, RegistryError};
