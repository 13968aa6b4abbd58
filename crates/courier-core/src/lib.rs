//! courier-core
//!
//! Core building blocks for the Courier outbox dispatcher.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, item, payload_type, attempt, outcome, state, errors）
//! - **ports**: 抽象化レイヤー（ItemStore, PayloadDecoder, Transport, Clock, IdGenerator）
//! - **app**: アプリケーションロジック（dispatcher, retry, scheduler, builder, status）
//! - **typed**: 型付き payload API（Payload trait, PayloadRegistry, codec）
//! - **impls**: 実装（InMemoryItemStore, SqliteItemStore, HttpTransport）
//! - **config**: YAML 設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod typed;

#[cfg(test)]
mod testing;
