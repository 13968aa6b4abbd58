//! DispatcherBuilder - Dispatcher の構築とワイヤリング
//!
//! # Fail-fast 設計
//! - store / decoder / transport が揃っていなければ BuildError
//! - expect_types() で期待される payload type を登録
//! - build() 時に「期待集合 ⊆ 登録済み集合」をチェック

use std::sync::Arc;

use super::dispatcher::Dispatcher;
use super::retry::RetryPolicy;
use crate::ports::{ItemStore, PayloadDecoder, Transport};
use crate::typed::PayloadRegistry;

/// DispatcherBuilder は Dispatcher を構築
///
/// # 使用例
/// ```ignore
/// let dispatcher = Dispatcher::builder()
///     .store(store)
///     .registry(registry)
///     .transport(transport)
///     .expect_types(&["egrunnerverv.sak.v1"])
///     .build()?;
/// ```
pub struct DispatcherBuilder {
    store: Option<Arc<dyn ItemStore>>,
    decoder: Option<Arc<dyn PayloadDecoder>>,
    transport: Option<Arc<dyn Transport>>,
    registered_types: Option<Vec<String>>,
    expected_types: Option<Vec<String>>,
    policy: RetryPolicy,
    concurrency: usize,
}

/// BuildError は Dispatcher 構築時のエラー
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("no item store configured")]
    MissingStore,

    #[error("no payload decoder configured")]
    MissingDecoder,

    #[error("no transport configured")]
    MissingTransport,

    #[error("Missing payload types: {0:?}. These types were expected but not registered.")]
    MissingPayloadTypes(Vec<String>),

    #[error("concurrency must be at least 1")]
    InvalidConcurrency,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            decoder: None,
            transport: None,
            registered_types: None,
            expected_types: None,
            policy: RetryPolicy::default(),
            concurrency: 4,
        }
    }

    pub fn store(mut self, store: Arc<dyn ItemStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Uses a registry as the decoder and remembers its tags for `expect_types`.
    pub fn registry(mut self, registry: PayloadRegistry) -> Self {
        self.registered_types = Some(registry.registered_types());
        self.decoder = Some(Arc::new(registry));
        self
    }

    /// Uses an arbitrary decoder. `expect_types` cannot be checked against it.
    pub fn decoder(mut self, decoder: Arc<dyn PayloadDecoder>) -> Self {
        self.registered_types = None;
        self.decoder = Some(decoder);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Items sent in parallel within one scan. `1` sends strictly in order.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn expect_types(mut self, payload_types: &[&str]) -> Self {
        self.expected_types = Some(payload_types.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn build(self) -> Result<Dispatcher, BuildError> {
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let decoder = self.decoder.ok_or(BuildError::MissingDecoder)?;
        let transport = self.transport.ok_or(BuildError::MissingTransport)?;
        if self.concurrency == 0 {
            return Err(BuildError::InvalidConcurrency);
        }

        if let Some(expected_types) = &self.expected_types {
            let registered = self.registered_types.unwrap_or_default();
            let missing: Vec<String> = expected_types
                .iter()
                .filter(|t| !registered.contains(t))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingPayloadTypes(missing));
            }
        }

        Ok(Dispatcher::new(
            store,
            decoder,
            transport,
            self.policy,
            self.concurrency,
        ))
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryItemStore;
    use crate::testing::{FakeTransport, JSON_TYPE, json_registry};

    fn complete() -> DispatcherBuilder {
        Dispatcher::builder()
            .store(Arc::new(InMemoryItemStore::new()))
            .registry(json_registry())
            .transport(Arc::new(FakeTransport::always_ok("ok")))
    }

    #[test]
    fn build_success() {
        let dispatcher = complete()
            .expect_types(&[JSON_TYPE])
            .concurrency(2)
            .retry_policy(RetryPolicy::none())
            .build()
            .unwrap();

        assert_eq!(dispatcher.concurrency(), 2);
        assert_eq!(dispatcher.policy().max_attempts(), 1);
    }

    #[test]
    fn build_missing_payload_types() {
        let result = complete().expect_types(&[JSON_TYPE, "other.v1"]).build();
        assert!(matches!(
            result,
            Err(BuildError::MissingPayloadTypes(missing)) if missing == vec!["other.v1".to_string()]
        ));
    }

    #[test]
    fn custom_decoder_cannot_satisfy_expectations() {
        let result = complete()
            .decoder(Arc::new(json_registry()))
            .expect_types(&[JSON_TYPE])
            .build();
        assert!(matches!(result, Err(BuildError::MissingPayloadTypes(_))));
    }

    #[test]
    fn build_without_collaborators_fails_fast() {
        assert!(matches!(
            Dispatcher::builder().build(),
            Err(BuildError::MissingStore)
        ));
        assert!(matches!(
            Dispatcher::builder()
                .store(Arc::new(InMemoryItemStore::new()))
                .build(),
            Err(BuildError::MissingDecoder)
        ));
        assert!(matches!(
            complete().concurrency(0).build(),
            Err(BuildError::InvalidConcurrency)
        ));
    }
}
