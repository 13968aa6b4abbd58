//! Test doubles shared by the app and impls tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ulid::Ulid;

use crate::domain::{
    Deletion, DispatchItem, ItemId, PayloadType, StoreError, TargetUri, TransportError,
};
use crate::impls::InMemoryItemStore;
use crate::ports::{DecodedPayload, ItemStore, Transport};
use crate::typed::PayloadRegistry;

/// Schema-less tag registered by `json_registry`.
pub const JSON_TYPE: &str = "courier.test.json.v1";

pub fn json_registry() -> PayloadRegistry {
    let mut registry = PayloadRegistry::new();
    registry.register_json(JSON_TYPE).unwrap();
    registry
}

pub fn new_item(target: &str, payload: &str) -> DispatchItem {
    DispatchItem::new(
        ItemId::from_ulid(Ulid::new()),
        TargetUri::parse(target).unwrap(),
        PayloadType::new(JSON_TYPE).unwrap(),
        payload,
        chrono::Utc::now(),
    )
}

/// Wraps an `InMemoryItemStore`, counting calls and optionally failing them.
pub struct CountingStore {
    inner: InMemoryItemStore,
    lists: AtomicUsize,
    deletes: Mutex<Vec<ItemId>>,
    fail_list: bool,
    fail_delete: bool,
}

impl CountingStore {
    pub fn new(inner: InMemoryItemStore) -> Self {
        Self {
            inner,
            lists: AtomicUsize::new(0),
            deletes: Mutex::new(Vec::new()),
            fail_list: false,
            fail_delete: false,
        }
    }

    pub fn failing_list(mut self) -> Self {
        self.fail_list = true;
        self
    }

    pub fn failing_deletes(mut self) -> Self {
        self.fail_delete = true;
        self
    }

    pub async fn insert(&self, item: DispatchItem) -> DispatchItem {
        self.inner.insert_item(item.clone()).await;
        item
    }

    pub fn inner(&self) -> &InMemoryItemStore {
        &self.inner
    }

    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    /// Ids whose delete actually removed an item.
    pub fn deletes(&self) -> Vec<ItemId> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ItemStore for CountingStore {
    async fn list_pending(&self) -> Result<Vec<DispatchItem>, StoreError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        if self.fail_list {
            return Err(StoreError::Backend("database is locked".into()));
        }
        self.inner.list_pending().await
    }

    async fn delete(&self, id: ItemId) -> Result<Deletion, StoreError> {
        if self.fail_delete {
            return Err(StoreError::Backend("disk I/O error".into()));
        }
        let deletion = self.inner.delete(id).await?;
        if deletion == Deletion::Deleted {
            self.deletes.lock().unwrap().push(id);
        }
        Ok(deletion)
    }
}

type Respond = dyn Fn(&str, u32) -> Result<String, TransportError> + Send + Sync;

/// Scripted transport. The responder receives the target and the 1-based
/// call number for that target.
pub struct FakeTransport {
    respond: Box<Respond>,
    latency: Duration,
    calls: Mutex<HashMap<String, u32>>,
}

impl FakeTransport {
    pub fn new(
        respond: impl Fn(&str, u32) -> Result<String, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            respond: Box::new(respond),
            latency: Duration::ZERO,
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn always_ok(response: &'static str) -> Self {
        Self::new(move |_, _| Ok(response.to_string()))
    }

    pub fn always_status(status: u16) -> Self {
        Self::new(move |_, _| {
            Err(TransportError::Status {
                status,
                body: "unavailable".into(),
            })
        })
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn calls_to(&self, target: &str) -> u32 {
        self.calls.lock().unwrap().get(target).copied().unwrap_or(0)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn patch(
        &self,
        target: &TargetUri,
        _payload: &DecodedPayload,
    ) -> Result<String, TransportError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(target.to_string()).or_insert(0);
            *count += 1;
            *count
        };
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        (self.respond)(target.as_str(), call)
    }
}
