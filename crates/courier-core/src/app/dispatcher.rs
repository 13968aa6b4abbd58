//! Dispatcher - pending item の送信・リトライ・削除
//!
//! # フロー（item ごと）
//! 1. in-flight 登録（同一プロセス内の二重送信を防ぐ）
//! 2. PayloadDecoder で decode（失敗は致命的、リトライしない）
//! 3. Transport で PATCH
//! 4. 成功 → ItemStore::delete / 失敗 → RetryPolicy に従って再送
//! 5. リトライ上限 → item はそのまま（次のスキャンで再挑戦）

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, trace, warn};

use super::builder::DispatcherBuilder;
use super::in_flight::InFlight;
use super::retry::RetryPolicy;
use super::status::ScanReport;
use crate::domain::{
    AttemptRecord, Deletion, DispatchError, DispatchItem, DispatchOutcome, DispatchReport,
    DispatchState,
};
use crate::ports::{DecodedPayload, ItemStore, PayloadDecoder, Transport};

/// The dispatch-with-retry engine.
///
/// Cheap to share: wrap it in an `Arc` and hand it to a `ScanScheduler`.
pub struct Dispatcher {
    store: Arc<dyn ItemStore>,
    decoder: Arc<dyn PayloadDecoder>,
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    concurrency: usize,
    in_flight: InFlight,
}

impl Dispatcher {
    pub(crate) fn new(
        store: Arc<dyn ItemStore>,
        decoder: Arc<dyn PayloadDecoder>,
        transport: Arc<dyn Transport>,
        policy: RetryPolicy,
        concurrency: usize,
    ) -> Self {
        Self {
            store,
            decoder,
            transport,
            policy,
            concurrency: concurrency.max(1),
            in_flight: InFlight::default(),
        }
    }

    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Sends every item pending at call time.
    ///
    /// Items are independent: one item failing never stops the others. Only a
    /// failure to list the store is returned as an error.
    pub async fn dispatch_all(&self) -> Result<ScanReport, DispatchError> {
        let items = self.store.list_pending().await?;
        let mut report = ScanReport::new(items.len());
        if items.is_empty() {
            debug!("no pending items");
            return Ok(report);
        }
        info!(pending = items.len(), concurrency = self.concurrency, "scan started");

        let mut results = stream::iter(items)
            .map(|item| async move { self.dispatch_one(&item).await })
            .buffer_unordered(self.concurrency);
        while let Some(item_report) = results.next().await {
            report.record(&item_report);
        }

        if report.failed() > 0 {
            warn!(%report, "scan finished with failures");
        } else {
            info!(%report, "scan finished");
        }
        Ok(report)
    }

    /// Decode, send with retries, and delete on success.
    #[instrument(
        name = "dispatch",
        skip_all,
        fields(item_id = %item.id(), payload_type = %item.payload_type(), target = %item.target_uri())
    )]
    pub async fn dispatch_one(&self, item: &DispatchItem) -> DispatchReport {
        let Some(_claim) = self.in_flight.claim(item.id()) else {
            debug!("item already in flight, skipping");
            return DispatchReport::new(item.id(), DispatchOutcome::AlreadyInFlight, Vec::new());
        };

        let payload = match self
            .decoder
            .decode(item.serialized_payload(), item.payload_type())
        {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "payload decode failed, item left in store for an operator");
                return DispatchReport::new(item.id(), DispatchOutcome::DecodeFailed(err), Vec::new());
            }
        };
        debug!(payload = item.serialized_payload(), "payload decoded");

        self.send_with_retry(item, &payload).await
    }

    async fn send_with_retry(&self, item: &DispatchItem, payload: &DecodedPayload) -> DispatchReport {
        let max_attempts = self.policy.max_attempts();
        let mut attempts = Vec::with_capacity(max_attempts as usize);
        let mut state = DispatchState::Pending;
        let mut waited = Duration::ZERO;
        let mut attempt = 0;

        let last_error = loop {
            attempt += 1;
            advance(&mut state, DispatchState::Sending);

            let started = Instant::now();
            let result = self.transport.patch(item.target_uri(), payload).await;
            let elapsed = started.elapsed();

            let err = match result {
                Ok(response) => {
                    attempts.push(AttemptRecord::succeeded(attempt, waited, elapsed));
                    let outcome = self.acknowledge(item, response).await;
                    advance(&mut state, outcome.final_state());
                    return DispatchReport::new(item.id(), outcome, attempts);
                }
                Err(err) => err,
            };
            attempts.push(AttemptRecord::failed(attempt, waited, elapsed, err.clone()));

            if attempt >= max_attempts {
                break err;
            }

            let delay = self.policy.next_delay(attempt - 1);
            warn!(
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "send failed, retrying"
            );
            advance(&mut state, DispatchState::RetryWait);
            tokio::time::sleep(delay).await;
            waited = delay;
            debug!(attempt = attempt + 1, "retrying after {}", err);
        };

        advance(&mut state, DispatchState::Pending);
        error!(
            attempts = attempt,
            error = %last_error,
            "retries exhausted, item left for the next scan"
        );
        DispatchReport::new(
            item.id(),
            DispatchOutcome::RetryExhausted { last_error },
            attempts,
        )
    }

    /// The remote accepted the update; remove the item.
    async fn acknowledge(&self, item: &DispatchItem, response: String) -> DispatchOutcome {
        info!(response = %response, "dispatch succeeded");

        match self.store.delete(item.id()).await {
            Ok(deletion) => {
                if deletion == Deletion::NotFound {
                    debug!("item was already deleted");
                }
                DispatchOutcome::Delivered { response, deletion }
            }
            Err(err) => {
                warn!(
                    error = %err,
                    "delivered but delete failed, item will be sent again on the next scan"
                );
                DispatchOutcome::DeliveredNotDeleted { response, error: err }
            }
        }
    }
}

fn advance(state: &mut DispatchState, next: DispatchState) {
    debug_assert!(
        state.can_transition_to(next),
        "invalid dispatch transition {state:?} -> {next:?}"
    );
    trace!(from = ?*state, to = ?next, "state transition");
    *state = next;
}
