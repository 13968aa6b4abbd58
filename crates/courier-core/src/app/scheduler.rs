//! ScanScheduler - 定期スキャンのトリガー
//!
//! - start() で tick タスクを起動、shutdown() で停止
//! - スキャンは 1 回ずつ完了まで実行（重なりなし、遅れた tick は詰めない）
//! - shutdown は次のスキャンを止めるだけで、送信中の item は最後まで走る

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};

use super::dispatcher::Dispatcher;

/// Owns the ticking task that calls `Dispatcher::dispatch_all`.
///
/// Dropping the handle without `shutdown` also stops the loop after
/// the current scan, because the watch sender goes away.
pub struct ScanScheduler {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ScanScheduler {
    /// Spawns the scan loop. The first scan starts immediately.
    pub fn start(dispatcher: Arc<Dispatcher>, every: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let every = every.max(Duration::from_millis(1));

        let join = tokio::spawn(scan_loop(dispatcher, every, shutdown_rx));
        info!(interval_ms = every.as_millis() as u64, "scan scheduler started");

        Self { shutdown_tx, join }
    }

    pub fn request_shutdown(&self) {
        // receiver may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    /// Stops ticking and waits for the scan in progress, if any.
    pub async fn shutdown(self) {
        self.request_shutdown();
        if let Err(e) = self.join.await {
            error!(error = %e, "scan loop panicked");
        }
        info!("scan scheduler stopped");
    }
}

async fn scan_loop(
    dispatcher: Arc<Dispatcher>,
    every: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        tokio::select! {
            changed = shutdown_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        if let Err(e) = dispatcher.dispatch_all().await {
            error!(error = %e, "scan failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::RetryPolicy;
    use crate::impls::InMemoryItemStore;
    use crate::testing::{CountingStore, FakeTransport, json_registry, new_item};

    fn dispatcher(store: Arc<CountingStore>, transport: Arc<FakeTransport>) -> Arc<Dispatcher> {
        Arc::new(
            Dispatcher::builder()
                .store(store)
                .registry(json_registry())
                .transport(transport)
                .retry_policy(RetryPolicy::default())
                .build()
                .unwrap(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn scans_immediately_and_then_on_every_tick() {
        let store = Arc::new(CountingStore::new(InMemoryItemStore::new()));
        let scheduler = ScanScheduler::start(
            dispatcher(store.clone(), Arc::new(FakeTransport::always_ok("ok"))),
            Duration::from_secs(60),
        );

        tokio::time::sleep(Duration::from_secs(150)).await;
        scheduler.shutdown().await;

        // t = 0, 60, 120
        assert_eq!(store.lists(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_scan_delivers_pending_items() {
        let store = Arc::new(CountingStore::new(InMemoryItemStore::new()));
        let item = store.insert(new_item("https://example/api/X", "{}")).await;
        let transport = Arc::new(FakeTransport::always_ok("ok"));
        let scheduler = ScanScheduler::start(
            dispatcher(store.clone(), transport.clone()),
            Duration::from_secs(60),
        );

        tokio::time::sleep(Duration::from_secs(1)).await;
        scheduler.shutdown().await;

        assert_eq!(transport.calls(), 1);
        assert_eq!(store.deletes(), vec![item.id()]);
    }

    #[tokio::test(start_paused = true)]
    async fn listing_errors_do_not_stop_the_scheduler() {
        let store = Arc::new(CountingStore::new(InMemoryItemStore::new()).failing_list());
        let scheduler = ScanScheduler::start(
            dispatcher(store.clone(), Arc::new(FakeTransport::always_ok("ok"))),
            Duration::from_secs(10),
        );

        tokio::time::sleep(Duration::from_secs(25)).await;
        scheduler.shutdown().await;

        assert_eq!(store.lists(), 3);
    }
}
