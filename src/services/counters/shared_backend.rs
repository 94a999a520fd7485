use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{CounterBackend, CounterCycle, CounterStore};
use crate::error::CounterStoreError;
use crate::models::{
    CounterEvent, CounterSet, APP_DB_ERRORS_TOTAL, APP_REQUESTS_TOTAL, APP_UP,
};

/// In-process atomic counters, seeded from and flushed back to the file.
#[derive(Debug)]
pub struct SharedCounterBackend {
    up: AtomicU64,
    requests_total: AtomicU64,
    db_errors_total: AtomicU64,
    /// Unrecognised counters found at startup; passed through unchanged.
    extras: Vec<(String, u64)>,
    dirty: AtomicBool,
    /// Held for the whole of a flush so a later flush waits for an earlier
    /// write to land.
    flush_lock: Mutex<()>,
    store: CounterStore,
}

impl SharedCounterBackend {
    /// Seed the counters from `store`.
    pub async fn load(store: CounterStore) -> Self {
        let seed = store.load().await;
        info!(
            path = %store.path().display(),
            requests_total = seed.requests_total(),
            "Shared counters seeded from file"
        );

        Self {
            up: AtomicU64::new(seed.up()),
            requests_total: AtomicU64::new(seed.requests_total()),
            db_errors_total: AtomicU64::new(seed.db_errors_total()),
            extras: seed
                .extras()
                .map(|(name, value)| (name.to_string(), value))
                .collect(),
            dirty: AtomicBool::new(false),
            flush_lock: Mutex::new(()),
            store,
        }
    }

    fn apply(&self, event: CounterEvent) {
        match event {
            CounterEvent::RequestReceived => saturating_inc(&self.requests_total),
            CounterEvent::DataSourceSucceeded => self.up.store(1, Ordering::Relaxed),
            CounterEvent::DataSourceFailed => {
                saturating_inc(&self.db_errors_total);
                self.up.store(0, Ordering::Relaxed);
            }
        }
    }

    fn current(&self) -> CounterSet {
        let mut counters = CounterSet::default();
        for (name, value) in &self.extras {
            counters.set(name, *value);
        }
        counters.set(APP_UP, self.up.load(Ordering::Relaxed));
        counters.set(APP_REQUESTS_TOTAL, self.requests_total.load(Ordering::Relaxed));
        counters.set(APP_DB_ERRORS_TOTAL, self.db_errors_total.load(Ordering::Relaxed));
        counters
    }

    /// Write the counters to the file if they changed since the last flush.
    pub async fn flush(&self) -> Result<(), CounterStoreError> {
        let _guard = self.flush_lock.lock().await;
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }

        let result = self.store.save(&self.current()).await;
        if result.is_err() {
            self.dirty.store(true, Ordering::Release);
        }
        result
    }

    /// Flush every `every` until the backend is dropped.
    pub fn spawn_flush_task(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(backend) = weak.upgrade() else {
                    debug!("Counter flush task stopping");
                    break;
                };
                if let Err(e) = backend.flush().await {
                    warn!(error = %e, "Periodic counter flush failed");
                }
            }
        })
    }
}

fn saturating_inc(counter: &AtomicU64) {
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
        Some(v.saturating_add(1))
    });
}

#[async_trait]
impl CounterBackend for SharedCounterBackend {
    async fn begin(&self) -> CounterCycle {
        CounterCycle::new(self.current())
    }

    async fn commit(&self, cycle: CounterCycle) {
        for event in cycle.events() {
            self.apply(*event);
        }
        if !cycle.events().is_empty() {
            self.dirty.store(true, Ordering::Release);
        }
    }

    async fn snapshot(&self) -> CounterSet {
        self.current()
    }

    async fn shutdown(&self) {
        match self.flush().await {
            Ok(()) => info!(path = %self.store.path().display(), "Counters flushed"),
            Err(e) => warn!(error = %e, "Final counter flush failed"),
        }
    }
}
