use async_trait::async_trait;
use tracing::warn;

use super::{CounterBackend, CounterCycle, CounterStore};
use crate::models::CounterSet;

/// Read-modify-write of the counter file on every request.
///
/// No locking: two overlapping cycles both start from the same file contents
/// and the later commit wins.
#[derive(Debug, Clone)]
pub struct FileCounterBackend {
    store: CounterStore,
}

impl FileCounterBackend {
    pub fn new(store: CounterStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CounterStore {
        &self.store
    }
}

#[async_trait]
impl CounterBackend for FileCounterBackend {
    async fn begin(&self) -> CounterCycle {
        CounterCycle::new(self.store.load().await)
    }

    async fn commit(&self, cycle: CounterCycle) {
        if let Err(e) = self.store.save(&cycle.current()).await {
            warn!(error = %e, "Failed to persist counters");
        }
    }

    async fn snapshot(&self) -> CounterSet {
        self.store.load().await
    }
}
