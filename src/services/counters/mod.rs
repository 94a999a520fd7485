//! Request counters.
//!
//! Every request opens a [`CounterCycle`], records what happened, and hands
//! the cycle back to its [`CounterBackend`] to be persisted. Two backends
//! exist:
//!
//! * [`FileCounterBackend`] re-reads the counter file on every request and
//!   overwrites it at the end. Concurrent requests race and can lose updates.
//! * [`SharedCounterBackend`] keeps the counters in process atomics seeded
//!   from the file at startup and flushes them back periodically.

use async_trait::async_trait;

use crate::models::{CounterEvent, CounterSet};

pub mod file_backend;
pub mod file_store;
pub mod shared_backend;

pub use file_backend::FileCounterBackend;
pub use file_store::CounterStore;
pub use shared_backend::SharedCounterBackend;

/// Counters loaded at the start of a request plus the events recorded since.
#[derive(Debug, Clone)]
pub struct CounterCycle {
    loaded: CounterSet,
    events: Vec<CounterEvent>,
}

impl CounterCycle {
    pub fn new(loaded: CounterSet) -> Self {
        Self {
            loaded,
            events: Vec::new(),
        }
    }

    pub fn record(&mut self, event: CounterEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[CounterEvent] {
        &self.events
    }

    /// The loaded counters with every recorded event applied.
    pub fn current(&self) -> CounterSet {
        let mut counters = self.loaded.clone();
        for event in &self.events {
            counters.apply(*event);
        }
        counters
    }
}

#[async_trait]
pub trait CounterBackend: Send + Sync {
    /// Start a request cycle from the latest known counters.
    async fn begin(&self) -> CounterCycle;

    /// Persist a finished cycle. Failures are logged, never returned.
    async fn commit(&self, cycle: CounterCycle);

    /// Read-only view of the current counters.
    async fn snapshot(&self) -> CounterSet;

    /// Called once when the server stops.
    async fn shutdown(&self) {}
}
