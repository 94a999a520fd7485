// Business logic services
// Counter persistence and response rendering.

pub mod counters;
pub mod metrics_renderer;
pub mod page_renderer;

pub use counters::{
    CounterBackend, CounterCycle, CounterStore, FileCounterBackend, SharedCounterBackend,
};
