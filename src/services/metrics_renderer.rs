//! Prometheus text exposition for the recognised counters.

use std::fmt::Write;

use crate::models::{CounterSet, RECOGNIZED};

/// Content type of both renderings.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// `# HELP` / `# TYPE` annotated form served by the exporter.
pub fn render_exposition(counters: &CounterSet) -> String {
    let mut out = String::new();
    for descriptor in RECOGNIZED.iter() {
        let _ = writeln!(out, "# HELP {} {}", descriptor.name, descriptor.help);
        let _ = writeln!(out, "# TYPE {} {}", descriptor.name, descriptor.kind.as_str());
        let _ = writeln!(out, "{} {}", descriptor.name, counters.value_of(descriptor));
    }
    out
}

/// Bare `<name> <value>` lines served from the page listener.
pub fn render_plain(counters: &CounterSet) -> String {
    let mut out = String::new();
    for descriptor in RECOGNIZED.iter() {
        let _ = writeln!(out, "{} {}", descriptor.name, counters.value_of(descriptor));
    }
    out
}
