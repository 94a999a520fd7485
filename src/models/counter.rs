//! Counter set model and its flat-file line format.
//!
//! A counter file holds one `<name> <value>` pair per line. Only names that
//! start with `app_` are recognised; every other line is skipped on load.

use std::collections::BTreeMap;
use std::fmt::Write;

/// Prefix every persisted counter name must carry.
pub const NAME_PREFIX: &str = "app_";

pub const APP_UP: &str = "app_up";
pub const APP_REQUESTS_TOTAL: &str = "app_requests_total";
pub const APP_DB_ERRORS_TOTAL: &str = "app_db_errors_total";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Gauge,
    Counter,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
        }
    }
}

/// Static description of a recognised counter.
#[derive(Debug, Clone, Copy)]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub default: u64,
}

/// Recognised counters, in persistence and rendering order.
pub const RECOGNIZED: [MetricDescriptor; 3] = [
    MetricDescriptor {
        name: APP_UP,
        help: "Whether the app is up (1) or down (0)",
        kind: MetricKind::Gauge,
        default: 1,
    },
    MetricDescriptor {
        name: APP_REQUESTS_TOTAL,
        help: "Total number of requests",
        kind: MetricKind::Counter,
        default: 0,
    },
    MetricDescriptor {
        name: APP_DB_ERRORS_TOTAL,
        help: "Number of DB errors",
        kind: MetricKind::Counter,
        default: 0,
    },
];

/// Something that happened during one request and moves the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterEvent {
    RequestReceived,
    DataSourceSucceeded,
    DataSourceFailed,
}

/// Named non-negative counters. Always contains the recognised names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSet {
    values: BTreeMap<String, u64>,
}

impl Default for CounterSet {
    fn default() -> Self {
        let values = RECOGNIZED
            .iter()
            .map(|d| (d.name.to_string(), d.default))
            .collect();
        Self { values }
    }
}

impl CounterSet {
    /// Parse counter file contents on top of the defaults.
    ///
    /// Lines that do not match `app_<name> <digits>` are ignored, so this never
    /// fails.
    pub fn parse(text: &str) -> Self {
        let mut set = Self::default();
        for line in text.lines() {
            if let Some((name, value)) = parse_line(line) {
                set.values.insert(name.to_string(), value);
            }
        }
        set
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.values.get(name).copied()
    }

    /// Value of a recognised counter. Falls back to its default.
    pub fn value_of(&self, descriptor: &MetricDescriptor) -> u64 {
        self.get(descriptor.name).unwrap_or(descriptor.default)
    }

    pub fn set(&mut self, name: &str, value: u64) {
        self.values.insert(name.to_string(), value);
    }

    pub fn increment(&mut self, name: &str) {
        let slot = self.values.entry(name.to_string()).or_insert(0);
        *slot = slot.saturating_add(1);
    }

    pub fn apply(&mut self, event: CounterEvent) {
        match event {
            CounterEvent::RequestReceived => self.increment(APP_REQUESTS_TOTAL),
            CounterEvent::DataSourceSucceeded => self.set(APP_UP, 1),
            CounterEvent::DataSourceFailed => {
                self.increment(APP_DB_ERRORS_TOTAL);
                self.set(APP_UP, 0);
            }
        }
    }

    pub fn requests_total(&self) -> u64 {
        self.get(APP_REQUESTS_TOTAL).unwrap_or(0)
    }

    pub fn db_errors_total(&self) -> u64 {
        self.get(APP_DB_ERRORS_TOTAL).unwrap_or(0)
    }

    pub fn up(&self) -> u64 {
        self.get(APP_UP).unwrap_or(1)
    }

    /// Counters outside the recognised set, in lexical order.
    pub fn extras(&self) -> impl Iterator<Item = (&str, u64)> {
        self.values
            .iter()
            .filter(|(name, _)| !is_recognized(name))
            .map(|(name, value)| (name.as_str(), *value))
    }

    /// Serialize to the counter file format.
    ///
    /// Recognised names come first in their fixed order, extras follow.
    pub fn to_file_format(&self) -> String {
        let mut out = String::new();
        for descriptor in RECOGNIZED.iter() {
            let _ = writeln!(out, "{} {}", descriptor.name, self.value_of(descriptor));
        }
        for (name, value) in self.extras() {
            let _ = writeln!(out, "{} {}", name, value);
        }
        out
    }
}

fn is_recognized(name: &str) -> bool {
    RECOGNIZED.iter().any(|d| d.name == name)
}

/// Parse one counter line into `(name, value)`.
///
/// The name is the first whitespace-delimited token and must start with
/// `app_`. The value is the leading digit run of the second token.
pub fn parse_line(line: &str) -> Option<(&str, u64)> {
    let line = line.trim_end_matches(['\r', '\n']);
    if !line.starts_with(NAME_PREFIX) {
        return None;
    }

    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    let raw_value = tokens.next()?;

    let digits_end = raw_value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw_value.len());
    if digits_end == 0 {
        return None;
    }

    let value = raw_value[..digits_end].parse::<u64>().ok()?;
    Some((name, value))
}
