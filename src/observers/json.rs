//! JSON observer for serializing a snapshot.
//!
//! This module provides [`JsonObserver`], which serializes a tally
//! [`Snapshot`] into one JSON document per report.
//!
//! # Feature Flag
//!
//! This module requires the `json` feature:
//!
//! ```toml
//! [dependencies]
//! conteggio = { version = "0.1", features = ["json"] }
//! ```
//!
//! # Output
//!
//! ```text
//! {"timestamp_ms":1760000000000,"total":3,"entries":[{"value":"order-service","count":2},{"value":"user-service","count":1}]}
//! ```

use crate::tally::{Entry, Snapshot};
use serde::{Deserialize, Serialize};

/// The serialized form of one report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonReport {
    /// Optional timestamp in milliseconds since Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    /// Sum of all counts.
    pub total: u64,
    /// Entries sorted ascending by value.
    pub entries: Vec<Entry>,
}

impl JsonReport {
    /// Copies the content of `snapshot` into a report.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            timestamp_ms: None,
            total: snapshot.total(),
            entries: snapshot.entries().to_vec(),
        }
    }

    /// Finds the count of a value.
    pub fn get(&self, value: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.count)
    }
}

#[derive(Debug, Clone)]
struct JsonConfig {
    pretty: bool,
    include_timestamp: bool,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            include_timestamp: true,
        }
    }
}

/// An observer that serializes a snapshot to JSON.
///
/// # Examples
///
/// ```rust
/// use conteggio::observers::json::JsonObserver;
/// use conteggio::tally::Tally;
///
/// let tally = Tally::new();
/// tally.increment("v1.0");
///
/// let json = JsonObserver::new()
///     .include_timestamp(false)
///     .to_json(&tally.snapshot())
///     .unwrap();
/// assert_eq!(json, r#"{"total":1,"entries":[{"value":"v1.0","count":1}]}"#);
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonObserver {
    config: JsonConfig,
}

impl JsonObserver {
    /// Creates a new JSON observer with compact output and timestamps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables pretty-printing.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.config.pretty = enabled;
        self
    }

    /// Enables or disables timestamp inclusion.
    pub fn include_timestamp(mut self, enabled: bool) -> Self {
        self.config.include_timestamp = enabled;
        self
    }

    /// Builds the intermediate report without serializing it.
    pub fn collect(&self, snapshot: &Snapshot) -> JsonReport {
        let mut report = JsonReport::from_snapshot(snapshot);
        if self.config.include_timestamp {
            report.timestamp_ms = Some(current_timestamp_ms());
        }
        report
    }

    /// Serializes `snapshot` to a JSON string.
    pub fn to_json(&self, snapshot: &Snapshot) -> Result<String, serde_json::Error> {
        let report = self.collect(snapshot);
        if self.config.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        }
    }

    /// Renders `snapshot` as one JSON document per line.
    ///
    /// An empty snapshot renders to an empty string.
    pub fn render(&self, snapshot: &Snapshot) -> Result<String, serde_json::Error> {
        if snapshot.is_empty() {
            return Ok(String::new());
        }
        let mut json = self.to_json(snapshot)?;
        json.push('\n');
        Ok(json)
    }
}

/// Returns the current timestamp in milliseconds since Unix epoch.
fn current_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
