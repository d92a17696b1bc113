//! Prometheus observer built on the official `prometheus` crate.
//!
//! This module provides [`PrometheusObserver`], which registers a tally
//! [`Snapshot`] and any number of [`Observable`] counters with a fresh
//! [`Registry`] and encodes them with the [`TextEncoder`].
//!
//! The snapshot becomes a single counter vector with one series per
//! resolved value:
//!
//! ```text
//! # HELP log_records Log records by resolved attribute value
//! # TYPE log_records counter
//! log_records{value="order-service"} 2
//! log_records{value="user-service"} 1
//! ```
//!
//! # Feature Flag
//!
//! This module requires the `prometheus` feature:
//!
//! ```toml
//! [dependencies]
//! conteggio = { version = "0.1", features = ["prometheus"] }
//! ```

use crate::counters::Observable;
use crate::observers::PrometheusError;
use crate::tally::Snapshot;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Result type for Prometheus observer operations.
pub type Result<T> = std::result::Result<T, PrometheusError>;

const METRIC_NAME: &str = "log_records";
const DEFAULT_LABEL_NAME: &str = "value";

/// Observer that renders a snapshot in Prometheus exposition format.
///
/// # Example
///
/// ```rust
/// use conteggio::counters::monotone::Monotone;
/// use conteggio::counters::Observable;
/// use conteggio::observers::prometheus::PrometheusObserver;
/// use conteggio::tally::Tally;
///
/// let tally = Tally::new();
/// tally.increment("checkout");
///
/// let batches = Monotone::new().with_name("batches_received");
/// batches.increment();
///
/// let counters: Vec<&dyn Observable> = vec![&batches];
/// let output = PrometheusObserver::new()
///     .render(&tally.snapshot(), counters.into_iter())
///     .unwrap();
///
/// assert!(output.contains("log_records{value=\"checkout\"} 1"));
/// assert!(output.contains("batches_received 1"));
/// ```
#[derive(Debug, Clone)]
pub struct PrometheusObserver {
    namespace: Option<String>,
    label_name: String,
}

impl Default for PrometheusObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl PrometheusObserver {
    /// Creates a new observer exporting `log_records{value="…"}`.
    pub fn new() -> Self {
        Self {
            namespace: None,
            label_name: DEFAULT_LABEL_NAME.to_string(),
        }
    }

    /// Sets the namespace (prefix) for all metrics.
    ///
    /// Namespace "conteggio" + metric "log_records" = "conteggio_log_records".
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(Self::sanitize_name(namespace));
        self
    }

    /// Sets the label carrying the resolved value, e.g. the attribute key.
    pub fn with_label_name(mut self, name: &str) -> Self {
        self.label_name = Self::sanitize_name(name);
        self
    }

    /// Returns the namespace, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the label carrying the resolved value.
    pub fn label_name(&self) -> &str {
        &self.label_name
    }

    /// Sanitizes a metric or label name to be Prometheus-compatible.
    ///
    /// Prometheus names must match `[a-zA-Z_:][a-zA-Z0-9_:]*`.
    fn sanitize_name(name: &str) -> String {
        let mut result = String::with_capacity(name.len());
        for c in name.chars() {
            if c.is_ascii_alphanumeric() || c == '_' || c == ':' {
                result.push(c);
            } else {
                result.push('_');
            }
        }
        if result.is_empty() {
            result.push_str("unnamed");
        }
        if result.starts_with(|c: char| c.is_ascii_digit()) {
            result.insert(0, '_');
        }
        result
    }

    fn opts(&self, raw_name: &str, help: &str) -> Opts {
        let mut opts = Opts::new(Self::sanitize_name(raw_name), help);
        if let Some(ns) = &self.namespace {
            opts = opts.namespace(ns.clone());
        }
        opts
    }

    /// Renders the snapshot and the extra counters.
    ///
    /// An empty snapshot renders to an empty string, whatever the counters
    /// hold.
    ///
    /// # Errors
    ///
    /// Returns an error if metric creation, registration, or encoding fails,
    /// for instance when two counters share a name.
    pub fn render<'a>(
        &self,
        snapshot: &Snapshot,
        counters: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<String> {
        if snapshot.is_empty() {
            return Ok(String::new());
        }

        let registry = Registry::new();

        let by_value = IntCounterVec::new(
            self.opts(METRIC_NAME, "Log records by resolved attribute value"),
            &[self.label_name.as_str()],
        )?;
        for entry in snapshot {
            by_value
                .with_label_values(&[entry.value.as_str()])
                .inc_by(entry.count);
        }
        registry.register(Box::new(by_value))?;

        for counter in counters {
            let raw_name = if counter.name().is_empty() {
                "unnamed"
            } else {
                counter.name()
            };
            let metric = IntCounter::with_opts(self.opts(raw_name, &format!("{} metric", raw_name)))?;
            metric.inc_by(counter.value());
            registry.register(Box::new(metric))?;
        }

        self.encode_registry(&registry)
    }

    fn encode_registry(&self, registry: &Registry) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| PrometheusError::EncodeError(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| PrometheusError::EncodeError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::monotone::Monotone;
    use crate::tally::Tally;

    fn sample() -> Snapshot {
        let tally = Tally::new();
        tally.increment("user-service");
        tally.increment("order-service");
        tally.increment("order-service");
        tally.snapshot()
    }

    fn no_counters<'a>() -> std::iter::Empty<&'a dyn Observable> {
        std::iter::empty()
    }

    #[test]
    fn test_render_empty() {
        let output = PrometheusObserver::new()
            .render(&Snapshot::default(), no_counters())
            .unwrap();
        assert!(output.is_empty());
    }

    #[test]
    fn test_render_values() {
        let output = PrometheusObserver::new()
            .render(&sample(), no_counters())
            .unwrap();

        assert!(output.contains("# HELP log_records Log records by resolved attribute value"));
        assert!(output.contains("# TYPE log_records counter"));
        assert!(output.contains("log_records{value=\"order-service\"} 2"));
        assert!(output.contains("log_records{value=\"user-service\"} 1"));
    }

    #[test]
    fn test_render_with_counters() {
        let batches = Monotone::new().with_name("batches_received");
        let records = Monotone::new().with_name("log_records_received");
        batches.add(2);
        records.add(3);

        let counters: Vec<&dyn Observable> = vec![&batches, &records];
        let output = PrometheusObserver::new()
            .render(&sample(), counters.into_iter())
            .unwrap();

        assert!(output.contains("# HELP batches_received batches_received metric"));
        assert!(output.contains("batches_received 2"));
        assert!(output.contains("log_records_received 3"));
    }

    #[test]
    fn test_render_with_namespace_and_label() {
        let output = PrometheusObserver::new()
            .with_namespace("conteggio")
            .with_label_name("service.name")
            .render(&sample(), no_counters())
            .unwrap();

        assert!(output.contains("conteggio_log_records{service_name=\"order-service\"} 2"));
    }

    #[test]
    fn test_duplicate_counter_names_fail() {
        let first = Monotone::new().with_name("dup");
        let second = Monotone::new().with_name("dup");
        let counters: Vec<&dyn Observable> = vec![&first, &second];

        let result = PrometheusObserver::new().render(&sample(), counters.into_iter());
        assert!(matches!(result, Err(PrometheusError::MetricError(_))));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(PrometheusObserver::sanitize_name("valid_name"), "valid_name");
        assert_eq!(PrometheusObserver::sanitize_name("with-dash"), "with_dash");
        assert_eq!(PrometheusObserver::sanitize_name("with.dot"), "with_dot");
        assert_eq!(PrometheusObserver::sanitize_name(""), "unnamed");
        assert_eq!(PrometheusObserver::sanitize_name("123starts"), "_123starts");
    }
}
