//! The monitor: attribute resolution, counting and periodic reporting.
//!
//! A [`Monitor`] owns one [`Tally`] and the ingestion statistics. It exposes
//! the two operations the transport layer needs:
//!
//! - [`Monitor::ingest`] resolves an attribute for every record of a batch
//!   and counts the results. It never fails and may be called from any
//!   number of tasks at once.
//! - [`Monitor::run`] drives the [`Reporter`] until cancelled.
//!
//! Share it with `Arc<Monitor>`; its state lives as long as the last handle.
//!
//! # Examples
//!
//! ```rust
//! use conteggio::batch::{Batch, Record, ResourceGroup, ScopeGroup};
//! use conteggio::monitor::Monitor;
//! use std::time::Duration;
//!
//! let monitor = Monitor::new(Duration::from_secs(30));
//!
//! let batch = Batch::new().with_resource(
//!     ResourceGroup::new().with_attribute("env", "production").with_scope(
//!         ScopeGroup::new()
//!             .with_record(Record::new())
//!             .with_record(Record::new().with_attribute("env", "staging")),
//!     ),
//! );
//! monitor.ingest(&batch, "env");
//!
//! let snapshot = monitor.snapshot();
//! assert_eq!(snapshot.get("production"), Some(1));
//! assert_eq!(snapshot.get("staging"), Some(1));
//! ```

use std::io::Write;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::batch::Batch;
use crate::counters::monotone::Monotone;
use crate::counters::Observable;
use crate::observers::{Renderer, ReportFormat};
use crate::reporter::Reporter;
use crate::resolver::resolve;
use crate::tally::{Snapshot, Tally};

/// Counters describing the ingestion traffic itself.
#[derive(Debug)]
pub struct IngestStats {
    batches: Monotone,
    records: Monotone,
}

impl IngestStats {
    fn new() -> Self {
        Self {
            batches: Monotone::new().with_name("batches_received"),
            records: Monotone::new().with_name("log_records_received"),
        }
    }

    /// Number of batches ingested.
    pub fn batches(&self) -> u64 {
        self.batches.value()
    }

    /// Number of records ingested.
    pub fn records(&self) -> u64 {
        self.records.value()
    }

    /// Returns the statistics as observable counters.
    pub fn counters(&self) -> [&dyn Observable; 2] {
        [&self.batches, &self.records]
    }
}

/// Resolves, counts and reports log records by attribute value.
#[derive(Debug)]
pub struct Monitor {
    tally: Tally,
    stats: IngestStats,
    interval: Duration,
    renderer: Renderer,
}

impl Monitor {
    /// Creates a monitor reporting every `interval` in the text format.
    pub fn new(interval: Duration) -> Self {
        Self {
            tally: Tally::new(),
            stats: IngestStats::new(),
            interval,
            renderer: Renderer::default(),
        }
    }

    /// Sets the report format.
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.renderer = self.renderer.with_format(format);
        self
    }

    /// Sets the report format and observer settings.
    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Returns the reporting interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Resolves `attribute` for every record in `batch` and counts each
    /// resolved value once.
    ///
    /// Increments are applied in record order. Concurrent calls interleave
    /// freely but never lose an increment.
    #[instrument(level = "debug", skip_all, fields(attribute = %attribute))]
    pub fn ingest(&self, batch: &Batch, attribute: &str) {
        let resolved = resolve(batch, attribute);
        for value in &resolved {
            self.tally.increment(value);
        }

        self.stats.batches.increment();
        self.stats.records.add(resolved.len() as u64);

        debug!(records = resolved.len(), "batch ingested");
    }

    /// Returns a sorted copy of the current counts.
    pub fn snapshot(&self) -> Snapshot {
        self.tally.snapshot()
    }

    /// Returns the ingestion statistics.
    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    fn reporter(&self) -> Reporter<'_> {
        Reporter::new(&self.tally, self.interval)
            .with_renderer(self.renderer.clone())
            .with_counters(self.stats.counters())
    }

    /// Prints a report to stdout every interval until `token` is cancelled.
    ///
    /// Writes go through the blocking [`std::io::Stdout`], so a stalled
    /// stdout (a full pipe, a paused terminal) blocks the worker thread
    /// running this future. Use [`run_with_writer`](Self::run_with_writer)
    /// with a different sink, or spawn it on a dedicated runtime, when that
    /// matters.
    pub async fn run(&self, token: CancellationToken) {
        self.run_with_writer(token, std::io::stdout()).await;
    }

    /// Like [`run`](Self::run), writing reports to `out`.
    pub async fn run_with_writer<W: Write>(&self, token: CancellationToken, out: W) {
        self.reporter().run(token, out).await;
        info!(
            batches = self.stats.batches(),
            records = self.stats.records(),
            distinct_values = self.tally.len(),
            "ingestion totals"
        );
    }
}
