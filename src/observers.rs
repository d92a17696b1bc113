//! Renderers that turn a tally [`Snapshot`](crate::tally::Snapshot) into text.
//!
//! - [`text`] - the plain `"value" - count` report (always available)
//! - [`table`] - pretty-print the snapshot as a table using the `tabled` crate
//! - [`json`] - serialize the snapshot to a JSON object per report
//! - [`prometheus`] - export the snapshot in Prometheus exposition format
//!
//! # Unified Error Handling
//!
//! All fallible observers use the unified [`ObserverError`] type, so the
//! [`Reporter`](crate::reporter::Reporter) handles every format the same way.
//! [`Renderer`] pairs the selected [`ReportFormat`] with the settings of each
//! observer and dispatches to the right one.
//!
//! # Feature Flags
//!
//! - `table` - Enables the [`table`] module
//! - `json` - Enables the [`json`] module
//! - `prometheus` - Enables the [`prometheus`] module
//! - `full` - Enables all observer modules and the server binary

mod error;

pub use error::{ObserverError, Result};

#[cfg(feature = "prometheus")]
pub use error::PrometheusError;

pub mod text;

use crate::counters::Observable;
use crate::tally::Snapshot;

#[cfg(feature = "table")]
pub mod table;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "prometheus")]
pub mod prometheus;

/// Output format used by the reporter on every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "server", derive(clap::ValueEnum))]
pub enum ReportFormat {
    /// One `"value" - count` line per entry followed by a blank line
    #[default]
    Text,
    /// Rounded two-column table
    #[cfg(feature = "table")]
    Table,
    /// One JSON object per report
    #[cfg(feature = "json")]
    Json,
    /// Prometheus exposition format
    #[cfg(feature = "prometheus")]
    Prometheus,
}

/// A report format together with the settings of the observers behind it.
///
/// # Examples
///
/// ```rust
/// use conteggio::observers::{Renderer, ReportFormat};
/// use conteggio::tally::Tally;
///
/// let tally = Tally::new();
/// tally.increment("v1.0");
///
/// let renderer = Renderer::new(ReportFormat::Text);
/// let report = renderer.render(&tally.snapshot(), std::iter::empty()).unwrap();
/// assert_eq!(report, "\"v1.0\" - 1\n\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Renderer {
    format: ReportFormat,
    #[cfg(feature = "table")]
    table: table::TableObserver,
    #[cfg(feature = "json")]
    json: json::JsonObserver,
    #[cfg(feature = "prometheus")]
    prometheus: prometheus::PrometheusObserver,
}

impl Renderer {
    /// Creates a renderer for `format` with default observer settings.
    pub fn new(format: ReportFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Returns the selected format.
    pub fn format(&self) -> ReportFormat {
        self.format
    }

    /// Sets the selected format, keeping the observer settings.
    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the observer used by [`ReportFormat::Table`].
    #[cfg(feature = "table")]
    pub fn with_table(mut self, observer: table::TableObserver) -> Self {
        self.table = observer;
        self
    }

    /// Sets the observer used by [`ReportFormat::Json`].
    #[cfg(feature = "json")]
    pub fn with_json(mut self, observer: json::JsonObserver) -> Self {
        self.json = observer;
        self
    }

    /// Sets the observer used by [`ReportFormat::Prometheus`].
    #[cfg(feature = "prometheus")]
    pub fn with_prometheus(mut self, observer: prometheus::PrometheusObserver) -> Self {
        self.prometheus = observer;
        self
    }

    /// Renders `snapshot` in the selected format.
    ///
    /// `counters` are exported by formats that support extra metrics and
    /// ignored by the others. An empty snapshot renders to an empty string.
    #[cfg_attr(not(feature = "prometheus"), allow(unused_variables))]
    pub fn render<'a>(
        &self,
        snapshot: &Snapshot,
        counters: impl Iterator<Item = &'a dyn Observable>,
    ) -> Result<String> {
        let rendered = match self.format {
            ReportFormat::Text => text::TextObserver::new().render(snapshot),
            #[cfg(feature = "table")]
            ReportFormat::Table => self.table.render(snapshot),
            #[cfg(feature = "json")]
            ReportFormat::Json => self.json.render(snapshot)?,
            #[cfg(feature = "prometheus")]
            ReportFormat::Prometheus => self.prometheus.render(snapshot, counters)?,
        };
        Ok(rendered)
    }
}
