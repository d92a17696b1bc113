//! Command-line configuration of the receiver binary.
//!
//! Long flags are kebab-case; the camelCase spellings accepted by earlier
//! deployments (`--listenAddr`, `--maxReceiveMessageSize`) are kept as
//! hidden aliases.

use std::time::Duration;

use clap::Parser;

use crate::observers::{Renderer, ReportFormat};
#[cfg(feature = "table")]
use crate::observers::table::{TableObserver, TableStyle};

/// OTLP log receiver counting records by attribute value.
#[derive(Parser, Debug, Clone)]
#[command(name = "conteggio", version, about)]
pub struct Config {
    /// The listen address
    #[arg(long, alias = "listenAddr", default_value = "localhost:4317")]
    pub listen_addr: String,

    /// The max message size in bytes the server can receive
    #[arg(long, alias = "maxReceiveMessageSize", default_value_t = 16 * 1024 * 1024)]
    pub max_receive_message_size: usize,

    /// The reporting interval, e.g. 30s, 500ms or 1h2m3s
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub duration: Duration,

    /// The name of the attribute to count by
    #[arg(long, default_value = "")]
    pub attribute: String,

    /// The report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Table style used by `--format table`
    #[cfg(feature = "table")]
    #[arg(long, value_enum, default_value_t = TableStyle::Rounded)]
    pub table_style: TableStyle,

    /// Pretty-print reports with `--format json`
    #[cfg(feature = "json")]
    #[arg(long)]
    pub json_pretty: bool,

    /// Leave the timestamp out of reports with `--format json`
    #[cfg(feature = "json")]
    #[arg(long)]
    pub json_no_timestamp: bool,

    /// Metric name prefix used by `--format prometheus`
    #[cfg(feature = "prometheus")]
    #[arg(long)]
    pub prometheus_namespace: Option<String>,

    /// Label carrying the attribute value with `--format prometheus`
    #[cfg(feature = "prometheus")]
    #[arg(long, default_value = "value")]
    pub prometheus_label: String,

    /// Log filter directive for diagnostics written to stderr
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    /// Builds the report renderer selected by the format flags.
    pub fn renderer(&self) -> Renderer {
        let renderer = Renderer::new(self.format);

        #[cfg(feature = "table")]
        let renderer = renderer.with_table(TableObserver::new().with_style(self.table_style));

        #[cfg(feature = "json")]
        let renderer = renderer.with_json(
            crate::observers::json::JsonObserver::new()
                .pretty(self.json_pretty)
                .include_timestamp(!self.json_no_timestamp),
        );

        #[cfg(feature = "prometheus")]
        let renderer = {
            let mut observer = crate::observers::prometheus::PrometheusObserver::new()
                .with_label_name(&self.prometheus_label);
            if let Some(namespace) = &self.prometheus_namespace {
                observer = observer.with_namespace(namespace);
            }
            renderer.with_prometheus(observer)
        };

        renderer
    }
}

/// Parses a duration such as `300ms`, `1.5s` or `2h45m`.
///
/// Accepted units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. Every
/// number needs a unit, and the total must be greater than zero. A leading
/// `+` is accepted; a leading `-` is not.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let mut rest = input.strip_prefix('+').unwrap_or(input);
    if rest.is_empty() {
        return Err(format!("invalid duration {input:?}"));
    }

    let mut nanos = 0f64;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("invalid duration {input:?}"));
        }
        let number: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("invalid duration {input:?}"))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = match &rest[..unit_len] {
            "" => return Err(format!("missing unit in duration {input:?}")),
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            unit => return Err(format!("unknown unit {unit:?} in duration {input:?}")),
        };
        rest = &rest[unit_len..];

        nanos += number * scale;
    }

    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(format!("duration {input:?} out of range"));
    }
    let nanos = nanos.round() as u64;
    if nanos == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(Duration::from_nanos(nanos))
}
