//! # Conteggio - Log Record Counts by Attribute Value
//!
//! An aggregation backend for OpenTelemetry logs. Every ingested log record
//! is assigned the value of one chosen attribute, the number of records per
//! value is counted process-wide, and a sorted snapshot of the counts is
//! printed periodically.
//!
//! ## Attribute Resolution
//!
//! Log batches are three-level trees (resources, scopes, records). The value
//! of the attribute for a record is looked up on the record first, then on
//! the enclosing scope, then on the enclosing resource:
//!
//! ```text
//! Batch                                       resolved "service"
//!  └─ Resource  service=api
//!      ├─ Scope
//!      │   ├─ Record  service=checkout   ──►  checkout
//!      │   └─ Record                     ──►  api
//!      └─ Scope     service=worker
//!          └─ Record                     ──►  worker
//! ```
//!
//! When nothing matches, the record counts as `"unknown"`. Resource and
//! scope values become the fallback for the *rest of the batch*, not only
//! for their own subtree; see [`resolver`] for the exact rules.
//!
//! ## Counting and Reporting
//!
//! [`Tally`](tally::Tally) is a mutex-guarded map shared by every ingesting
//! task. [`Reporter`](reporter::Reporter) snapshots it on a fixed interval:
//!
//! ```text
//! "order-service" - 1
//! "unknown" - 1
//! "user-service" - 1
//!
//! ```
//!
//! Counts are cumulative; they are never reset between reports.
//!
//! ## Quick Start
//!
//! ```rust
//! use conteggio::batch::{Batch, Record, ResourceGroup, ScopeGroup};
//! use conteggio::monitor::Monitor;
//! use std::time::Duration;
//!
//! let monitor = Monitor::new(Duration::from_secs(30));
//!
//! let batch = Batch::new().with_resource(
//!     ResourceGroup::new().with_scope(
//!         ScopeGroup::new()
//!             .with_attribute("version", "v1.0")
//!             .with_record(Record::new())
//!             .with_record(Record::new()),
//!     ),
//! );
//! monitor.ingest(&batch, "version");
//!
//! assert_eq!(monitor.snapshot().get("v1.0"), Some(2));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Module | Description |
//! |---------|--------|-------------|
//! | `server` (default) | [`server`], [`config`] | OTLP/gRPC receiver and the `conteggio` binary |
//! | `table` | [`observers::table`] | Print reports as tables |
//! | `json` | [`observers::json`] | Print reports as JSON objects |
//! | `prometheus` | [`observers::prometheus`] | Print reports in Prometheus exposition format |
//! | `serde` | | `Serialize`/`Deserialize` for the batch model and snapshots |
//! | `full` | All of the above | |

pub mod batch;
pub mod counters;
pub mod monitor;
pub mod observers;
pub mod reporter;
pub mod resolver;
pub mod tally;

#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod server;
