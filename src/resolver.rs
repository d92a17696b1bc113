//! Attribute resolution over a [`Batch`].
//!
//! Each record resolves to a single string: its own attribute value when it
//! has a string value under the requested key, otherwise the current
//! fallback. The fallback starts as [`UNKNOWN`] and is overwritten whenever a
//! resource group or scope group carries a string value under the key.
//!
//! The fallback is shared by the whole traversal and is never reset when
//! moving to the next resource or scope group. A value found on an early
//! group therefore stays the default for every later group that does not
//! override it, including sibling scopes and later resources:
//!
//! ```text
//! resource A {service="api"}
//!   scope a1            record -> "api"
//! resource B {}
//!   scope b1            record -> "api"     (inherited from A)
//!   scope b2 {service="worker"}
//!                       record -> "worker"
//! resource C {}
//!   scope c1            record -> "worker"  (inherited from b2)
//! ```
//!
//! Record-level values never update the fallback.

use crate::batch::{find_str, Batch};

/// Value used for records when no override is found.
pub const UNKNOWN: &str = "unknown";

/// Resolves `key` for every record in `batch`.
///
/// Values are returned in depth-first order: resources in order, then their
/// scopes in order, then the records of each scope in order. The result has
/// exactly one entry per record.
///
/// # Examples
///
/// ```rust
/// use conteggio::batch::{Batch, Record, ResourceGroup, ScopeGroup};
/// use conteggio::resolver::resolve;
///
/// let batch = Batch::new().with_resource(
///     ResourceGroup::new().with_attribute("env", "production").with_scope(
///         ScopeGroup::new()
///             .with_record(Record::new().with_attribute("env", "staging"))
///             .with_record(Record::new()),
///     ),
/// );
///
/// assert_eq!(resolve(&batch, "env"), vec!["staging", "production"]);
/// assert_eq!(resolve(&batch, "missing"), vec!["unknown", "unknown"]);
/// ```
pub fn resolve<'a>(batch: &'a Batch, key: &str) -> Vec<&'a str> {
    let mut resolved = Vec::with_capacity(batch.record_count());
    let mut fallback: &'a str = UNKNOWN;

    for resource in &batch.resources {
        if let Some(value) = find_str(&resource.attributes, key) {
            fallback = value;
        }

        for scope in &resource.scopes {
            if let Some(value) = find_str(&scope.attributes, key) {
                fallback = value;
            }

            resolved.extend(
                scope
                    .records
                    .iter()
                    .map(|record| find_str(&record.attributes, key).unwrap_or(fallback)),
            );
        }
    }

    resolved
}
