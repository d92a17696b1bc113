//! Sharded counters for ingestion self-statistics.
//!
//! Every export request bumps the same couple of counters from whichever
//! task happens to handle it. A single `AtomicUsize` would make those
//! updates bounce one cache line between all cores, so each counter spreads
//! its value over [`NUM_COMPONENTS`] cache-padded slots and sums them on
//! read.
//!
//! # Architecture
//!
//! ```text
//!                          ┌─────────────────────────────────────┐
//!                          │         Counter Structure           │
//!                          ├─────────────────────────────────────┤
//!   Thread 0 ──writes──►   │ [Slot 0] ████████ (CachePadded)     │
//!   Thread 1 ──writes──►   │ [Slot 1] ████████ (CachePadded)     │
//!        ...               │    ...                              │
//!   Thread 63 ─writes──►   │ [Slot 63] ███████ (CachePadded)     │
//!                          └─────────────────────────────────────┘
//!                                          │
//!                                          ▼
//!                                   value() aggregates
//!                                   all slots on read
//! ```
//!
//! Slots are assigned round-robin the first time a thread touches any
//! counter. After 64 threads, assignment wraps around and threads share
//! slots, which only costs some contention.

pub mod monotone;

use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of shards (slots) used by each counter.
///
/// Each slot is cache-line padded, so a counter costs roughly
/// `64 slots × 64 bytes = 4KB`.
pub(crate) const NUM_COMPONENTS: usize = 64;

static NEXT_SLOT_ID: AtomicUsize = AtomicUsize::new(0);

thread_local! {
    /// Slot index of the current thread, assigned lazily and stable for the
    /// lifetime of the thread.
    pub(crate) static THREAD_SLOT_INDEX: usize = get_next_slot_id();
}

/// Assigns the next slot to a thread. The result is in `[0, NUM_COMPONENTS)`.
///
/// `Relaxed` is enough: two threads landing on the same slot only adds
/// contention, never a wrong total.
pub fn get_next_slot_id() -> usize {
    NEXT_SLOT_ID.fetch_add(1, Ordering::Relaxed) % NUM_COMPONENTS
}

/// A named counter whose current value can be read.
///
/// Observers use this trait to export counters without knowing their
/// concrete type.
///
/// # Examples
///
/// ```rust
/// use conteggio::counters::monotone::Monotone;
/// use conteggio::counters::Observable;
///
/// let counter = Monotone::new().with_name("batches_received");
/// counter.add(3);
///
/// let observable: &dyn Observable = &counter;
/// assert_eq!(observable.name(), "batches_received");
/// assert_eq!(observable.value(), 3);
/// assert_eq!(observable.to_string(), "batches_received:3");
/// ```
pub trait Observable: Debug + Send + Sync {
    /// Returns the name of this counter, or an empty string if unnamed.
    fn name(&self) -> &str;

    /// Returns the current aggregated value.
    fn value(&self) -> u64;
}

impl std::fmt::Display for dyn Observable + '_ {
    /// Formats the counter as `name:value` if named, or just `value` otherwise.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.name().is_empty() {
            write!(f, "{}:{}", self.name(), self.value())
        } else {
            write!(f, "{}", self.value())
        }
    }
}
