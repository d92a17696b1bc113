//! Monotone counter with sharded atomic storage.
//!
//! [`Monotone`] only ever goes up. It backs the ingestion statistics kept by
//! the [`Monitor`](crate::monitor::Monitor): one increment per export request
//! and one addition per batch of records, issued from many tasks at once.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_utils::CachePadded;

use crate::counters::{Observable, NUM_COMPONENTS, THREAD_SLOT_INDEX};

/// A monotonically increasing counter spread over cache-padded shards.
///
/// # Examples
///
/// ```rust
/// use conteggio::counters::monotone::Monotone;
/// use conteggio::counters::Observable;
/// use std::sync::Arc;
/// use std::thread;
///
/// static BATCHES: Monotone = Monotone::new().with_name("batches_received");
///
/// let records = Arc::new(Monotone::new().with_name("log_records_received"));
/// let handles: Vec<_> = (0..4)
///     .map(|_| {
///         let records = Arc::clone(&records);
///         thread::spawn(move || {
///             for _ in 0..1000 {
///                 BATCHES.increment();
///                 records.add(3);
///             }
///         })
///     })
///     .collect();
///
/// for h in handles {
///     h.join().unwrap();
/// }
///
/// assert_eq!(BATCHES.value(), 4000);
/// assert_eq!(records.value(), 12000);
/// ```
pub struct Monotone {
    name: &'static str,
    components: [CachePadded<AtomicU64>; NUM_COMPONENTS],
}

impl Monotone {
    /// Creates an unnamed counter initialized to zero.
    pub const fn new() -> Self {
        const ZERO: CachePadded<AtomicU64> = CachePadded::new(AtomicU64::new(0));
        Monotone {
            components: [ZERO; NUM_COMPONENTS],
            name: "",
        }
    }

    /// Sets the name of this counter, returning `self` for method chaining.
    pub const fn with_name(self, name: &'static str) -> Self {
        Self { name, ..self }
    }

    #[inline]
    fn component(&self) -> &AtomicU64 {
        THREAD_SLOT_INDEX.with(|idx| &self.components[*idx])
    }

    /// Adds `value` to the current thread's shard.
    #[inline]
    pub fn add(&self, value: u64) {
        self.component().fetch_add(value, Ordering::Relaxed);
    }

    /// Adds one.
    #[inline]
    pub fn increment(&self) {
        self.add(1);
    }

    /// Returns the current thread's contribution to the total.
    #[inline]
    pub fn local_value(&self) -> u64 {
        self.component().load(Ordering::Relaxed)
    }
}

impl Observable for Monotone {
    #[inline]
    fn name(&self) -> &str {
        self.name
    }

    /// Sums all 64 shards.
    #[inline]
    fn value(&self) -> u64 {
        self.components
            .iter()
            .map(|counter| counter.load(Ordering::Relaxed))
            .sum()
    }
}

impl Default for Monotone {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Monotone {
    /// Formats the counter as `name{ [slot]:value ... }`, listing only
    /// non-zero shards.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{{", self.name)?;
        for (i, counter) in self.components.iter().enumerate() {
            let val = counter.load(Ordering::Relaxed);
            if val != 0 {
                write!(f, " [{i}]:{val}")?;
            }
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let counter = Monotone::new();
        assert_eq!(counter.value(), 0);
        assert_eq!(counter.name(), "");
    }

    #[test]
    fn test_add_and_increment() {
        let counter = Monotone::new();
        counter.increment();
        counter.add(41);
        assert_eq!(counter.value(), 42);
        assert_eq!(counter.local_value(), 42);
    }

    #[test]
    fn test_with_name() {
        let counter = Monotone::new().with_name("batches_received");
        counter.increment();
        assert_eq!(counter.name(), "batches_received");
        assert_eq!(counter.value(), 1);
    }

    #[test]
    fn test_static_counter() {
        static COUNTER: Monotone = Monotone::new().with_name("static");
        COUNTER.add(2);
        assert!(COUNTER.value() >= 2);
    }

    #[test]
    fn test_dyn_format() {
        let counter = Monotone::new().with_name("log_records_received");
        counter.add(7);
        assert_eq!(
            format!("{}", &counter as &dyn Observable),
            "log_records_received:7"
        );

        let unnamed = Monotone::new();
        unnamed.add(3);
        assert_eq!(format!("{}", &unnamed as &dyn Observable), "3");
    }

    #[test]
    fn test_debug_lists_nonzero_shards() {
        let counter = Monotone::new().with_name("dbg");
        counter.add(5);
        let debug_str = format!("{:?}", counter);
        assert!(debug_str.starts_with("dbg{"));
        assert!(debug_str.contains(":5"));
        assert!(debug_str.ends_with("}"));
    }

    #[test]
    fn test_multiple_threads() {
        use std::sync::Arc;
        use std::thread;

        let counter = Arc::new(Monotone::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..500 {
                        counter.increment();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.value(), 4000);
    }
}
