//! Concurrent frequency counter keyed by resolved value.
//!
//! [`Tally`] maps each resolved value to the number of records that resolved
//! to it. Unlike the sharded counters in [`counters`](crate::counters), the
//! key space is open-ended, so a single mutex guards the whole map. Both the
//! write path ([`Tally::increment`]) and the read path ([`Tally::snapshot`])
//! take the same lock:
//!
//! - `increment` holds it for one hash lookup (plus one allocation the first
//!   time a value is seen);
//! - `snapshot` holds it for one copy of the map; sorting happens after the
//!   lock is released.
//!
//! Entries are never evicted, so memory grows with the number of distinct
//! values ever seen.
//!
//! # Examples
//!
//! ```rust
//! use conteggio::tally::Tally;
//!
//! let tally = Tally::new();
//! tally.increment("order-service");
//! tally.increment("user-service");
//! tally.increment("order-service");
//!
//! let snapshot = tally.snapshot();
//! assert_eq!(snapshot.get("order-service"), Some(2));
//! assert_eq!(snapshot.total(), 3);
//! ```

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A mutex-guarded map from resolved value to occurrence count.
#[derive(Debug, Default)]
pub struct Tally {
    storage: Mutex<HashMap<String, u64>>,
}

impl Tally {
    /// Creates an empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every critical section leaves the map consistent, so a poisoned lock
    /// is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.storage.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds one to the count for `value`, creating the entry if needed.
    #[inline]
    pub fn increment(&self, value: &str) {
        let mut storage = self.lock();
        match storage.get_mut(value) {
            Some(count) => *count += 1,
            None => {
                storage.insert(value.to_owned(), 1);
            }
        }
    }

    /// Returns a point-in-time copy of all entries, sorted by value.
    pub fn snapshot(&self) -> Snapshot {
        let entries: Vec<Entry> = self
            .lock()
            .iter()
            .map(|(value, count)| Entry {
                value: value.clone(),
                count: *count,
            })
            .collect();

        Snapshot::from_unsorted(entries)
    }

    /// Returns the number of distinct values seen so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been counted yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// One `(value, count)` pair of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entry {
    /// The resolved value.
    pub value: String,
    /// How many records resolved to it.
    pub count: u64,
}

/// A consistent copy of a [`Tally`], sorted ascending by value.
///
/// Ordering is byte-wise, as given by `String`'s `Ord`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    entries: Vec<Entry>,
}

impl Snapshot {
    /// Builds a snapshot from entries in any order.
    pub fn from_unsorted(mut entries: Vec<Entry>) -> Self {
        entries.sort_unstable_by(|a, b| a.value.cmp(&b.value));
        Self { entries }
    }

    /// Returns the sorted entries.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns an iterator over the sorted entries.
    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Returns the number of distinct values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the count recorded for `value`, if any.
    pub fn get(&self, value: &str) -> Option<u64> {
        self.entries
            .binary_search_by(|entry| entry.value.as_str().cmp(value))
            .ok()
            .map(|idx| self.entries[idx].count)
    }

    /// Returns the sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|entry| entry.count).sum()
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_new_is_empty() {
        let tally = Tally::new();
        assert!(tally.is_empty());
        assert!(tally.snapshot().is_empty());
    }

    #[test]
    fn test_increment() {
        let tally = Tally::new();
        tally.increment("a");
        tally.increment("a");
        tally.increment("b");

        let snapshot = tally.snapshot();
        assert_eq!(snapshot.get("a"), Some(2));
        assert_eq!(snapshot.get("b"), Some(1));
        assert_eq!(snapshot.get("c"), None);
        assert_eq!(tally.len(), 2);
    }

    #[test]
    fn test_snapshot_sorted_bytewise() {
        let tally = Tally::new();
        for value in ["zeta", "alpha", "Beta", "a b", "a", "unknown"] {
            tally.increment(value);
        }

        let values: Vec<_> = tally.snapshot().iter().map(|e| e.value.clone()).collect();
        assert_eq!(values, vec!["Beta", "a", "a b", "alpha", "unknown", "zeta"]);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let tally = Tally::new();
        tally.increment("a");
        let before = tally.snapshot();
        tally.increment("a");

        assert_eq!(before.get("a"), Some(1));
        assert_eq!(tally.snapshot().get("a"), Some(2));
    }

    #[test]
    fn test_total() {
        let tally = Tally::new();
        for _ in 0..5 {
            tally.increment("x");
        }
        tally.increment("y");
        assert_eq!(tally.snapshot().total(), 6);
    }

    #[test]
    fn test_empty_string_is_a_value() {
        let tally = Tally::new();
        tally.increment("");
        assert_eq!(tally.snapshot().get(""), Some(1));
    }

    #[test]
    fn test_multiple_threads() {
        let tally = Arc::new(Tally::new());
        let mut handles = vec![];

        for i in 0..8 {
            let tally_clone = Arc::clone(&tally);
            handles.push(thread::spawn(move || {
                for j in 0..1000 {
                    tally_clone.increment(if j % 2 == 0 { "even" } else { "odd" });
                }
                tally_clone.increment(&format!("thread-{i}"));
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = tally.snapshot();
        assert_eq!(snapshot.get("even"), Some(4000));
        assert_eq!(snapshot.get("odd"), Some(4000));
        assert_eq!(snapshot.total(), 8008);
        assert_eq!(snapshot.len(), 10);
    }

    #[test]
    fn test_snapshot_during_writes() {
        let tally = Arc::new(Tally::new());
        let writer = {
            let tally = Arc::clone(&tally);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    tally.increment("busy");
                }
            })
        };

        let mut last = 0;
        for _ in 0..100 {
            let seen = tally.snapshot().get("busy").unwrap_or(0);
            assert!(seen >= last);
            last = seen;
        }

        writer.join().unwrap();
        assert_eq!(tally.snapshot().get("busy"), Some(10_000));
    }

    #[test]
    fn test_from_unsorted() {
        let snapshot = Snapshot::from_unsorted(vec![
            Entry {
                value: "b".into(),
                count: 2,
            },
            Entry {
                value: "a".into(),
                count: 1,
            },
        ]);
        assert_eq!(snapshot.entries()[0].value, "a");
        assert_eq!(snapshot.entries()[1].value, "b");
    }
}
