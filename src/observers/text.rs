//! Plain-text report.
//!
//! One line per entry, `"<value>" - <count>`, in snapshot order (ascending by
//! value), each line terminated by a newline, followed by one blank line:
//!
//! ```text
//! "order-service" - 1
//! "unknown" - 1
//! "user-service" - 1
//!
//! ```
//!
//! Values are written verbatim between the quotes, without escaping. An
//! empty snapshot renders to an empty string.

use std::fmt::Write;

use crate::tally::Snapshot;

/// Renders a snapshot in the plain-text report format.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextObserver;

impl TextObserver {
    /// Creates a new text observer.
    pub fn new() -> Self {
        Self
    }

    /// Renders `snapshot`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use conteggio::observers::text::TextObserver;
    /// use conteggio::tally::Tally;
    ///
    /// let tally = Tally::new();
    /// tally.increment("b");
    /// tally.increment("a");
    /// tally.increment("b");
    ///
    /// let text = TextObserver::new().render(&tally.snapshot());
    /// assert_eq!(text, "\"a\" - 1\n\"b\" - 2\n\n");
    /// ```
    pub fn render(&self, snapshot: &Snapshot) -> String {
        if snapshot.is_empty() {
            return String::new();
        }

        let mut out = String::with_capacity(snapshot.len() * 24 + 1);
        for entry in snapshot {
            // Writing into a String cannot fail.
            let _ = writeln!(out, "\"{}\" - {}", entry.value, entry.count);
        }
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::{Entry, Tally};

    #[test]
    fn test_render_empty() {
        assert_eq!(TextObserver::new().render(&Snapshot::default()), "");
    }

    #[test]
    fn test_render_single() {
        let tally = Tally::new();
        tally.increment("v1.0");
        tally.increment("v1.0");
        tally.increment("v1.0");
        assert_eq!(TextObserver::new().render(&tally.snapshot()), "\"v1.0\" - 3\n\n");
    }

    #[test]
    fn test_render_sorted() {
        let tally = Tally::new();
        for value in ["user-service", "order-service", "unknown"] {
            tally.increment(value);
        }
        assert_eq!(
            TextObserver::new().render(&tally.snapshot()),
            "\"order-service\" - 1\n\"unknown\" - 1\n\"user-service\" - 1\n\n"
        );
    }

    #[test]
    fn test_render_is_verbatim() {
        let snapshot = Snapshot::from_unsorted(vec![Entry {
            value: "say \"hi\"".into(),
            count: 12,
        }]);
        assert_eq!(
            TextObserver::new().render(&snapshot),
            "\"say \"hi\"\" - 12\n\n"
        );
    }
}
