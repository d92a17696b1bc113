//! Table observer for pretty-printing a snapshot.
//!
//! This module provides [`TableObserver`], which renders a tally
//! [`Snapshot`] as a formatted table using the `tabled` crate.
//!
//! # Feature Flag
//!
//! This module requires the `table` feature:
//!
//! ```toml
//! [dependencies]
//! conteggio = { version = "0.1", features = ["table"] }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use conteggio::observers::table::{TableObserver, TableStyle};
//!
//! let observer = TableObserver::new().with_style(TableStyle::Rounded);
//! println!("{}", observer.render(&tally.snapshot()));
//! // ╭───────────────┬───────╮
//! // │ Value         │ Count │
//! // ├───────────────┼───────┤
//! // │ order-service │ 1     │
//! // │ unknown       │ 1     │
//! // ╰───────────────┴───────╯
//! ```

use crate::tally::Snapshot;
use tabled::{settings::Style, Table, Tabled};

/// Available table styles for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "server", derive(clap::ValueEnum))]
pub enum TableStyle {
    /// ASCII table with simple characters: +, -, |
    Ascii,
    /// Modern rounded corners (default)
    #[default]
    Rounded,
    /// Sharp corners with box-drawing characters
    Sharp,
    /// Modern style with clean lines
    Modern,
    /// GitHub-flavored Markdown table
    Markdown,
    /// No borders, just spacing
    Blank,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Count")]
    count: u64,
}

/// An observer that renders a snapshot as a table.
#[derive(Debug, Clone)]
#[derive(Debug, Clone, Default)]
pub struct TableObserver {
    style: TableStyle,
}

impl TableObserver {
    /// Creates a new table observer with the rounded style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the table style.
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.style = style;
        self
    }

    /// Returns the table style.
    pub fn style(&self) -> TableStyle {
        self.style
    }

    fn apply_style(&self, table: &mut Table) {
        match self.style {
            TableStyle::Ascii => {
                table.with(Style::ascii());
            }
            TableStyle::Rounded => {
                table.with(Style::rounded());
            }
            TableStyle::Sharp => {
                table.with(Style::sharp());
            }
            TableStyle::Modern => {
                table.with(Style::modern());
            }
            TableStyle::Markdown => {
                table.with(Style::markdown());
            }
            TableStyle::Blank => {
                table.with(Style::blank());
            }
        }
    }

    /// Renders `snapshot` as a table followed by a blank line.
    ///
    /// An empty snapshot renders to an empty string.
    pub fn render(&self, snapshot: &Snapshot) -> String {
        if snapshot.is_empty() {
            return String::new();
        }

        let rows: Vec<EntryRow> = snapshot
            .iter()
            .map(|entry| EntryRow {
                value: entry.value.clone(),
                count: entry.count,
            })
            .collect();

        let mut table = Table::new(rows);
        self.apply_style(&mut table);

        format!("{}\n\n", table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tally::Tally;

    fn sample() -> Snapshot {
        let tally = Tally::new();
        tally.increment("user-service");
        tally.increment("order-service");
        tally.increment("order-service");
        tally.snapshot()
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(TableObserver::new().render(&Snapshot::default()), "");
    }

    #[test]
    fn test_render_contains_entries() {
        let output = TableObserver::new().render(&sample());
        assert!(output.contains("Value"));
        assert!(output.contains("Count"));
        assert!(output.contains("order-service"));
        assert!(output.contains("user-service"));
        assert!(output.ends_with("\n\n"));
    }

    #[test]
    fn test_render_sorted_rows() {
        let output = TableObserver::new()
            .with_style(TableStyle::Ascii)
            .render(&sample());
        let order = output.find("order-service").unwrap();
        let user = output.find("user-service").unwrap();
        assert!(order < user);
    }

    #[test]
    fn test_ascii_style() {
        let output = TableObserver::new()
            .with_style(TableStyle::Ascii)
            .render(&sample());
        assert!(output.starts_with('+'));
        assert!(!output.contains('╭'));
    }

    #[test]
    fn test_markdown_style() {
        let output = TableObserver::new()
            .with_style(TableStyle::Markdown)
            .render(&sample());
        assert!(output.contains("| Value"));
    }
}
