//! Report tables
//!
//! Three shapes appear while tidying a message set:
//!
//! - [`LocationTable`]: long form for one reported location,
//!   one row per `(message, segment occurrence)`.
//! - [`WideTable`]: the inner join of several location tables on
//!   `(message id, segment index)`.
//! - [`TidyTable`]: the final report, with the composite message id split
//!   back into one column per identity location.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Composite identity of one message
///
/// `key` is the separator-joined form used for ordering and uniqueness;
/// `parts` keeps the individual identity values so they never have to be
/// recovered by splitting `key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MessageId {
    key: String,
    parts: Vec<String>,
}

impl MessageId {
    /// Join identity values, in identity-location order.
    pub fn new(parts: Vec<String>, separator: &str) -> Self {
        Self {
            key: parts.join(separator),
            parts,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// One `(message, segment occurrence)` row of a location table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRow {
    pub message_id: MessageId,

    /// Zero-based occurrence index; `None` when the message lacks the segment
    pub segment_index: Option<usize>,

    pub value: Option<String>,
}

/// Long-form values of one reported location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationTable {
    /// Output column name of the location
    pub column: String,
    pub rows: Vec<LocationRow>,
}

impl LocationTable {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One joined row covering every reported location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideRow {
    pub message_id: MessageId,
    pub segment_index: Option<usize>,

    /// One value per column of the owning [`WideTable`]
    pub values: Vec<Option<String>>,
}

impl WideRow {
    /// Join key: `(message id, segment index)`
    pub fn key(&self) -> (&MessageId, Option<usize>) {
        (&self.message_id, self.segment_index)
    }

    /// Whether at least one reported value is present
    pub fn is_populated(&self) -> bool {
        self.values.iter().any(Option::is_some)
    }
}

/// Reported locations joined on `(message id, segment index)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideTable {
    pub columns: Vec<String>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Drop rows where every reported value is missing; returns the number dropped.
    pub fn prune_empty_rows(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(WideRow::is_populated);
        before - self.rows.len()
    }

    /// Order rows by message identity, then numerically by segment index.
    ///
    /// Rows without a segment index sort before indexed rows of the same message.
    pub fn sort_by_message(&mut self) {
        self.rows.sort_by(|a, b| {
            a.message_id
                .cmp(&b.message_id)
                .then_with(|| a.segment_index.cmp(&b.segment_index))
        });
    }
}

impl From<LocationTable> for WideTable {
    fn from(table: LocationTable) -> Self {
        let rows = table
            .rows
            .into_iter()
            .map(|row| WideRow {
                message_id: row.message_id,
                segment_index: row.segment_index,
                values: vec![row.value],
            })
            .collect();
        Self {
            columns: vec![table.column],
            rows,
        }
    }
}

/// One row of the final report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TidyRow {
    /// Identity values, one per identity column
    pub ids: Vec<String>,

    /// Reported segment index; `None` for a message lacking the segment
    pub segment_index: Option<usize>,

    /// Reported values, one per report column
    pub values: Vec<Option<String>>,
}

/// Final report: identity columns, the segment column, then report columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TidyTable {
    pub columns: Vec<String>,
    pub identity_width: usize,
    pub rows: Vec<TidyRow>,
}

impl TidyTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Name of the segment index column; `None` if `columns` is too short
    pub fn segment_column(&self) -> Option<&str> {
        self.columns.get(self.identity_width).map(String::as_str)
    }

    /// Cell text at `(row, column)`.
    ///
    /// The outer `Option` is `None` when the row or column does not exist;
    /// the inner one is `None` for a missing value.
    pub fn cell(&self, row: usize, column: &str) -> Option<Option<String>> {
        let row = self.rows.get(row)?;
        let index = self.column_index(column)?;
        Some(row.cell(index, self.identity_width))
    }

    /// Flatten every row to text, writing `null_text` for missing values.
    pub fn to_records(&self, null_text: &str) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                (0..self.columns.len())
                    .map(|index| {
                        row.cell(index, self.identity_width)
                            .unwrap_or_else(|| null_text.to_string())
                    })
                    .collect()
            })
            .collect()
    }
}

impl TidyRow {
    fn cell(&self, index: usize, identity_width: usize) -> Option<String> {
        match index.cmp(&identity_width) {
            Ordering::Less => self.ids.get(index).cloned(),
            Ordering::Equal => self.segment_index.map(|i| i.to_string()),
            Ordering::Greater => self
                .values
                .get(index - identity_width - 1)
                .cloned()
                .flatten(),
        }
    }
}
