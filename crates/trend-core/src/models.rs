use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One untyped spreadsheet cell, as produced by a spreadsheet decoder.
///
/// The decoder itself lives outside this workspace; this enum is the neutral
/// hand-off shape it fills in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Cell {
    /// A blank / missing cell.
    Empty,
    /// A textual cell, possibly blank or whitespace-only.
    Text(String),
    /// A numeric cell, including numbers that are really Excel date serials.
    Number(f64),
    /// A native date or date-time cell.
    Date(NaiveDateTime),
    /// A boolean cell.
    Bool(bool),
}

impl Cell {
    /// `true` for cells that carry no usable value: `Empty` and blank text.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// A raw spreadsheet-derived table before any cleaning.
///
/// Rows are ordered as they appeared in the file; no schema is assumed beyond
/// the caller knowing how many leading rows are report titles / metadata.
/// The extract is immutable once produced — the normalizer never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExtract {
    pub rows: Vec<Vec<Cell>>,
}

impl RawExtract {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// How to interpret a [`RawExtract`] of a particular report format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutDescriptor {
    /// Number of leading title / metadata rows to discard unconditionally.
    pub header_skip: usize,
    /// Canonical names assigned positionally to the remaining columns.
    /// Length must equal the remaining column count of the extract.
    pub column_names: Vec<String>,
    /// Whether the Rate measure column is present and should be parsed.
    pub include_rate: bool,
}

impl LayoutDescriptor {
    /// Positional index of a canonical column name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }
}

/// Canonical column names the normalizer resolves against a layout.
pub mod columns {
    pub const DOC_DATE: &str = "DocDate";
    pub const ITEM: &str = "Item";
    pub const QTY: &str = "Qty";
    pub const AMOUNT: &str = "Amount";
    pub const RATE: &str = "Rate";
}

/// One cleaned transaction line.
///
/// Invariant: `doc_date`, `item`, `qty` and `amount` are always valid —
/// rows that could not satisfy this were dropped during normalization.
/// `rate` is `Some` iff the layout enabled it and the cell parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub doc_date: NaiveDate,
    pub item: String,
    pub qty: f64,
    pub amount: f64,
    pub rate: Option<f64>,
}

impl TransactionRow {
    /// Calendar month number (1–12) of the document date.
    pub fn month(&self) -> u32 {
        self.doc_date.month()
    }
}

/// Summed measures for one `(month, item)` group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthItemAggregate {
    /// Calendar month number, 1–12.
    pub month: u32,
    pub item: String,
    pub qty_sum: f64,
    pub amount_sum: f64,
    /// `Some` iff rate was a requested measure and at least one row in the
    /// group carried a rate value.
    pub rate_sum: Option<f64>,
}

/// Which measures the aggregator should sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureSet {
    pub qty: bool,
    pub amount: bool,
    pub rate: bool,
}

impl Default for MeasureSet {
    /// Qty and Amount; Rate stays off unless the layout provides it.
    fn default() -> Self {
        Self {
            qty: true,
            amount: true,
            rate: false,
        }
    }
}

impl MeasureSet {
    /// All three measures, for rate-bearing report types.
    pub fn all() -> Self {
        Self {
            qty: true,
            amount: true,
            rate: true,
        }
    }

    /// Compact bit encoding, used as part of cache keys.
    pub fn bits(&self) -> u8 {
        (self.qty as u8) | (self.amount as u8) << 1 | (self.rate as u8) << 2
    }
}
