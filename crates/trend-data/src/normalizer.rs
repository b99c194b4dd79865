//! Raw-extract cleaning: the first half of the pipeline.
//!
//! Takes the untyped rows of a spreadsheet export plus a layout descriptor
//! and produces typed [`TransactionRow`]s. Structural problems (wrong column
//! count, misconfigured layout) abort with an error; per-row data problems
//! are absorbed by dropping the row and counting it.

use tracing::debug;
use trend_core::cells::{DateParser, NumericParser};
use trend_core::models::{columns, Cell, LayoutDescriptor, RawExtract, TransactionRow};
use trend_core::{Result, TrendError};

// ── NormalizedTable ───────────────────────────────────────────────────────────

/// The normalizer's output: retained rows plus drop diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTable {
    /// Rows that satisfied every field requirement.
    pub rows: Vec<TransactionRow>,
    /// Data rows inspected (extract rows after the header skip).
    pub rows_read: usize,
    /// Rows discarded for a blank or unparsable required field.
    pub rows_dropped: usize,
}

impl NormalizedTable {
    /// Sorted, de-duplicated item identifiers — the host's filter options.
    pub fn items(&self) -> Vec<String> {
        let mut items: Vec<String> = self.rows.iter().map(|r| r.item.clone()).collect();
        items.sort();
        items.dedup();
        items
    }
}

// ── Column bindings ───────────────────────────────────────────────────────────

/// Resolved positional indices for the fields the pipeline consumes.
struct ColumnBindings {
    doc_date: usize,
    item: usize,
    qty: usize,
    amount: usize,
    rate: Option<usize>,
}

impl ColumnBindings {
    fn resolve(layout: &LayoutDescriptor) -> Result<Self> {
        let index = |name: &str| {
            layout
                .column_index(name)
                .ok_or_else(|| TrendError::MissingColumn(name.to_string()))
        };
        Ok(Self {
            doc_date: index(columns::DOC_DATE)?,
            item: index(columns::ITEM)?,
            qty: index(columns::QTY)?,
            amount: index(columns::AMOUNT)?,
            rate: if layout.include_rate {
                Some(index(columns::RATE)?)
            } else {
                None
            },
        })
    }
}

// ── normalize ─────────────────────────────────────────────────────────────────

/// Clean a raw extract into a typed transaction table.
///
/// 1. Discard the first `layout.header_skip` rows unconditionally.
/// 2. Verify the remaining column count against `layout.column_names`
///    (the extract width is the widest remaining row; decoders trim trailing
///    blanks per row, so short rows are padded with blanks, not rejected).
/// 3. For each remaining row, parse DocDate, Item, Qty, Amount (and Rate
///    when the layout enables it); drop the row when any of them is blank
///    or unparsable.
///
/// An extract that is empty after the header skip yields an empty table.
pub fn normalize(raw: &RawExtract, layout: &LayoutDescriptor) -> Result<NormalizedTable> {
    let skip = layout.header_skip.min(raw.rows.len());
    let data_rows = &raw.rows[skip..];

    if data_rows.is_empty() {
        return Ok(NormalizedTable::default());
    }

    let width = data_rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let expected = layout.column_names.len();
    if width != expected {
        return Err(TrendError::SchemaMismatch {
            expected,
            found: width,
        });
    }

    let bindings = ColumnBindings::resolve(layout)?;

    let mut table = NormalizedTable {
        rows_read: data_rows.len(),
        ..NormalizedTable::default()
    };

    for row in data_rows {
        match parse_row(row, &bindings) {
            Some(txn) => table.rows.push(txn),
            None => table.rows_dropped += 1,
        }
    }

    debug!(
        rows_read = table.rows_read,
        rows_kept = table.rows.len(),
        rows_dropped = table.rows_dropped,
        "extract normalized"
    );

    Ok(table)
}

// ── Private helpers ───────────────────────────────────────────────────────────

static EMPTY_CELL: Cell = Cell::Empty;

/// Cell at `idx`, treating a missing trailing cell as blank.
fn cell_at(row: &[Cell], idx: usize) -> &Cell {
    row.get(idx).unwrap_or(&EMPTY_CELL)
}

/// Item identifiers are text in well-formed exports, but some extracts
/// carry purely numeric codes; render those as their decimal form.
fn parse_item(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Cell::Number(n) => Some(format!("{}", n)),
        _ => None,
    }
}

/// Parse one data row; `None` means "drop and count".
fn parse_row(row: &[Cell], bindings: &ColumnBindings) -> Option<TransactionRow> {
    let doc_date = DateParser::parse(cell_at(row, bindings.doc_date))?;
    let item = parse_item(cell_at(row, bindings.item))?;
    let qty = NumericParser::parse(cell_at(row, bindings.qty))?;
    let amount = NumericParser::parse(cell_at(row, bindings.amount))?;

    let rate = match bindings.rate {
        // With the rate column enabled an unparsable rate drops the row.
        Some(idx) => Some(NumericParser::parse(cell_at(row, idx))?),
        None => None,
    };

    Some(TransactionRow {
        doc_date,
        item,
        qty,
        amount,
        rate,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
