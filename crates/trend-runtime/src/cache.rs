//! Content-addressed memoization for the two pipeline stages.
//!
//! The host application re-runs the pipeline on every widget interaction;
//! this cache makes those re-runs cheap. Normalized tables are keyed by the
//! extract's content fingerprint plus the report type (the normalizer runs
//! once per upload), aggregates by the table fingerprint plus the selection
//! and measure set (the aggregator runs once per filter change). Purely
//! in-memory; the transforms themselves stay pure and repeatable.

use std::collections::hash_map::{DefaultHasher, Entry};
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use chrono::Datelike;
use tracing::debug;
use trend_core::models::{Cell, MeasureSet, MonthItemAggregate, RawExtract, TransactionRow};
use trend_core::Result;
use trend_data::aggregator::TrendAggregator;
use trend_data::layouts::ReportType;
use trend_data::normalizer::{normalize, NormalizedTable};

// ── Fingerprints ──────────────────────────────────────────────────────────────

/// Content fingerprint of a raw extract.
///
/// Identical extracts always collide; distinct extracts practically never do
/// for the single-upload working set this cache serves.
pub fn fingerprint_extract(raw: &RawExtract) -> u64 {
    let mut hasher = DefaultHasher::new();
    raw.rows.len().hash(&mut hasher);
    for row in &raw.rows {
        row.len().hash(&mut hasher);
        for cell in row {
            hash_cell(&mut hasher, cell);
        }
    }
    hasher.finish()
}

/// Content fingerprint of a normalized table.
pub fn fingerprint_table(table: &NormalizedTable) -> u64 {
    let mut hasher = DefaultHasher::new();
    table.rows.len().hash(&mut hasher);
    for row in &table.rows {
        hash_transaction(&mut hasher, row);
    }
    hasher.finish()
}

fn hash_cell(hasher: &mut impl Hasher, cell: &Cell) {
    match cell {
        Cell::Empty => 0u8.hash(hasher),
        Cell::Text(s) => {
            1u8.hash(hasher);
            s.hash(hasher);
        }
        Cell::Number(n) => {
            2u8.hash(hasher);
            n.to_bits().hash(hasher);
        }
        Cell::Date(dt) => {
            3u8.hash(hasher);
            dt.and_utc().timestamp().hash(hasher);
        }
        Cell::Bool(b) => {
            4u8.hash(hasher);
            b.hash(hasher);
        }
    }
}

fn hash_transaction(hasher: &mut impl Hasher, row: &TransactionRow) {
    row.doc_date.year().hash(hasher);
    row.doc_date.ordinal().hash(hasher);
    row.item.hash(hasher);
    row.qty.to_bits().hash(hasher);
    row.amount.to_bits().hash(hasher);
    row.rate.map(f64::to_bits).hash(hasher);
}

// ── Cache keys ────────────────────────────────────────────────────────────────

/// Key for one aggregation: table contents + filter state + measures.
///
/// The selection is sorted so that set iteration order cannot split one
/// logical selection across two entries; `None` is the "no filter" state,
/// distinct from `Some(empty)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AggregateKey {
    table: u64,
    selection: Option<Vec<String>>,
    measures: u8,
}

impl AggregateKey {
    fn new(table: u64, selection: Option<&HashSet<String>>, measures: &MeasureSet) -> Self {
        let selection = selection.map(|set| {
            let mut items: Vec<String> = set.iter().cloned().collect();
            items.sort();
            items
        });
        Self {
            table,
            selection,
            measures: measures.bits(),
        }
    }
}

// ── PipelineCache ─────────────────────────────────────────────────────────────

/// Memoizes normalized tables and aggregate tables by content identity.
#[derive(Debug, Default)]
pub struct PipelineCache {
    normalized: HashMap<(u64, ReportType), NormalizedTable>,
    aggregated: HashMap<AggregateKey, Vec<MonthItemAggregate>>,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `raw` for `report_type`, reusing a previous result when the
    /// extract contents are identical. Errors are not cached: a schema
    /// mismatch propagates every time it is attempted.
    pub fn normalized(
        &mut self,
        raw: &RawExtract,
        report_type: ReportType,
    ) -> Result<&NormalizedTable> {
        let key = (fingerprint_extract(raw), report_type);
        match self.normalized.entry(key) {
            Entry::Occupied(entry) => {
                debug!(fingerprint = key.0, %report_type, "normalize cache hit");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                debug!(fingerprint = key.0, %report_type, "normalize cache miss");
                let table = normalize(raw, &report_type.descriptor())?;
                Ok(entry.insert(table))
            }
        }
    }

    /// Aggregate `table`, reusing a previous result for the same contents,
    /// selection and measure set.
    pub fn aggregated(
        &mut self,
        table: &NormalizedTable,
        selection: Option<&HashSet<String>>,
        measures: &MeasureSet,
    ) -> &[MonthItemAggregate] {
        let key = AggregateKey::new(fingerprint_table(table), selection, measures);
        match self.aggregated.entry(key) {
            Entry::Occupied(entry) => {
                debug!("aggregate cache hit");
                entry.into_mut()
            }
            Entry::Vacant(entry) => {
                debug!("aggregate cache miss");
                let aggregates = match selection {
                    Some(items) => {
                        TrendAggregator::aggregate_filtered(&table.rows, items, measures)
                    }
                    None => TrendAggregator::aggregate(&table.rows, measures),
                };
                entry.insert(aggregates)
            }
        }
    }

    /// Discard everything, e.g. when the host replaces the uploaded file.
    pub fn invalidate(&mut self) {
        self.normalized.clear();
        self.aggregated.clear();
        debug!("pipeline cache invalidated");
    }

    /// `(normalized entries, aggregated entries)` currently held.
    pub fn entry_counts(&self) -> (usize, usize) {
        (self.normalized.len(), self.aggregated.len())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
