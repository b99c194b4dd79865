//! The full upload-to-aggregate pipeline.
//!
//! Normalizes a raw extract, optionally restricts it to an item selection,
//! aggregates, and returns everything the host UI needs in one value:
//! the cleaned rows, the aggregate table, the distinct item list for the
//! filter widget, and run metadata with the drop diagnostics.

use std::collections::HashSet;

use chrono::Utc;
use tracing::debug;
use trend_core::models::{MeasureSet, MonthItemAggregate, RawExtract, TransactionRow};
use trend_core::Result;
use trend_data::aggregator::TrendAggregator;
use trend_data::layouts::ReportType;
use trend_data::normalizer::normalize;

// ── Public types ──────────────────────────────────────────────────────────────

/// Diagnostics produced alongside a pipeline run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PipelineMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// The report type the extract was interpreted as.
    pub report_type: ReportType,
    /// Extract rows inspected after the header skip.
    pub rows_read: usize,
    /// Rows that survived normalization.
    pub rows_kept: usize,
    /// Rows discarded for missing or unparsable required fields.
    pub rows_dropped: usize,
    /// `(month, item)` groups in the aggregate output.
    pub groups_created: usize,
    /// Wall-clock seconds spent normalizing.
    pub normalize_time_seconds: f64,
    /// Wall-clock seconds spent filtering + aggregating.
    pub aggregate_time_seconds: f64,
}

/// The complete output of [`run_pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// The cleaned transaction table (unfiltered).
    pub rows: Vec<TransactionRow>,
    /// The aggregate of the (possibly filtered) rows.
    pub aggregates: Vec<MonthItemAggregate>,
    /// Sorted distinct item names — the host's multiselect options.
    pub items: Vec<String>,
    /// Run diagnostics.
    pub metadata: PipelineMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// The measures a report type can meaningfully sum: all three when its
/// layout carries a rate column, qty + amount otherwise.
pub fn default_measures(report_type: ReportType) -> MeasureSet {
    if report_type.descriptor().include_rate {
        MeasureSet::all()
    } else {
        MeasureSet::default()
    }
}

/// Run the full pipeline over one uploaded extract.
///
/// `selection` distinguishes the two filter states: `None` means "no filter"
/// (aggregate everything), `Some(set)` restricts to the named items — and an
/// empty set is a valid state that yields an empty aggregate.
///
/// Structural faults (schema mismatch, bad layout) propagate as errors;
/// per-row data faults surface only as `rows_dropped` in the metadata.
pub fn run_pipeline(
    raw: &RawExtract,
    report_type: ReportType,
    selection: Option<&HashSet<String>>,
    measures: &MeasureSet,
) -> Result<PipelineResult> {
    let layout = report_type.descriptor();

    let normalize_start = std::time::Instant::now();
    let table = normalize(raw, &layout)?;
    let normalize_time = normalize_start.elapsed().as_secs_f64();

    let aggregate_start = std::time::Instant::now();
    let aggregates = match selection {
        Some(items) => TrendAggregator::aggregate_filtered(&table.rows, items, measures),
        None => TrendAggregator::aggregate(&table.rows, measures),
    };
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    debug!(
        report_type = %report_type,
        rows_kept = table.rows.len(),
        rows_dropped = table.rows_dropped,
        groups = aggregates.len(),
        "pipeline run complete"
    );

    let metadata = PipelineMetadata {
        generated_at: Utc::now().to_rfc3339(),
        report_type,
        rows_read: table.rows_read,
        rows_kept: table.rows.len(),
        rows_dropped: table.rows_dropped,
        groups_created: aggregates.len(),
        normalize_time_seconds: normalize_time,
        aggregate_time_seconds: aggregate_time,
    };

    let items = table.items();

    Ok(PipelineResult {
        rows: table.rows,
        aggregates,
        items,
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
