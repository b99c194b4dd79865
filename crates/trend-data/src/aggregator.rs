//! Month/item aggregation: the second half of the pipeline.
//!
//! Folds normalized transaction rows into one [`MonthItemAggregate`] per
//! `(month, item)` key. Every call is a pure function of its inputs; the
//! filtered variant re-aggregates an item subset without shared state.

use std::collections::{BTreeMap, HashSet};

use trend_core::models::{MeasureSet, MonthItemAggregate, TransactionRow};

// ── AggregateTotals ───────────────────────────────────────────────────────────

/// Cross-group measure sums, for totals rows and conservation checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateTotals {
    pub qty: f64,
    pub amount: f64,
    pub rate: Option<f64>,
    /// Number of `(month, item)` groups that contributed.
    pub groups: usize,
}

// ── TrendAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that groups transaction rows by `(month, item)`.
pub struct TrendAggregator;

impl TrendAggregator {
    /// Aggregate `rows`, summing each measure requested in `measures`.
    ///
    /// Groups with no rows never appear (no zero-filled gaps). Output is
    /// deterministically ordered: ascending month (1–12), then item
    /// lexicographically — the BTreeMap key order.
    pub fn aggregate(rows: &[TransactionRow], measures: &MeasureSet) -> Vec<MonthItemAggregate> {
        let mut map: BTreeMap<(u32, String), MonthItemAggregate> = BTreeMap::new();

        for row in rows {
            let key = (row.month(), row.item.clone());
            let agg = map.entry(key).or_insert_with(|| MonthItemAggregate {
                month: row.month(),
                item: row.item.clone(),
                qty_sum: 0.0,
                amount_sum: 0.0,
                rate_sum: None,
            });

            if measures.qty {
                agg.qty_sum += row.qty;
            }
            if measures.amount {
                agg.amount_sum += row.amount;
            }
            if measures.rate {
                if let Some(rate) = row.rate {
                    *agg.rate_sum.get_or_insert(0.0) += rate;
                }
            }
        }

        map.into_values().collect()
    }

    /// Restrict `rows` to items in `item_selection`, then aggregate.
    ///
    /// An empty selection yields an empty aggregate — it is the "nothing
    /// selected" state, not "no filter". Callers expressing "no filter"
    /// should call [`TrendAggregator::aggregate`] directly.
    pub fn aggregate_filtered(
        rows: &[TransactionRow],
        item_selection: &HashSet<String>,
        measures: &MeasureSet,
    ) -> Vec<MonthItemAggregate> {
        let selected: Vec<TransactionRow> = rows
            .iter()
            .filter(|r| item_selection.contains(&r.item))
            .cloned()
            .collect();
        Self::aggregate(&selected, measures)
    }

    /// Sum measures across all groups into a single [`AggregateTotals`].
    pub fn calculate_totals(aggregates: &[MonthItemAggregate]) -> AggregateTotals {
        let mut totals = AggregateTotals {
            groups: aggregates.len(),
            ..AggregateTotals::default()
        };
        for agg in aggregates {
            totals.qty += agg.qty_sum;
            totals.amount += agg.amount_sum;
            if let Some(rate) = agg.rate_sum {
                *totals.rate.get_or_insert(0.0) += rate;
            }
        }
        totals
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
