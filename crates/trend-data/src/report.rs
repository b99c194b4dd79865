//! Presentation surfaces derived from the aggregate table.
//!
//! The host application renders a chart keyed on (month, item, qty), shows a
//! wide per-item pivot, and offers the pivot as a download. Everything here
//! is pure data + CSV bytes; widget code and spreadsheet codecs stay outside
//! this workspace.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use trend_core::models::MonthItemAggregate;
use trend_core::months::month_abbr_checked;
use trend_core::{Result, TrendError};

// ── Chart points ──────────────────────────────────────────────────────────────

/// One bar / line-chart datum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Calendar month number, 1–12, for ordering the axis.
    pub month: u32,
    /// Calendar-order label (`"Jan"` … `"Dec"`), for the axis ticks.
    pub month_label: String,
    pub item: String,
    pub qty: f64,
}

/// Chart series for the aggregate table, preserving its calendar order.
pub fn chart_points(aggregates: &[MonthItemAggregate]) -> Result<Vec<ChartPoint>> {
    aggregates
        .iter()
        .map(|agg| {
            Ok(ChartPoint {
                month: agg.month,
                month_label: month_abbr_checked(agg.month)?.to_string(),
                item: agg.item.clone(),
                qty: agg.qty_sum,
            })
        })
        .collect()
}

// ── Pivot table ───────────────────────────────────────────────────────────────

/// One pivot row: an item with its per-month measures and row-wise totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotRow {
    pub item: String,
    /// Qty per month, parallel to [`PivotTable::months`]; 0 where the item
    /// had no transactions that month.
    pub qty_by_month: Vec<f64>,
    /// Amount per month, parallel to [`PivotTable::months`].
    pub amount_by_month: Vec<f64>,
    pub qty_total: f64,
    pub amount_total: f64,
}

/// The wide download shape: one row per item, one Qty and one Amount column
/// per month that occurs in the data, calendar-ordered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotTable {
    /// The months (1–12) present in the aggregate, ascending.
    pub months: Vec<u32>,
    /// Rows ordered by item, lexicographically.
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    /// Pivot an aggregate table into the wide per-item shape.
    pub fn build(aggregates: &[MonthItemAggregate]) -> Self {
        let months: Vec<u32> = aggregates
            .iter()
            .map(|a| a.month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let items: Vec<String> = aggregates
            .iter()
            .map(|a| a.item.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = items
            .into_iter()
            .map(|item| {
                let mut qty_by_month = vec![0.0; months.len()];
                let mut amount_by_month = vec![0.0; months.len()];
                for agg in aggregates.iter().filter(|a| a.item == item) {
                    // every aggregate month is in `months`
                    if let Some(pos) = months.iter().position(|m| *m == agg.month) {
                        qty_by_month[pos] += agg.qty_sum;
                        amount_by_month[pos] += agg.amount_sum;
                    }
                }
                let qty_total = qty_by_month.iter().sum();
                let amount_total = amount_by_month.iter().sum();
                PivotRow {
                    item,
                    qty_by_month,
                    amount_by_month,
                    qty_total,
                    amount_total,
                }
            })
            .collect();

        Self { months, rows }
    }

    /// CSV header: `Item`, `<Mon> Qty`…, `<Mon> Amount`…, `QtyTotal`,
    /// `AmountTotal`.
    pub fn headers(&self) -> Result<Vec<String>> {
        let mut headers = vec!["Item".to_string()];
        for month in &self.months {
            headers.push(format!("{} Qty", month_abbr_checked(*month)?));
        }
        for month in &self.months {
            headers.push(format!("{} Amount", month_abbr_checked(*month)?));
        }
        headers.push("QtyTotal".to_string());
        headers.push("AmountTotal".to_string());
        Ok(headers)
    }

    /// Serialize the pivot as CSV bytes for download.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(self.headers()?)
            .map_err(csv_export_err)?;

        for row in &self.rows {
            let mut record = vec![row.item.clone()];
            record.extend(row.qty_by_month.iter().map(|v| v.to_string()));
            record.extend(row.amount_by_month.iter().map(|v| v.to_string()));
            record.push(row.qty_total.to_string());
            record.push(row.amount_total.to_string());
            writer.write_record(record).map_err(csv_export_err)?;
        }

        writer
            .into_inner()
            .map_err(|e| TrendError::CsvExport(e.to_string()))
    }
}

// ── Long-form CSV ─────────────────────────────────────────────────────────────

/// Serialize the aggregate table itself as long-form CSV
/// (`Month, Item, Qty, Amount[, Rate]`). `include_rate` adds the Rate column;
/// groups without a rate sum leave it blank.
pub fn aggregates_to_csv_bytes(
    aggregates: &[MonthItemAggregate],
    include_rate: bool,
) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut headers = vec!["Month", "Item", "Qty", "Amount"];
    if include_rate {
        headers.push("Rate");
    }
    writer.write_record(&headers).map_err(csv_export_err)?;

    for agg in aggregates {
        let mut record = vec![
            month_abbr_checked(agg.month)?.to_string(),
            agg.item.clone(),
            agg.qty_sum.to_string(),
            agg.amount_sum.to_string(),
        ];
        if include_rate {
            record.push(agg.rate_sum.map(|r| r.to_string()).unwrap_or_default());
        }
        writer.write_record(record).map_err(csv_export_err)?;
    }

    writer
        .into_inner()
        .map_err(|e| TrendError::CsvExport(e.to_string()))
}

fn csv_export_err(e: csv::Error) -> TrendError {
    TrendError::CsvExport(e.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(month: u32, item: &str, qty: f64, amount: f64) -> MonthItemAggregate {
        MonthItemAggregate {
            month,
            item: item.to_string(),
            qty_sum: qty,
            amount_sum: amount,
            rate_sum: None,
        }
    }

    fn sample_aggregates() -> Vec<MonthItemAggregate> {
        vec![
            agg(3, "Gear", 4.0, 80.0),
            agg(3, "Widget", 15.0, 150.0),
            agg(11, "Widget", 2.0, 20.0),
        ]
    }

    // ── chart_points ──────────────────────────────────────────────────────────

    #[test]
    fn test_chart_points_carry_calendar_labels() {
        let points = chart_points(&sample_aggregates()).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].month_label, "Mar");
        assert_eq!(points[2].month_label, "Nov");
        assert_eq!(points[2].qty, 2.0);
    }

    #[test]
    fn test_chart_points_preserve_order() {
        let points = chart_points(&sample_aggregates()).unwrap();
        let months: Vec<u32> = points.iter().map(|p| p.month).collect();
        assert_eq!(months, vec![3, 3, 11]);
    }

    #[test]
    fn test_chart_points_empty() {
        assert!(chart_points(&[]).unwrap().is_empty());
    }

    // ── PivotTable ────────────────────────────────────────────────────────────

    #[test]
    fn test_pivot_only_present_months() {
        let pivot = PivotTable::build(&sample_aggregates());
        assert_eq!(pivot.months, vec![3, 11]);
    }

    #[test]
    fn test_pivot_rows_per_item_with_totals() {
        let pivot = PivotTable::build(&sample_aggregates());
        assert_eq!(pivot.rows.len(), 2);

        let gear = &pivot.rows[0];
        assert_eq!(gear.item, "Gear");
        assert_eq!(gear.qty_by_month, vec![4.0, 0.0]);
        assert_eq!(gear.qty_total, 4.0);

        let widget = &pivot.rows[1];
        assert_eq!(widget.item, "Widget");
        assert_eq!(widget.qty_by_month, vec![15.0, 2.0]);
        assert_eq!(widget.amount_by_month, vec![150.0, 20.0]);
        assert_eq!(widget.qty_total, 17.0);
        assert_eq!(widget.amount_total, 170.0);
    }

    #[test]
    fn test_pivot_headers_calendar_order() {
        let pivot = PivotTable::build(&sample_aggregates());
        let headers = pivot.headers().unwrap();
        assert_eq!(
            headers,
            vec![
                "Item",
                "Mar Qty",
                "Nov Qty",
                "Mar Amount",
                "Nov Amount",
                "QtyTotal",
                "AmountTotal",
            ]
        );
    }

    #[test]
    fn test_pivot_empty_aggregates() {
        let pivot = PivotTable::build(&[]);
        assert!(pivot.months.is_empty());
        assert!(pivot.rows.is_empty());
        assert_eq!(pivot.headers().unwrap(), vec!["Item", "QtyTotal", "AmountTotal"]);
    }

    #[test]
    fn test_pivot_csv_bytes() {
        let pivot = PivotTable::build(&sample_aggregates());
        let bytes = pivot.to_csv_bytes().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Item,Mar Qty,Nov Qty,Mar Amount,Nov Amount,QtyTotal,AmountTotal"
        );
        assert_eq!(lines.next().unwrap(), "Gear,4,0,80,0,4,80");
        assert_eq!(lines.next().unwrap(), "Widget,15,2,150,20,17,170");
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_pivot_csv_round_trips_through_a_file() {
        let pivot = PivotTable::build(&sample_aggregates());
        let bytes = pivot.to_csv_bytes().unwrap();

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pivot.csv");
        std::fs::write(&path, &bytes).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[1][0], "Widget");
    }

    // ── aggregates_to_csv_bytes ───────────────────────────────────────────────

    #[test]
    fn test_long_form_csv_without_rate() {
        let bytes = aggregates_to_csv_bytes(&sample_aggregates(), false).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "Month,Item,Qty,Amount");
        assert_eq!(lines.next().unwrap(), "Mar,Gear,4,80");
    }

    #[test]
    fn test_long_form_csv_with_rate_blank_when_absent() {
        let mut aggs = sample_aggregates();
        aggs[0].rate_sum = Some(12.5);
        let bytes = aggregates_to_csv_bytes(&aggs, true).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Month,Item,Qty,Amount,Rate");
        assert_eq!(lines[1], "Mar,Gear,4,80,12.5");
        // No rate sum for this group: trailing field left empty.
        assert_eq!(lines[2], "Mar,Widget,15,150,");
    }
}
