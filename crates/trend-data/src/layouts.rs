//! Fixed registry of report-type layouts.
//!
//! Each supported export format maps to one [`LayoutDescriptor`]; the host
//! application's report-type selector resolves to a [`ReportType`] and the
//! single parameterized normalizer does the rest. Earlier revisions of this
//! pipeline carried one copy-pasted cleaning function per format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use trend_core::models::LayoutDescriptor;
use trend_core::{Result, TrendError};

/// The report formats the pipeline knows how to normalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    /// The full demand register: four title rows, eleven columns. The Rate
    /// column exists in the file but is not carried as a measure.
    DemandTrend,
    /// The condensed per-product export: two title rows, six columns,
    /// Rate carried as a measure.
    ProductTrend,
}

impl ReportType {
    /// Every registered report type, in selector display order.
    pub fn all() -> &'static [ReportType] {
        &[ReportType::DemandTrend, ReportType::ProductTrend]
    }

    /// The layout descriptor for this report type.
    pub fn descriptor(&self) -> LayoutDescriptor {
        match self {
            ReportType::DemandTrend => LayoutDescriptor {
                header_skip: 4,
                column_names: [
                    "DocDate", "DocType", "DocNo", "PRDORDNO", "Code", "Item", "Store", "Qty",
                    "Unit", "Rate", "Amount",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                include_rate: false,
            },
            ReportType::ProductTrend => LayoutDescriptor {
                header_skip: 2,
                column_names: ["DocDate", "DocNo", "Item", "Qty", "Rate", "Amount"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                include_rate: true,
            },
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportType::DemandTrend => write!(f, "DemandTrend"),
            ReportType::ProductTrend => write!(f, "ProductTrend"),
        }
    }
}

impl FromStr for ReportType {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "DemandTrend" => Ok(ReportType::DemandTrend),
            "ProductTrend" => Ok(ReportType::ProductTrend),
            other => Err(TrendError::UnknownReportType(other.to_string())),
        }
    }
}
