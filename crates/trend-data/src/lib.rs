//! Transform layer for the sales-trend pipeline.
//!
//! Responsible for turning a raw spreadsheet extract into a typed transaction
//! table (the normalizer), folding that table into monthly per-item aggregates
//! (the aggregator), and deriving the presentation surfaces the host UI
//! consumes: chart points, the wide pivot table, and CSV export bytes.

pub mod aggregator;
pub mod layouts;
pub mod normalizer;
pub mod report;

pub use trend_core as core;
