//! Application-layer glue for the sales-trend pipeline.
//!
//! Wires the normalizer and aggregator into a single call with run metadata,
//! and provides the content-addressed caches the host application uses to
//! avoid re-cleaning an upload on every filter change.

pub mod cache;
pub mod pipeline;

pub use trend_core as core;
pub use trend_data as data;
