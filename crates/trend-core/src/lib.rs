//! Core domain layer for the sales-trend pipeline.
//!
//! Holds the tabular data model shared by every other crate, the coercion
//! helpers that turn untyped spreadsheet cells into typed values, the
//! calendar-order month table, and the workspace-wide error taxonomy.
//! Everything here is a pure in-memory transform with no I/O.

pub mod cells;
pub mod error;
pub mod models;
pub mod months;

pub use error::{Result, TrendError};
