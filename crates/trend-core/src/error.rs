use thiserror::Error;

/// All errors produced by the sales-trend crates.
#[derive(Error, Debug)]
pub enum TrendError {
    /// The extract's column count does not match the layout descriptor.
    ///
    /// Fatal for the whole file: no partial result is produced.
    #[error("Schema mismatch: extract has {found} columns after header skip, layout expects {expected}")]
    SchemaMismatch { expected: usize, found: usize },

    /// A canonical column name required by the pipeline is absent from the
    /// layout descriptor. This is a configuration fault, not a data fault.
    #[error("Layout is missing required column: {0}")]
    MissingColumn(String),

    /// A report-type string did not match any registered layout.
    #[error("Unknown report type: {0}")]
    UnknownReportType(String),

    /// A month number outside the 1–12 calendar range.
    #[error("Invalid month number: {0}")]
    InvalidMonth(u32),

    /// CSV serialization of an export surface failed.
    #[error("CSV export failed: {0}")]
    CsvExport(String),

    /// Pass-through for raw I/O errors from export helpers.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convenience alias used throughout the sales-trend crates.
pub type Result<T> = std::result::Result<T, TrendError>;
