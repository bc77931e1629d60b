/// Data layer: core types, remote loading, and schema adaptation.
///
/// Architecture:
/// ```text
///  remote CSV (bounded by row limit)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → CaseTable, cached per row limit
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ CaseTable │  lower-cased columns, typed cells
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  adapter  │  to_date → ds, count_new_cases → y
///   └──────────┘
/// ```
pub mod adapter;
pub mod loader;
pub mod model;

use thiserror::Error;

/// Failures while obtaining or reshaping the historical series.
#[derive(Debug, Error)]
pub enum DataError {
    /// Remote fetch failed or the payload was unparseable.
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    /// The row limit must be a positive integer.
    #[error("row limit must be a positive integer, got {0}")]
    InvalidRowLimit(u32),

    /// An expected column is absent after loading.
    #[error("expected column '{column}' is missing from the loaded data")]
    SchemaMismatch { column: String },
}
