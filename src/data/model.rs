use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// FieldValue – a single cell in the loaded table
// ---------------------------------------------------------------------------

/// Engine input column holding the observation date.
pub const DS_COLUMN: &str = "ds";
/// Engine input column holding the observed value.
pub const Y_COLUMN: &str = "y";
/// Saturation upper bound attached for logistic growth.
pub const CAP_COLUMN: &str = "cap";
/// Saturation lower bound attached for logistic growth.
pub const FLOOR_COLUMN: &str = "floor";

/// A dynamically-typed cell value mirroring the source CSV's dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v:.2}"),
            FieldValue::Date(d) => write!(f, "{d}"),
            FieldValue::Null => write!(f, "<null>"),
        }
    }
}

impl FieldValue {
    /// Try to interpret the value as an `f64` for fitting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to interpret the value as a calendar date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// CaseTable – the loaded historical series
// ---------------------------------------------------------------------------

/// The loaded tabular dataset: ordered column names plus one map per row.
///
/// Column names are lower-cased at load time; `rows` preserves source order.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseTable {
    /// Ordered, lower-cased header names.
    pub columns: Vec<String>,
    /// One record per source row, column name → value.
    pub rows: Vec<BTreeMap<String, FieldValue>>,
}

impl CaseTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a column of this name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Rename a column in the header and in every row.
    ///
    /// Returns `false` when the source column does not exist (the table is
    /// left untouched in that case).
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        let Some(pos) = self.columns.iter().position(|c| c == from) else {
            return false;
        };
        self.columns[pos] = to.to_string();
        for row in &mut self.rows {
            if let Some(value) = row.remove(from) {
                row.insert(to.to_string(), value);
            }
        }
        true
    }

    /// Insert a column holding the same value in every row.
    ///
    /// An existing column of the same name is overwritten.
    pub fn set_uniform_column(&mut self, name: &str, value: FieldValue) {
        if !self.has_column(name) {
            self.columns.push(name.to_string());
        }
        for row in &mut self.rows {
            row.insert(name.to_string(), value.clone());
        }
    }
}

// ---------------------------------------------------------------------------
// AdaptedSeries – the engine-facing view of the table
// ---------------------------------------------------------------------------

/// A [`CaseTable`] renamed to the engine's input contract (`ds`, `y`).
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptedSeries {
    pub table: CaseTable,
}

impl AdaptedSeries {
    /// The `ds` column as dates, in row order.
    ///
    /// A row without a parseable date makes the whole series unusable, so
    /// the first offender is reported rather than skipped.
    pub fn dates(&self) -> Result<Vec<NaiveDate>, String> {
        self.table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.get(DS_COLUMN)
                    .and_then(FieldValue::as_date)
                    .ok_or_else(|| format!("row {i} has no valid '{DS_COLUMN}' date"))
            })
            .collect()
    }

    /// The `y` column as floats, in row order.
    ///
    /// Non-numeric cells become NaN so the engine's finite-value check can
    /// report them.
    pub fn values(&self) -> Vec<f64> {
        self.table
            .rows
            .iter()
            .map(|row| {
                row.get(Y_COLUMN)
                    .and_then(FieldValue::as_f64)
                    .unwrap_or(f64::NAN)
            })
            .collect()
    }

    /// Attach uniform `cap` / `floor` columns to every row.
    pub fn attach_bounds(&mut self, cap: f64, floor: f64) {
        self.table
            .set_uniform_column(CAP_COLUMN, FieldValue::Float(cap));
        self.table
            .set_uniform_column(FLOOR_COLUMN, FieldValue::Float(floor));
    }

    /// The attached saturation bounds, if any row carries them.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let row = self.table.rows.first()?;
        let cap = row.get(CAP_COLUMN)?.as_f64()?;
        let floor = row.get(FLOOR_COLUMN)?.as_f64()?;
        Some((cap, floor))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Whether the series has no rows.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
