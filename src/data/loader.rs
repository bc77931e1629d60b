use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;

use super::model::{CaseTable, FieldValue};
use super::DataError;

// ---------------------------------------------------------------------------
// Remote source
// ---------------------------------------------------------------------------

/// Fixed location of the historical case-workload CSV.
pub const DATA_URL: &str =
    "https://raw.githubusercontent.com/ajacks04/streamlit/master/data/all_cases_online.csv";

/// Source column holding the observation date, parsed at load time.
pub const DATE_COLUMN: &str = "to_date";

/// Accepted layouts for the date column.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// A source of historical case data, bounded by a row limit.
pub trait CaseSource {
    fn fetch(&self, row_limit: u32) -> Result<CaseTable, DataError>;
}

/// Fetches the case CSV over HTTP and parses it into a [`CaseTable`].
pub struct RemoteCsvSource {
    url: String,
}

impl RemoteCsvSource {
    pub fn new() -> Self {
        Self::with_url(DATA_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for RemoteCsvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseSource for RemoteCsvSource {
    fn fetch(&self, row_limit: u32) -> Result<CaseTable, DataError> {
        let body = reqwest::blocking::get(&self.url)
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(|e| DataError::Unavailable(e.to_string()))?;
        parse_csv(&body, row_limit)
    }
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// Parse CSV text into a [`CaseTable`], keeping at most `row_limit` records.
///
/// Header names are lower-cased; the [`DATE_COLUMN`] cells are parsed into
/// dates, every other cell is typed by inference.
pub fn parse_csv(text: &str, row_limit: u32) -> Result<CaseTable, DataError> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| DataError::Unavailable(format!("unreadable CSV header: {e}")))?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().take(row_limit as usize).enumerate() {
        let record =
            result.map_err(|e| DataError::Unavailable(format!("CSV row {row_no}: {e}")))?;

        let mut row = BTreeMap::new();
        for (idx, cell) in record.iter().enumerate() {
            let Some(name) = columns.get(idx) else {
                continue;
            };
            let value = if name == DATE_COLUMN {
                FieldValue::Date(parse_date(cell, row_no)?)
            } else {
                infer_value(cell)
            };
            row.insert(name.clone(), value);
        }
        rows.push(row);
    }

    Ok(CaseTable { columns, rows })
}

fn parse_date(cell: &str, row_no: usize) -> Result<NaiveDate, DataError> {
    let cell = cell.trim();
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cell, fmt) {
            return Ok(date);
        }
    }
    Err(DataError::Unavailable(format!(
        "CSV row {row_no}: '{cell}' is not a recognised date"
    )))
}

fn infer_value(cell: &str) -> FieldValue {
    let cell = cell.trim();
    if cell.is_empty() {
        return FieldValue::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return FieldValue::Integer(i);
    }
    if let Ok(f) = cell.parse::<f64>() {
        return FieldValue::Float(f);
    }
    FieldValue::String(cell.to_string())
}

// ---------------------------------------------------------------------------
// Loader with per-row-limit cache
// ---------------------------------------------------------------------------

/// Loads case data through a [`CaseSource`], memoising results by row limit.
///
/// Cache entries are shared `Arc`s; callers must not assume defensive
/// copies.
pub struct DataLoader {
    source: Box<dyn CaseSource>,
    cache: BTreeMap<u32, Arc<CaseTable>>,
}

impl DataLoader {
    pub fn new(source: Box<dyn CaseSource>) -> Self {
        Self {
            source,
            cache: BTreeMap::new(),
        }
    }

    /// Fetch up to `row_limit` rows, returning the cached table when this
    /// limit has been loaded before.
    pub fn load(&mut self, row_limit: u32) -> Result<Arc<CaseTable>, DataError> {
        if row_limit == 0 {
            return Err(DataError::InvalidRowLimit(row_limit));
        }
        if let Some(table) = self.cache.get(&row_limit) {
            log::debug!("cache hit for row limit {row_limit}");
            return Ok(Arc::clone(table));
        }

        let table = self.source.fetch(row_limit)?;
        log::info!(
            "loaded {} rows ({} columns) for row limit {row_limit}",
            table.len(),
            table.columns.len()
        );
        let shared = Arc::new(table);
        self.cache.insert(row_limit, Arc::clone(&shared));
        Ok(shared)
    }

    /// Drop the cache entry for this row limit, forcing the next `load` to
    /// fetch again.
    pub fn invalidate(&mut self, row_limit: u32) {
        self.cache.remove(&row_limit);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    const SAMPLE_CSV: &str = "\
TO_DATE,Count_New_Cases,Region
2022-01-01,120,north
2022-01-02,135,north
2022-01-03,98,south
";

    struct CountingSource {
        calls: Rc<Cell<u32>>,
    }

    impl CaseSource for CountingSource {
        fn fetch(&self, row_limit: u32) -> Result<CaseTable, DataError> {
            self.calls.set(self.calls.get() + 1);
            parse_csv(SAMPLE_CSV, row_limit)
        }
    }

    #[test]
    fn headers_are_lowercased_and_dates_parsed() {
        let table = parse_csv(SAMPLE_CSV, 1000).unwrap();

        assert_eq!(table.columns, vec!["to_date", "count_new_cases", "region"]);
        assert_eq!(table.len(), 3);
        assert_eq!(
            table.rows[0].get("to_date").and_then(FieldValue::as_date),
            NaiveDate::from_ymd_opt(2022, 1, 1)
        );
        assert_eq!(
            table.rows[1].get("count_new_cases"),
            Some(&FieldValue::Integer(135))
        );
        assert_eq!(
            table.rows[2].get("region"),
            Some(&FieldValue::String("south".into()))
        );
    }

    #[test]
    fn row_limit_bounds_the_result() {
        let table = parse_csv(SAMPLE_CSV, 2).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn unparseable_date_is_unavailable() {
        let bad = "to_date,count_new_cases\nnot-a-date,5\n";
        let err = parse_csv(bad, 10).unwrap_err();
        assert!(matches!(err, DataError::Unavailable(_)));
    }

    #[test]
    fn repeated_loads_hit_the_cache() {
        let calls = Rc::new(Cell::new(0));
        let mut loader = DataLoader::new(Box::new(CountingSource {
            calls: Rc::clone(&calls),
        }));

        let first = loader.load(1000).unwrap();
        let second = loader.load(1000).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn different_row_limits_fetch_again() {
        let calls = Rc::new(Cell::new(0));
        let mut loader = DataLoader::new(Box::new(CountingSource {
            calls: Rc::clone(&calls),
        }));

        loader.load(2).unwrap();
        loader.load(3).unwrap();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn invalidate_forces_a_refetch() {
        let calls = Rc::new(Cell::new(0));
        let mut loader = DataLoader::new(Box::new(CountingSource {
            calls: Rc::clone(&calls),
        }));

        loader.load(1000).unwrap();
        loader.invalidate(1000);
        loader.load(1000).unwrap();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn zero_row_limit_is_rejected() {
        let calls = Rc::new(Cell::new(0));
        let mut loader = DataLoader::new(Box::new(CountingSource {
            calls: Rc::clone(&calls),
        }));

        let err = loader.load(0).unwrap_err();
        assert!(matches!(err, DataError::InvalidRowLimit(0)));
        assert_eq!(calls.get(), 0);
    }
}
