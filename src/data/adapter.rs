use super::loader::DATE_COLUMN;
use super::model::{AdaptedSeries, CaseTable, DS_COLUMN, Y_COLUMN};
use super::DataError;

// ---------------------------------------------------------------------------
// Schema adapter: source column names → engine input contract
// ---------------------------------------------------------------------------

/// Source column holding the daily case count.
pub const COUNT_COLUMN: &str = "count_new_cases";

/// Rename the loaded table's date and count columns into the engine's
/// required `ds` / `y` names.
///
/// Row count, row order, and all other columns are preserved. A missing
/// source column is a [`DataError::SchemaMismatch`].
pub fn adapt(table: &CaseTable) -> Result<AdaptedSeries, DataError> {
    let mut renamed = table.clone();
    for (from, to) in [(DATE_COLUMN, DS_COLUMN), (COUNT_COLUMN, Y_COLUMN)] {
        if !renamed.rename_column(from, to) {
            return Err(DataError::SchemaMismatch {
                column: from.to_string(),
            });
        }
    }
    Ok(AdaptedSeries { table: renamed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;
    use crate::data::model::FieldValue;

    const SAMPLE_CSV: &str = "\
to_date,count_new_cases,region,backlog
2022-01-01,120,north,4
2022-01-02,135,north,7
2022-01-03,98,south,2
";

    #[test]
    fn renames_preserve_rows_order_and_extras() {
        let table = parse_csv(SAMPLE_CSV, 1000).unwrap();
        let adapted = adapt(&table).unwrap();

        assert_eq!(
            adapted.table.columns,
            vec!["ds", "y", "region", "backlog"]
        );
        assert_eq!(adapted.len(), table.len());

        // Order intact: the y column tracks the source count column.
        let counts: Vec<_> = adapted
            .table
            .rows
            .iter()
            .map(|r| r.get("y").and_then(FieldValue::as_f64).unwrap())
            .collect();
        assert_eq!(counts, vec![120.0, 135.0, 98.0]);

        // Extra columns survive untouched.
        assert_eq!(
            adapted.table.rows[2].get("region"),
            Some(&FieldValue::String("south".into()))
        );
    }

    #[test]
    fn missing_date_column_is_a_schema_mismatch() {
        let table = parse_csv("day,count_new_cases\n1,5\n", 10).unwrap();
        let err = adapt(&table).unwrap_err();
        assert!(matches!(
            err,
            DataError::SchemaMismatch { ref column } if column == "to_date"
        ));
    }

    #[test]
    fn missing_count_column_is_a_schema_mismatch() {
        let table = parse_csv("to_date,cases\n2022-01-01,5\n", 10).unwrap();
        let err = adapt(&table).unwrap_err();
        assert!(matches!(
            err,
            DataError::SchemaMismatch { ref column } if column == "count_new_cases"
        ));
    }
}
