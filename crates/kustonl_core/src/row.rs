//! Tabular query results.

use serde_json::{Map, Value};

/// One result row: column name to scalar value, in column order.
pub type Row = Map<String, Value>;

/// Zip a column-name list with positional row values.
///
/// Values beyond the number of columns are dropped and missing trailing values
/// are left out of the row, matching a positional zip.
///
/// # Examples
///
/// ```
/// use kustonl_core::rows_from_table;
/// use serde_json::json;
///
/// let columns = vec!["version".to_string(), "count_".to_string()];
/// let rows = rows_from_table(&columns, vec![vec![json!("0.48.1"), json!(10)]]);
/// assert_eq!(rows[0]["count_"], json!(10));
/// ```
pub fn rows_from_table(columns: &[String], rows: Vec<Vec<Value>>) -> Vec<Row> {
    rows.into_iter()
        .map(|values| columns.iter().cloned().zip(values).collect::<Row>())
        .collect()
}
