//! Kusto REST v1 result sets.

use kustonl_core::{Row, rows_from_table};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A query response: one or more tables, the first being the primary result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryResponse {
    /// Result tables in response order
    pub tables: Vec<ResultTable>,
}

impl QueryResponse {
    /// The primary result table.
    pub fn primary_result(&self) -> Option<&ResultTable> {
        self.tables.first()
    }

    /// Take ownership of the primary result table.
    pub fn into_primary_result(self) -> Option<ResultTable> {
        self.tables.into_iter().next()
    }
}

/// One result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultTable {
    /// Table name, e.g. `Table_0`
    #[serde(default)]
    pub table_name: String,
    /// Column schema in positional order
    pub columns: Vec<ResultColumn>,
    /// Row values, positionally aligned with `columns`
    pub rows: Vec<Vec<Value>>,
}

impl ResultTable {
    /// Column names in positional order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.column_name.clone()).collect()
    }

    /// Convert to field-name-to-value rows, preserving row order.
    pub fn into_rows(self) -> Vec<Row> {
        let columns = self.column_names();
        rows_from_table(&columns, self.rows)
    }
}

/// Column schema entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultColumn {
    /// Column name
    pub column_name: String,
    /// .NET data type name, e.g. `String`, `Int64`
    #[serde(default)]
    pub data_type: Option<String>,
    /// Kusto column type, e.g. `string`, `long`
    #[serde(default)]
    pub column_type: Option<String>,
}

impl ResultColumn {
    /// Column with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            column_name: name.into(),
            data_type: None,
            column_type: None,
        }
    }
}
