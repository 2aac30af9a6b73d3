//! Result normalization.
//!
//! Whatever shape the executor extracted — table, series, or scalar — is
//! coerced into a display-ready table with explicit column names and a row
//! count. One coercion per shape, nothing ad hoc.

use crate::error::{ChatError, Result};
use crate::frame::{Column, Dtype, Frame, Value};
use crate::query::ExecValue;

/// Name of the synthesized index column when a series is materialized.
const INDEX_COLUMN: &str = "index";

/// The normalized, display-ready answer to one question.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    /// The answer as a table. Every column is named.
    pub table: Frame,
    /// Number of rows, recorded for display.
    pub rows: usize,
}

/// Normalizes an executor value into a result table.
///
/// Tables pass through unchanged (idempotent). A series becomes a two-column
/// table of fresh 0-based index and values. A scalar becomes a single-cell
/// table named after the expression that produced it.
pub fn normalize(value: ExecValue) -> Result<ResultTable> {
    match value {
        ExecValue::Table(table) => Ok(ResultTable {
            rows: table.n_rows(),
            table,
        }),
        ExecValue::Series(column) => {
            let index: Vec<Value> = (0..column.len() as i64).map(Value::Int).collect();
            let table = Frame::with_columns(
                "result",
                vec![Column::new(INDEX_COLUMN, Dtype::Int, index), column],
            );
            Ok(ResultTable {
                rows: table.n_rows(),
                table,
            })
        }
        ExecValue::Scalar { name, value } => {
            let table = Frame::with_columns(
                "result",
                vec![Column::new(name, dtype_of(&value), vec![value])],
            );
            Ok(ResultTable { rows: 1, table })
        }
        // The executor rejects an unaggregated groupby before we get here.
        ExecValue::Grouped { .. } => Err(ChatError::internal(
            "grouped value reached normalization without an aggregation",
        )),
    }
}

fn dtype_of(value: &Value) -> Dtype {
    match value {
        Value::Int(_) => Dtype::Int,
        Value::Float(_) => Dtype::Float,
        Value::Bool(_) => Dtype::Bool,
        Value::Text(_) | Value::Null => Dtype::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::test_support::department_frame;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_table_passes_through() {
        let frame = department_frame();
        let result = normalize(ExecValue::Table(frame.clone())).unwrap();

        assert_eq!(result.table, frame);
        assert_eq!(result.rows, 3);
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let frame = department_frame();
        let once = normalize(ExecValue::Table(frame)).unwrap();
        let twice = normalize(ExecValue::Table(once.table.clone())).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_series_becomes_two_column_table() {
        let series = Column::new(
            "Net Amount",
            Dtype::Int,
            vec![Value::Int(100), Value::Int(200), Value::Int(50)],
        );
        let result = normalize(ExecValue::Series(series)).unwrap();

        assert_eq!(result.table.n_cols(), 2);
        assert_eq!(result.rows, 3);
        assert_eq!(result.table.column_names(), vec!["index", "Net Amount"]);
        assert_eq!(
            result.table.column("index").unwrap().values,
            vec![Value::Int(0), Value::Int(1), Value::Int(2)]
        );
    }

    #[test]
    fn test_scalar_becomes_single_cell_table() {
        let result = normalize(ExecValue::Scalar {
            name: "count".to_string(),
            value: Value::Int(42),
        })
        .unwrap();

        assert_eq!(result.rows, 1);
        assert_eq!(result.table.column_names(), vec!["count"]);
        assert_eq!(result.table.row(0), vec![&Value::Int(42)]);
    }

    #[test]
    fn test_empty_table_keeps_zero_rows() {
        let frame = department_frame().take_rows(&[false, false, false]);
        let result = normalize(ExecValue::Table(frame)).unwrap();

        assert_eq!(result.rows, 0);
        assert_eq!(result.table.n_cols(), 2);
    }
}
