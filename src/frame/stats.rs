//! Per-column descriptive statistics.
//!
//! Computes the summary block embedded in the dataset profile: count and
//! cardinality for every column, mean/std/min/max for numeric columns, and
//! the most frequent value for everything else.

use std::collections::HashMap;

use crate::frame::{Column, Frame};

/// Descriptive statistics for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    /// Column name.
    pub name: String,
    /// Number of non-null values.
    pub count: usize,
    /// Number of distinct non-null values.
    pub unique: usize,
    /// Most frequent value and its frequency, for non-numeric columns.
    pub top: Option<(String, usize)>,
    /// Mean of numeric values.
    pub mean: Option<f64>,
    /// Sample standard deviation of numeric values (needs at least 2 values).
    pub std: Option<f64>,
    /// Minimum numeric value.
    pub min: Option<f64>,
    /// Maximum numeric value.
    pub max: Option<f64>,
}

/// Computes summaries for every column of the frame, in column order.
pub fn describe(frame: &Frame) -> Vec<ColumnSummary> {
    frame.columns.iter().map(summarize).collect()
}

fn summarize(column: &Column) -> ColumnSummary {
    let non_null: Vec<_> = column.values.iter().filter(|v| !v.is_null()).collect();
    let count = non_null.len();

    // Frequency table over display strings, preserving first-seen order so
    // ties resolve deterministically.
    let mut order: Vec<String> = Vec::new();
    let mut freq: HashMap<String, usize> = HashMap::new();
    for value in &non_null {
        let key = value.to_display_string();
        if !freq.contains_key(&key) {
            order.push(key.clone());
        }
        *freq.entry(key).or_insert(0) += 1;
    }
    let unique = order.len();

    let numeric: Vec<f64> = non_null.iter().filter_map(|v| v.as_f64()).collect();

    if column.dtype.is_numeric() && !numeric.is_empty() {
        let mean = numeric.iter().sum::<f64>() / numeric.len() as f64;
        let std = if numeric.len() > 1 {
            let var = numeric.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (numeric.len() - 1) as f64;
            Some(var.sqrt())
        } else {
            None
        };
        let min = numeric.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = numeric.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        ColumnSummary {
            name: column.name.clone(),
            count,
            unique,
            top: None,
            mean: Some(mean),
            std,
            min: Some(min),
            max: Some(max),
        }
    } else {
        // Strict comparison keeps the first-seen value on ties.
        let mut top: Option<(String, usize)> = None;
        for key in &order {
            let n = freq[key];
            if top.as_ref().map_or(true, |(_, best)| n > *best) {
                top = Some((key.clone(), n));
            }
        }

        ColumnSummary {
            name: column.name.clone(),
            count,
            unique,
            top,
            mean: None,
            std: None,
            min: None,
            max: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::test_support::department_frame;
    use crate::frame::{Dtype, Value};

    #[test]
    fn test_numeric_summary() {
        let frame = department_frame();
        let summaries = describe(&frame);
        let amount = &summaries[1];

        assert_eq!(amount.name, "Net Amount");
        assert_eq!(amount.count, 3);
        assert_eq!(amount.unique, 3);
        assert_eq!(amount.mean, Some(350.0 / 3.0));
        assert_eq!(amount.min, Some(50.0));
        assert_eq!(amount.max, Some(200.0));
        assert!(amount.std.unwrap() > 0.0);
        assert_eq!(amount.top, None);
    }

    #[test]
    fn test_text_summary_has_top_value() {
        let frame = department_frame();
        let summaries = describe(&frame);
        let dept = &summaries[0];

        assert_eq!(dept.count, 3);
        assert_eq!(dept.unique, 2);
        assert_eq!(dept.top, Some(("Surgery".to_string(), 2)));
        assert_eq!(dept.mean, None);
    }

    #[test]
    fn test_top_tie_breaks_on_first_seen() {
        let column = Column::new(
            "City",
            Dtype::Text,
            vec!["Aden".into(), "Sanaa".into(), "Aden".into(), "Sanaa".into()],
        );
        let frame = Frame::with_columns("t", vec![column]);
        let summary = &describe(&frame)[0];
        assert_eq!(summary.top, Some(("Aden".to_string(), 2)));
    }

    #[test]
    fn test_nulls_excluded_from_count() {
        let column = Column::new(
            "Age",
            Dtype::Int,
            vec![Value::Int(30), Value::Null, Value::Int(40)],
        );
        let frame = Frame::with_columns("t", vec![column]);
        let summary = &describe(&frame)[0];

        assert_eq!(summary.count, 2);
        assert_eq!(summary.mean, Some(35.0));
    }

    #[test]
    fn test_single_value_has_no_std() {
        let column = Column::new("N", Dtype::Int, vec![Value::Int(7)]);
        let frame = Frame::with_columns("t", vec![column]);
        let summary = &describe(&frame)[0];

        assert_eq!(summary.std, None);
        assert_eq!(summary.mean, Some(7.0));
    }
}
