//! Dataset profile construction.
//!
//! Builds the plain-text description of the loaded table that grounds the
//! model's output: identity, schema, a small leading sample, and descriptive
//! statistics for every column. A pure function of the frame contents, so
//! repeated calls over an unchanged dataset produce identical text.

use std::fmt::Write;

use crate::frame::stats::{describe, ColumnSummary};
use crate::frame::Frame;

/// Sentinel text returned when no dataset is loaded.
///
/// Callers must check for this before invoking the synthesizer.
pub const NO_DATA: &str = "No data loaded";

/// Number of leading rows included in the sample block.
const SAMPLE_ROWS: usize = 3;

/// Builds the textual profile of the dataset.
pub fn build_profile(dataset: Option<&Frame>) -> String {
    let Some(frame) = dataset else {
        return NO_DATA.to_string();
    };

    let mut out = String::new();

    writeln!(out, "Dataset Information:").ok();
    writeln!(out, "Table Name: {}", frame.name).ok();
    writeln!(out, "Total Rows: {}", frame.n_rows()).ok();
    writeln!(out, "Columns: {}", frame.column_names().join(", ")).ok();

    writeln!(out, "\nColumn Types:").ok();
    for column in &frame.columns {
        writeln!(out, "  {}: {}", column.name, column.dtype).ok();
    }

    writeln!(out, "\nSample Data (first {SAMPLE_ROWS} rows):").ok();
    writeln!(out, "  {}", frame.column_names().join(" | ")).ok();
    for idx in 0..frame.n_rows().min(SAMPLE_ROWS) {
        let cells: Vec<String> = frame
            .row(idx)
            .iter()
            .map(|v| v.to_display_string())
            .collect();
        writeln!(out, "  {}", cells.join(" | ")).ok();
    }

    writeln!(out, "\nSummary Statistics:").ok();
    for summary in describe(frame) {
        writeln!(out, "  {}", format_summary(&summary)).ok();
    }

    out
}

fn format_summary(s: &ColumnSummary) -> String {
    let mut line = format!("{}: count={} unique={}", s.name, s.count, s.unique);

    if let Some((top, freq)) = &s.top {
        line.push_str(&format!(" top=\"{top}\" freq={freq}"));
    }
    if let Some(mean) = s.mean {
        line.push_str(&format!(" mean={}", fmt_num(mean)));
    }
    if let Some(std) = s.std {
        line.push_str(&format!(" std={}", fmt_num(std)));
    }
    if let Some(min) = s.min {
        line.push_str(&format!(" min={}", fmt_num(min)));
    }
    if let Some(max) = s.max {
        line.push_str(&format!(" max={}", fmt_num(max)));
    }

    line
}

/// Prints integral values without a decimal tail, everything else to 2 dp.
fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v:.2}")
    }
}
