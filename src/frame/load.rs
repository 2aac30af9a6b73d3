//! Dataset loading from spreadsheet-style files.
//!
//! CSV files go through the `csv` crate; Excel-family files (xlsx, xls,
//! xlsb, ods) go through `calamine`. Either way the result is a typed
//! `Frame` with column types inferred from the cell contents.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{ChatError, Result};
use crate::frame::{Column, Dtype, Frame, Value};

/// Loads a tabular file into a frame.
///
/// The first row is treated as the header. The frame name is the file stem,
/// used as the dataset label in profiles.
pub fn load_table(path: &Path) -> Result<Frame> {
    if !path.exists() {
        return Err(ChatError::data(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset")
        .to_string();

    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => load_csv(path, name),
        "xlsx" | "xls" | "xlsb" | "ods" => load_workbook(path, name),
        other => Err(ChatError::data(format!(
            "Unsupported file type '.{other}' (expected csv, xlsx, xls, xlsb, or ods)"
        ))),
    }
}

/// Loads a CSV file. Cells arrive as text and are re-typed per column.
fn load_csv(path: &Path, name: String) -> Result<Frame> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ChatError::data(format!("Failed to open CSV: {e}")))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ChatError::data(format!("Failed to read CSV header: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        return Err(ChatError::data("CSV file has no header row"));
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(|e| ChatError::data(format!("Failed to read CSV row: {e}")))?;
        for (i, col) in cells.iter_mut().enumerate() {
            col.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .enumerate()
        .map(|(i, (header, raw))| {
            let header = normalize_header(&header, i);
            typed_column(header, &raw)
        })
        .collect();

    Ok(Frame::with_columns(name, columns))
}

/// Loads the first sheet of an Excel-family workbook.
fn load_workbook(path: &Path, name: String) -> Result<Frame> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ChatError::data(format!("Failed to open workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ChatError::data("Workbook has no sheets"))?
        .map_err(|e| ChatError::data(format!("Failed to read sheet: {e}")))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| ChatError::data("Sheet is empty"))?;

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| normalize_header(&cell.to_string(), i))
        .collect();

    // Workbook cells carry their own types; stringify and re-infer so CSV
    // and Excel inputs take the same inference path.
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (i, col) in cells.iter_mut().enumerate() {
            let text = match row.get(i) {
                None | Some(Data::Empty) => String::new(),
                Some(Data::Error(e)) => format!("{e:?}"),
                Some(cell) => cell.to_string(),
            };
            col.push(text);
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(header, raw)| typed_column(header, &raw))
        .collect();

    Ok(Frame::with_columns(name, columns))
}

/// Replaces empty headers with a positional fallback name.
fn normalize_header(header: &str, index: usize) -> String {
    let trimmed = header.trim();
    if trimmed.is_empty() {
        format!("column_{index}")
    } else {
        trimmed.to_string()
    }
}

/// Infers a column type from raw text cells and builds the typed column.
///
/// Empty cells become Null and do not vote. Precedence: all-int, all-number,
/// all-bool, otherwise text.
fn typed_column(name: String, raw: &[String]) -> Column {
    let non_empty: Vec<&str> = raw
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    let dtype = if non_empty.is_empty() {
        Dtype::Text
    } else if non_empty.iter().all(|s| s.parse::<i64>().is_ok()) {
        Dtype::Int
    } else if non_empty.iter().all(|s| s.parse::<f64>().is_ok()) {
        Dtype::Float
    } else if non_empty.iter().all(|s| parse_bool(s).is_some()) {
        Dtype::Bool
    } else {
        Dtype::Text
    };

    let values = raw
        .iter()
        .map(|s| {
            let s = s.trim();
            if s.is_empty() {
                return Value::Null;
            }
            match dtype {
                Dtype::Int => Value::Int(s.parse().unwrap_or_default()),
                Dtype::Float => Value::Float(s.parse().unwrap_or_default()),
                Dtype::Bool => parse_bool(s).map(Value::Bool).unwrap_or_default(),
                Dtype::Text => Value::Text(s.to_string()),
            }
        })
        .collect();

    Column::new(name, dtype, values)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
