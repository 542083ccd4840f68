//! Spreadsheet-workbook loading (XLSX / XLS) via calamine.

use crate::data::{Column, Dataset, Value};
use crate::error::{PulseError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// Load the first worksheet of a workbook into a dataset.
///
/// The first row is the header; remaining rows are data. Cell typing
/// follows the workbook's own cells: numeric cells become numbers, text
/// cells are re-inferred the same way delimited text is, and empty or
/// error cells become missing.
pub fn load_workbook<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| PulseError::Workbook(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PulseError::Workbook("No sheets found in workbook".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| PulseError::Workbook(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| PulseError::EmptyData("Worksheet has no header row".to_string()))?;

    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let name = cell.to_string().trim().to_string();
            if name.is_empty() {
                format!("column_{}", i + 1)
            } else {
                name
            }
        })
        .collect();

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (i, column) in columns.iter_mut().enumerate() {
            let cell = row.get(i).unwrap_or(&Data::Empty);
            column.push(cell_to_value(cell));
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Dataset::new(columns)
}

/// Convert one workbook cell to a dataset value.
pub(crate) fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Missing,
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) if f.is_finite() => Value::Number(*f),
        Data::Float(_) => Value::Missing,
        Data::String(s) => Value::parse(s),
        Data::Bool(b) => Value::Text(b.to_string()),
        Data::Error(_) => Value::Missing,
        other => Value::Text(other.to_string()),
    }
}
