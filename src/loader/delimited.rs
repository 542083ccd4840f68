//! Delimited-text loading (CSV / TSV).

use crate::data::{Column, Dataset, Value};
use crate::error::{PulseError, Result};
use std::io::Read;
use std::path::Path;

/// Load a delimited-text file into a dataset.
///
/// The first record is the header. Cells are inferred per value: empty
/// cells become missing, finite numbers become numeric, everything else
/// stays text. Short records are padded with missing cells.
pub fn load_delimited<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<Dataset> {
    let file = std::fs::File::open(path)?;
    read_delimited(file, delimiter)
}

/// Load a delimited-text stream into a dataset.
pub fn read_delimited<R: Read>(reader: R, delimiter: u8) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let trimmed = h.trim();
            if trimmed.is_empty() {
                format!("column_{}", i + 1)
            } else {
                trimmed.to_string()
            }
        })
        .collect();

    if headers.is_empty() {
        return Err(PulseError::EmptyData(
            "File has no header row".to_string(),
        ));
    }

    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for record in csv_reader.records() {
        let record = record?;
        for (i, column) in columns.iter_mut().enumerate() {
            let cell = record.get(i).unwrap_or("");
            column.push(Value::parse(cell));
        }
    }

    let columns = headers
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Dataset::new(columns)
}

/// Write a dataset to a CSV file. Missing cells are written as empty
/// fields, so a write/load round trip preserves them.
pub fn write_csv<P: AsRef<Path>>(dataset: &Dataset, path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(dataset.column_names())?;
    for row in 0..dataset.n_rows() {
        let cells: Vec<String> = dataset.row(row).iter().map(|v| v.to_string()).collect();
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    Ok(())
}
