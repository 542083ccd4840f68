//! File loading: delimited text and spreadsheet workbooks.
//!
//! Loading is the one terminal failure point of a session: a file that
//! cannot be read or parsed produces an error and no partial dataset.

mod delimited;
mod workbook;

pub use delimited::{load_delimited, read_delimited, write_csv};
pub use workbook::load_workbook;

use crate::data::Dataset;
use crate::error::{PulseError, Result};
use std::path::Path;

/// Source file format, normally inferred from the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Comma-separated text.
    Csv,
    /// Tab-separated text.
    Tsv,
    /// Excel workbook (.xlsx / .xls).
    Workbook,
}

/// Load a dataset from a file, dispatching on the extension.
pub fn load_path<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let format = match ext.as_str() {
        "csv" => Format::Csv,
        "tsv" => Format::Tsv,
        "xlsx" | "xls" => Format::Workbook,
        other => return Err(PulseError::UnsupportedFormat(format!(".{other}"))),
    };
    load_with_format(path, format)
}

/// Load a dataset from a file with an explicitly declared format.
pub fn load_with_format<P: AsRef<Path>>(path: P, format: Format) -> Result<Dataset> {
    match format {
        Format::Csv => load_delimited(path, b','),
        Format::Tsv => load_delimited(path, b'\t'),
        Format::Workbook => load_workbook(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_dispatch_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "a,b").unwrap();
        writeln!(file, "1,x").unwrap();

        let ds = load_path(&path).unwrap();
        assert_eq!(ds.n_rows(), 1);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = load_path("data.parquet");
        assert!(matches!(result, Err(PulseError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_path("/nonexistent/data.csv");
        assert!(matches!(result, Err(PulseError::Io(_))));
    }
}
