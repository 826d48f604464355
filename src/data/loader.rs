// ============================================================
// Layer 4 — CSV Loader
// ============================================================
// Loads the input table from a .csv file using the csv crate.
//
// All cells are kept as strings at this stage. Numeric
// coercion happens later in the Preparer so that a bad value
// can be reported per column with a sample of the offending
// cells instead of a bare parse error.
//
// Reference: csv crate documentation
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use std::path::Path;

use crate::domain::table::RawTable;
use crate::domain::traits::TableSource;

/// Loads a single .csv file with a header row.
/// Implements the TableSource trait from Layer 3.
pub struct CsvLoader {
    /// Path to the .csv file
    path: String,
}

impl CsvLoader {
    /// Create a new CsvLoader pointed at a file
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Implement the TableSource trait so the application layer
/// can call load() without knowing about csv internals
impl TableSource for CsvLoader {
    fn load(&self) -> Result<RawTable> {
        let path = Path::new(&self.path);

        // flexible(true) defers field-count checking to us, so a ragged
        // row is reported with its line number instead of a bare csv error.
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .with_context(|| format!("Cannot open '{}'", self.path))?;

        // Header row becomes the column names
        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("Cannot read header row of '{}'", self.path))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows: Vec<Vec<String>> = Vec::new();

        for (line, record) in reader.records().enumerate() {
            let record = record
                .with_context(|| format!("Cannot read row {} of '{}'", line + 2, self.path))?;

            // A ragged row would silently misalign every later column,
            // so reject it here with the file line number.
            if record.len() != headers.len() {
                anyhow::bail!(
                    "Row {} of '{}' has {} fields, expected {}",
                    line + 2,
                    self.path,
                    record.len(),
                    headers.len(),
                );
            }

            rows.push(record.iter().map(|c| c.trim().to_string()).collect());
        }

        tracing::info!(
            "Loaded '{}': {} rows, {} columns",
            self.path,
            rows.len(),
            headers.len()
        );

        Ok(RawTable::new(headers, rows))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_loads_headers_and_rows() {
        let f = write_csv("a,b,c\n1,x,2.5\n2,y,3.5\n");
        let table = CsvLoader::new(f.path().to_str().unwrap()).load().unwrap();
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1], vec!["2", "y", "3.5"]);
    }

    #[test]
    fn test_trims_whitespace() {
        let f = write_csv("a, b\n 1 , x \n");
        let table = CsvLoader::new(f.path().to_str().unwrap()).load().unwrap();
        assert_eq!(table.headers, vec!["a", "b"]);
        assert_eq!(table.rows[0], vec!["1", "x"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = CsvLoader::new("no/such/file.csv").load();
        assert!(result.is_err());
    }
}
