// ============================================================
// Layer 3 — RawTable Domain Type
// ============================================================
// Represents a tabular file loaded from disk, before any
// column classification or encoding has happened.
// This is a plain data struct with no ML behaviour —
// just the header row and the data rows as strings.
//
// By the time a RawTable is created, the CSV parsing has
// already happened; every cell is an owned String and every
// row has exactly one cell per header.
//
// Reference: Rust Book §5 (Structs and Methods)

/// A raw table loaded from disk. Cells are kept as strings;
/// numeric coercion is the Data Preparer's job, so that a
/// coercion failure can be reported per column with samples
/// of the offending values.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Column names, in file order
    pub headers: Vec<String>,

    /// Data rows; each row has headers.len() cells
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows (excluding the header)
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name, or None if absent
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// All values of one column, in row order.
    /// Returns None if the column does not exist.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RawTable {
        RawTable::new(
            vec!["a".into(), "b".into()],
            vec![
                vec!["1".into(), "x".into()],
                vec!["2".into(), "y".into()],
            ],
        )
    }

    #[test]
    fn test_column_index() {
        let t = table();
        assert_eq!(t.column_index("b"), Some(1));
        assert_eq!(t.column_index("missing"), None);
    }

    #[test]
    fn test_column_values_in_row_order() {
        let t = table();
        assert_eq!(t.column("a"), Some(vec!["1", "2"]));
        assert_eq!(t.column("missing"), None);
    }

    #[test]
    fn test_row_count() {
        assert_eq!(table().row_count(), 2);
    }
}
