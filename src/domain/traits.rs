// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// By programming against traits instead of concrete types,
// we can swap implementations without changing the code
// that uses them. For example:
//   - CsvLoader implements TableSource
//   - A future ParquetLoader could also implement TableSource
//   - The application layer only sees TableSource
//     and works with both without any changes
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use crate::domain::table::RawTable;

// ─── TableSource ──────────────────────────────────────────────────────────────
/// Any component that can load a raw table from a source.
///
/// Implementations:
///   - CsvLoader → loads from a .csv file on disk
pub trait TableSource {
    /// Load the full table from this source.
    /// Returns the table or an error.
    fn load(&self) -> Result<RawTable>;
}
