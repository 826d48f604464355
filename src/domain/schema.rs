// ============================================================
// Layer 3 — FeatureSchema Domain Type
// ============================================================
// The frozen partition of input columns into numeric and
// categorical feature groups, decided exactly once when the
// Data Preparer fits the table, then passed (immutably) to
// every downstream component.
//
// The categorical list is an explicitly ORDERED list of
// (column name, vocabulary size) pairs. Order matters:
// the Feature Embedder emits one token per entry in this
// order, so positional encoding is only meaningful if the
// order is stable across every forward pass.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// One categorical column together with the number of distinct
/// category codes observed at fit time. The embedding table for
/// this column is sized with exactly `vocab_size` rows, so any
/// id >= vocab_size is invalid input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    pub name:       String,
    pub vocab_size: usize,
}

/// The fixed feature schema for one run. Created once at fit
/// time and never mutated afterwards; serialised next to the
/// checkpoint so `evaluate` can rebuild the exact model shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Name of the column being predicted
    pub target: String,

    /// Numeric feature columns, in file order.
    /// All of them together form the single numeric token.
    pub numeric: Vec<String>,

    /// Categorical feature columns with their vocabulary sizes,
    /// in file order. One token (and one embedding table) each.
    pub categorical: Vec<CategoricalColumn>,
}

impl FeatureSchema {
    /// Length of the numeric feature vector (F)
    pub fn numeric_width(&self) -> usize {
        self.numeric.len()
    }

    /// Number of categorical feature tokens (C)
    pub fn categorical_count(&self) -> usize {
        self.categorical.len()
    }

    /// Token sequence length fed to the encoder stack:
    /// one numeric token plus one token per categorical column.
    pub fn sequence_length(&self) -> usize {
        1 + self.categorical.len()
    }

    /// Embedding-table sizes in token order
    pub fn vocab_sizes(&self) -> Vec<usize> {
        self.categorical.iter().map(|c| c.vocab_size).collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema {
            target:  "Exam_Score".into(),
            numeric: vec!["Hours_Studied".into(), "Attendance".into()],
            categorical: vec![
                CategoricalColumn { name: "Gender".into(), vocab_size: 2 },
                CategoricalColumn { name: "School_Type".into(), vocab_size: 3 },
            ],
        }
    }

    #[test]
    fn test_sequence_length_is_one_plus_categoricals() {
        let s = schema();
        assert_eq!(s.numeric_width(), 2);
        assert_eq!(s.categorical_count(), 2);
        assert_eq!(s.sequence_length(), 3);
    }

    #[test]
    fn test_vocab_sizes_in_order() {
        assert_eq!(schema().vocab_sizes(), vec![2, 3]);
    }

    #[test]
    fn test_roundtrips_through_json() {
        let s = schema();
        let json = serde_json::to_string(&s).unwrap();
        let back: FeatureSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
