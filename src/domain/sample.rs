// ============================================================
// Layer 3 — TabSample Domain Type
// ============================================================
// One fully prepared training sample: the standardized numeric
// features, the integer-coded categorical features, and the
// regression target. Immutable once constructed.
//
// The categorical ids are stored in the same order as
// FeatureSchema::categorical — the sample carries no column
// names of its own, the schema is the single source of truth
// for ordering.

use serde::{Deserialize, Serialize};

/// One prepared sample. `numeric` has the schema's numeric
/// width, `categorical` one id per categorical column in
/// schema order, each id in [0, vocab_size) for its column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabSample {
    /// Standardized numeric features (zero mean, unit variance)
    pub numeric: Vec<f32>,

    /// Integer category codes, one per categorical column
    pub categorical: Vec<u32>,

    /// The raw (unscaled) target score
    pub target: f32,
}

impl TabSample {
    pub fn new(numeric: Vec<f32>, categorical: Vec<u32>, target: f32) -> Self {
        Self { numeric, categorical, target }
    }
}
