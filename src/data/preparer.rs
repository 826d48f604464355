// ============================================================
// Layer 4 — Data Preparer
// ============================================================
// Turns a RawTable of strings into prepared samples:
//
//   1. Classify columns into numeric vs. categorical
//      using a fixed allow-list plus auto-detection of any
//      text-typed column that is not the target
//   2. Standardize each numeric column (zero mean, unit variance)
//   3. Integer-code each categorical column
//   4. Build one TabSample per row
//
// The fitted parameters (per-column mean/std, per-column
// label↔id maps) are computed exactly once from the full input
// table and reused for every transform. The resulting
// FeatureSchema is frozen for the lifetime of the run.
//
// Failure mode: a declared-numeric column that cannot be
// coerced to numbers is a fatal data-shape error. The
// diagnostic lists every offending column together with a
// sample of its bad values, and no training proceeds.

use anyhow::{Context, Result};
use std::collections::HashMap;

use crate::domain::sample::TabSample;
use crate::domain::schema::{CategoricalColumn, FeatureSchema};
use crate::domain::table::RawTable;

/// Columns that are always treated as categorical, regardless
/// of what their values look like. Any other text-typed column
/// is picked up by auto-detection in classify().
pub const CATEGORICAL_ALLOW_LIST: [&str; 8] = [
    "Parental_Involvement",
    "Access_to_Resources",
    "Peer_Influence",
    "School_Type",
    "Learning_Disabilities",
    "Parental_Education_Level",
    "Distance_from_Home",
    "Gender",
];

/// How many bad cell values to include per column in a
/// data-shape error message
const BAD_VALUE_SAMPLES: usize = 5;

// ─── Standardizer ─────────────────────────────────────────────────────────────
/// Per-column standardization parameters, fitted once.
/// transform(v) = (v - mean) / std
#[derive(Debug, Clone)]
pub struct Standardizer {
    pub mean: f32,
    pub std:  f32,
}

impl Standardizer {
    /// Fit mean and (population) standard deviation over `values`.
    /// A constant column gets std 1.0 so its standardized values
    /// are all zero rather than NaN.
    pub fn fit(values: &[f32]) -> Self {
        let n = values.len().max(1) as f32;
        let mean = values.iter().sum::<f32>() / n;
        let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;
        let std = var.sqrt();
        let std = if std == 0.0 { 1.0 } else { std };
        Self { mean, std }
    }

    pub fn transform(&self, value: f32) -> f32 {
        (value - self.mean) / self.std
    }
}

// ─── CategoryEncoder ──────────────────────────────────────────────────────────
/// Per-column label ↔ integer-id mapping, fitted once.
/// Ids are assigned in order of first appearance, so the
/// vocabulary size equals the number of distinct labels seen.
#[derive(Debug, Clone)]
pub struct CategoryEncoder {
    /// id → label, in assignment order
    labels: Vec<String>,
    /// label → id
    index: HashMap<String, u32>,
}

impl CategoryEncoder {
    /// Fit the encoder over all values of one column.
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut labels: Vec<String> = Vec::new();
        let mut index: HashMap<String, u32> = HashMap::new();

        for v in values {
            if !index.contains_key(v) {
                index.insert(v.to_string(), labels.len() as u32);
                labels.push(v.to_string());
            }
        }

        Self { labels, index }
    }

    /// Look up the id for a label. None means the label was
    /// never seen at fit time (invalid input for this run).
    pub fn encode(&self, label: &str) -> Option<u32> {
        self.index.get(label).copied()
    }

    /// Look up the label for an id
    pub fn decode(&self, id: u32) -> Option<&str> {
        self.labels.get(id as usize).map(|s| s.as_str())
    }

    /// Number of distinct labels observed at fit time.
    /// This is exactly the embedding-table size for the column.
    pub fn vocab_size(&self) -> usize {
        self.labels.len()
    }

    /// All labels in id order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

// ─── Preparer ─────────────────────────────────────────────────────────────────
/// Classifies and fits a table. Holds only the target column
/// name; everything fitted lives in the returned PreparedColumns.
pub struct Preparer {
    target: String,
}

impl Preparer {
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into() }
    }

    /// Partition the feature columns into (numeric, categorical)
    /// name lists, both in file order. The target column belongs
    /// to neither set.
    ///
    /// A column is categorical if it is on the fixed allow-list,
    /// or if it is text-typed: its first non-empty value does not
    /// parse as a number. Everything else is declared numeric —
    /// which is a promise checked later by fit().
    pub fn classify(&self, table: &RawTable) -> (Vec<String>, Vec<String>) {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();

        for (idx, name) in table.headers.iter().enumerate() {
            if *name == self.target {
                continue;
            }

            if CATEGORICAL_ALLOW_LIST.contains(&name.as_str()) {
                categorical.push(name.clone());
                continue;
            }

            // Auto-detection: peek at the first non-empty value
            let first_value = table
                .rows
                .iter()
                .map(|r| r[idx].as_str())
                .find(|v| !v.is_empty());

            let text_typed = match first_value {
                Some(v) => v.parse::<f32>().is_err(),
                None    => false,
            };

            if text_typed {
                categorical.push(name.clone());
            } else {
                numeric.push(name.clone());
            }
        }

        tracing::debug!(
            "Classified {} numeric and {} categorical feature columns",
            numeric.len(),
            categorical.len()
        );

        (numeric, categorical)
    }

    /// Fit standardizers and encoders over the full table and
    /// freeze the feature schema.
    ///
    /// Fails with a data-shape error if any declared-numeric
    /// column (or the target) contains a value that cannot be
    /// coerced to a number.
    pub fn fit(&self, table: &RawTable) -> Result<PreparedColumns> {
        table
            .column_index(&self.target)
            .with_context(|| format!("Target column '{}' not found in table", self.target))?;

        let (numeric_names, categorical_names) = self.classify(table);

        // ── Coerce numeric columns, collecting every failure ──────────────────
        // All offending columns are gathered before erroring so the
        // diagnostic shows the whole problem at once.
        let mut bad_columns: Vec<(String, Vec<String>)> = Vec::new();
        let mut numeric_values: Vec<Vec<f32>> = Vec::with_capacity(numeric_names.len());

        for name in &numeric_names {
            match parse_numeric_column(table, name) {
                Ok(values)   => numeric_values.push(values),
                Err(samples) => bad_columns.push((name.clone(), samples)),
            }
        }

        // The target is declared numeric by definition
        let target_values = match parse_numeric_column(table, &self.target) {
            Ok(values)   => values,
            Err(samples) => {
                bad_columns.push((self.target.clone(), samples));
                Vec::new()
            }
        };

        if !bad_columns.is_empty() {
            let detail = bad_columns
                .iter()
                .map(|(name, samples)| format!("'{}' (e.g. {})", name, samples.join(", ")))
                .collect::<Vec<_>>()
                .join("; ");
            anyhow::bail!(
                "Declared-numeric columns contain non-numeric values: {detail}"
            );
        }

        // ── Fit per-column parameters ─────────────────────────────────────────
        let standardizers: Vec<Standardizer> = numeric_values
            .iter()
            .map(|values| Standardizer::fit(values))
            .collect();

        let encoders: Vec<CategoryEncoder> = categorical_names
            .iter()
            .map(|name| {
                // classify() only returns existing columns
                let values = table.column(name).unwrap_or_default();
                CategoryEncoder::fit(values)
            })
            .collect();

        let schema = FeatureSchema {
            target:  self.target.clone(),
            numeric: numeric_names,
            categorical: categorical_names
                .iter()
                .zip(&encoders)
                .map(|(name, enc)| CategoricalColumn {
                    name:       name.clone(),
                    vocab_size: enc.vocab_size(),
                })
                .collect(),
        };

        tracing::info!(
            "Fitted schema: {} numeric columns, {} categorical columns, {} rows",
            schema.numeric.len(),
            schema.categorical.len(),
            target_values.len()
        );

        Ok(PreparedColumns { schema, standardizers, encoders })
    }
}

/// Parse one column to f32. On failure returns up to
/// BAD_VALUE_SAMPLES of the offending cell values.
fn parse_numeric_column(table: &RawTable, name: &str) -> std::result::Result<Vec<f32>, Vec<String>> {
    let idx = match table.column_index(name) {
        Some(idx) => idx,
        None      => return Err(vec!["<missing column>".to_string()]),
    };

    let mut values = Vec::with_capacity(table.row_count());
    let mut bad: Vec<String> = Vec::new();

    for row in &table.rows {
        match row[idx].parse::<f32>() {
            Ok(v) => values.push(v),
            Err(_) => {
                if bad.len() < BAD_VALUE_SAMPLES {
                    bad.push(format!("{:?}", row[idx]));
                }
            }
        }
    }

    if bad.is_empty() { Ok(values) } else { Err(bad) }
}

// ─── PreparedColumns ──────────────────────────────────────────────────────────
/// Everything fitted by Preparer::fit: the frozen schema plus
/// the per-column transforms needed to turn rows into samples.
#[derive(Debug)]
pub struct PreparedColumns {
    pub schema:    FeatureSchema,
    standardizers: Vec<Standardizer>,
    encoders:      Vec<CategoryEncoder>,
}

impl PreparedColumns {
    /// The fitted encoder for a categorical column, by name
    pub fn encoder(&self, name: &str) -> Option<&CategoryEncoder> {
        self.schema
            .categorical
            .iter()
            .position(|c| c.name == name)
            .map(|i| &self.encoders[i])
    }

    /// The fitted standardizer for a numeric column, by name
    pub fn standardizer(&self, name: &str) -> Option<&Standardizer> {
        self.schema
            .numeric
            .iter()
            .position(|n| n == name)
            .map(|i| &self.standardizers[i])
    }

    /// Transform every row of `table` into a TabSample using the
    /// fitted parameters. Row order is preserved.
    pub fn to_samples(&self, table: &RawTable) -> Result<Vec<TabSample>> {
        let numeric_idx: Vec<usize> = self
            .schema
            .numeric
            .iter()
            .map(|name| {
                table
                    .column_index(name)
                    .with_context(|| format!("Numeric column '{}' not found", name))
            })
            .collect::<Result<_>>()?;

        let categorical_idx: Vec<usize> = self
            .schema
            .categorical
            .iter()
            .map(|c| {
                table
                    .column_index(&c.name)
                    .with_context(|| format!("Categorical column '{}' not found", c.name))
            })
            .collect::<Result<_>>()?;

        let target_idx = table
            .column_index(&self.schema.target)
            .with_context(|| format!("Target column '{}' not found", self.schema.target))?;

        let mut samples = Vec::with_capacity(table.row_count());

        for (row_no, row) in table.rows.iter().enumerate() {
            let mut numeric = Vec::with_capacity(numeric_idx.len());
            for (&idx, std) in numeric_idx.iter().zip(&self.standardizers) {
                let raw: f32 = row[idx]
                    .parse()
                    .with_context(|| {
                        format!("Row {}: non-numeric value {:?} in column '{}'",
                            row_no + 1, row[idx], table.headers[idx])
                    })?;
                numeric.push(std.transform(raw));
            }

            let mut categorical = Vec::with_capacity(categorical_idx.len());
            for (&idx, enc) in categorical_idx.iter().zip(&self.encoders) {
                let id = enc.encode(&row[idx]).with_context(|| {
                    format!("Row {}: unseen category {:?} in column '{}'",
                        row_no + 1, row[idx], table.headers[idx])
                })?;
                categorical.push(id);
            }

            let target: f32 = row[target_idx]
                .parse()
                .with_context(|| {
                    format!("Row {}: non-numeric target {:?}", row_no + 1, row[target_idx])
                })?;

            samples.push(TabSample::new(numeric, categorical, target));
        }

        Ok(samples)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RawTable {
        RawTable::new(
            vec![
                "Hours_Studied".into(),
                "Gender".into(),
                "Tutor_Name".into(),
                "Exam_Score".into(),
            ],
            vec![
                vec!["10".into(), "Male".into(),   "Ann".into(), "67".into()],
                vec!["20".into(), "Female".into(), "Bob".into(), "74".into()],
                vec!["30".into(), "Female".into(), "Ann".into(), "71".into()],
                vec!["40".into(), "Male".into(),   "Cat".into(), "80".into()],
            ],
        )
    }

    #[test]
    fn test_classify_uses_allow_list_and_text_detection() {
        let preparer = Preparer::new("Exam_Score");
        let (numeric, categorical) = preparer.classify(&table());
        // Gender is on the allow-list; Tutor_Name is auto-detected as text
        assert_eq!(numeric, vec!["Hours_Studied"]);
        assert_eq!(categorical, vec!["Gender", "Tutor_Name"]);
    }

    #[test]
    fn test_standardized_values_have_zero_mean_unit_variance() {
        let values = vec![10.0, 20.0, 30.0, 40.0];
        let std = Standardizer::fit(&values);
        let transformed: Vec<f32> = values.iter().map(|&v| std.transform(v)).collect();

        let n = transformed.len() as f32;
        let mean = transformed.iter().sum::<f32>() / n;
        let var = transformed.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;

        assert!(mean.abs() < 1e-6, "mean was {mean}");
        assert!((var - 1.0).abs() < 1e-5, "variance was {var}");
    }

    #[test]
    fn test_constant_column_does_not_produce_nan() {
        let std = Standardizer::fit(&[5.0, 5.0, 5.0]);
        assert_eq!(std.transform(5.0), 0.0);
    }

    #[test]
    fn test_encoder_ids_cover_exactly_the_vocab() {
        let enc = CategoryEncoder::fit(["Low", "High", "Low", "Medium", "High"]);
        assert_eq!(enc.vocab_size(), 3);
        for label in ["Low", "High", "Medium"] {
            let id = enc.encode(label).unwrap();
            assert!((id as usize) < enc.vocab_size());
        }
        assert_eq!(enc.encode("Unknown"), None);
    }

    #[test]
    fn test_encode_decode_roundtrip_recovers_label_set() {
        let labels = ["Public", "Private", "Public", "Charter"];
        let enc = CategoryEncoder::fit(labels);

        let mut decoded: Vec<&str> = (0..enc.vocab_size() as u32)
            .map(|id| enc.decode(id).unwrap())
            .collect();
        decoded.sort_unstable();

        let mut expected: Vec<&str> = vec!["Charter", "Private", "Public"];
        expected.sort_unstable();

        assert_eq!(decoded, expected);
        // labels() is the same set in id order
        assert_eq!(enc.labels(), &["Public", "Private", "Charter"]);
    }

    #[test]
    fn test_fit_builds_ordered_schema_with_vocab_sizes() {
        let prepared = Preparer::new("Exam_Score").fit(&table()).unwrap();
        let schema = &prepared.schema;

        assert_eq!(schema.numeric, vec!["Hours_Studied"]);
        assert_eq!(schema.categorical.len(), 2);
        assert_eq!(schema.categorical[0].name, "Gender");
        assert_eq!(schema.categorical[0].vocab_size, 2);
        assert_eq!(schema.categorical[1].name, "Tutor_Name");
        assert_eq!(schema.categorical[1].vocab_size, 3);
        assert_eq!(schema.sequence_length(), 3);
    }

    #[test]
    fn test_to_samples_standardizes_and_encodes() {
        let t = table();
        let prepared = Preparer::new("Exam_Score").fit(&t).unwrap();
        let samples = prepared.to_samples(&t).unwrap();

        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].numeric.len(), 1);
        assert_eq!(samples[0].categorical.len(), 2);
        assert_eq!(samples[0].target, 67.0);

        // Every encoded id is within its column's vocabulary
        for sample in &samples {
            for (id, col) in sample.categorical.iter().zip(&prepared.schema.categorical) {
                assert!((*id as usize) < col.vocab_size);
            }
        }
    }

    #[test]
    fn test_bad_numeric_column_is_a_data_shape_error() {
        let t = RawTable::new(
            vec!["Hours_Studied".into(), "Exam_Score".into()],
            vec![
                vec!["10".into(), "67".into()],
                vec!["n/a".into(), "74".into()],
            ],
        );
        let err = Preparer::new("Exam_Score").fit(&t).unwrap_err();
        let message = format!("{err}");
        assert!(message.contains("Hours_Studied"), "got: {message}");
        assert!(message.contains("n/a"), "got: {message}");
    }

    #[test]
    fn test_missing_target_is_an_error() {
        let err = Preparer::new("Final_Grade").fit(&table()).unwrap_err();
        assert!(format!("{err:#}").contains("Final_Grade"));
    }

    #[test]
    fn test_unseen_category_in_transform_is_an_error() {
        let t = table();
        let prepared = Preparer::new("Exam_Score").fit(&t).unwrap();

        let unseen = RawTable::new(
            t.headers.clone(),
            vec![vec!["15".into(), "Other".into(), "Ann".into(), "60".into()]],
        );
        assert!(prepared.to_samples(&unseen).is_err());
    }
}
