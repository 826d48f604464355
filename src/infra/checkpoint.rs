// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved per run:
//   1. Model weights (.mpk.gz file) — the early-stopped best
//   2. train_config.json            — training hyperparameters
//   3. schema.json                  — the frozen feature schema
//
// Why save config and schema separately?
//   When loading for evaluation, we need the exact model
//   architecture (d_model, num_layers, ...) AND the exact
//   feature widths (numeric width, per-column vocabulary
//   sizes) to rebuild the model before loading weights into
//   it. The schema also pins the token order.
//
// Burn's CompactRecorder:
//   - Serialises model parameters to MessagePack format
//   - Compresses with gzip for smaller file size
//   - Type-safe: loading fails if architecture doesn't match
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::domain::schema::FeatureSchema;
use crate::ml::model::ScoreRegressor;

/// File stem of the saved best-model weights
const MODEL_FILE: &str = "model_best";

/// Manages saving and loading of model checkpoints.
/// All files are stored in the configured directory.
pub struct CheckpointManager {
    /// Path to the directory where checkpoints are stored
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save the best model's weights.
    pub fn save_model<B: AutodiffBackend>(
        &self,
        model: &ScoreRegressor<B>,
    ) -> Result<()> {
        // Build the file path (without extension — recorder adds it)
        let path = self.dir.join(MODEL_FILE);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        tracing::debug!("Saved best-model checkpoint");
        Ok(())
    }

    /// Load model weights from the saved checkpoint.
    ///
    /// The model parameter must have the correct architecture
    /// (matching the saved checkpoint) or loading will fail.
    pub fn load_model<B: Backend>(
        &self,
        model:  ScoreRegressor<B>,
        device: &B::Device,
    ) -> Result<ScoreRegressor<B>> {
        let path = self.dir.join(MODEL_FILE);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    /// Save the training configuration to JSON.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'evaluate'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }

    /// Save the frozen feature schema to JSON.
    pub fn save_schema(&self, schema: &FeatureSchema) -> Result<()> {
        let path = self.dir.join("schema.json");
        let json = serde_json::to_string_pretty(schema)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write schema to '{}'", path.display()))?;

        tracing::debug!("Saved feature schema to '{}'", path.display());
        Ok(())
    }

    /// Load the frozen feature schema from JSON.
    pub fn load_schema(&self) -> Result<FeatureSchema> {
        let path = self.dir.join("schema.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read schema from '{}'. \
                     Make sure you have run 'train' before 'evaluate'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::CategoricalColumn;

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_str().unwrap());

        let cfg = TrainConfig::default();
        ckpt.save_config(&cfg).unwrap();
        let loaded = ckpt.load_config().unwrap();
        assert_eq!(loaded.d_model, cfg.d_model);
        assert_eq!(loaded.target, cfg.target);
    }

    #[test]
    fn test_schema_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_str().unwrap());

        let schema = FeatureSchema {
            target:  "Exam_Score".into(),
            numeric: vec!["Hours_Studied".into()],
            categorical: vec![CategoricalColumn { name: "Gender".into(), vocab_size: 2 }],
        };
        ckpt.save_schema(&schema).unwrap();
        assert_eq!(ckpt.load_schema().unwrap(), schema);
    }

    #[test]
    fn test_load_without_train_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = CheckpointManager::new(dir.path().to_str().unwrap());
        assert!(ckpt.load_config().is_err());
        assert!(ckpt.load_schema().is_err());
    }
}
