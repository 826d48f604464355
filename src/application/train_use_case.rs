// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the CSV table          (Layer 4 - data)
//   Step 2: Classify + fit columns      (Layer 4 - data)
//   Step 3: Build samples               (Layer 4 - data)
//   Step 4: Split train/test            (Layer 4 - data)
//   Step 5: Split train/validation      (Layer 4 - data)
//   Step 6: Build Burn datasets         (Layer 4 - data)
//   Step 7: Save config + schema        (Layer 6 - infra)
//   Step 8: Run training loop           (Layer 5 - ml)
//   Step 9: Evaluate on held-out test   (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use burn::module::AutodiffModule;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::TabDataset,
    loader::CsvLoader,
    preparer::Preparer,
    splitter::split_seeded,
};
use crate::domain::traits::TableSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::evaluator::{evaluate, RegressionReport};
use crate::ml::trainer::run_training;

/// Fraction of samples kept for training in both cuts:
/// 80/20 train/test, then 80/20 train/validation.
pub const TRAIN_FRACTION: f64 = 0.8;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved to disk and reloaded by the
// evaluate workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_path:      String,
    pub target:         String,
    pub checkpoint_dir: String,
    pub d_model:        usize,
    pub num_heads:      usize,
    pub num_layers:     usize,
    pub d_ff:           usize,
    pub dropout:        f64,
    pub batch_size:     usize,
    pub lr:             f64,
    pub patience:       usize,
    pub max_epochs:     usize,
    pub seed:           u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path:      "data/StudentPerformanceFactors.csv".to_string(),
            target:         "Exam_Score".to_string(),
            checkpoint_dir: "checkpoints".to_string(),
            d_model:        64,
            num_heads:      4,
            num_layers:     3,
            d_ff:           256,
            dropout:        0.1,
            batch_size:     32,
            lr:             1e-3,
            patience:       10,
            max_epochs:     100,
            seed:           42,
        }
    }
}

/// What the training run produced, for the CLI layer to print.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub numeric_columns:     Vec<String>,
    pub categorical_columns: Vec<String>,
    pub metrics:             RegressionReport,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end.
    pub fn execute(&self) -> Result<TrainReport> {
        let cfg = &self.config;

        // ── Step 1: Load the CSV table ────────────────────────────────────────
        tracing::info!("Loading table from '{}'", cfg.data_path);
        let loader = CsvLoader::new(&cfg.data_path);
        let table  = loader.load()?;

        // ── Step 2: Classify columns and fit the transforms ───────────────────
        // Standardizers and category encoders are fitted once over the
        // full input and frozen; the schema fixes the token order.
        let preparer = Preparer::new(&cfg.target);
        let prepared = preparer.fit(&table)?;
        let schema   = prepared.schema.clone();

        // ── Step 3: Build samples ─────────────────────────────────────────────
        let samples = prepared.to_samples(&table)?;
        tracing::info!("Built {} samples", samples.len());

        // ── Step 4: Train/test split (80/20, fixed seed) ──────────────────────
        let (train_samples, test_samples) = split_seeded(samples, TRAIN_FRACTION, cfg.seed);

        // ── Step 5: Train/validation split (80/20 again) ──────────────────────
        // The same seed is reused for both cuts on purpose — this
        // reproduces the original experiment's splits exactly.
        let (train_samples, val_samples) = split_seeded(train_samples, TRAIN_FRACTION, cfg.seed);
        tracing::info!(
            "Split: {} train, {} validation, {} test",
            train_samples.len(),
            val_samples.len(),
            test_samples.len(),
        );

        // ── Step 6: Build Burn datasets ───────────────────────────────────────
        let train_dataset = TabDataset::new(train_samples);
        let val_dataset   = TabDataset::new(val_samples);
        let test_dataset  = TabDataset::new(test_samples);

        // ── Step 7: Save config + schema for the evaluate workflow ────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;
        ckpt_manager.save_schema(&schema)?;

        // ── Step 8: Run training loop (Layer 5) ───────────────────────────────
        let model = run_training(cfg, &schema, train_dataset, val_dataset, &ckpt_manager)?;

        // ── Step 9: Evaluate the best model on the held-out test set ──────────
        let device = burn::backend::ndarray::NdArrayDevice::default();
        let metrics = evaluate(&model.valid(), test_dataset, cfg.batch_size, &device)?;

        Ok(TrainReport {
            numeric_columns:     schema.numeric.clone(),
            categorical_columns: schema.categorical.iter().map(|c| c.name.clone()).collect(),
            metrics,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// A deterministic 100-row toy table: 3 numeric columns,
    /// 2 categorical columns and a numeric target.
    fn write_toy_csv(dir: &std::path::Path) -> String {
        let path = dir.join("toy.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "Hours_Studied,Attendance,Sleep_Hours,Gender,School_Type,Exam_Score").unwrap();
        for i in 0..100u32 {
            let hours      = (i % 10) as f32;
            let attendance = 60.0 + (i % 40) as f32;
            let sleep      = 5.0 + (i % 4) as f32;
            let gender     = if i % 2 == 0 { "Male" } else { "Female" };
            let school     = if i % 3 == 0 { "Public" } else { "Private" };
            let score      = 50.0 + 2.0 * hours + 0.2 * (attendance - 60.0);
            writeln!(f, "{hours},{attendance},{sleep},{gender},{school},{score}").unwrap();
        }
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_end_to_end_toy_training() {
        let dir = tempfile::tempdir().unwrap();
        let config = TrainConfig {
            data_path:      write_toy_csv(dir.path()),
            target:         "Exam_Score".to_string(),
            checkpoint_dir: dir.path().join("ckpt").to_str().unwrap().to_string(),
            // Small model so the test stays fast
            d_model:        16,
            num_heads:      2,
            num_layers:     1,
            d_ff:           32,
            dropout:        0.1,
            batch_size:     16,
            lr:             1e-3,
            patience:       3,
            max_epochs:     5,
            seed:           42,
        };

        let report = TrainUseCase::new(config.clone()).execute().unwrap();

        assert_eq!(
            report.numeric_columns,
            vec!["Hours_Studied", "Attendance", "Sleep_Hours"]
        );
        assert_eq!(report.categorical_columns, vec!["Gender", "School_Type"]);

        // 100 rows → 80 train+val, 20 test
        assert_eq!(report.metrics.sample_count, 20);
        assert!(report.metrics.rmse >= 0.0);
        assert!(report.metrics.r2 <= 1.0);

        // Training left a checkpoint, config, schema and metrics log behind
        let ckpt_dir = std::path::Path::new(&config.checkpoint_dir);
        assert!(ckpt_dir.join("train_config.json").exists());
        assert!(ckpt_dir.join("schema.json").exists());
        assert!(ckpt_dir.join("metrics.csv").exists());
    }
}
