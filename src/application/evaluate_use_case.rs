// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Re-scores a previously trained checkpoint on the held-out
// test split:
//
//   1. Load train_config.json + schema.json   (Layer 6)
//   2. Rebuild the model and load the weights (Layer 5 + 6)
//   3. Re-run the deterministic data prep     (Layer 4)
//   4. Evaluate on the same test split        (Layer 5)
//
// The data preparation is deterministic (fixed classification,
// fit-once transforms, seeded split), so the test split here is
// exactly the split the model never saw during training.

use anyhow::Result;

use crate::data::{
    dataset::TabDataset,
    loader::CsvLoader,
    preparer::Preparer,
    splitter::split_seeded,
};
use crate::application::train_use_case::{TrainReport, TRAIN_FRACTION};
use crate::domain::traits::TableSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::evaluator::evaluate;
use crate::ml::model::{ScoreRegressor, ScoreRegressorConfig};
use crate::ml::trainer::EvalBackend;

pub struct EvaluateUseCase {
    checkpoint_dir: String,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_dir: impl Into<String>) -> Self {
        Self { checkpoint_dir: checkpoint_dir.into() }
    }

    pub fn execute(&self) -> Result<TrainReport> {
        // ── Rebuild the exact model from the saved sidecars ───────────────────
        let ckpt_manager = CheckpointManager::new(&self.checkpoint_dir);
        let cfg    = ckpt_manager.load_config()?;
        let schema = ckpt_manager.load_schema()?;

        let device = burn::backend::ndarray::NdArrayDevice::default();
        // Dropout 0.0: evaluation never drops activations
        let model_cfg = ScoreRegressorConfig::new(
            schema.numeric_width(), schema.vocab_sizes(),
            cfg.d_model, cfg.num_heads, cfg.num_layers, cfg.d_ff, 0.0,
        );
        let model: ScoreRegressor<EvalBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");

        // ── Re-run the deterministic data preparation ─────────────────────────
        let table    = CsvLoader::new(&cfg.data_path).load()?;
        let prepared = Preparer::new(&cfg.target).fit(&table)?;

        // The model was sized from the saved schema; refuse to score
        // a table that fits to a different one.
        if prepared.schema != schema {
            anyhow::bail!(
                "Schema fitted from '{}' does not match the saved schema — \
                 was the data file changed since training?",
                cfg.data_path,
            );
        }

        let samples = prepared.to_samples(&table)?;
        let (_train_samples, test_samples) = split_seeded(samples, TRAIN_FRACTION, cfg.seed);
        let test_dataset = TabDataset::new(test_samples);

        // ── Score the held-out split ──────────────────────────────────────────
        let metrics = evaluate(&model, test_dataset, cfg.batch_size, &device)?;

        Ok(TrainReport {
            numeric_columns:     schema.numeric.clone(),
            categorical_columns: schema.categorical.iter().map(|c| c.name.clone()).collect(),
            metrics,
        })
    }
}
