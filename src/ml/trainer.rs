// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader and Adam,
// with validation-based early stopping.
//
// Key Burn insight:
//   - Training uses TrainBackend (Autodiff<NdArray>) for gradients
//   - model.valid() returns the model on EvalBackend (NdArray)
//   - Validation batcher must also use EvalBackend
//   - Dropout is automatically disabled on the valid model
//
// Early stopping keeps a snapshot (a clone of all parameters)
// of the best model seen so far. When validation loss fails to
// improve for `patience` consecutive epochs, training halts and
// the snapshot — not the last epoch's parameters — is returned.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam
//            Prechelt (1998) Early Stopping — But When?

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    module::AutodiffModule,
    nn::loss::{MseLoss, Reduction},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::TabBatcher, dataset::TabDataset};
use crate::domain::schema::FeatureSchema;
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{ScoreRegressor, ScoreRegressorConfig};

pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;
pub type EvalBackend  = burn::backend::NdArray;

// ─── EarlyStopping ────────────────────────────────────────────────────────────
/// Validation-based early stopping with best-model snapshotting.
///
/// Generic over the snapshot type so the policy can be tested
/// without a tensor backend: any Clone value stands in for the
/// model parameters.
pub struct EarlyStopping<M> {
    patience:   usize,
    best_loss:  f64,
    bad_epochs: usize,
    best:       Option<M>,
}

impl<M: Clone> EarlyStopping<M> {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_loss:  f64::INFINITY,
            bad_epochs: 0,
            best:       None,
        }
    }

    /// Record one epoch's validation loss.
    ///
    /// Tie policy: a loss strictly greater than the best so far
    /// increments the non-improvement counter; equal-or-better
    /// resets the counter to zero and snapshots the model.
    ///
    /// Returns true once the counter reaches the patience
    /// threshold — the caller should stop training.
    pub fn observe(&mut self, val_loss: f64, model: &M) -> bool {
        if val_loss > self.best_loss {
            self.bad_epochs += 1;
        } else {
            self.best_loss  = val_loss;
            self.bad_epochs = 0;
            self.best       = Some(model.clone());
        }
        self.bad_epochs >= self.patience
    }

    /// Lowest validation loss seen so far
    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }

    /// The snapshot taken at the best epoch, if any epoch was
    /// observed. Consumes the stopper.
    pub fn into_best(self) -> Option<M> {
        self.best
    }
}

// ─── Training entry point ─────────────────────────────────────────────────────
pub fn run_training(
    cfg:           &TrainConfig,
    schema:        &FeatureSchema,
    train_dataset: TabDataset,
    val_dataset:   TabDataset,
    ckpt_manager:  &CheckpointManager,
) -> Result<ScoreRegressor<TrainBackend>> {
    let device = burn::backend::ndarray::NdArrayDevice::default();
    tracing::info!("Using ndarray device: {:?}", device);
    train_loop(cfg, schema, train_dataset, val_dataset, ckpt_manager, device)
}

fn train_loop(
    cfg:           &TrainConfig,
    schema:        &FeatureSchema,
    train_dataset: TabDataset,
    val_dataset:   TabDataset,
    ckpt_manager:  &CheckpointManager,
    device:        burn::backend::ndarray::NdArrayDevice,
) -> Result<ScoreRegressor<TrainBackend>> {

    // Seed the backend RNG so weight initialisation and dropout
    // masks are reproducible across runs
    TrainBackend::seed(cfg.seed);

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = ScoreRegressorConfig::new(
        schema.numeric_width(), schema.vocab_sizes(),
        cfg.d_model, cfg.num_heads, cfg.num_layers, cfg.d_ff, cfg.dropout,
    );
    let mut model: ScoreRegressor<TrainBackend> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {} blocks, d_model={}, {} feature tokens",
        cfg.num_layers, cfg.d_model, schema.sequence_length(),
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let optim_cfg = AdamConfig::new().with_epsilon(1e-8);
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = TabBatcher::<TrainBackend>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (EvalBackend — no autodiff overhead) ───────────
    let val_batcher = TabBatcher::<EvalBackend>::new(device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let metrics_logger = MetricsLogger::new(&cfg.checkpoint_dir)?;
    let mut stopper: EarlyStopping<ScoreRegressor<TrainBackend>> =
        EarlyStopping::new(cfg.patience);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.max_epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let (loss, _) = model.forward_loss(
                batch.numeric,
                batch.categorical,
                batch.targets,
            );

            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            train_loss_sum += loss_val;
            train_batches  += 1;

            // Backward pass + Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → ScoreRegressor<EvalBackend>, dropout disabled,
        // no parameter updates
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;

        for batch in val_loader.iter() {
            let predictions = model_valid.forward(batch.numeric, batch.categorical);
            let batch_loss: f64 = MseLoss::new()
                .forward(predictions, batch.targets, Reduction::Mean)
                .into_scalar().elem::<f64>();
            val_loss_sum += batch_loss;
            val_batches  += 1;
        }

        let avg_val_loss = if val_batches > 0 {
            val_loss_sum / val_batches as f64
        } else { f64::NAN };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4}",
            epoch, cfg.max_epochs, avg_train_loss, avg_val_loss,
        );
        metrics_logger.log(&EpochMetrics::new(epoch, avg_train_loss, avg_val_loss))?;

        if stopper.observe(avg_val_loss, &model) {
            tracing::info!(
                "Early stopping at epoch {} (best val_loss={:.4})",
                epoch,
                stopper.best_loss(),
            );
            break;
        }
    }

    // Roll back to the parameters snapshotted at the best epoch.
    // If no epoch ever ran the untouched model is returned as-is.
    if let Some(best) = stopper.into_best() {
        model = best;
    }

    ckpt_manager.save_model(&model)?;
    tracing::info!("Training complete, best model checkpointed");

    Ok(model)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    /// Drive the stopper with a fixed loss sequence, snapshotting the
    /// epoch index. Returns (stop_epoch, restored_snapshot).
    fn run_sequence(losses: &[f64], patience: usize) -> (Option<usize>, Option<usize>) {
        let mut stopper: EarlyStopping<usize> = EarlyStopping::new(patience);
        let mut stopped_at = None;
        for (epoch, &loss) in losses.iter().enumerate() {
            if stopper.observe(loss, &epoch) {
                stopped_at = Some(epoch);
                break;
            }
        }
        (stopped_at, stopper.into_best())
    }

    #[test]
    fn test_halts_at_best_epoch_plus_patience() {
        // Best loss at index 1, then no improvement
        let losses = [3.0, 2.0, 2.5, 2.6, 2.7, 2.8, 2.9];
        let (stopped_at, best) = run_sequence(&losses, 3);
        assert_eq!(stopped_at, Some(1 + 3));
        // The snapshot is from the best epoch, not the last one
        assert_eq!(best, Some(1));
    }

    #[test]
    fn test_equal_loss_counts_as_improvement() {
        // Ties reset the counter and refresh the snapshot
        let losses = [2.0, 2.0, 2.0, 2.0];
        let (stopped_at, best) = run_sequence(&losses, 2);
        assert_eq!(stopped_at, None);
        assert_eq!(best, Some(3));
    }

    #[test]
    fn test_improvement_resets_counter() {
        // One bad epoch, then improvement, then patience bad epochs
        let losses = [3.0, 3.5, 2.0, 2.5, 2.5];
        let (stopped_at, best) = run_sequence(&losses, 2);
        assert_eq!(stopped_at, Some(4));
        assert_eq!(best, Some(2));
    }

    #[test]
    fn test_never_stops_while_improving() {
        let losses = [5.0, 4.0, 3.0, 2.0, 1.0];
        let (stopped_at, best) = run_sequence(&losses, 1);
        assert_eq!(stopped_at, None);
        assert_eq!(best, Some(4));
    }

    #[test]
    fn test_no_observations_means_no_snapshot() {
        let stopper: EarlyStopping<usize> = EarlyStopping::new(3);
        assert_eq!(stopper.into_best(), None);
    }
}
