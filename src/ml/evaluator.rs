// ============================================================
// Layer 5 — Evaluator
// ============================================================
// Runs the trained model over the held-out set with no
// parameter updates, collects every prediction and target,
// and computes RMSE and R² over the FULL set — not averaged
// per batch, which would weight the last partial batch wrong.

use anyhow::Result;
use burn::{data::dataloader::DataLoaderBuilder, prelude::*};

use crate::data::{batcher::TabBatcher, dataset::TabDataset};
use crate::ml::model::ScoreRegressor;
use crate::ml::trainer::EvalBackend;

/// Final regression metrics over the held-out set
#[derive(Debug, Clone)]
pub struct RegressionReport {
    /// Root mean squared error, in target units
    pub rmse: f64,
    /// Coefficient of determination; 1.0 is perfect, <= 0 means
    /// no better than predicting the mean
    pub r2: f64,
    /// Number of held-out samples scored
    pub sample_count: usize,
}

/// Score `model` on `dataset` and return the full-set metrics.
pub fn evaluate(
    model:      &ScoreRegressor<EvalBackend>,
    dataset:    TabDataset,
    batch_size: usize,
    device:     &<EvalBackend as Backend>::Device,
) -> Result<RegressionReport> {
    let batcher = TabBatcher::<EvalBackend>::new(device.clone());
    let loader  = DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset);

    let mut predictions: Vec<f32> = Vec::new();
    let mut targets:     Vec<f32> = Vec::new();

    for batch in loader.iter() {
        let batch_pred = model.forward(batch.numeric, batch.categorical);
        predictions.extend(tensor_to_vec(batch_pred)?);
        targets.extend(tensor_to_vec(batch.targets)?);
    }

    let report = RegressionReport {
        rmse:         rmse(&predictions, &targets),
        r2:           r_squared(&predictions, &targets),
        sample_count: targets.len(),
    };

    tracing::info!(
        "Evaluated {} held-out samples: rmse={:.4} r2={:.4}",
        report.sample_count, report.rmse, report.r2,
    );

    Ok(report)
}

fn tensor_to_vec(tensor: Tensor<EvalBackend, 1>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow::anyhow!("Cannot read tensor data: {e:?}"))
}

/// Root mean squared error over paired slices
pub fn rmse(predictions: &[f32], targets: &[f32]) -> f64 {
    if predictions.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(&p, &t)| {
            let d = (p - t) as f64;
            d * d
        })
        .sum();
    (sum_sq / predictions.len() as f64).sqrt()
}

/// Coefficient of determination: 1 - SS_res / SS_tot.
/// A constant target column has SS_tot = 0; we report 0.0
/// rather than dividing by zero.
pub fn r_squared(predictions: &[f32], targets: &[f32]) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    let mean: f64 = targets.iter().map(|&t| t as f64).sum::<f64>() / targets.len() as f64;

    let ss_res: f64 = predictions
        .iter()
        .zip(targets)
        .map(|(&p, &t)| {
            let d = p as f64 - t as f64;
            d * d
        })
        .sum();
    let ss_tot: f64 = targets
        .iter()
        .map(|&t| {
            let d = t as f64 - mean;
            d * d
        })
        .sum();

    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let values = [1.0f32, 2.0, 3.0, 4.0];
        assert_eq!(rmse(&values, &values), 0.0);
        assert_eq!(r_squared(&values, &values), 1.0);
    }

    #[test]
    fn test_rmse_known_value() {
        // Errors of 3 and 4 → mean square 12.5 → rmse 3.5355
        let predictions = [3.0f32, 4.0];
        let targets     = [0.0f32, 0.0];
        assert!((rmse(&predictions, &targets) - 12.5f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_mean_predictor_has_zero_r2() {
        let targets = [1.0f32, 2.0, 3.0];
        let predictions = [2.0f32, 2.0, 2.0];
        assert!(r_squared(&predictions, &targets).abs() < 1e-9);
    }

    #[test]
    fn test_r2_never_exceeds_one() {
        let targets = [10.0f32, 20.0, 30.0, 40.0];
        let predictions = [12.0f32, 18.0, 33.0, 39.0];
        let r2 = r_squared(&predictions, &targets);
        assert!(r2 <= 1.0);
        assert!(r2 > 0.9);
    }

    #[test]
    fn test_constant_targets_do_not_divide_by_zero() {
        let targets = [5.0f32, 5.0, 5.0];
        let predictions = [4.0f32, 5.0, 6.0];
        assert_eq!(r_squared(&predictions, &targets), 0.0);
    }

    #[test]
    fn test_empty_slices() {
        assert_eq!(rmse(&[], &[]), 0.0);
        assert_eq!(r_squared(&[], &[]), 0.0);
    }
}
