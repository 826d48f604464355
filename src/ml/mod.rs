// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn training and model code.
//
// What's in this layer:
//
//   model.rs     — The tabular transformer regressor
//                  • one linear projection for the numeric block
//                  • one embedding table per categorical column
//                  • sinusoidal positional encoding
//                  • pre-norm encoder blocks (MHA + GELU FFN)
//                  • mean pooling + two-layer regression head
//
//   trainer.rs   — The training loop
//                  Forward pass, MSE loss, backward pass, Adam
//                  step, validation pass, early stopping with
//                  best-model snapshot and rollback
//
//   evaluator.rs — Held-out evaluation
//                  Collects all predictions and targets and
//                  computes RMSE and R² over the full set
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Vaswani et al. (2017) Attention Is All You Need
//            Gorishniy et al. (2021) Revisiting Deep Learning
//            Models for Tabular Data

/// Tabular transformer regression model
pub mod model;

/// Training loop with validation and early stopping
pub mod trainer;

/// RMSE / R² evaluation on held-out data
pub mod evaluator;
