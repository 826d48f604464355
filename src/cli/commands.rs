// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `evaluate`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Every hyperparameter defaults to the experiment's fixed
// value, so a bare `train` reproduces the reference run.

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the regression model on a tabular CSV file
    Train(TrainArgs),

    /// Re-score a trained checkpoint on the held-out test split
    Evaluate(EvaluateArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Path to the input CSV file (header row required)
    #[arg(long, default_value = "data/StudentPerformanceFactors.csv")]
    pub data_path: String,

    /// Name of the numeric column to predict
    #[arg(long, default_value = "Exam_Score")]
    pub target: String,

    /// Directory to save the model checkpoint, config and schema
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Width of every feature token (d_model in the paper)
    #[arg(long, default_value_t = 64)]
    pub d_model: usize,

    /// Number of attention heads in multi-head attention
    /// d_model must be divisible by num_heads
    #[arg(long, default_value_t = 4)]
    pub num_heads: usize,

    /// Number of stacked encoder blocks
    #[arg(long, default_value_t = 3)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 256)]
    pub d_ff: usize,

    /// Dropout probability — randomly zeroes activations during
    /// training to prevent overfitting
    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Consecutive non-improving validation epochs before
    /// training stops and rolls back to the best model
    #[arg(long, default_value_t = 10)]
    pub patience: usize,

    /// Upper bound on training epochs if early stopping never fires
    #[arg(long, default_value_t = 100)]
    pub max_epochs: usize,

    /// RNG seed for the train/test and train/validation shuffles
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:      a.data_path,
            target:         a.target,
            checkpoint_dir: a.checkpoint_dir,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            d_ff:           a.d_ff,
            dropout:        a.dropout,
            batch_size:     a.batch_size,
            lr:             a.lr,
            patience:       a.patience,
            max_epochs:     a.max_epochs,
            seed:           a.seed,
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Directory where the checkpoint was saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
