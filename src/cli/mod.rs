// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — trains the model and reports test metrics
//   2. `evaluate` — re-scores a saved checkpoint

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

use crate::application::train_use_case::TrainReport;

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "student-score-transformer",
    version = "0.1.0",
    about = "Train a transformer regression model on tabular student performance data."
)]
pub struct Cli {
    /// The subcommand to run (train or evaluate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => Self::run_train(args),
            Commands::Evaluate(args) => Self::run_evaluate(args),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on '{}'", args.data_path);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        let report = use_case.execute()?;

        print_report(&report);
        println!("\nTraining complete. Checkpoint saved.");
        Ok(())
    }

    /// Handles the `evaluate` subcommand.
    /// Re-scores the saved checkpoint and prints the same report.
    fn run_evaluate(args: EvaluateArgs) -> Result<()> {
        use crate::application::evaluate_use_case::EvaluateUseCase;

        let use_case = EvaluateUseCase::new(args.checkpoint_dir);
        let report = use_case.execute()?;

        print_report(&report);
        Ok(())
    }
}

/// The final text report: classified column names plus the
/// held-out metrics with four-decimal formatting.
fn print_report(report: &TrainReport) {
    println!("\nColumn classification:");
    println!("  numeric:     {}", report.numeric_columns.join(", "));
    println!("  categorical: {}", report.categorical_columns.join(", "));
    println!(
        "\nHeld-out test metrics over {} samples:",
        report.metrics.sample_count
    );
    println!("  RMSE: {:.4}", report.metrics.rmse);
    println!("  R²:   {:.4}", report.metrics.r2);
}
