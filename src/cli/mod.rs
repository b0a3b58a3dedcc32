// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — trains on a tiny MNIST subset, retaining
//                   the best checkpoint seen (early stopping)
//   2. `evaluate` — loads the best checkpoint and reports
//                   test-set loss and accuracy
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvalArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "mnist-overfit",
    version = "0.1.0",
    about = "Train a small MLP on a tiny MNIST subset with dropout and early stopping, then evaluate the best checkpoint."
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
            Commands::Train(args) => Self::run_train(args),
            Commands::Evaluate(args) => Self::run_evaluate(args),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!(
            "Starting training: {} epochs over a {}-image subset",
            args.epochs,
            args.train_size,
        );

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        let history = use_case.execute()?;

        println!(
            "Training complete after {} epochs. Best checkpoint saved (min. validation loss: {:.4}).",
            history.epochs(),
            history.best_val_loss().unwrap_or(f64::NAN),
        );
        Ok(())
    }

    /// Handles the `evaluate` subcommand.
    /// Loads the best checkpoint and prints test loss/accuracy.
    fn run_evaluate(args: EvalArgs) -> Result<()> {
        use crate::application::eval_use_case::EvalUseCase;

        let use_case = EvalUseCase::new(args.checkpoint_dir);
        let result = use_case.execute()?;

        println!(
            "Best checkpoint achieved test loss of {:.4} and accuracy of {:.4}",
            result.loss, result.accuracy,
        );
        Ok(())
    }
}
