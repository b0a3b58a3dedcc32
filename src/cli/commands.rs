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
// The defaults reproduce the reference overfitting experiment;
// add --dropout to run the regularised variant.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the classifier on a tiny MNIST subset
    Train(TrainArgs),

    /// Evaluate the retained best checkpoint on the test split
    Evaluate(EvalArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory to save the best checkpoint, config and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Training subset size — small on purpose, so the model
    /// overfits and early stopping has something to show
    #[arg(long, default_value_t = 200)]
    pub train_size: usize,

    /// Validation subset size, disjoint from the training subset
    #[arg(long, default_value_t = 1000)]
    pub val_size: usize,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Number of full passes through the training subset.
    /// The loop always runs to completion; "early stopping" is
    /// the retained checkpoint, not an exit condition
    #[arg(long, default_value_t = 500)]
    pub epochs: usize,

    /// SGD learning rate
    #[arg(long, default_value_t = 0.05)]
    pub lr: f64,

    /// Hidden layer widths, comma separated (e.g. 64,32)
    #[arg(long, value_delimiter = ',', default_values_t = [64, 32])]
    pub hidden_dims: Vec<usize>,

    /// Dropout probability after each hidden activation.
    /// Omit the flag to train without dropout
    #[arg(long)]
    pub dropout: Option<f64>,

    /// Print progress every N epochs
    #[arg(long, default_value_t = 1)]
    pub log_every: usize,

    /// Seed for the subset draw and the per-epoch shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            checkpoint_dir: a.checkpoint_dir,
            train_size: a.train_size,
            val_size: a.val_size,
            batch_size: a.batch_size,
            epochs: a.epochs,
            lr: a.lr,
            hidden_dims: a.hidden_dims,
            dropout: a.dropout,
            log_every: a.log_every,
            seed: a.seed,
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Directory where the checkpoint was saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
