// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Why log metrics to CSV?
//   - Easy to open in a spreadsheet or plot with any tool
//   - The loss curves are the whole point of this project:
//     val_loss rising while train_loss keeps falling IS
//     overfitting, and the row where val_loss bottoms out is
//     the epoch the checkpoint policy retained
//
// Metrics recorded per epoch:
//   - epoch:      the epoch index (0, 1, 2, ..)
//   - train_loss: mean cross-entropy over the training batches
//   - val_loss:   mean cross-entropy over the validation batches
//   - val_acc:    mean per-batch accuracy on the validation set
//
// Output file: <checkpoint_dir>/metrics.csv
//
// Reference: Rust Book §12 (I/O and File Handling)

use anyhow::Result;
use burn::tensor::backend::AutodiffBackend;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

use crate::domain::history::TrainingHistory;
use crate::ml::model::Mlp;
use crate::ml::observer::EpochObserver;

/// Appends one CSV row per epoch. This is an observer like any
/// other — it never affects control flow or the checkpoint.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create the logger, writing the CSV header if the file is
    /// new. Appending across runs is allowed on purpose.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,train_loss,val_loss,val_acc")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    fn append_row(
        &self,
        epoch: usize,
        train_loss: f64,
        val_loss: f64,
        val_acc: f64,
    ) -> Result<()> {
        let mut f = OpenOptions::new().append(true).open(&self.csv_path)?;
        writeln!(f, "{},{:.6},{:.6},{:.6}", epoch, train_loss, val_loss, val_acc)?;
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}

impl<B: AutodiffBackend> EpochObserver<B> for MetricsLogger {
    fn on_epoch_end(
        &mut self,
        _model: &Mlp<B>,
        epoch: usize,
        history: &TrainingHistory,
        val_accuracy: f64,
    ) -> Result<()> {
        self.append_row(
            epoch,
            history.latest_train_loss().unwrap_or(f64::NAN),
            history.latest_val_loss().unwrap_or(f64::NAN),
            val_accuracy,
        )
    }
}
