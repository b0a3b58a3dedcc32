// ============================================================
// Layer 3 — Training History
// ============================================================
// Two append-only sequences of per-epoch losses, indexed by
// epoch number starting at 0.
//
// This type also owns the early-stopping decision:
//   "is the latest validation loss the minimum seen so far?"
//
// Note the tie semantics: a validation loss that EQUALS the
// running minimum counts as an improvement, so the checkpoint
// is overwritten on ties. With 32-bit losses exact repeats do
// happen on tiny datasets; we keep the equality check because
// the retained snapshot is then the LATEST of the tied epochs.
//
// Reference: Rust Book §8 (Vectors)

use serde::{Deserialize, Serialize};

/// Train and validation loss per epoch, appended in lock-step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingHistory {
    /// Mean training loss per epoch (index = epoch number)
    pub train_losses: Vec<f64>,

    /// Mean validation loss per epoch (index = epoch number)
    pub val_losses: Vec<f64>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one epoch's losses. Both sequences grow together,
    /// so they always have the same length.
    pub fn record_epoch(&mut self, train_loss: f64, val_loss: f64) {
        self.train_losses.push(train_loss);
        self.val_losses.push(val_loss);
    }

    /// Number of completed epochs.
    pub fn epochs(&self) -> usize {
        self.val_losses.len()
    }

    pub fn latest_train_loss(&self) -> Option<f64> {
        self.train_losses.last().copied()
    }

    pub fn latest_val_loss(&self) -> Option<f64> {
        self.val_losses.last().copied()
    }

    /// Minimum validation loss seen so far, if any epoch completed.
    pub fn best_val_loss(&self) -> Option<f64> {
        self.val_losses.iter().copied().reduce(f64::min)
    }

    /// True when the most recent validation loss equals the running
    /// minimum. Ties count as an improvement (see module docs), so
    /// the checkpoint policy persists on the tied epoch too.
    pub fn is_current_best(&self) -> bool {
        match (self.latest_val_loss(), self.best_val_loss()) {
            (Some(latest), Some(best)) => latest == best,
            _ => false,
        }
    }
}
