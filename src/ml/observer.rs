// ============================================================
// Layer 5 — Epoch Observers
// ============================================================
// After every epoch the training orchestrator hands the model,
// the epoch index, the loss history and the latest validation
// accuracy to an observer. All "what do we do with an epoch's
// results" behaviour lives behind this trait:
//
//   - ProgressReporter (here)       → prints stats every N epochs
//   - BestCheckpoint  (infra layer) → persists the best snapshot
//   - MetricsLogger   (infra layer) → appends a CSV row
//
// Observers never affect control flow — the loop always runs to
// completion. "Early stopping" in this project means retaining
// the best checkpoint seen, not terminating the loop.
//
// Multiple observers compose through ObserverSet, a simple
// fan-out that invokes each one in order.
//
// Reference: Rust Book §17 (Trait Objects)

use anyhow::Result;
use burn::tensor::backend::AutodiffBackend;

use crate::domain::history::TrainingHistory;
use crate::ml::model::Mlp;

/// Receives the results of one completed epoch.
pub trait EpochObserver<B: AutodiffBackend> {
    fn on_epoch_end(
        &mut self,
        model: &Mlp<B>,
        epoch: usize,
        history: &TrainingHistory,
        val_accuracy: f64,
    ) -> Result<()>;
}

// ─── ObserverSet ──────────────────────────────────────────────────────────────
/// Fan-out composite: forwards every epoch to each registered
/// observer, in registration order. An observer error aborts
/// the run (no partial-failure semantics).
pub struct ObserverSet<B: AutodiffBackend> {
    observers: Vec<Box<dyn EpochObserver<B>>>,
}

impl<B: AutodiffBackend> ObserverSet<B> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn push(&mut self, observer: Box<dyn EpochObserver<B>>) {
        self.observers.push(observer);
    }
}

impl<B: AutodiffBackend> Default for ObserverSet<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: AutodiffBackend> EpochObserver<B> for ObserverSet<B> {
    fn on_epoch_end(
        &mut self,
        model: &Mlp<B>,
        epoch: usize,
        history: &TrainingHistory,
        val_accuracy: f64,
    ) -> Result<()> {
        for observer in &mut self.observers {
            observer.on_epoch_end(model, epoch, history, val_accuracy)?;
        }
        Ok(())
    }
}

// ─── ProgressReporter ─────────────────────────────────────────────────────────
/// Prints the latest stats every `every` epochs. Purely
/// informational — no persisted state, no control flow.
pub struct ProgressReporter {
    every: usize,
}

impl ProgressReporter {
    /// A cadence of 0 would never report; clamp it to 1.
    pub fn every(every: usize) -> Self {
        Self {
            every: every.max(1),
        }
    }

    fn should_report(&self, epoch: usize) -> bool {
        epoch % self.every == 0
    }
}

impl<B: AutodiffBackend> EpochObserver<B> for ProgressReporter {
    fn on_epoch_end(
        &mut self,
        _model: &Mlp<B>,
        epoch: usize,
        history: &TrainingHistory,
        val_accuracy: f64,
    ) -> Result<()> {
        if self.should_report(epoch) {
            println!(
                "[EPOCH {epoch}] Train loss: {:.4}, Validation loss: {:.4}, Validation accuracy: {:.4}",
                history.latest_train_loss().unwrap_or(f64::NAN),
                history.latest_val_loss().unwrap_or(f64::NAN),
                val_accuracy,
            );
        }
        Ok(())
    }
}
