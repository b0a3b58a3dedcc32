// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the MNIST train source   (Layer 4 - data)
//   Step 2: Draw tiny disjoint subsets    (Layer 4 - data)
//   Step 3: Build datasets                (Layer 4 - data)
//   Step 4: Save config                   (Layer 6 - infra)
//   Step 5: Run training loop             (Layer 5 - ml)
//
// The deliberately tiny train split (200 images by default) is
// what makes the model overfit within a few hundred epochs, so
// the early-stopping checkpoint has something to demonstrate.
//
// Reference: Burn Book §5 (Training)

use anyhow::Result;
use burn::data::dataset::{vision::MnistDataset, Dataset};
use serde::{Deserialize, Serialize};

use crate::data::{dataset::DigitDataset, subset::draw_subsets};
use crate::domain::history::TrainingHistory;
use crate::infra::checkpoint::CheckpointStore;
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Serialisable so it can
// be saved next to the checkpoint and reloaded for evaluation.
// Defaults mirror the reference experiment: a 200-image train
// split, 1000 validation images, SGD at 0.05 for 500 epochs over
// a [64, 32] MLP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub checkpoint_dir: String,
    pub train_size: usize,
    pub val_size: usize,
    pub batch_size: usize,
    pub epochs: usize,
    pub lr: f64,
    pub hidden_dims: Vec<usize>,
    pub dropout: Option<f64>,
    pub log_every: usize,
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "checkpoints".to_string(),
            train_size: 200,
            val_size: 1000,
            batch_size: 32,
            epochs: 500,
            lr: 0.05,
            hidden_dims: vec![64, 32],
            dropout: None,
            log_every: 1,
            seed: 42,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end. Returns the
    /// per-epoch loss history.
    pub fn execute(&self) -> Result<TrainingHistory> {
        let cfg = &self.config;

        // ── Step 1: Load the MNIST train source ──────────────────────────────
        // Downloads the 60k-image split on first use, then reads
        // from the local cache.
        tracing::info!("Loading the MNIST train split");
        let source = MnistDataset::train();
        tracing::info!("Source has {} images", source.len());

        // ── Step 2: Draw the tiny train/validation subsets ───────────────────
        // Disjoint and seeded — see data::subset for why both matter.
        let (train_samples, val_samples) =
            draw_subsets(&source, cfg.train_size, cfg.val_size, cfg.seed)?;
        tracing::info!(
            "Subsets drawn: {} train, {} validation",
            train_samples.len(),
            val_samples.len(),
        );

        // ── Step 3: Build Burn datasets ──────────────────────────────────────
        let train_dataset = DigitDataset::new(train_samples);
        let val_dataset = DigitDataset::new(val_samples);

        // ── Step 4: Save config for evaluation ───────────────────────────────
        // The evaluate command needs the architecture to rebuild
        // the model before loading the best snapshot into it.
        let store = CheckpointStore::new(cfg.checkpoint_dir.clone());
        store.save_config(cfg)?;

        // ── Step 5: Run training loop (Layer 5) ──────────────────────────────
        let history = run_training(cfg, train_dataset, val_dataset, store)?;

        // The loop ran to completion; report which epoch's snapshot
        // survived as "the" model.
        let store = CheckpointStore::new(cfg.checkpoint_dir.clone());
        if let Ok(best) = store.load_best_epoch() {
            tracing::info!(
                "Retained checkpoint: epoch {} with validation loss {:.4}",
                best.epoch,
                best.val_loss,
            );
        }

        Ok(history)
    }
}
