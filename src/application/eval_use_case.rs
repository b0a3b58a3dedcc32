// ============================================================
// Layer 2 — EvalUseCase
// ============================================================
// Evaluates the retained best checkpoint on the held-out test
// split, to estimate generalisation error:
//
//   Step 1: Load the saved TrainConfig    (Layer 6 - infra)
//   Step 2: Rebuild the architecture      (Layer 5 - ml)
//   Step 3: Load the best snapshot        (Layer 6 - infra)
//   Step 4: Evaluate on the test split    (Layer 5 - ml)
//
// The test split is used in full (10k images) — it was never
// touched during training or validation.

use anyhow::Result;
use burn::data::dataloader::DataLoaderBuilder;
use burn::data::dataset::{vision::MnistDataset, Dataset};

use crate::data::batcher::DigitBatcher;
use crate::data::dataset::{DigitDataset, DigitSample};
use crate::infra::checkpoint::CheckpointStore;
use crate::ml::model::{Mlp, MlpConfig};
use crate::ml::trainer::{evaluate, Evaluation};

type EvalBackend = burn::backend::NdArray;

pub struct EvalUseCase {
    checkpoint_dir: String,
}

impl EvalUseCase {
    pub fn new(checkpoint_dir: String) -> Self {
        Self { checkpoint_dir }
    }

    pub fn execute(&self) -> Result<Evaluation> {
        let device = burn::backend::ndarray::NdArrayDevice::default();
        let store = CheckpointStore::new(self.checkpoint_dir.clone());

        // ── Step 1 + 2: rebuild the trained architecture ─────────────────────
        // Dropout config is restored too, but it is inert on this
        // backend — evaluation is deterministic either way.
        let cfg = store.load_config()?;
        let model: Mlp<EvalBackend> = MlpConfig::new(cfg.hidden_dims.clone())
            .with_dropout(cfg.dropout)
            .init(&device)?;

        // ── Step 3: load the best snapshot into it ───────────────────────────
        let model = store.load_model(model, &device)?;
        match store.load_best_epoch() {
            Ok(best) => tracing::info!(
                "Loaded snapshot from epoch {} (validation loss {:.4})",
                best.epoch,
                best.val_loss,
            ),
            Err(_) => tracing::info!("Loaded snapshot (no best-epoch record found)"),
        }

        // ── Step 4: evaluate on the full test split ──────────────────────────
        tracing::info!("Loading the MNIST test split");
        let samples: Vec<DigitSample> = MnistDataset::test()
            .iter()
            .map(DigitSample::from)
            .collect();
        tracing::info!("Evaluating on {} test images", samples.len());

        let loader = DataLoaderBuilder::new(DigitBatcher::<EvalBackend>::new(device.clone()))
            .batch_size(cfg.batch_size)
            .num_workers(1)
            .build(DigitDataset::new(samples));

        evaluate(&model, loader.as_ref())
    }
}
