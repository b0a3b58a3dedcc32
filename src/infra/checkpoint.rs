// ============================================================
// Layer 6 — Checkpoint Store
// ============================================================
// Saves and restores model weights using Burn's CompactRecorder.
//
// What gets saved in the checkpoint directory:
//   1. best_model.mpk.gz   — parameters of the best model so far
//   2. best_epoch.json     — which epoch produced it, and its loss
//   3. train_config.json   — architecture + run hyperparameters
//
// Why save the config separately?
//   When loading for evaluation we need the exact architecture
//   (hidden_dims, dropout) to rebuild the model before loading
//   the weights into it.
//
// Burn's CompactRecorder:
//   - Serialises model parameters to MessagePack format
//   - Compresses with gzip for smaller file size
//   - Type-safe: loading fails if the architecture doesn't match
//
// Unlike a per-epoch checkpoint scheme there is exactly ONE
// snapshot key: the best model overwrites its predecessor. This
// is the whole early-stopping mechanism — when the model starts
// to overfit, the snapshot simply stops being replaced.
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::application::train_use_case::TrainConfig;
use crate::domain::history::TrainingHistory;
use crate::ml::model::Mlp;
use crate::ml::observer::EpochObserver;

/// File stem of the single snapshot key — the recorder adds
/// the .mpk.gz extension.
const SNAPSHOT_KEY: &str = "best_model";

/// Which epoch the retained snapshot came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestEpoch {
    pub epoch: usize,
    pub val_loss: f64,
}

/// Manages saving and loading of the best-model snapshot.
/// All files live in the configured directory.
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Create the store, creating the directory if needed.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_KEY)
    }

    /// Persist the full parameter snapshot, overwriting any
    /// previous snapshot at the same key.
    pub fn save_model<B: AutodiffBackend>(&self, model: &Mlp<B>) -> Result<()> {
        let path = self.snapshot_path();
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;
        tracing::debug!("Saved best-model checkpoint");
        Ok(())
    }

    /// Load the persisted snapshot into a freshly built model of
    /// matching architecture. Fails if the snapshot is absent or
    /// the parameter shapes don't match.
    pub fn load_model<B: Backend>(&self, model: Mlp<B>, device: &B::Device) -> Result<Mlp<B>> {
        let path = self.snapshot_path();
        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;
        Ok(model.load_record(record))
    }

    /// Record which epoch produced the retained snapshot.
    pub fn save_best_epoch(&self, epoch: usize, val_loss: f64) -> Result<()> {
        let path = self.dir.join("best_epoch.json");
        let json = serde_json::to_string(&BestEpoch { epoch, val_loss })?;
        fs::write(&path, json).with_context(|| "Failed to write best_epoch.json")?;
        Ok(())
    }

    pub fn load_best_epoch(&self) -> Result<BestEpoch> {
        let path = self.dir.join("best_epoch.json");
        let json = fs::read_to_string(&path)
            .with_context(|| "Cannot find 'best_epoch.json'. Have you run 'train' first?")?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save the training configuration so `evaluate` can rebuild
    /// the exact architecture later.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have run 'train' before 'evaluate'.",
                path.display()
            )
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── BestCheckpoint observer ──────────────────────────────────────────────────
/// The early-stopping policy: persist the snapshot whenever the
/// latest validation loss equals the minimum seen so far. Ties
/// count as an improvement, so a tied epoch overwrites the
/// snapshot with the later parameters (see domain::history).
pub struct BestCheckpoint {
    store: CheckpointStore,
}

impl BestCheckpoint {
    pub fn new(store: CheckpointStore) -> Self {
        Self { store }
    }
}

impl<B: AutodiffBackend> EpochObserver<B> for BestCheckpoint {
    fn on_epoch_end(
        &mut self,
        model: &Mlp<B>,
        epoch: usize,
        history: &TrainingHistory,
        _val_accuracy: f64,
    ) -> Result<()> {
        if history.is_current_best() {
            let val_loss = history.latest_val_loss().unwrap_or(f64::NAN);
            println!(
                "Found new best model at epoch {epoch} with a validation loss of {val_loss:.4}"
            );
            self.store.save_model(model)?;
            self.store.save_best_epoch(epoch, val_loss)?;
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::MlpConfig;
    use burn::module::AutodiffModule;

    type B = burn::backend::Autodiff<burn::backend::NdArray>;
    type Inner = burn::backend::NdArray;

    fn scratch_dir(tag: &str) -> String {
        let dir = std::env::temp_dir().join(format!(
            "mnist_overfit_{}_{}",
            tag,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir.to_string_lossy().into_owned()
    }

    #[test]
    fn test_snapshot_round_trip_restores_parameters() {
        let dir = scratch_dir("roundtrip");
        let store = CheckpointStore::new(dir.clone());
        let device = Default::default();

        let original: Mlp<B> = MlpConfig::new(vec![8]).init(&device).unwrap();
        store.save_model(&original).unwrap();

        // A freshly initialised model has different random weights;
        // loading must overwrite them with the saved ones.
        let fresh: Mlp<Inner> = MlpConfig::new(vec![8]).init(&device).unwrap();
        let loaded = store.load_model(fresh, &device).unwrap();

        assert_eq!(
            original.valid().output.weight.val().into_data(),
            loaded.output.weight.val().into_data(),
        );
        assert_eq!(
            original.valid().hidden[0].weight.val().into_data(),
            loaded.hidden[0].weight.val().into_data(),
        );

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_loading_without_snapshot_fails() {
        let dir = scratch_dir("missing");
        let store = CheckpointStore::new(dir.clone());
        let device = Default::default();

        let model: Mlp<Inner> = MlpConfig::new(vec![8]).init(&device).unwrap();
        assert!(store.load_model(model, &device).is_err());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_best_checkpoint_observer_follows_the_running_minimum() {
        let dir = scratch_dir("policy");
        let store = CheckpointStore::new(dir.clone());
        let mut observer = BestCheckpoint::new(store);

        let device = Default::default();
        let model: Mlp<B> = MlpConfig::new(vec![4]).init(&device).unwrap();

        // Losses 0.9, 0.7, 0.8, 0.7 → saved at epochs 0, 1 and 3.
        let mut history = TrainingHistory::new();
        let expected_epochs = [Some(0), Some(1), None, Some(3)];

        for (epoch, val_loss) in [0.9, 0.7, 0.8, 0.7].into_iter().enumerate() {
            history.record_epoch(1.0, val_loss);
            observer.on_epoch_end(&model, epoch, &history, 0.0).unwrap();

            let recorded = observer.store.load_best_epoch().ok().map(|b| b.epoch);
            match expected_epochs[epoch] {
                Some(want) => assert_eq!(recorded, Some(want)),
                // Epoch 2 is not a minimum: the epoch-1 record stays.
                None => assert_eq!(recorded, Some(1)),
            }
        }

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = scratch_dir("config");
        let store = CheckpointStore::new(dir.clone());

        let cfg = TrainConfig::default();
        store.save_config(&cfg).unwrap();
        let loaded = store.load_config().unwrap();

        assert_eq!(loaded.hidden_dims, cfg.hidden_dims);
        assert_eq!(loaded.epochs, cfg.epochs);
        assert_eq!(loaded.dropout, cfg.dropout);

        let _ = fs::remove_dir_all(dir);
    }
}
