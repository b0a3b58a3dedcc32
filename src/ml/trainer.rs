// ============================================================
// Layer 5 — Training Loop
// ============================================================
// The train / validate / observe loop, split into the three
// pieces the rest of the crate composes:
//
//   run_epoch — one pass of SGD updates over the train loader
//   evaluate  — read-only mean loss + accuracy over a loader
//   train     — repeats run_epoch + evaluate for n_epochs,
//               invoking the observer after every epoch
//
// Key Burn insight:
//   - Training uses an Autodiff backend for gradients
//   - model.valid() returns the model on the inner backend,
//     where dropout is inactive and evaluation is deterministic;
//     the training model is untouched, so there is no mode flag
//     to restore
//   - Gradients exist per backward() call, so there is no
//     zero_grad step between batches
//
// The loop has NO early-exit condition. It always runs to
// completion; early stopping is the checkpoint observer
// retaining the best snapshot, not loop control.
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    module::AutodiffModule,
    optim::{GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::sync::Arc;

use crate::application::train_use_case::TrainConfig;
use crate::data::batcher::{DigitBatch, DigitBatcher};
use crate::data::dataset::DigitDataset;
use crate::domain::history::TrainingHistory;
use crate::infra::checkpoint::{BestCheckpoint, CheckpointStore};
use crate::infra::metrics::MetricsLogger;
use crate::ml::model::{Mlp, MlpConfig};
use crate::ml::observer::{EpochObserver, ObserverSet, ProgressReporter};

type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;
type ValidBackend = burn::backend::NdArray;

/// Concrete entry point for the `train` command: builds the
/// model, the SGD optimizer and the two loaders, wires the
/// observers (progress, CSV metrics, best-checkpoint policy)
/// and runs the generic loop below.
pub fn run_training(
    cfg: &TrainConfig,
    train_dataset: DigitDataset,
    val_dataset: DigitDataset,
    store: CheckpointStore,
) -> Result<TrainingHistory> {
    // Device is chosen here and passed down explicitly — nothing
    // below consults global state.
    let device = burn::backend::ndarray::NdArrayDevice::default();
    tracing::info!("Using ndarray device: {:?}", device);

    let model: Mlp<TrainBackend> = MlpConfig::new(cfg.hidden_dims.clone())
        .with_dropout(cfg.dropout)
        .init(&device)?;
    tracing::info!(
        "Model ready: hidden layers {:?}, dropout {:?}",
        cfg.hidden_dims,
        cfg.dropout,
    );

    let mut optim = SgdConfig::new().init();

    // Training loader reshuffles every epoch; validation order is fixed.
    let train_batcher = DigitBatcher::<TrainBackend>::new(device.clone());
    let train_loader = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(1)
        .build(train_dataset);

    // Validation loader on the inner backend — no autodiff overhead.
    let val_batcher = DigitBatcher::<ValidBackend>::new(device.clone());
    let val_loader = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let mut observers = ObserverSet::new();
    observers.push(Box::new(ProgressReporter::every(cfg.log_every)));
    observers.push(Box::new(MetricsLogger::new(cfg.checkpoint_dir.clone())?));
    observers.push(Box::new(BestCheckpoint::new(store)));

    let (_, history) = train(
        model,
        &mut optim,
        cfg.lr,
        train_loader,
        val_loader,
        cfg.epochs,
        &mut observers,
    )?;

    tracing::info!("Training complete!");
    Ok(history)
}

// ─── Epoch runner ─────────────────────────────────────────────────────────────
/// One full pass over the training loader: forward, cross-entropy,
/// backward, SGD step per batch, in loader order. Returns the
/// updated model and the unweighted mean of per-batch losses.
///
/// An empty loader is a precondition violation — we fail fast
/// instead of dividing by zero.
pub fn run_epoch<B, O>(
    mut model: Mlp<B>,
    optim: &mut O,
    lr: f64,
    loader: &dyn DataLoader<DigitBatch<B>>,
) -> Result<(Mlp<B>, f64)>
where
    B: AutodiffBackend,
    O: Optimizer<Mlp<B>, B>,
{
    let mut loss_sum = 0.0f64;
    let mut batches = 0usize;

    for batch in loader.iter() {
        let (loss, _) = model.forward_loss(batch.images, batch.targets);

        loss_sum += loss.clone().into_scalar().elem::<f64>();
        batches += 1;

        // Backward pass + SGD update
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(lr, model, grads);
    }

    if batches == 0 {
        bail!("training loader yielded no batches — is the train split empty?");
    }

    Ok((model, loss_sum / batches as f64))
}

// ─── Evaluator ────────────────────────────────────────────────────────────────
/// Mean loss and accuracy over one loader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f64,
    pub accuracy: f64,
}

/// Read-only pass: no gradients, no parameter updates. Call with
/// `model.valid()` so dropout is inactive.
///
/// Every batch weighs equally in both averages regardless of its
/// size — a documented approximation (the trailing short batch
/// counts as much as a full one), not per-sample weighting.
pub fn evaluate<B: Backend>(
    model: &Mlp<B>,
    loader: &dyn DataLoader<DigitBatch<B>>,
) -> Result<Evaluation> {
    let mut loss_sum = 0.0f64;
    let mut accuracy_sum = 0.0f64;
    let mut batches = 0usize;

    for batch in loader.iter() {
        let batch_size = batch.targets.dims()[0];
        let (loss, logits) = model.forward_loss(batch.images, batch.targets.clone());

        loss_sum += loss.into_scalar().elem::<f64>();

        // argmax(1) returns shape [batch, 1] — squeeze to [batch]
        // before comparing with the targets which are [batch]
        let predictions = logits.argmax(1).flatten::<1>(0, 1);
        let correct: i64 = predictions
            .equal(batch.targets)
            .int()
            .sum()
            .into_scalar()
            .elem();

        accuracy_sum += correct as f64 / batch_size as f64;
        batches += 1;
    }

    if batches == 0 {
        bail!("evaluation loader yielded no batches — is the split empty?");
    }

    Ok(Evaluation {
        loss: loss_sum / batches as f64,
        accuracy: accuracy_sum / batches as f64,
    })
}

// ─── Training orchestrator ────────────────────────────────────────────────────
/// Runs `n_epochs` epochs of train + validate, invoking the
/// observer after each one. Returns the trained model and the
/// per-epoch loss history. `n_epochs == 0` returns immediately
/// with empty histories and never touches the observer.
pub fn train<B, O>(
    mut model: Mlp<B>,
    optim: &mut O,
    lr: f64,
    train_loader: Arc<dyn DataLoader<DigitBatch<B>>>,
    val_loader: Arc<dyn DataLoader<DigitBatch<B::InnerBackend>>>,
    n_epochs: usize,
    observer: &mut dyn EpochObserver<B>,
) -> Result<(Mlp<B>, TrainingHistory)>
where
    B: AutodiffBackend,
    O: Optimizer<Mlp<B>, B>,
{
    let mut history = TrainingHistory::new();

    for epoch in 0..n_epochs {
        let (updated, train_loss) = run_epoch(model, optim, lr, train_loader.as_ref())?;
        model = updated;

        // model.valid() → Mlp<B::InnerBackend>, dropout inactive
        let validation = evaluate(&model.valid(), val_loader.as_ref())?;

        history.record_epoch(train_loss, validation.loss);
        observer.on_epoch_end(&model, epoch, &history, validation.accuracy)?;
    }

    Ok((model, history))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batcher::DigitBatcher;
    use crate::data::dataset::{DigitDataset, DigitSample, IMAGE_SIDE};
    use crate::ml::model::MlpConfig;
    use burn::data::dataloader::DataLoaderBuilder;
    use burn::optim::SgdConfig;
    use std::cell::Cell;
    use std::rc::Rc;

    type TB = burn::backend::Autodiff<burn::backend::NdArray>;
    type EB = burn::backend::NdArray;

    fn samples(n: usize) -> Vec<DigitSample> {
        (0..n)
            .map(|i| DigitSample {
                image: [[(i * 13 % 256) as f32; IMAGE_SIDE]; IMAGE_SIDE],
                label: (i % 10) as u8,
            })
            .collect()
    }

    fn loader_of<B: Backend>(
        samples: Vec<DigitSample>,
        batch_size: usize,
    ) -> Arc<dyn DataLoader<DigitBatch<B>>> {
        let batcher = DigitBatcher::<B>::new(Default::default());
        DataLoaderBuilder::new(batcher)
            .batch_size(batch_size)
            .build(DigitDataset::new(samples))
    }

    struct Counting {
        calls: Rc<Cell<usize>>,
    }

    impl EpochObserver<TB> for Counting {
        fn on_epoch_end(
            &mut self,
            _model: &Mlp<TB>,
            _epoch: usize,
            _history: &TrainingHistory,
            _val_accuracy: f64,
        ) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_zero_epochs_returns_empty_histories() {
        let device = Default::default();
        let model: Mlp<TB> = MlpConfig::new(vec![8]).init(&device).unwrap();
        let mut optim = SgdConfig::new().init();

        let calls = Rc::new(Cell::new(0));
        let mut observer = Counting {
            calls: Rc::clone(&calls),
        };

        let (_, history) = train(
            model,
            &mut optim,
            0.05,
            loader_of::<TB>(samples(8), 4),
            loader_of::<EB>(samples(4), 4),
            0,
            &mut observer,
        )
        .unwrap();

        assert_eq!(history.epochs(), 0);
        assert!(history.train_losses.is_empty());
        assert!(history.val_losses.is_empty());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_one_epoch_records_losses_and_updates_parameters() {
        let device = Default::default();
        let model: Mlp<TB> = MlpConfig::new(vec![16]).init(&device).unwrap();
        let initial_weights = model.output.weight.val().into_data();

        let mut optim = SgdConfig::new().init();
        let calls = Rc::new(Cell::new(0));
        let mut observer = Counting {
            calls: Rc::clone(&calls),
        };

        let (trained, history) = train(
            model,
            &mut optim,
            0.05,
            loader_of::<TB>(samples(16), 4),
            loader_of::<EB>(samples(8), 4),
            1,
            &mut observer,
        )
        .unwrap();

        assert_eq!(history.train_losses.len(), 1);
        assert_eq!(history.val_losses.len(), 1);
        assert!(history.train_losses[0].is_finite());
        assert_eq!(calls.get(), 1);

        // SGD with a non-trivial learning rate must have moved the weights
        let trained_weights = trained.output.weight.val().into_data();
        assert_ne!(initial_weights, trained_weights);
    }

    #[test]
    fn test_empty_train_split_fails_fast() {
        let device = Default::default();
        let model: Mlp<TB> = MlpConfig::new(vec![8]).init(&device).unwrap();
        let mut optim = SgdConfig::new().init();

        let result = run_epoch(model, &mut optim, 0.05, loader_of::<TB>(Vec::new(), 4).as_ref());
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_evaluation_split_fails_fast() {
        let device = Default::default();
        let model: Mlp<EB> = MlpConfig::new(vec![8]).init(&device).unwrap();

        let result = evaluate(&model, loader_of::<EB>(Vec::new(), 4).as_ref());
        assert!(result.is_err());
    }

    #[test]
    fn test_evaluation_is_deterministic_without_dropout_noise() {
        let device = Default::default();
        // Dropout configured, but evaluate runs on the inner backend
        // where it is inactive.
        let model: Mlp<TB> = MlpConfig::new(vec![16])
            .with_dropout(Some(0.8))
            .init(&device)
            .unwrap();
        let model = model.valid();

        let loader = loader_of::<EB>(samples(12), 5);
        let first = evaluate(&model, loader.as_ref()).unwrap();
        let second = evaluate(&model, loader.as_ref()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_epoch_runner_reports_mean_over_all_batches() {
        let device = Default::default();
        let model: Mlp<TB> = MlpConfig::new(vec![8]).init(&device).unwrap();
        let mut optim = SgdConfig::new().init();

        // 10 samples in batches of 4 → 3 batches, last one short.
        // A learning rate of 0 keeps the parameters fixed, so the
        // reported mean must equal the evaluator's batch-mean loss
        // over the same data in the same order.
        let (trained, train_loss) = run_epoch(
            model,
            &mut optim,
            0.0,
            loader_of::<TB>(samples(10), 4).as_ref(),
        )
        .unwrap();

        let check = evaluate(&trained.valid(), loader_of::<EB>(samples(10), 4).as_ref()).unwrap();
        assert!((train_loss - check.loss).abs() < 1e-5);
    }
}
