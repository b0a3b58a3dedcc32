// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains all tensor-touching code. The model, the
// training loop and the observer seam live here; nothing above
// it ever calls into Burn's tensor API directly.
//
// What's in this layer:
//
//   model.rs    — The feed-forward classifier
//                 • Linear stack built from hidden_dims
//                 • ReLU activations, optional dropout
//                 • final Linear to 10 raw logits
//
//   trainer.rs  — run_epoch / evaluate / train
//                 forward pass, cross-entropy, backward pass,
//                 SGD step, per-epoch validation
//
//   observer.rs — EpochObserver trait + composition
//                 how checkpointing, progress printing and
//                 metrics logging hook into the loop
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Srivastava et al. (2014) Dropout

/// Feed-forward classifier architecture
pub mod model;

/// Epoch runner, evaluator and training orchestrator
pub mod trainer;

/// Epoch observer trait, fan-out set and progress reporter
pub mod observer;
