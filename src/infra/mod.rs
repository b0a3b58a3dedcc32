// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence concerns:
//
//   checkpoint.rs — Saving and loading model weights.
//                   Uses Burn's CompactRecorder to serialise
//                   the parameters of the best model seen so
//                   far, plus the TrainConfig as JSON so
//                   `evaluate` can rebuild the architecture.
//                   Also home of the BestCheckpoint observer —
//                   the early-stopping policy itself.
//
//   metrics.rs    — Training metrics logging.
//                   Writes epoch-level metrics (losses,
//                   validation accuracy) to a CSV file for
//                   later analysis and plotting.
//
// Reference: Rust Book §7 (Modules)
//            Burn Book §5 (Checkpointing)

/// Best-model snapshot store and checkpoint observer
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
