// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between the raw MNIST source and GPU-ready
// tensor batches.
//
// The pipeline flows in this order:
//
//   MnistDataset (burn, downloads the 28x28 images)
//       │
//       ▼
//   subset        → draws small, disjoint, seeded
//       │            train/validation samples
//       ▼
//   DigitDataset  → implements Burn's Dataset trait
//       │
//       ▼
//   DigitBatcher  → stacks samples into tensor batches
//       │
//       ▼
//   DataLoader    → feeds batches to the training loop
//                   (shuffled per epoch for training,
//                    fixed order for validation/test)
//
// Each module is responsible for exactly one step.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Sample and dataset types over 28x28 grayscale digits
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Seeded, disjoint train/validation subsetting
pub mod subset;
