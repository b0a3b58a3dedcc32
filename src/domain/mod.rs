// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// The heart of the application — pure Rust types that define
// the core concepts of a training run.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - NO ML-specific code
//
// Why keep this layer pure?
//   The checkpoint-retention decision ("is the latest
//   validation loss the best seen so far?") is just a
//   comparison over a list of floats. Keeping it free of
//   tensors makes it trivially unit-testable.
//
// Reference: Rust Book §5 (Structs)

// Per-epoch train/validation loss records and the
// running-minimum query used by the checkpoint policy
pub mod history;
