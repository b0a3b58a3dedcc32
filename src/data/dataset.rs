// ============================================================
// Layer 4 — Digit Dataset
// ============================================================
// Owns the in-memory sample type and the Dataset impl that
// Burn's DataLoader iterates over.
//
// We copy the items we draw out of Burn's MnistDataset into
// our own DigitSample so the rest of the crate (and the unit
// tests) never depend on how the source dataset stores its
// 60k images.
//
// Reference: Burn Book §4 (Datasets)

use burn::data::dataset::{vision::MnistItem, Dataset};
use serde::{Deserialize, Serialize};

/// Image height and width — the source images are 28x28 grayscale.
pub const IMAGE_SIDE: usize = 28;

/// One labelled image, pixels as raw 0..=255 floats.
/// Normalisation to [0, 1] happens in the batcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigitSample {
    /// Pixel rows, row-major
    pub image: [[f32; IMAGE_SIDE]; IMAGE_SIDE],

    /// Class label in 0..=9
    pub label: u8,
}

impl From<MnistItem> for DigitSample {
    fn from(item: MnistItem) -> Self {
        Self {
            image: item.image,
            label: item.label,
        }
    }
}

/// A fixed, in-memory split (train, validation or test).
/// Ownership of the samples is transferred once at setup and
/// the collection is never mutated afterwards — shuffling is
/// the DataLoader's job.
pub struct DigitDataset {
    samples: Vec<DigitSample>,
}

impl DigitDataset {
    pub fn new(samples: Vec<DigitSample>) -> Self {
        Self { samples }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

impl Dataset<DigitSample> for DigitDataset {
    fn get(&self, index: usize) -> Option<DigitSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
