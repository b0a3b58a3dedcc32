// ============================================================
// Layer 4 — Digit Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<DigitSample>
// into tensors for the model forward pass.
//
// How batching works here:
//   Input:  Vec of N DigitSamples, each a 28x28 image
//   Output: DigitBatch with images [N, 784] and targets [N]
//
// The flattening from 28x28 to 784 happens here rather than in
// the model: the MLP only ever sees 1-D feature vectors. Pixels
// arrive as 0..=255 floats and are scaled to [0, 1].
//
// Reference: Burn Book §4 (Batcher)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::{DigitSample, IMAGE_SIDE};

/// Flattened input width: 28 * 28 pixels.
pub const INPUT_DIM: usize = IMAGE_SIDE * IMAGE_SIDE;

// ─── DigitBatch ───────────────────────────────────────────────────────────────
/// A batch of digit samples ready for the model forward pass.
///
/// B is the Burn Backend (e.g. NdArray, Autodiff<NdArray>) —
/// generic so the same batcher serves training and evaluation.
#[derive(Debug, Clone)]
pub struct DigitBatch<B: Backend> {
    /// Flattened images scaled to [0, 1] — shape: [batch_size, 784]
    pub images: Tensor<B, 2>,

    /// Integer class labels in 0..=9 — shape: [batch_size]
    pub targets: Tensor<B, 1, Int>,
}

// ─── DigitBatcher ─────────────────────────────────────────────────────────────
/// Holds the target device so tensors are created in the
/// right place.
#[derive(Clone, Debug)]
pub struct DigitBatcher<B: Backend> {
    device: B::Device,
}

impl<B: Backend> DigitBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<DigitSample, DigitBatch<B>> for DigitBatcher<B> {
    fn batch(&self, items: Vec<DigitSample>) -> DigitBatch<B> {
        let images: Vec<Tensor<B, 2>> = items
            .iter()
            .map(|sample| Data::<f32, 2>::from(sample.image))
            .map(|data| Tensor::<B, 2>::from_data(data.convert(), &self.device))
            .map(|tensor| tensor.reshape([1, INPUT_DIM]))
            .map(|tensor| tensor / 255.0)
            .collect();

        let labels: Vec<i32> = items.iter().map(|sample| sample.label as i32).collect();

        let images = Tensor::cat(images, 0);
        let targets = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device);

        DigitBatch { images, targets }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::DigitSample;

    type B = burn::backend::NdArray;

    fn constant_sample(pixel: f32, label: u8) -> DigitSample {
        DigitSample {
            image: [[pixel; IMAGE_SIDE]; IMAGE_SIDE],
            label,
        }
    }

    #[test]
    fn test_batch_shapes() {
        let batcher = DigitBatcher::<B>::new(Default::default());
        let batch = batcher.batch(vec![
            constant_sample(0.0, 3),
            constant_sample(255.0, 7),
            constant_sample(128.0, 1),
        ]);

        assert_eq!(batch.images.dims(), [3, INPUT_DIM]);
        assert_eq!(batch.targets.dims(), [3]);
    }

    #[test]
    fn test_pixels_scaled_to_unit_range() {
        let batcher = DigitBatcher::<B>::new(Default::default());
        let batch = batcher.batch(vec![constant_sample(255.0, 0)]);

        let values = batch.images.into_data().value;
        assert!((values[0] - 1.0).abs() < 1e-6);
        assert!(values.iter().all(|v| (*v - 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_targets_preserve_labels_in_order() {
        let batcher = DigitBatcher::<B>::new(Default::default());
        let batch = batcher.batch(vec![
            constant_sample(0.0, 9),
            constant_sample(0.0, 0),
            constant_sample(0.0, 4),
        ]);

        let values = batch.targets.into_data().value;
        assert_eq!(values, vec![9, 0, 4]);
    }
}
