// ============================================================
// Layer 4 — Subset Sampler
// ============================================================
// Draws small, DISJOINT train and validation samples from the
// full 60k-image source dataset.
//
// Why subsample at all?
//   The whole point of this project is to demonstrate
//   overfitting. A 200-image training set is small enough for
//   a few-thousand-parameter MLP to memorise, which makes the
//   train/validation loss curves diverge visibly.
//
// Why disjoint?
//   If a training image leaked into the validation set, the
//   validation loss would no longer measure generalisation and
//   early stopping would retain the wrong checkpoint.
//
// The draw is seeded so a run is reproducible end to end.
//
// Reference: rand crate documentation (index::sample)

use anyhow::{bail, Result};
use burn::data::dataset::{vision::MnistItem, Dataset};
use rand::{rngs::StdRng, SeedableRng};

use crate::data::dataset::DigitSample;

/// Draw `n_train + n_val` distinct indices from `source` and
/// return the corresponding samples as two disjoint sets.
///
/// Fails if the source is too small for the request.
pub fn draw_subsets<D: Dataset<MnistItem>>(
    source: &D,
    n_train: usize,
    n_val: usize,
    seed: u64,
) -> Result<(Vec<DigitSample>, Vec<DigitSample>)> {
    let total = source.len();
    let wanted = n_train + n_val;
    if wanted > total {
        bail!(
            "requested {} train + {} validation samples but the source only has {}",
            n_train,
            n_val,
            total
        );
    }

    let mut rng = StdRng::seed_from_u64(seed);

    // Distinct indices, uniformly drawn — every index appears at
    // most once, which is what makes the two sets disjoint.
    let indices = rand::seq::index::sample(&mut rng, total, wanted);

    let fetch = |index: usize| -> Result<DigitSample> {
        source
            .get(index)
            .map(DigitSample::from)
            .ok_or_else(|| anyhow::anyhow!("source dataset has no item at index {index}"))
    };

    let mut train = Vec::with_capacity(n_train);
    let mut val = Vec::with_capacity(n_val);
    for (position, index) in indices.iter().enumerate() {
        if position < n_train {
            train.push(fetch(index)?);
        } else {
            val.push(fetch(index)?);
        }
    }

    tracing::debug!(
        "Drew {} train and {} validation samples from {} (seed {})",
        train.len(),
        val.len(),
        total,
        seed,
    );

    Ok((train, val))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::data::dataset::InMemDataset;

    /// Source items whose first pixel encodes their index so the
    /// tests can check which originals were drawn.
    fn source_of(len: usize) -> InMemDataset<MnistItem> {
        let items = (0..len)
            .map(|i| {
                let mut image = [[0.0f32; 28]; 28];
                image[0][0] = i as f32;
                MnistItem {
                    image,
                    label: (i % 10) as u8,
                }
            })
            .collect();
        InMemDataset::new(items)
    }

    #[test]
    fn test_subset_sizes() {
        let source = source_of(100);
        let (train, val) = draw_subsets(&source, 20, 10, 42).unwrap();
        assert_eq!(train.len(), 20);
        assert_eq!(val.len(), 10);
    }

    #[test]
    fn test_subsets_are_disjoint() {
        let source = source_of(50);
        let (train, val) = draw_subsets(&source, 25, 25, 7).unwrap();

        let train_tags: Vec<f32> = train.iter().map(|s| s.image[0][0]).collect();
        for sample in &val {
            assert!(!train_tags.contains(&sample.image[0][0]));
        }
    }

    #[test]
    fn test_seed_makes_draw_reproducible() {
        let source = source_of(100);
        let (train_a, _) = draw_subsets(&source, 10, 5, 123).unwrap();
        let (train_b, _) = draw_subsets(&source, 10, 5, 123).unwrap();

        let tags_a: Vec<f32> = train_a.iter().map(|s| s.image[0][0]).collect();
        let tags_b: Vec<f32> = train_b.iter().map(|s| s.image[0][0]).collect();
        assert_eq!(tags_a, tags_b);
    }

    #[test]
    fn test_oversized_request_fails() {
        let source = source_of(10);
        let result = draw_subsets(&source, 8, 8, 0);
        assert!(result.is_err());
    }
}
