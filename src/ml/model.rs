// ============================================================
// Layer 5 — MLP Model
// ============================================================
// A small feed-forward classifier for 28x28 grayscale images:
//
//   input [N, 784]
//     → Linear(784, hidden_dims[0]) → ReLU [→ Dropout(p)]
//     → Linear(hidden_dims[i-1], hidden_dims[i]) → ReLU [→ Dropout(p)]
//     → ...
//     → Linear(hidden_dims.last(), 10)
//
// The final layer has no activation — it produces raw logits
// and the cross-entropy loss applies the softmax internally.
//
// Dropout is optional: the plain model demonstrates raw
// overfitting, the dropout model demonstrates the mitigation.
// On the non-autodiff backend (model.valid()) Burn's dropout
// is a no-op, so evaluation is always deterministic.
//
// Consecutive layer widths chain by construction: each Linear's
// input width is the previous layer's output width, starting at
// 784 and ending at the 10 classes.
//
// Reference: Burn Book §3 (Building Blocks)

use anyhow::{bail, Result};
use burn::{nn, nn::loss::CrossEntropyLossConfig, prelude::*, tensor::activation::relu};

use crate::data::batcher::INPUT_DIM;

/// Number of output classes.
pub const NUM_CLASSES: usize = 10;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct MlpConfig {
    /// Output width of each hidden layer, in order. Must be non-empty.
    pub hidden_dims: Vec<usize>,

    /// Dropout probability applied after every hidden activation.
    /// None builds the model without dropout layers.
    pub dropout: Option<f64>,
}

impl MlpConfig {
    /// Build the model on the given device. Parameter
    /// initialisation is Burn's Linear default.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<Mlp<B>> {
        if self.hidden_dims.is_empty() {
            bail!("hidden_dims must not be empty: the layer widths would not chain");
        }

        let mut hidden = Vec::with_capacity(self.hidden_dims.len());
        let mut in_dim = INPUT_DIM;
        for &width in &self.hidden_dims {
            hidden.push(nn::LinearConfig::new(in_dim, width).init(device));
            in_dim = width;
        }

        // in_dim is now the last hidden width
        let output = nn::LinearConfig::new(in_dim, NUM_CLASSES).init(device);
        let dropout = self.dropout.map(|p| nn::DropoutConfig::new(p).init());

        Ok(Mlp {
            hidden,
            dropout,
            output,
        })
    }
}

#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    pub hidden: Vec<nn::Linear<B>>,
    pub dropout: Option<nn::Dropout>,
    pub output: nn::Linear<B>,
}

impl<B: Backend> Mlp<B> {
    /// images: [batch, 784] → logits: [batch, 10]
    pub fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        let mut x = images;
        for linear in &self.hidden {
            x = relu(linear.forward(x));
            if let Some(dropout) = &self.dropout {
                x = dropout.forward(x);
            }
        }
        self.output.forward(x)
    }

    /// Forward pass plus the scalar cross-entropy loss against
    /// integer labels. Used by both the epoch runner (autodiff
    /// backend) and the evaluator (inner backend).
    pub fn forward_loss(
        &self,
        images: Tensor<B, 2>,
        targets: Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(images);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets);
        (loss, logits)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    type B = burn::backend::NdArray;

    #[test]
    fn test_factory_output_width_is_ten() {
        let device = Default::default();
        let model: Mlp<B> = MlpConfig::new(vec![64, 32]).init(&device).unwrap();

        let images = Tensor::<B, 2>::zeros([3, INPUT_DIM], &device);
        let logits = model.forward(images);
        assert_eq!(logits.dims(), [3, NUM_CLASSES]);
    }

    #[test]
    fn test_layer_widths_chain_from_784() {
        let device = Default::default();
        let model: Mlp<B> = MlpConfig::new(vec![64, 32]).init(&device).unwrap();

        assert_eq!(model.hidden.len(), 2);
        assert_eq!(model.hidden[0].weight.val().dims(), [INPUT_DIM, 64]);
        assert_eq!(model.hidden[1].weight.val().dims(), [64, 32]);
        assert_eq!(model.output.weight.val().dims(), [32, NUM_CLASSES]);
    }

    #[test]
    fn test_empty_hidden_dims_is_rejected() {
        let device: <B as Backend>::Device = Default::default();
        let result = MlpConfig::new(Vec::new()).init::<B>(&device);
        assert!(result.is_err());
    }

    #[test]
    fn test_dropout_only_built_when_requested() {
        let device = Default::default();

        let plain: Mlp<B> = MlpConfig::new(vec![16]).init(&device).unwrap();
        assert!(plain.dropout.is_none());

        let regularised: Mlp<B> = MlpConfig::new(vec![16])
            .with_dropout(Some(0.8))
            .init(&device)
            .unwrap();
        assert!(regularised.dropout.is_some());
    }

    #[test]
    fn test_loss_is_finite_on_random_input() {
        let device = Default::default();
        let model: Mlp<B> = MlpConfig::new(vec![8]).init(&device).unwrap();

        let images = Tensor::<B, 2>::ones([4, INPUT_DIM], &device);
        let targets = Tensor::<B, 1, Int>::from_ints([0, 3, 9, 5].as_slice(), &device);
        let (loss, logits) = model.forward_loss(images, targets);

        assert_eq!(logits.dims(), [4, NUM_CLASSES]);
        let value: f64 = loss.into_scalar().elem();
        assert!(value.is_finite());
    }
}
