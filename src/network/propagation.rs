use ndarray::Array2;

use super::activation::{Activation, ActivationFunction};
use super::layers::DenseLayer;
use super::loss::squared_error_prime;

/// Every intermediate value of one forward pass.
///
/// Index 0 of both sequences holds the raw input batch; index `l` holds the
/// values of layer `l`. A fresh instance is produced by each pass and belongs
/// to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardResult {
    pre_activations: Vec<Array2<f64>>,
    activations: Vec<Array2<f64>>,
}

impl ForwardResult {
    pub fn pre_activations(&self) -> &[Array2<f64>] {
        &self.pre_activations
    }

    pub fn activations(&self) -> &[Array2<f64>] {
        &self.activations
    }

    pub fn input(&self) -> &Array2<f64> {
        &self.activations[0]
    }

    /// Activated values of the last layer.
    pub fn output(&self) -> &Array2<f64> {
        &self.activations[self.activations.len() - 1]
    }

    pub fn into_output(mut self) -> Array2<f64> {
        self.activations.swap_remove(self.activations.len() - 1)
    }

    /// Number of examples (columns) in the batch.
    pub fn batch_size(&self) -> usize {
        self.input().ncols()
    }
}

/// Error signals of one backward pass.
///
/// `deltas()[i]` belongs to the transition `layers[i]`, i.e. to layer `i + 1`,
/// and pairs with `ForwardResult::activations()[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaSet {
    deltas: Vec<Array2<f64>>,
}

impl DeltaSet {
    pub fn new(deltas: Vec<Array2<f64>>) -> Self {
        Self { deltas }
    }

    pub fn deltas(&self) -> &[Array2<f64>] {
        &self.deltas
    }

    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

pub(crate) fn forward(layers: &[DenseLayer], activation: &Activation, input: &Array2<f64>) -> ForwardResult {
    let mut pre_activations = Vec::with_capacity(layers.len() + 1);
    let mut activations = Vec::with_capacity(layers.len() + 1);
    pre_activations.push(input.clone());
    activations.push(input.clone());

    for layer in layers {
        let z = layer.forward(&activations[activations.len() - 1]);
        activations.push(activation.value(&z));
        pre_activations.push(z);
    }

    ForwardResult {
        pre_activations,
        activations,
    }
}

pub(crate) fn backward(
    layers: &[DenseLayer],
    activation: &Activation,
    forward: &ForwardResult,
    targets: &Array2<f64>,
) -> DeltaSet {
    let count = layers.len();
    let z = forward.pre_activations();
    let mut deltas: Vec<Array2<f64>> = vec![Array2::zeros((0, 0)); count];

    deltas[count - 1] = squared_error_prime(forward.output(), targets) * activation.derivative(&z[count]);
    for i in (0..count - 1).rev() {
        // layers[i + 1] maps layer i + 1 to layer i + 2
        deltas[i] = layers[i + 1].weights().t().dot(&deltas[i + 1]) * activation.derivative(&z[i + 1]);
    }

    DeltaSet { deltas }
}
