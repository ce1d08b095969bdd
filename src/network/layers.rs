use ndarray::{Array2, Axis};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::Rng;

use super::update::Gradient;
use super::NetworkError;

/// Parameters of one transition between consecutive layers.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    weights: Array2<f64>,
    bias: Array2<f64>,
}

impl DenseLayer {
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        let weights = Array2::random_using((output_size, input_size), StandardNormal, rng);
        let bias = Array2::random_using((output_size, 1), StandardNormal, rng);
        Self { weights, bias }
    }

    pub fn from_parameters(weights: Array2<f64>, bias: Array2<f64>) -> Result<Self, NetworkError> {
        if bias.nrows() != weights.nrows() {
            return Err(NetworkError::ShapeMismatch {
                what: "bias rows",
                expected: weights.nrows(),
                found: bias.nrows(),
            });
        }
        if bias.ncols() != 1 {
            return Err(NetworkError::ShapeMismatch {
                what: "bias columns",
                expected: 1,
                found: bias.ncols(),
            });
        }
        if weights.is_empty() {
            return Err(NetworkError::InvalidConfiguration(
                "layer weights cannot be empty".to_string(),
            ));
        }
        Ok(Self { weights, bias })
    }

    pub fn inputs(&self) -> usize {
        self.weights.ncols()
    }

    pub fn outputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn bias(&self) -> &Array2<f64> {
        &self.bias
    }

    // z = W·a + b, with b broadcast over every column of the batch
    pub fn forward(&self, input: &Array2<f64>) -> Array2<f64> {
        self.weights.dot(input) + &self.bias
    }

    pub(crate) fn apply_gradient(&mut self, gradient: &Gradient, step: f64) {
        self.weights.scaled_add(-step, &gradient.weights);
        self.bias.scaled_add(-step, &gradient.bias);
    }

    pub(crate) fn check_gradient(&self, layer: usize, gradient: &Gradient) -> Result<(), NetworkError> {
        if gradient.weights.dim() != self.weights.dim() {
            return Err(NetworkError::DimensionInvariantViolation {
                layer,
                expected: self.weights.dim(),
                found: gradient.weights.dim(),
            });
        }
        if gradient.bias.dim() != self.bias.dim() {
            return Err(NetworkError::DimensionInvariantViolation {
                layer,
                expected: self.bias.dim(),
                found: gradient.bias.dim(),
            });
        }
        Ok(())
    }
}

pub(crate) fn row_sum(delta: &Array2<f64>) -> Array2<f64> {
    delta.sum_axis(Axis(1)).insert_axis(Axis(1))
}
