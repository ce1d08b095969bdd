use ndarray::Array2;

use super::layers::{row_sum, DenseLayer};
use super::propagation::{DeltaSet, ForwardResult};
use super::NetworkError;

/// Batch-summed gradient of `0.5 * ||a - y||^2` for one transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub weights: Array2<f64>,
    pub bias: Array2<f64>,
}

/// `delta[l] · a[l-1]^T` and the row sums of `delta[l]` for every layer.
///
/// The matrix product adds up the per-example outer products, so the result is
/// a sum over the batch, not a mean.
pub fn gradients(forward: &ForwardResult, deltas: &DeltaSet) -> Result<Vec<Gradient>, NetworkError> {
    let activations = forward.activations();
    if activations.len() != deltas.len() + 1 {
        return Err(NetworkError::DimensionInvariantViolation {
            layer: deltas.len(),
            expected: (activations.len().saturating_sub(1), 0),
            found: (deltas.len(), 0),
        });
    }

    deltas
        .deltas()
        .iter()
        .zip(activations)
        .enumerate()
        .map(|(i, (delta, previous))| {
            if delta.ncols() != previous.ncols() {
                return Err(NetworkError::DimensionInvariantViolation {
                    layer: i,
                    expected: (delta.nrows(), previous.ncols()),
                    found: delta.dim(),
                });
            }
            Ok(Gradient {
                weights: delta.dot(&previous.t()),
                bias: row_sum(delta),
            })
        })
        .collect()
}

/// One plain SGD step: `p <- p - (learning_rate / m) * gradient`.
///
/// Every shape is checked before the first parameter is written, so a failed
/// step leaves `layers` untouched.
pub(crate) fn sgd_step(
    layers: &mut [DenseLayer],
    forward: &ForwardResult,
    deltas: &DeltaSet,
    learning_rate: f64,
) -> Result<(), NetworkError> {
    if !(learning_rate.is_finite() && learning_rate > 0.0) {
        return Err(NetworkError::InvalidConfiguration(format!(
            "learning rate must be positive, got {}",
            learning_rate
        )));
    }
    if deltas.len() != layers.len() {
        return Err(NetworkError::DimensionInvariantViolation {
            layer: deltas.len().min(layers.len()),
            expected: (layers.len(), 0),
            found: (deltas.len(), 0),
        });
    }

    let gradients = gradients(forward, deltas)?;
    for (i, (layer, gradient)) in layers.iter().zip(&gradients).enumerate() {
        layer.check_gradient(i, gradient)?;
    }

    let step = learning_rate / forward.batch_size() as f64;
    for (layer, gradient) in layers.iter_mut().zip(&gradients) {
        layer.apply_gradient(gradient, step);
    }
    Ok(())
}
