use enum_dispatch::enum_dispatch;
use ndarray::Array2;

use super::NetworkError;

pub type Transfer = fn(&Array2<f64>) -> Array2<f64>;

pub fn linear(x: &Array2<f64>) -> Array2<f64> {
    x.clone()
}

pub fn linear_prime(x: &Array2<f64>) -> Array2<f64> {
    Array2::ones(x.raw_dim())
}

pub fn sigmoid(x: &Array2<f64>) -> Array2<f64> {
    x.map(|v| 1.0 / (1.0 + (-v).exp()))
}

pub fn sigmoid_prime(x: &Array2<f64>) -> Array2<f64> {
    let s = sigmoid(x);
    &s * (1.0 - &s)
}

pub fn tanh(x: &Array2<f64>) -> Array2<f64> {
    x.map(|v| v.tanh())
}

pub fn tanh_prime(x: &Array2<f64>) -> Array2<f64> {
    x.map(|v| 1.0 - v.tanh().powi(2))
}

pub fn relu(x: &Array2<f64>) -> Array2<f64> {
    x.map(|v| v.max(0.0))
}

pub fn relu_prime(x: &Array2<f64>) -> Array2<f64> {
    x.map(|v| if v > &0.0 { 1.0 } else { 0.0 })
}

/// Elementwise nonlinearity applied after every layer.
///
/// Both operations take the pre-activation matrix `z`; `derivative` is the
/// slope of `value` at `z`, never at the already activated output.
#[enum_dispatch]
pub trait ActivationFunction {
    fn value(&self, z: &Array2<f64>) -> Array2<f64>;
    fn derivative(&self, z: &Array2<f64>) -> Array2<f64>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sigmoid;

impl ActivationFunction for Sigmoid {
    fn value(&self, z: &Array2<f64>) -> Array2<f64> {
        sigmoid(z)
    }

    fn derivative(&self, z: &Array2<f64>) -> Array2<f64> {
        sigmoid_prime(z)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tanh;

impl ActivationFunction for Tanh {
    fn value(&self, z: &Array2<f64>) -> Array2<f64> {
        tanh(z)
    }

    fn derivative(&self, z: &Array2<f64>) -> Array2<f64> {
        tanh_prime(z)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Relu;

impl ActivationFunction for Relu {
    fn value(&self, z: &Array2<f64>) -> Array2<f64> {
        relu(z)
    }

    fn derivative(&self, z: &Array2<f64>) -> Array2<f64> {
        relu_prime(z)
    }
}

/// Identity; turns the network into a product of affine maps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Linear;

impl ActivationFunction for Linear {
    fn value(&self, z: &Array2<f64>) -> Array2<f64> {
        linear(z)
    }

    fn derivative(&self, z: &Array2<f64>) -> Array2<f64> {
        linear_prime(z)
    }
}

/// A caller supplied pair of transfer functions.
#[derive(Debug, Clone, Copy)]
pub struct FnActivation {
    value: Transfer,
    derivative: Transfer,
}

impl FnActivation {
    pub fn new(value: Transfer, derivative: Option<Transfer>) -> Result<Self, NetworkError> {
        match derivative {
            Some(derivative) => Ok(Self { value, derivative }),
            None => Err(NetworkError::InvalidConfiguration(
                "activation function has no derivative".to_string(),
            )),
        }
    }
}

impl ActivationFunction for FnActivation {
    fn value(&self, z: &Array2<f64>) -> Array2<f64> {
        (self.value)(z)
    }

    fn derivative(&self, z: &Array2<f64>) -> Array2<f64> {
        (self.derivative)(z)
    }
}

#[derive(Debug, Clone)]
#[enum_dispatch(ActivationFunction)]
pub enum Activation {
    Sigmoid(Sigmoid),
    Tanh(Tanh),
    Relu(Relu),
    Linear(Linear),
    Custom(FnActivation),
}

impl Default for Activation {
    fn default() -> Self {
        Activation::from(Sigmoid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn sigmoid_values_and_slope() {
        let z = arr2(&[[0.0, 2.0], [-2.0, 40.0]]);
        let a = Sigmoid.value(&z);
        let d = Sigmoid.derivative(&z);

        assert_relative_eq!(a[[0, 0]], 0.5);
        assert_relative_eq!(a[[0, 1]], 0.8807970779778823, max_relative = 1e-12);
        assert_relative_eq!(a[[1, 0]], 0.11920292202211755, max_relative = 1e-12);
        assert_relative_eq!(d[[0, 0]], 0.25);
        assert_relative_eq!(d[[0, 1]], 0.8807970779778823 * 0.11920292202211755, max_relative = 1e-12);
        assert!(d[[1, 1]] >= 0.0 && d[[1, 1]] < 1e-16);
    }

    #[test]
    fn sigmoid_saturates_without_nan() {
        let z = arr2(&[[-1000.0, 1000.0]]);
        let a = Sigmoid.value(&z);
        let d = Sigmoid.derivative(&z);
        assert!(a.iter().chain(d.iter()).all(|v| v.is_finite()));
        assert_relative_eq!(a[[0, 0]], 0.0);
        assert_relative_eq!(a[[0, 1]], 1.0);
    }

    #[test]
    fn derivative_is_taken_at_pre_activation() {
        // tanh'(z) = 1 - tanh(z)^2, not 1 - z^2
        let z = arr2(&[[0.5]]);
        let d = Tanh.derivative(&z);
        assert_relative_eq!(d[[0, 0]], 1.0 - 0.5f64.tanh().powi(2), max_relative = 1e-12);
    }

    #[test]
    fn relu_and_linear() {
        let z = arr2(&[[-1.5, 0.0, 3.0]]);
        assert_eq!(Relu.value(&z), arr2(&[[0.0, 0.0, 3.0]]));
        assert_eq!(Relu.derivative(&z), arr2(&[[0.0, 0.0, 1.0]]));
        assert_eq!(Linear.value(&z), z);
        assert_eq!(Linear.derivative(&z), arr2(&[[1.0, 1.0, 1.0]]));
    }

    #[test]
    fn default_activation_is_sigmoid() {
        let z = arr2(&[[0.3, -0.7]]);
        let activation = Activation::default();
        assert!(matches!(activation, Activation::Sigmoid(_)));
        assert_eq!(activation.value(&z), sigmoid(&z));
        assert_eq!(activation.derivative(&z), sigmoid_prime(&z));
    }

    #[test]
    fn custom_activation_requires_derivative() {
        let missing = FnActivation::new(tanh, None);
        assert!(matches!(missing, Err(NetworkError::InvalidConfiguration(_))));

        let custom = Activation::from(FnActivation::new(tanh, Some(tanh_prime)).unwrap());
        let z = arr2(&[[0.25, -0.25]]);
        assert_eq!(custom.value(&z), Tanh.value(&z));
        assert_eq!(custom.derivative(&z), Tanh.derivative(&z));
    }
}
