use ndarray::Array2;
use rand::Rng;

use self::activation::Activation;
use self::layers::DenseLayer;
use self::propagation::{DeltaSet, ForwardResult};
use crate::trainer::{TrainConfig, TrainReport, Trainer};

pub mod activation;
pub mod layers;
pub mod loss;
pub mod propagation;
pub mod update;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    #[error("{what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("layer {layer}: expected shape {expected:?}, found {found:?}")]
    DimensionInvariantViolation {
        layer: usize,
        expected: (usize, usize),
        found: (usize, usize),
    },
}

/// Fully-connected feedforward network.
///
/// `layers()[i]` holds the weights and bias feeding layer `i + 1` of the
/// topology. Parameters only change through [`Network::update`], which
/// [`Network::fit`] and [`Network::train`] call once per mini-batch.
#[derive(Debug, Clone)]
pub struct Network {
    topology: Vec<usize>,
    layers: Vec<DenseLayer>,
    activation: Activation,
}

impl Network {
    pub fn new<R: Rng + ?Sized>(
        topology: &[usize],
        activation: Activation,
        rng: &mut R,
    ) -> Result<Self, NetworkError> {
        check_topology(topology)?;
        let layers = topology
            .windows(2)
            .map(|pair| DenseLayer::new(pair[0], pair[1], rng))
            .collect();
        Ok(Self {
            topology: topology.to_vec(),
            layers,
            activation,
        })
    }

    pub fn from_layers(layers: Vec<DenseLayer>, activation: Activation) -> Result<Self, NetworkError> {
        let first = layers.first().ok_or_else(|| {
            NetworkError::InvalidConfiguration("a network needs at least one layer".to_string())
        })?;

        let mut topology = vec![first.inputs()];
        for layer in &layers {
            let previous = topology[topology.len() - 1];
            if layer.inputs() != previous {
                return Err(NetworkError::ShapeMismatch {
                    what: "layer inputs",
                    expected: previous,
                    found: layer.inputs(),
                });
            }
            topology.push(layer.outputs());
        }

        Ok(Self {
            topology,
            layers,
            activation,
        })
    }

    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    pub fn layers(&self) -> &[DenseLayer] {
        &self.layers
    }

    pub fn activation(&self) -> &Activation {
        &self.activation
    }

    pub fn input_size(&self) -> usize {
        self.topology[0]
    }

    pub fn output_size(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    // forward propagation, keeping every layer
    pub fn forward(&self, input: &Array2<f64>) -> Result<ForwardResult, NetworkError> {
        check_rows("input features", self.input_size(), input)?;
        if input.ncols() == 0 {
            return Err(NetworkError::ShapeMismatch {
                what: "batch size",
                expected: 1,
                found: 0,
            });
        }
        Ok(propagation::forward(&self.layers, &self.activation, input))
    }

    // predict output for given input
    pub fn predict(&self, input: &Array2<f64>) -> Result<Array2<f64>, NetworkError> {
        Ok(self.forward(input)?.into_output())
    }

    /// Runs one forward pass and propagates the error of `targets` back
    /// through every layer.
    pub fn backward(
        &self,
        input: &Array2<f64>,
        targets: &Array2<f64>,
    ) -> Result<(ForwardResult, DeltaSet), NetworkError> {
        check_rows("target outputs", self.output_size(), targets)?;
        if targets.ncols() != input.ncols() {
            return Err(NetworkError::ShapeMismatch {
                what: "target examples",
                expected: input.ncols(),
                found: targets.ncols(),
            });
        }
        let forward = self.forward(input)?;
        let deltas = propagation::backward(&self.layers, &self.activation, &forward, targets);
        Ok((forward, deltas))
    }

    pub fn update(
        &mut self,
        forward: &ForwardResult,
        deltas: &DeltaSet,
        learning_rate: f64,
    ) -> Result<(), NetworkError> {
        update::sgd_step(&mut self.layers, forward, deltas, learning_rate)
    }

    // train the network on a single mini-batch
    pub fn fit(
        &mut self,
        input: &Array2<f64>,
        targets: &Array2<f64>,
        learning_rate: f64,
    ) -> Result<(), NetworkError> {
        let (forward, deltas) = self.backward(input, targets)?;
        self.update(&forward, &deltas, learning_rate)
    }

    pub fn train<R: Rng + ?Sized>(
        &mut self,
        inputs: &Array2<f64>,
        targets: &Array2<f64>,
        config: &TrainConfig,
        rng: &mut R,
    ) -> Result<TrainReport, NetworkError> {
        Trainer::new(config.clone()).train(self, inputs, targets, rng)
    }

    pub fn cost(predicted: &Array2<f64>, target: &Array2<f64>) -> Result<f64, NetworkError> {
        if predicted.nrows() != target.nrows() {
            return Err(NetworkError::ShapeMismatch {
                what: "target rows",
                expected: predicted.nrows(),
                found: target.nrows(),
            });
        }
        if predicted.ncols() != target.ncols() {
            return Err(NetworkError::ShapeMismatch {
                what: "target columns",
                expected: predicted.ncols(),
                found: target.ncols(),
            });
        }
        Ok(loss::squared_error(predicted, target))
    }
}

fn check_topology(topology: &[usize]) -> Result<(), NetworkError> {
    if topology.len() < 2 {
        return Err(NetworkError::InvalidConfiguration(format!(
            "topology needs an input and an output layer, got {:?}",
            topology
        )));
    }
    if topology.contains(&0) {
        return Err(NetworkError::InvalidConfiguration(format!(
            "every layer needs at least one unit, got {:?}",
            topology
        )));
    }
    Ok(())
}

pub(crate) fn check_rows(what: &'static str, expected: usize, matrix: &Array2<f64>) -> Result<(), NetworkError> {
    if matrix.nrows() != expected {
        return Err(NetworkError::ShapeMismatch {
            what,
            expected,
            found: matrix.nrows(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::activation::{Linear, Sigmoid};
    use super::*;
    use ndarray::arr2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn builds_one_layer_per_transition() {
        let mut rng = StdRng::seed_from_u64(0);
        let network = Network::new(&[4, 6, 7, 3], Activation::default(), &mut rng).unwrap();
        let shapes: Vec<_> = network.layers().iter().map(|l| (l.weights().dim(), l.bias().dim())).collect();
        assert_eq!(shapes, vec![((6, 4), (6, 1)), ((7, 6), (7, 1)), ((3, 7), (3, 1))]);
        assert_eq!(network.topology(), &[4, 6, 7, 3]);
        assert_eq!(network.input_size(), 4);
        assert_eq!(network.output_size(), 3);
    }

    #[test]
    fn rejects_bad_topology() {
        let mut rng = StdRng::seed_from_u64(0);
        for topology in [&[3][..], &[][..], &[2, 0, 1][..]] {
            let err = Network::new(topology, Activation::default(), &mut rng);
            assert!(matches!(err, Err(NetworkError::InvalidConfiguration(_))));
        }
    }

    #[test]
    fn from_layers_checks_chaining() {
        let a = DenseLayer::from_parameters(Array2::zeros((3, 2)), Array2::zeros((3, 1))).unwrap();
        let b = DenseLayer::from_parameters(Array2::zeros((1, 4)), Array2::zeros((1, 1))).unwrap();
        let err = Network::from_layers(vec![a.clone(), b], Activation::default());
        assert_eq!(
            err.err(),
            Some(NetworkError::ShapeMismatch {
                what: "layer inputs",
                expected: 3,
                found: 4
            })
        );

        let c = DenseLayer::from_parameters(Array2::zeros((1, 3)), Array2::zeros((1, 1))).unwrap();
        let network = Network::from_layers(vec![a, c], Activation::default()).unwrap();
        assert_eq!(network.topology(), &[2, 3, 1]);

        assert!(Network::from_layers(vec![], Activation::default()).is_err());
    }

    #[test]
    fn predict_validates_input_rows() {
        let mut rng = StdRng::seed_from_u64(1);
        let network = Network::new(&[3, 2, 1], Activation::default(), &mut rng).unwrap();
        let err = network.predict(&Array2::zeros((2, 5)));
        assert_eq!(
            err,
            Err(NetworkError::ShapeMismatch {
                what: "input features",
                expected: 3,
                found: 2
            })
        );
        assert!(network.predict(&Array2::zeros((3, 0))).is_err());
        assert_eq!(network.predict(&Array2::zeros((3, 5))).unwrap().dim(), (1, 5));
    }

    #[test]
    fn predict_has_no_hidden_state() {
        let mut rng = StdRng::seed_from_u64(2);
        let network = Network::new(&[2, 3, 2], Activation::from(Sigmoid), &mut rng).unwrap();
        let input = arr2(&[[0.1, -0.4, 2.0], [1.5, 0.0, -3.0]]);
        let first = network.predict(&input).unwrap();
        for _ in 0..10 {
            assert_eq!(network.predict(&input).unwrap(), first);
        }
    }

    #[test]
    fn backward_validates_targets() {
        let mut rng = StdRng::seed_from_u64(1);
        let network = Network::new(&[2, 2], Activation::default(), &mut rng).unwrap();
        let input = Array2::zeros((2, 3));
        assert!(matches!(
            network.backward(&input, &Array2::zeros((1, 3))),
            Err(NetworkError::ShapeMismatch { what: "target outputs", .. })
        ));
        assert!(matches!(
            network.backward(&input, &Array2::zeros((2, 4))),
            Err(NetworkError::ShapeMismatch { what: "target examples", .. })
        ));
    }

    #[test]
    fn fit_reduces_cost_on_a_batch() {
        let layers = vec![DenseLayer::from_parameters(arr2(&[[0.5]]), arr2(&[[0.0]])).unwrap()];
        let mut network = Network::from_layers(layers, Activation::from(Linear)).unwrap();
        let input = arr2(&[[1.0, 2.0, -1.0]]);
        let targets = arr2(&[[2.0, 4.0, -2.0]]);

        let before = Network::cost(&network.predict(&input).unwrap(), &targets).unwrap();
        network.fit(&input, &targets, 0.1).unwrap();
        let after = Network::cost(&network.predict(&input).unwrap(), &targets).unwrap();
        assert!(after < before);
    }

    #[test]
    fn cost_checks_shapes() {
        let a = arr2(&[[1.0, 2.0]]);
        assert_eq!(Network::cost(&a, &arr2(&[[0.0, 0.0]])), Ok(5.0));
        assert!(Network::cost(&a, &arr2(&[[0.0], [0.0]])).is_err());
        assert!(Network::cost(&a, &arr2(&[[0.0, 0.0, 0.0]])).is_err());
    }

    #[test]
    fn errors_describe_the_problem() {
        let err = NetworkError::ShapeMismatch {
            what: "input features",
            expected: 3,
            found: 2,
        };
        assert_eq!(err.to_string(), "input features: expected 3, found 2");
    }
}
