//! Fully-connected feedforward neural network trained with mini-batch
//! stochastic gradient descent and backpropagation.
//!
//! ```
//! use feedforward_sgd::utils::linspace_row;
//! use feedforward_sgd::{Activation, Network, TrainConfig};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let x = linspace_row(-1.0, 1.0, 100);
//! let y = x.mapv(|v| 0.5 * v + 0.25);
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let mut network = Network::new(&[1, 3, 1], Activation::default(), &mut rng).unwrap();
//! let config = TrainConfig { epochs: 5, ..TrainConfig::new(10) };
//! network.train(&x, &y, &config, &mut rng).unwrap();
//!
//! let prediction = network.predict(&x).unwrap();
//! assert_eq!(prediction.dim(), (1, 100));
//! ```

pub mod network;
pub mod trainer;
pub mod utils;

pub use network::activation::{Activation, ActivationFunction};
pub use network::layers::DenseLayer;
pub use network::propagation::{DeltaSet, ForwardResult};
pub use network::{Network, NetworkError};
pub use trainer::{TrainConfig, TrainReport, Trainer};
