use kdam::{tqdm, BarExt};
use ndarray::{s, Array2};
use rand::Rng;

use crate::network::{check_rows, Network, NetworkError};
use crate::utils::{batch_ranges, shuffle_together};

/// Options of the mini-batch training loop.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Examples per mini-batch; the `N % batch_size` leftovers of every
    /// shuffled epoch are not trained on.
    pub batch_size: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    /// Compute and log the cost over the retained examples after each epoch.
    pub verbose: bool,
    /// Draw a progress bar over the epochs.
    pub progress: bool,
}

impl TrainConfig {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size,
            epochs: 20,
            learning_rate: 0.3,
            verbose: false,
            progress: false,
        }
    }

    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.batch_size == 0 {
            return Err(NetworkError::InvalidConfiguration(
                "batch size must be positive".to_string(),
            ));
        }
        if self.epochs == 0 {
            return Err(NetworkError::InvalidConfiguration(
                "epoch count must be positive".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(NetworkError::InvalidConfiguration(format!(
                "learning rate must be positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainReport {
    pub epochs_completed: usize,
    pub batches_per_epoch: usize,
    /// Examples actually trained on in each epoch.
    pub examples_per_epoch: usize,
    pub batches_run: usize,
    /// Cost after each finished epoch, only filled when `verbose` is set.
    pub cost_history: Vec<f64>,
    pub stopped_early: bool,
}

pub struct Trainer {
    config: TrainConfig,
    /// Asked with `(epoch, batch)` before every mini-batch; returning `true`
    /// ends training before that batch runs.
    pub early_stop: Option<Box<dyn Fn(usize, usize) -> bool>>,
}

impl Trainer {
    pub fn new(config: TrainConfig) -> Self {
        Self {
            config,
            early_stop: None,
        }
    }

    pub fn with_early_stop(mut self, early_stop: impl Fn(usize, usize) -> bool + 'static) -> Self {
        self.early_stop = Some(Box::new(early_stop));
        self
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn train<R: Rng + ?Sized>(
        &self,
        network: &mut Network,
        inputs: &Array2<f64>,
        targets: &Array2<f64>,
        rng: &mut R,
    ) -> Result<TrainReport, NetworkError> {
        self.validate(network, inputs, targets)?;

        let total = inputs.ncols();
        let batch_size = self.config.batch_size;
        let mut report = TrainReport {
            batches_per_epoch: total / batch_size,
            examples_per_epoch: total - total % batch_size,
            ..TrainReport::default()
        };
        tracing::debug!(
            examples = total,
            batch_size,
            batches = report.batches_per_epoch,
            dropped = total % batch_size,
            "starting training"
        );
        if report.batches_per_epoch == 0 {
            tracing::warn!(examples = total, batch_size, "no complete batch, parameters will not change");
        }

        let mut pb = if self.config.progress {
            let mut pb = tqdm!(total = self.config.epochs);
            pb.set_description(String::from("SGD"));
            pb.refresh();
            Some(pb)
        } else {
            None
        };

        'epochs: for epoch in 0..self.config.epochs {
            let (data, target) = shuffle_together(inputs, targets, rng);

            for (batch, range) in batch_ranges(total, batch_size).enumerate() {
                if let Some(stop) = &self.early_stop {
                    if (stop)(epoch, batch) {
                        report.stopped_early = true;
                        break 'epochs;
                    }
                }
                let batch_input = data.slice(s![.., range.clone()]).to_owned();
                let batch_target = target.slice(s![.., range]).to_owned();
                network.fit(&batch_input, &batch_target, self.config.learning_rate)?;
                report.batches_run += 1;
            }

            if self.config.verbose {
                let kept = report.examples_per_epoch;
                // the squared error of an empty batch is zero
                let cost = if kept == 0 {
                    0.0
                } else {
                    let predicted = network.predict(&data.slice(s![.., ..kept]).to_owned())?;
                    Network::cost(&predicted, &target.slice(s![.., ..kept]).to_owned())?
                };
                tracing::info!(epoch = epoch + 1, cost, "epoch finished");
                report.cost_history.push(cost);
                if let Some(pb) = pb.as_mut() {
                    pb.set_postfix(format!("cost={:.6}", cost));
                }
            }

            report.epochs_completed += 1;
            if let Some(pb) = pb.as_mut() {
                pb.update(1);
            }
        }

        tracing::debug!(
            epochs = report.epochs_completed,
            batches = report.batches_run,
            stopped_early = report.stopped_early,
            "training finished"
        );
        Ok(report)
    }

    fn validate(&self, network: &Network, inputs: &Array2<f64>, targets: &Array2<f64>) -> Result<(), NetworkError> {
        check_rows("input features", network.input_size(), inputs)?;
        check_rows("target outputs", network.output_size(), targets)?;
        if inputs.ncols() != targets.ncols() {
            return Err(NetworkError::ShapeMismatch {
                what: "target examples",
                expected: inputs.ncols(),
                found: targets.ncols(),
            });
        }
        self.config.validate()
    }
}
