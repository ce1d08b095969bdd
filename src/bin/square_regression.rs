use std::path::PathBuf;
use std::time::Instant;

use feedforward_sgd::utils::{linspace_row, plot_cost_history};
use feedforward_sgd::{Activation, Network, TrainConfig};
use ndarray::arr2;
use rand::rngs::StdRng;
use rand::SeedableRng;

extern crate structopt;

use structopt::StructOpt;

/// Fit y = x² on evenly spaced points with a small sigmoid network and print a few predictions
#[derive(StructOpt, Debug)]
#[structopt(name = "feedforward_sgd - square regression")]
struct Cli {
    /// Number of training points sampled from [-10, 10]
    #[structopt(long = "n_points", short = "n", default_value = "10000")]
    n_points: usize,

    /// Units of each hidden layer
    #[structopt(long = "hidden", default_value = "2", use_delimiter = true)]
    hidden: Vec<usize>,

    /// Examples per mini-batch
    #[structopt(long = "batch_size", short = "b", default_value = "100")]
    batch_size: usize,

    /// Number of passes over the training data
    #[structopt(long = "epochs", short = "e", default_value = "10")]
    epochs: usize,

    /// Step size of the gradient descent update
    #[structopt(long = "learning_rate", default_value = "0.3")]
    learning_rate: f64,

    /// Seed for weight initialization and shuffling
    #[structopt(long = "seed", default_value = "42")]
    seed: u64,

    /// Log the cost after every epoch
    #[structopt(long = "verbose", short = "v")]
    verbose: bool,

    /// Show a progress bar
    #[structopt(long = "progress")]
    progress: bool,

    /// Write the per-epoch cost curve to this SVG file (implies --verbose)
    #[structopt(long = "plot", parse(from_os_str))]
    plot: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli: Cli = Cli::from_args();

    let verbose = cli.verbose || cli.plot.is_some();
    tracing_subscriber::fmt()
        .with_max_level(if verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        })
        .init();

    let x = linspace_row(-10.0, 10.0, cli.n_points);
    let y = x.mapv(|v| v * v);

    let mut topology = vec![1];
    topology.extend(&cli.hidden);
    topology.push(1);

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let mut network = Network::new(&topology, Activation::default(), &mut rng)?;

    let config = TrainConfig {
        batch_size: cli.batch_size,
        epochs: cli.epochs,
        learning_rate: cli.learning_rate,
        verbose,
        progress: cli.progress,
    };

    println!("Training {:?} network!", network.topology());
    let now: Instant = Instant::now();
    let report = network.train(&x, &y, &config, &mut rng)?;
    let elapsed: std::time::Duration = now.elapsed();
    println!("Training done!");
    println!("Time elapsed: {:.2?}", elapsed);
    println!(
        "{} epochs, {} batches of {} ({} examples dropped per epoch)",
        report.epochs_completed,
        report.batches_per_epoch,
        config.batch_size,
        cli.n_points - report.examples_per_epoch
    );

    let probe = arr2(&[[0.0, 1.0, -11.0]]);
    println!("{}", network.predict(&probe)?);

    if let Some(path) = &cli.plot {
        plot_cost_history(&report.cost_history, path)?;
        println!("Cost curve written to {}", path.display());
    }
    Ok(())
}
