use std::ops::Range;
use std::path::Path;

use ndarray::{Array, Array2, Axis};
use plotters::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

/// `n` evenly spaced scalar examples from `start` to `end`, as a `1 × n` row.
pub fn linspace_row(start: f64, end: f64, n: usize) -> Array2<f64> {
    Array::linspace(start, end, n).insert_axis(Axis(0))
}

/// Permutes the columns of `inputs` and `targets` with the same permutation.
pub fn shuffle_together<R: Rng + ?Sized>(
    inputs: &Array2<f64>,
    targets: &Array2<f64>,
    rng: &mut R,
) -> (Array2<f64>, Array2<f64>) {
    let mut order: Vec<usize> = (0..inputs.ncols()).collect();
    order.shuffle(rng);
    (inputs.select(Axis(1), &order), targets.select(Axis(1), &order))
}

/// Consecutive column ranges of exactly `batch_size` examples.
///
/// The last `total % batch_size` examples never appear in any range.
pub fn batch_ranges(total: usize, batch_size: usize) -> impl Iterator<Item = Range<usize>> {
    let count = if batch_size == 0 { 0 } else { total / batch_size };
    (0..count).map(move |k| k * batch_size..(k + 1) * batch_size)
}

pub fn plot_cost_history(costs: &[f64], path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if costs.is_empty() {
        return Err("no cost history to plot".into());
    }
    let max = costs.iter().cloned().fold(f64::EPSILON, f64::max);

    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .build_cartesian_2d(0..costs.len(), 0.0..max * 1.05)?;
    chart.draw_series(LineSeries::new(
        costs.iter().enumerate().map(|(i, c)| (i, *c)),
        &BLUE,
    ))?;
    root.present()?;
    Ok(())
}
