use ndarray::Array2;

/// Squared Frobenius norm of the residual, summed over the whole batch.
pub fn squared_error(y_pred: &Array2<f64>, y_true: &Array2<f64>) -> f64 {
    (y_pred - y_true).map(|v| v.powi(2)).sum()
}

/// Derivative of `0.5 * squared_error` with respect to the prediction.
pub fn squared_error_prime(y_pred: &Array2<f64>, y_true: &Array2<f64>) -> Array2<f64> {
    y_pred - y_true
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr2;

    #[test]
    fn squared_error_is_not_averaged() {
        let y_pred = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let y_true = arr2(&[[0.0, 2.0], [5.0, 1.0]]);
        assert_relative_eq!(squared_error(&y_pred, &y_true), 1.0 + 0.0 + 4.0 + 9.0);
        assert_eq!(squared_error_prime(&y_pred, &y_true), arr2(&[[1.0, 0.0], [-2.0, 3.0]]));
    }

    #[test]
    fn perfect_prediction_costs_nothing() {
        let y = arr2(&[[0.25, -0.5, 8.0]]);
        assert_eq!(squared_error(&y, &y), 0.0);
    }
}
