use nalgebra::DVector;

use super::confusion::check_lengths;
use crate::{data::dataset::RealNumber, error::Result};

pub trait RegressionMetrics<T: RealNumber> {
    /// Mean squared error.
    fn mse(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T> {
        check_lengths(y_true.len(), y_pred.len())?;

        let errors = y_pred - y_true;
        let errors_sq = errors.component_mul(&errors);

        Ok(errors_sq.sum() / count(y_true))
    }

    /// Mean absolute error.
    fn mae(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T> {
        check_lengths(y_true.len(), y_pred.len())?;

        let abs_errors_sum = y_pred
            .iter()
            .zip(y_true.iter())
            .map(|(&y_p, &y_t)| (y_p - y_t).abs())
            .fold(T::zero(), |acc, x| acc + x);

        Ok(abs_errors_sum / count(y_true))
    }

    /// Coefficient of determination, `1 - SS_res / SS_tot`.
    ///
    /// A constant `y_true` gives a zero denominator, so the result is NaN or infinite.
    fn r2(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<T> {
        check_lengths(y_true.len(), y_pred.len())?;

        let y_true_mean = y_true.sum() / count(y_true);
        let y_true_mean_vec = DVector::from_element(y_true.len(), y_true_mean);

        let mse_model = self.mse(y_true, y_pred)?;
        let mse_base = self.mse(y_true, &y_true_mean_vec)?;

        Ok(T::one() - (mse_model / mse_base))
    }
}

fn count<T: RealNumber>(y: &DVector<T>) -> T {
    T::from_usize(y.len()).unwrap_or_else(T::nan)
}
