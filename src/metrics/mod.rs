/// Confusion matrix and accuracy
pub mod confusion;
/// MSE, MAE and R²
pub mod errors;
