//! Error type shared by every learner.

/// Errors returned by model configuration, fitting and prediction.
///
/// Degenerate splits during induction are not errors; they end in a leaf.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// A hyperparameter is outside its accepted range.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Matrix, label or name dimensions disagree.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    /// The input has no rows or no columns.
    #[error("Input contains no samples or no features")]
    EmptyInput,
    /// `predict` was called before a successful `fit`.
    #[error("Model wasn't fitted yet")]
    NotFitted,
    /// The input holds values the learners can't work with (NaN, infinities).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
