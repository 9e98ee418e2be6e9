/// Gini-impurity CART classifier
pub mod classifier;
/// Label counting and impurity helpers
pub mod criteria;
pub mod node;
pub mod params;
/// Gradient/hessian regression tree used by boosting
pub mod regressor;
