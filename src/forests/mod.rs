/// Bagged decision-tree classifier
pub mod classifier;
pub mod params;
