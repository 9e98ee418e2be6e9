pub mod params;
/// Newton-boosted regression trees
pub mod regressor;
