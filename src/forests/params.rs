use crate::{
    error::{ModelError, Result},
    trees::params::TreeParams,
};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForestParams {
    pub n_estimators: usize,
    /// Passed to every member tree. Its `seed` is replaced by a per-member seed.
    pub tree_params: TreeParams,
    pub seed: Option<u64>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self::new()
    }
}

impl ForestParams {
    pub fn new() -> Self {
        Self {
            n_estimators: 100,
            tree_params: TreeParams::new(),
            seed: None,
        }
    }

    pub fn set_n_estimators(&mut self, n_estimators: usize) -> Result<()> {
        check_n_estimators(n_estimators)?;
        self.n_estimators = n_estimators;
        Ok(())
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<()> {
        self.tree_params.set_min_samples_split(min_samples_split)
    }

    pub fn set_max_depth(&mut self, max_depth: u16) -> Result<()> {
        self.tree_params.set_max_depth(max_depth)
    }

    pub fn set_max_features(&mut self, max_features: Option<usize>) -> Result<()> {
        self.tree_params.set_max_features(max_features)
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    pub fn tree_params(&self) -> &TreeParams {
        &self.tree_params
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn validate(&self) -> Result<()> {
        check_n_estimators(self.n_estimators)?;
        self.tree_params.validate()
    }
}

fn check_n_estimators(n_estimators: usize) -> Result<()> {
    if n_estimators < 1 {
        return Err(ModelError::InvalidConfiguration(
            "The number of trees must be greater than 0.".into(),
        ));
    }
    Ok(())
}
