use crate::{
    error::{ModelError, Result},
    trees::{
        params::{check_max_depth, check_min_samples_split},
        regressor::GradientTreeConfig,
    },
};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub max_depth: u16,
    pub learning_rate: f64,
    /// Minimum structure gain a split has to clear.
    pub gamma: f64,
    /// L2 penalty added to the hessian sum of every leaf.
    pub reg_lambda: f64,
    pub min_samples_split: u16,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self::new()
    }
}

impl BoostingParams {
    pub fn new() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 3,
            learning_rate: 0.1,
            gamma: 0.1,
            reg_lambda: 0.1,
            min_samples_split: 2,
        }
    }

    pub fn set_n_estimators(&mut self, n_estimators: usize) -> Result<()> {
        check_n_estimators(n_estimators)?;
        self.n_estimators = n_estimators;
        Ok(())
    }

    pub fn set_max_depth(&mut self, max_depth: u16) -> Result<()> {
        check_max_depth(max_depth)?;
        self.max_depth = max_depth;
        Ok(())
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<()> {
        check_learning_rate(learning_rate)?;
        self.learning_rate = learning_rate;
        Ok(())
    }

    pub fn set_gamma(&mut self, gamma: f64) -> Result<()> {
        check_penalty("gamma", gamma)?;
        self.gamma = gamma;
        Ok(())
    }

    pub fn set_reg_lambda(&mut self, reg_lambda: f64) -> Result<()> {
        check_penalty("reg_lambda", reg_lambda)?;
        self.reg_lambda = reg_lambda;
        Ok(())
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<()> {
        check_min_samples_split(min_samples_split)?;
        self.min_samples_split = min_samples_split;
        Ok(())
    }

    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    pub fn max_depth(&self) -> u16 {
        self.max_depth
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn reg_lambda(&self) -> f64 {
        self.reg_lambda
    }

    pub fn min_samples_split(&self) -> u16 {
        self.min_samples_split
    }

    /// Limits handed to each round's gradient tree.
    pub fn tree_config(&self) -> GradientTreeConfig {
        GradientTreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            gamma: self.gamma,
            reg_lambda: self.reg_lambda,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_n_estimators(self.n_estimators)?;
        check_max_depth(self.max_depth)?;
        check_learning_rate(self.learning_rate)?;
        check_penalty("gamma", self.gamma)?;
        check_penalty("reg_lambda", self.reg_lambda)?;
        check_min_samples_split(self.min_samples_split)
    }
}

fn check_n_estimators(n_estimators: usize) -> Result<()> {
    if n_estimators < 1 {
        return Err(ModelError::InvalidConfiguration(
            "The number of boosting rounds must be greater than 0.".into(),
        ));
    }
    Ok(())
}

fn check_learning_rate(learning_rate: f64) -> Result<()> {
    if !(learning_rate > 0.0 && learning_rate <= 1.0) {
        return Err(ModelError::InvalidConfiguration(format!(
            "The learning rate must be in (0, 1], got {}.",
            learning_rate
        )));
    }
    Ok(())
}

fn check_penalty(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::InvalidConfiguration(format!(
            "{} must be finite and non-negative, got {}.",
            name, value
        )));
    }
    Ok(())
}
