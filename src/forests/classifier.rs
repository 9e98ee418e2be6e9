//! Random Forest Classifier
use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

use super::params::ForestParams;
use crate::{
    data::dataset::{validate_features, ClassLabel, Dataset, RealNumber},
    error::{ModelError, Result},
    metrics::confusion::ClassificationMetrics,
    trees::{classifier::DecisionTreeClassifier, criteria::majority_label},
};

/// Bagging ensemble of [`DecisionTreeClassifier`]s.
///
/// Every member is fitted on its own bootstrap resample. Prediction is a
/// majority vote over members, ties going to the lowest class id.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RandomForestClassifier<XT: RealNumber, YT: ClassLabel> {
    trees: Vec<DecisionTreeClassifier<XT, YT>>,
    forest_params: ForestParams,
    n_features: usize,
}

impl<XT: RealNumber, YT: ClassLabel> Default for RandomForestClassifier<XT, YT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<XT: RealNumber, YT: ClassLabel> ClassificationMetrics<YT> for RandomForestClassifier<XT, YT> {}

impl<XT: RealNumber, YT: ClassLabel> RandomForestClassifier<XT, YT> {
    pub fn new() -> Self {
        Self {
            trees: Vec::new(),
            forest_params: ForestParams::new(),
            n_features: 0,
        }
    }

    /// Creates a forest with custom parameters. `None` keeps the default.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` for zero trees, `min_samples_split < 2`,
    /// `max_depth == 0` or `max_features == Some(0)`.
    pub fn with_params(
        n_estimators: Option<usize>,
        min_samples_split: Option<u16>,
        max_depth: Option<u16>,
        max_features: Option<usize>,
        seed: Option<u64>,
    ) -> Result<Self> {
        let mut forest = Self::new();
        let params = &mut forest.forest_params;

        if let Some(n_estimators) = n_estimators {
            params.set_n_estimators(n_estimators)?;
        }
        if let Some(min_samples_split) = min_samples_split {
            params.set_min_samples_split(min_samples_split)?;
        }
        if let Some(max_depth) = max_depth {
            params.set_max_depth(max_depth)?;
        }
        params.set_max_features(max_features)?;
        params.set_seed(seed);
        Ok(forest)
    }

    pub fn from_params(forest_params: ForestParams) -> Result<Self> {
        forest_params.validate()?;
        Ok(Self {
            forest_params,
            ..Self::new()
        })
    }

    pub fn params(&self) -> &ForestParams {
        &self.forest_params
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.forest_params.set_seed(seed)
    }

    /// Member trees, in the order their seeds were drawn.
    pub fn trees(&self) -> &[DecisionTreeClassifier<XT, YT>] {
        &self.trees
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Fits every member tree on a bootstrap resample, in parallel.
    ///
    /// With a seed the result is reproducible regardless of thread scheduling:
    /// member seeds are drawn up front and members are collected in draw order.
    pub fn fit(&mut self, dataset: &Dataset<XT, YT>) -> Result<()> {
        self.forest_params.validate()?;
        dataset.validate()?;

        let mut rng = match self.forest_params.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            _ => StdRng::from_entropy(),
        };
        let seeds = (0..self.forest_params.n_estimators())
            .map(|_| rng.gen::<u64>())
            .collect::<Vec<_>>();

        tracing::debug!(
            rows = dataset.nrows(),
            features = dataset.ncols(),
            trees = seeds.len(),
            "fitting random forest"
        );

        let tree_params = self.forest_params.tree_params();
        let trees: Result<Vec<_>> = seeds
            .into_par_iter()
            .map(|tree_seed| {
                let mut tree_rng = StdRng::seed_from_u64(tree_seed);
                let subset = dataset.bootstrap(&mut tree_rng);
                let mut tree = DecisionTreeClassifier::from_params(tree_params.clone())?;
                tree.set_seed(Some(tree_rng.gen()));
                tree.fit(&subset)?;
                Ok(tree)
            })
            .collect();

        self.trees = trees?;
        self.n_features = dataset.ncols();
        tracing::debug!(trees = self.trees.len(), "random forest fitted");
        Ok(())
    }

    /// Majority vote of the member trees for every row.
    pub fn predict(&self, features: &DMatrix<XT>) -> Result<DVector<YT>> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }
        validate_features(features, self.n_features)?;

        let tree_predictions = self
            .trees
            .iter()
            .map(|tree| tree.predict(features))
            .collect::<Result<Vec<_>>>()?;

        let predictions = (0..features.nrows())
            .map(|row| {
                let votes: Vec<YT> = tree_predictions
                    .iter()
                    .map(|prediction| prediction[row])
                    .collect();
                majority_label(&votes).ok_or(ModelError::NotFitted)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DVector::from_vec(predictions))
    }
}
