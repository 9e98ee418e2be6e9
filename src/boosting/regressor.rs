use nalgebra::{DMatrix, DVector};

use super::params::BoostingParams;
use crate::{
    data::dataset::{validate_features, Dataset, RealNumber},
    error::{ModelError, Result},
    metrics::errors::RegressionMetrics,
    trees::{node::TreeNode, regressor::GradientTreeBuilder},
};

/// Gradient boosted regression trees with Newton leaf weights.
///
/// Starts from the target mean and adds one tree per round, each fitted on the
/// squared-error gradient (`2 * (prediction - y)`) and hessian (`2`) of the
/// current ensemble. Predictions are `base + learning_rate * sum(tree outputs)`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GradientBoostedRegressor<XT: RealNumber> {
    trees: Vec<TreeNode<XT, f64>>,
    boosting_params: BoostingParams,
    base_prediction: Option<f64>,
    feature_importances: Vec<f64>,
    feature_names: Option<Vec<String>>,
}

impl<XT: RealNumber> Default for GradientBoostedRegressor<XT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<XT: RealNumber> RegressionMetrics<f64> for GradientBoostedRegressor<XT> {}

impl<XT: RealNumber> GradientBoostedRegressor<XT> {
    pub fn new() -> Self {
        Self {
            trees: Vec::new(),
            boosting_params: BoostingParams::new(),
            base_prediction: None,
            feature_importances: Vec::new(),
            feature_names: None,
        }
    }

    /// Creates a regressor from a complete parameter set.
    ///
    /// # Errors
    ///
    /// `InvalidConfiguration` if any parameter is out of range.
    pub fn with_params(boosting_params: BoostingParams) -> Result<Self> {
        boosting_params.validate()?;
        Ok(Self {
            boosting_params,
            ..Self::new()
        })
    }

    pub fn params(&self) -> &BoostingParams {
        &self.boosting_params
    }

    pub fn learning_rate(&self) -> f64 {
        self.boosting_params.learning_rate()
    }

    /// Target mean the ensemble starts from, `None` before `fit`.
    pub fn base_prediction(&self) -> Option<f64> {
        self.base_prediction
    }

    /// One tree per boosting round, in training order.
    pub fn trees(&self) -> &[TreeNode<XT, f64>] {
        &self.trees
    }

    /// Summed gain of every accepted split, indexed by column.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Importances paired with column names, if the training data was named.
    pub fn named_feature_importances(&self) -> Option<Vec<(String, f64)>> {
        let names = self.feature_names.as_ref()?;
        Some(
            names
                .iter()
                .cloned()
                .zip(self.feature_importances.iter().copied())
                .collect(),
        )
    }

    /// Runs every boosting round. Nothing is stored unless all rounds succeed.
    ///
    /// # Errors
    ///
    /// Fails before the first round on invalid parameters, empty input,
    /// mismatched row/target counts or non-finite features or targets.
    pub fn fit(&mut self, dataset: &Dataset<XT, f64>) -> Result<()> {
        self.boosting_params.validate()?;
        dataset.validate()?;
        if let Some(row) = dataset.y.iter().position(|target| !target.is_finite()) {
            return Err(ModelError::InvalidInput(format!(
                "non-finite target at row {}",
                row
            )));
        }

        let (x, y) = dataset.parts();
        let nrows = x.nrows();
        let learning_rate = self.boosting_params.learning_rate();
        let tree_config = self.boosting_params.tree_config();

        let base_prediction = y.mean();
        let mut current_prediction = DVector::from_element(nrows, base_prediction);
        let mut feature_importances = vec![0.0; x.ncols()];
        let mut trees = Vec::with_capacity(self.boosting_params.n_estimators());
        let hessians = vec![2.0; nrows];

        tracing::debug!(
            rows = nrows,
            features = x.ncols(),
            rounds = self.boosting_params.n_estimators(),
            base_prediction,
            "fitting gradient boosted trees"
        );

        for round in 0..self.boosting_params.n_estimators() {
            let gradients: Vec<f64> = current_prediction
                .iter()
                .zip(y.iter())
                .map(|(prediction, target)| 2.0 * (prediction - target))
                .collect();

            let tree = GradientTreeBuilder::new(tree_config, dataset, &gradients, &hessians)?
                .build(&mut feature_importances);

            let update = predict_tree(&tree, x);
            current_prediction.axpy(learning_rate, &update, 1.0);
            trees.push(tree);

            let train_mse = self.mse(y, &current_prediction)?;
            tracing::debug!(round, train_mse, "boosting round finished");
        }

        self.trees = trees;
        self.base_prediction = Some(base_prediction);
        self.feature_importances = feature_importances;
        self.feature_names = dataset.feature_names().map(<[String]>::to_vec);
        Ok(())
    }

    /// `base_prediction + learning_rate * sum(tree outputs)` for every row.
    pub fn predict(&self, features: &DMatrix<XT>) -> Result<DVector<f64>> {
        let base_prediction = self.base_prediction.ok_or(ModelError::NotFitted)?;
        validate_features(features, self.feature_importances.len())?;

        let mut predictions = DVector::from_element(features.nrows(), base_prediction);
        for tree in &self.trees {
            predictions.axpy(self.learning_rate(), &predict_tree(tree, features), 1.0);
        }
        Ok(predictions)
    }
}

fn predict_tree<XT: RealNumber>(tree: &TreeNode<XT, f64>, features: &DMatrix<XT>) -> DVector<f64> {
    DVector::from_iterator(
        features.nrows(),
        features
            .row_iter()
            .map(|row| *tree.traverse(&row.transpose())),
    )
}
