//! Decision Tree Classifier
use super::{
    criteria::{gini_impurity, is_pure, majority_label},
    node::TreeNode,
    params::TreeParams,
};
use crate::{
    data::dataset::{validate_features, ClassLabel, Dataset, RealNumber},
    error::{ModelError, Result},
    metrics::confusion::ClassificationMetrics,
};
use nalgebra::{DMatrix, DVector};
use rand::{rngs::StdRng, seq::index, SeedableRng};
use rayon::prelude::*;

struct SplitData<XT: RealNumber> {
    feature_index: usize,
    threshold: XT,
    left: Vec<usize>,
    right: Vec<usize>,
    information_gain: f64,
}

/// Decision Tree Classifier
///
/// CART tree grown on Gini impurity. Every value present in a candidate column
/// is tried as a threshold, and the split with the largest information gain
/// wins. Leaves hold the majority class of their rows.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DecisionTreeClassifier<XT: RealNumber, YT: ClassLabel> {
    root: Option<TreeNode<XT, YT>>,
    tree_params: TreeParams,
    n_features: usize,
}

impl<XT: RealNumber, YT: ClassLabel> Default for DecisionTreeClassifier<XT, YT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<XT: RealNumber, YT: ClassLabel> ClassificationMetrics<YT> for DecisionTreeClassifier<XT, YT> {}

impl<XT: RealNumber, YT: ClassLabel> DecisionTreeClassifier<XT, YT> {
    /// Creates a new instance of the decision tree classifier with default parameters.
    pub fn new() -> Self {
        Self {
            root: None,
            tree_params: TreeParams::new(),
            n_features: 0,
        }
    }

    /// Creates a new instance of the decision tree classifier with custom parameters.
    ///
    /// # Arguments
    ///
    /// * `min_samples_split` - The minimum number of samples required to split an internal node.
    /// * `max_depth` - The maximum depth of the tree.
    /// * `max_features` - How many randomly drawn columns are considered at each split. `None` means all of them.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `min_samples_split` is less than 2, `max_depth` is 0
    /// or `max_features` is `Some(0)`.
    pub fn with_params(
        min_samples_split: Option<u16>,
        max_depth: Option<u16>,
        max_features: Option<usize>,
    ) -> Result<Self> {
        let mut tree = Self::new();

        tree.set_min_samples_split(min_samples_split.unwrap_or(2))?;
        tree.set_max_depth(max_depth.unwrap_or(10))?;
        tree.set_max_features(max_features)?;
        Ok(tree)
    }

    /// Creates a classifier from a complete parameter set.
    pub fn from_params(tree_params: TreeParams) -> Result<Self> {
        tree_params.validate()?;
        Ok(Self {
            tree_params,
            ..Self::new()
        })
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

    /// Seeds feature subsampling. `None` draws a fresh seed from the OS on every fit.
    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.tree_params.set_seed(seed)
    }

    pub fn max_depth(&self) -> u16 {
        self.tree_params.max_depth()
    }

    pub fn min_samples_split(&self) -> u16 {
        self.tree_params.min_samples_split()
    }

    pub fn max_features(&self) -> Option<usize> {
        self.tree_params.max_features()
    }

    pub fn params(&self) -> &TreeParams {
        &self.tree_params
    }

    /// Root of the fitted tree, `None` before `fit`.
    pub fn root(&self) -> Option<&TreeNode<XT, YT>> {
        self.root.as_ref()
    }

    /// Number of columns seen during `fit`.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Builds the decision tree from a dataset.
    ///
    /// Refitting replaces the previous tree. On error the classifier is left untouched.
    ///
    /// # Errors
    ///
    /// Fails before any induction work on invalid parameters, empty input,
    /// mismatched row/label counts or non-finite features.
    pub fn fit(&mut self, dataset: &Dataset<XT, YT>) -> Result<()> {
        self.tree_params.validate()?;
        dataset.validate()?;

        let mut rng = match self.tree_params.seed() {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let n_features = dataset.ncols();
        let builder = TreeBuilder {
            dataset,
            max_depth: self.tree_params.effective_max_depth(),
            min_samples_split: self.tree_params.min_samples_split().into(),
            n_features,
            n_candidates: self
                .tree_params
                .max_features()
                .map_or(n_features, |max_features| max_features.min(n_features)),
        };

        tracing::debug!(
            rows = dataset.nrows(),
            features = n_features,
            candidates = builder.n_candidates,
            "fitting decision tree"
        );
        let root = builder.build_tree((0..dataset.nrows()).collect(), 0, &mut rng)?;
        tracing::debug!(
            depth = root.depth(),
            leaves = root.leaf_count(),
            "decision tree fitted"
        );

        self.root = Some(root);
        self.n_features = n_features;
        Ok(())
    }

    /// Predicts the class of every row.
    ///
    /// # Errors
    ///
    /// `NotFitted` before a successful `fit`; `ShapeMismatch` or `InvalidInput`
    /// when `features` doesn't have the fitted width or holds non-finite values.
    pub fn predict(&self, features: &DMatrix<XT>) -> Result<DVector<YT>> {
        let root = self.root.as_ref().ok_or(ModelError::NotFitted)?;
        validate_features(features, self.n_features)?;

        let predictions: Vec<_> = features
            .row_iter()
            .map(|row| *root.traverse(&row.transpose()))
            .collect();

        Ok(DVector::from_vec(predictions))
    }
}

/// Per-fit induction state borrowed by the recursion.
struct TreeBuilder<'a, XT: RealNumber, YT: ClassLabel> {
    dataset: &'a Dataset<XT, YT>,
    max_depth: u16,
    min_samples_split: usize,
    n_features: usize,
    n_candidates: usize,
}

impl<XT: RealNumber, YT: ClassLabel> TreeBuilder<'_, XT, YT> {
    fn build_tree(
        &self,
        rows: Vec<usize>,
        current_depth: u16,
        rng: &mut StdRng,
    ) -> Result<TreeNode<XT, YT>> {
        let labels = self.labels(&rows);
        let leaf_value = majority_label(&labels).ok_or(ModelError::EmptyInput)?;

        if current_depth >= self.max_depth
            || rows.len() < self.min_samples_split
            || is_pure(&labels)
        {
            return Ok(TreeNode::leaf(leaf_value));
        }

        let feature_indices = self.candidate_features(rng);
        let best_split = match self.get_best_split(&rows, &labels, &feature_indices) {
            Some(split) if !split.left.is_empty() && !split.right.is_empty() => split,
            _ => return Ok(TreeNode::leaf(leaf_value)),
        };

        tracing::trace!(
            depth = current_depth,
            feature = best_split.feature_index,
            threshold = %best_split.threshold,
            gain = best_split.information_gain,
            "gini split"
        );

        let left_node = self.build_tree(best_split.left, current_depth + 1, rng)?;
        let right_node = self.build_tree(best_split.right, current_depth + 1, rng)?;
        Ok(TreeNode::internal(
            best_split.feature_index,
            best_split.threshold,
            left_node,
            right_node,
        ))
    }

    fn candidate_features(&self, rng: &mut StdRng) -> Vec<usize> {
        if self.n_candidates >= self.n_features {
            return (0..self.n_features).collect();
        }
        index::sample(rng, self.n_features, self.n_candidates).into_vec()
    }

    /// Best split over the candidate columns. Among equal gains the earliest
    /// column, then the lowest threshold, wins.
    fn get_best_split(
        &self,
        rows: &[usize],
        labels: &[YT],
        feature_indices: &[usize],
    ) -> Option<SplitData<XT>> {
        let parent_impurity = gini_impurity(labels);

        feature_indices
            .par_iter()
            .map(|&feature_index| self.get_split(rows, parent_impurity, feature_index))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .reduce(|best, split| {
                if split.information_gain > best.information_gain {
                    split
                } else {
                    best
                }
            })
    }

    fn get_split(
        &self,
        rows: &[usize],
        parent_impurity: f64,
        feature_index: usize,
    ) -> Option<SplitData<XT>> {
        let mut best_split: Option<SplitData<XT>> = None;

        for threshold in self.dataset.unique_values(rows, feature_index) {
            let (left, right) = self
                .dataset
                .split_on_threshold(rows, feature_index, threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }

            let information_gain = self.information_gain(parent_impurity, &left, &right);
            if best_split
                .as_ref()
                .map_or(true, |best| information_gain > best.information_gain)
            {
                best_split = Some(SplitData {
                    feature_index,
                    threshold,
                    left,
                    right,
                    information_gain,
                });
            }
        }
        best_split
    }

    fn information_gain(&self, parent_impurity: f64, left: &[usize], right: &[usize]) -> f64 {
        let num_samples = (left.len() + right.len()) as f64;
        let weight_left = left.len() as f64 / num_samples;
        let weight_right = right.len() as f64 / num_samples;

        parent_impurity
            - weight_left * gini_impurity(&self.labels(left))
            - weight_right * gini_impurity(&self.labels(right))
    }

    fn labels(&self, rows: &[usize]) -> Vec<YT> {
        rows.iter().map(|&row| self.dataset.y[row]).collect()
    }
}
