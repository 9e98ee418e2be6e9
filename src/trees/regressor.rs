//! Gradient regression tree
//!
//! The per-round learner of the boosted ensemble. It is fitted on first and
//! second loss derivatives instead of targets: splits maximise the structure
//! score gain and leaves hold a single regularized Newton step.
use super::{node::TreeNode, params::effective_depth};
use crate::{
    data::dataset::{Dataset, RealNumber},
    error::{ModelError, Result},
};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

/// `g_sum^2 / (h_sum + reg_lambda)`.
pub fn structure_score(gradient_sum: f64, hessian_sum: f64, reg_lambda: f64) -> f64 {
    gradient_sum * gradient_sum / (hessian_sum + reg_lambda)
}

/// Newton step `-sum(g) / (sum(h) + reg_lambda)`.
pub fn leaf_weight(gradients: &[f64], hessians: &[f64], reg_lambda: f64) -> f64 {
    let gradient_sum: f64 = gradients.iter().sum();
    let hessian_sum: f64 = hessians.iter().sum();
    newton_step(gradient_sum, hessian_sum, reg_lambda)
}

fn newton_step(gradient_sum: f64, hessian_sum: f64, reg_lambda: f64) -> f64 {
    -gradient_sum / (hessian_sum + reg_lambda)
}

/// Growth limits and penalties of a single gradient tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientTreeConfig {
    pub max_depth: u16,
    pub min_samples_split: u16,
    pub gamma: f64,
    pub reg_lambda: f64,
}

struct SplitData<T: RealNumber> {
    feature_index: usize,
    threshold: T,
    left: Vec<usize>,
    right: Vec<usize>,
    gain: f64,
}

/// Grows one regression tree over a fixed set of gradient statistics.
pub struct GradientTreeBuilder<'a, T: RealNumber> {
    dataset: &'a Dataset<T, f64>,
    gradients: &'a [f64],
    hessians: &'a [f64],
    max_depth: u16,
    min_samples_split: usize,
    gamma: f64,
    reg_lambda: f64,
}

impl<'a, T: RealNumber> GradientTreeBuilder<'a, T> {
    /// Only the feature matrix of `dataset` is read; its targets are ignored.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the gradient or hessian count differs from the row count.
    pub fn new(
        config: GradientTreeConfig,
        dataset: &'a Dataset<T, f64>,
        gradients: &'a [f64],
        hessians: &'a [f64],
    ) -> Result<Self> {
        if gradients.len() != dataset.nrows() || hessians.len() != dataset.nrows() {
            return Err(ModelError::ShapeMismatch(format!(
                "{} rows but {} gradients and {} hessians",
                dataset.nrows(),
                gradients.len(),
                hessians.len()
            )));
        }
        Ok(Self {
            dataset,
            gradients,
            hessians,
            max_depth: effective_depth(config.max_depth),
            min_samples_split: config.min_samples_split.into(),
            gamma: config.gamma,
            reg_lambda: config.reg_lambda,
        })
    }

    /// Builds the tree over every row, adding each accepted split's gain to
    /// `importances[feature_index]`.
    pub fn build(&self, importances: &mut [f64]) -> TreeNode<T, f64> {
        self.build_tree((0..self.dataset.nrows()).collect(), 0, importances)
    }

    fn build_tree(
        &self,
        rows: Vec<usize>,
        current_depth: u16,
        importances: &mut [f64],
    ) -> TreeNode<T, f64> {
        if current_depth >= self.max_depth || rows.len() < self.min_samples_split {
            return self.leaf(&rows);
        }

        let best_split = match self.get_best_split(&rows) {
            // `gain` already has gamma subtracted; the second comparison is intended.
            Some(split) if split.gain > self.gamma => split,
            _ => return self.leaf(&rows),
        };

        tracing::trace!(
            depth = current_depth,
            feature = best_split.feature_index,
            threshold = %best_split.threshold,
            gain = best_split.gain,
            "gradient split"
        );
        if let Some(importance) = importances.get_mut(best_split.feature_index) {
            *importance += best_split.gain;
        }

        let left_node = self.build_tree(best_split.left, current_depth + 1, importances);
        let right_node = self.build_tree(best_split.right, current_depth + 1, importances);
        TreeNode::internal(
            best_split.feature_index,
            best_split.threshold,
            left_node,
            right_node,
        )
    }

    fn leaf(&self, rows: &[usize]) -> TreeNode<T, f64> {
        let (gradient_sum, hessian_sum) = self.sums(rows);
        TreeNode::leaf(newton_step(gradient_sum, hessian_sum, self.reg_lambda))
    }

    /// Best split over every column. Among equal gains the lowest column,
    /// then the lowest threshold, wins.
    fn get_best_split(&self, rows: &[usize]) -> Option<SplitData<T>> {
        let (gradient_sum, hessian_sum) = self.sums(rows);
        let parent_score = structure_score(gradient_sum, hessian_sum, self.reg_lambda);

        (0..self.dataset.ncols())
            .into_par_iter()
            .map(|feature_idx| self.get_split(rows, parent_score, feature_idx))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .reduce(|best, split| if split.gain > best.gain { split } else { best })
    }

    fn get_split(
        &self,
        rows: &[usize],
        parent_score: f64,
        feature_index: usize,
    ) -> Option<SplitData<T>> {
        let mut best_split: Option<SplitData<T>> = None;

        for threshold in self.dataset.unique_values(rows, feature_index) {
            let (left, right) = self
                .dataset
                .split_on_threshold(rows, feature_index, threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }

            let (left_g, left_h) = self.sums(&left);
            let (right_g, right_h) = self.sums(&right);
            let gain = structure_score(left_g, left_h, self.reg_lambda)
                + structure_score(right_g, right_h, self.reg_lambda)
                - parent_score
                - self.gamma;

            if best_split.as_ref().map_or(true, |best| gain > best.gain) {
                best_split = Some(SplitData {
                    feature_index,
                    threshold,
                    left,
                    right,
                    gain,
                });
            }
        }
        best_split
    }

    fn sums(&self, rows: &[usize]) -> (f64, f64) {
        rows.iter().fold((0.0, 0.0), |(g, h), &row| {
            (g + self.gradients[row], h + self.hessians[row])
        })
    }
}
