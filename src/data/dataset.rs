use nalgebra::{DMatrix, DVector};
use num_traits::{Float, FromPrimitive, Num, ToPrimitive};
use rand::seq::SliceRandom;
use rand::Rng;
use rand::{rngs::StdRng, SeedableRng};
use std::cmp::{Ordering, PartialOrd};
use std::fmt::{self, Display};
use std::fmt::{Debug, Formatter};
use std::hash::Hash;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

use crate::error::{ModelError, Result};

pub trait DataValue:
    Debug
    + Clone
    + Copy
    + Num
    + FromPrimitive
    + ToPrimitive
    + AddAssign
    + SubAssign
    + MulAssign
    + DivAssign
    + Send
    + Sync
    + Display
    + 'static
{
}

impl<T> DataValue for T where
    T: Debug
        + Clone
        + Copy
        + Num
        + FromPrimitive
        + ToPrimitive
        + AddAssign
        + SubAssign
        + MulAssign
        + DivAssign
        + Send
        + Sync
        + Display
        + 'static
{
}

pub trait Number: DataValue + PartialOrd {}
impl<T> Number for T where T: DataValue + PartialOrd {}

pub trait WholeNumber: Number + Eq + Hash {}
impl<T> WholeNumber for T where T: Number + Eq + Hash {}

/// Class id type. The total order decides vote ties (lowest id wins).
pub trait ClassLabel: WholeNumber + Ord {}
impl<T> ClassLabel for T where T: WholeNumber + Ord {}

pub trait RealNumber: Number + Float {}
impl<T> RealNumber for T where T: Number + Float {}

pub trait TargetValue: DataValue {}
impl<T> TargetValue for T where T: DataValue {}

/// Feature matrix plus aligned targets.
///
/// Rows are samples and columns are features. Column order is the feature
/// identity and has to match between `fit` and `predict`.
pub struct Dataset<XT: Number, YT: TargetValue> {
    pub x: DMatrix<XT>,
    pub y: DVector<YT>,
    feature_names: Option<Vec<String>>,
}

impl<XT: Number, YT: TargetValue> Debug for Dataset<XT, YT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Dataset {{\n    x: [\n")?;

        for i in 0..self.x.nrows() {
            write!(f, "        [")?;
            for j in 0..self.x.ncols() {
                write!(f, "{:?}, ", self.x[(i, j)])?;
            }
            writeln!(f, "],")?;
        }

        write!(f, "    ],\n    y: [")?;
        for i in 0..self.y.len() {
            write!(f, "{:?}, ", self.y[i])?;
        }
        write!(f, "]\n}}")
    }
}

impl<XT: Number, YT: TargetValue> Dataset<XT, YT> {
    pub fn new(x: DMatrix<XT>, y: DVector<YT>) -> Self {
        Self {
            x,
            y,
            feature_names: None,
        }
    }

    /// Attaches one name per column. Names are only used for reporting.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self> {
        if names.len() != self.x.ncols() {
            return Err(ModelError::ShapeMismatch(format!(
                "{} feature names given for {} columns",
                names.len(),
                self.x.ncols()
            )));
        }
        self.feature_names = Some(names);
        Ok(self)
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names.as_deref()
    }

    pub fn parts(&self) -> (&DMatrix<XT>, &DVector<YT>) {
        (&self.x, &self.y)
    }

    pub fn nrows(&self) -> usize {
        self.x.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.x.ncols()
    }

    /// Sorted, deduplicated values of `feature_index` over `rows`.
    pub fn unique_values(&self, rows: &[usize], feature_index: usize) -> Vec<XT> {
        let mut values: Vec<_> = rows.iter().map(|&row| self.x[(row, feature_index)]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        values.dedup();
        values
    }

    /// Routes `rows` by `value <= threshold` (left) or `value > threshold` (right).
    pub fn split_on_threshold(
        &self,
        rows: &[usize],
        feature_index: usize,
        threshold: XT,
    ) -> (Vec<usize>, Vec<usize>) {
        rows.iter()
            .copied()
            .partition(|&row| self.x[(row, feature_index)] <= threshold)
    }

    /// Same-size resample drawn with replacement.
    pub fn bootstrap<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let nrows = self.x.nrows();
        let sample_indices = (0..nrows)
            .map(|_| rng.gen_range(0..nrows))
            .collect::<Vec<_>>();
        self.select(&sample_indices)
    }

    pub fn train_test_split(&self, train_size: f64, seed: Option<u64>) -> Result<(Self, Self)> {
        if !(0.0..=1.0).contains(&train_size) {
            return Err(ModelError::InvalidConfiguration(
                "Train size should be between 0.0 and 1.0".into(),
            ));
        }
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut indices = (0..self.x.nrows()).collect::<Vec<_>>();
        indices.shuffle(&mut rng);
        let train_size = (self.x.nrows() as f64 * train_size).floor() as usize;
        let (train_indices, test_indices) = indices.split_at(train_size);

        Ok((self.select(train_indices), self.select(test_indices)))
    }

    fn select(&self, indices: &[usize]) -> Self {
        Self {
            x: self.x.select_rows(indices.iter()),
            y: self.y.select_rows(indices.iter()),
            feature_names: self.feature_names.clone(),
        }
    }
}

impl<XT: RealNumber, YT: TargetValue> Dataset<XT, YT> {
    /// Checks shape and finiteness before any training work starts.
    pub fn validate(&self) -> Result<()> {
        if self.x.nrows() == 0 || self.x.ncols() == 0 {
            return Err(ModelError::EmptyInput);
        }
        if self.x.nrows() != self.y.len() {
            return Err(ModelError::ShapeMismatch(format!(
                "{} rows but {} labels",
                self.x.nrows(),
                self.y.len()
            )));
        }
        check_finite(&self.x)
    }
}

/// Checks a prediction matrix against the width the model was fitted on.
///
/// A matrix with zero rows is accepted.
pub fn validate_features<XT: RealNumber>(x: &DMatrix<XT>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(ModelError::ShapeMismatch(format!(
            "model was fitted on {} features, got {}",
            n_features,
            x.ncols()
        )));
    }
    check_finite(x)
}

fn check_finite<XT: RealNumber>(x: &DMatrix<XT>) -> Result<()> {
    // Column-major storage, so the flat index maps back as (i % nrows, i / nrows).
    match x.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(ModelError::InvalidInput(format!(
            "non-finite feature value at row {}, column {}",
            index % x.nrows(),
            index / x.nrows()
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> Dataset<f64, u8> {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let y = DVector::from_vec(vec![9, 10, 11, 12]);
        Dataset::new(x, y)
    }

    #[test]
    fn test_dataset_new() {
        let x = DMatrix::from_row_slice(2, 2, &[1, 2, 3, 4]);
        let y = DVector::from_vec(vec![5, 6]);
        let dataset = Dataset::new(x.clone(), y.clone());
        assert_eq!(dataset.x, x);
        assert_eq!(dataset.y, y);
        assert!(dataset.feature_names().is_none());
    }

    #[test]
    fn test_dataset_formatting() {
        let x = DMatrix::from_row_slice(2, 2, &[1, 2, 3, 4]);
        let y = DVector::from_vec(vec![5, 6]);
        let dataset = Dataset::new(x, y);

        let expected_str = "\
Dataset {
    x: [
        [1, 2, ],
        [3, 4, ],
    ],
    y: [5, 6, ]
}";

        assert_eq!(format!("{:?}", dataset), expected_str);
    }

    #[test]
    fn test_parts_borrow_features_and_targets() {
        let dataset = sample_dataset();
        let (x, y) = dataset.parts();
        assert_eq!(x, &dataset.x);
        assert_eq!(y, &dataset.y);
    }

    #[test]
    fn test_feature_names_must_match_columns() {
        let named = sample_dataset().with_feature_names(vec!["reach".into(), "age".into()]);
        assert_eq!(
            named.unwrap().feature_names(),
            Some(&["reach".to_string(), "age".to_string()][..])
        );

        let result = sample_dataset().with_feature_names(vec!["reach".into()]);
        assert!(matches!(result, Err(ModelError::ShapeMismatch(_))));
    }

    #[test]
    fn test_validate_rejects_empty() {
        let dataset = Dataset::new(DMatrix::<f64>::zeros(0, 2), DVector::<u8>::zeros(0));
        assert_eq!(dataset.validate(), Err(ModelError::EmptyInput));

        let dataset = Dataset::new(DMatrix::<f64>::zeros(3, 0), DVector::<u8>::zeros(3));
        assert_eq!(dataset.validate(), Err(ModelError::EmptyInput));
    }

    #[test]
    fn test_validate_rejects_mismatched_labels() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let y = DVector::from_vec(vec![0u8, 1, 1]);
        let dataset = Dataset::new(x, y);
        assert!(matches!(dataset.validate(), Err(ModelError::ShapeMismatch(_))));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let x = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, f64::NAN, 4.0]);
        let y = DVector::from_vec(vec![0u8, 1]);
        let result = Dataset::new(x, y).validate();
        match result {
            Err(ModelError::InvalidInput(message)) => {
                assert!(message.contains("row 1, column 0"), "{message}")
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_validate_features() {
        let x = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        assert!(validate_features(&x, 2).is_ok());
        assert!(matches!(
            validate_features(&x, 3),
            Err(ModelError::ShapeMismatch(_))
        ));

        let x = DMatrix::from_row_slice(1, 2, &[1.0, f64::INFINITY]);
        assert!(matches!(
            validate_features(&x, 2),
            Err(ModelError::InvalidInput(_))
        ));

        assert!(validate_features(&DMatrix::<f64>::zeros(0, 2), 2).is_ok());
    }

    #[test]
    fn test_unique_values_sorted_and_deduplicated() {
        let x = DMatrix::from_row_slice(5, 1, &[3.0, 1.0, 3.0, 2.0, 1.0]);
        let y = DVector::from_vec(vec![0u8; 5]);
        let dataset = Dataset::new(x, y);

        assert_eq!(dataset.unique_values(&[0, 1, 2, 3, 4], 0), vec![1.0, 2.0, 3.0]);
        assert_eq!(dataset.unique_values(&[0, 2], 0), vec![3.0]);
    }

    #[test]
    fn test_split_on_threshold() {
        let dataset = sample_dataset();
        let (left, right) = dataset.split_on_threshold(&[0, 1, 2, 3], 0, 4.0);
        assert_eq!(left, vec![0, 1]);
        assert_eq!(right, vec![2, 3]);
    }

    #[test]
    fn test_split_on_threshold_left_empty() {
        let (left, right) = sample_dataset().split_on_threshold(&[0, 1, 2, 3], 0, -1.0);
        assert!(left.is_empty());
        assert_eq!(right.len(), 4);
    }

    #[test]
    fn test_split_on_threshold_right_empty() {
        let (left, right) = sample_dataset().split_on_threshold(&[0, 1, 2, 3], 0, 9.0);
        assert_eq!(left.len(), 4);
        assert!(right.is_empty());
    }

    #[test]
    fn test_bootstrap_keeps_size_and_rows() {
        let dataset = sample_dataset();
        let mut rng = StdRng::seed_from_u64(7);
        let sample = dataset.bootstrap(&mut rng);

        assert_eq!(sample.nrows(), 4);
        assert_eq!(sample.ncols(), 2);
        for i in 0..sample.nrows() {
            // every drawn row is an original row with its own label
            let label = sample.y[i];
            let original = (label - 9) as usize;
            assert_eq!(sample.x.row(i), dataset.x.row(original));
        }
    }

    #[test]
    fn test_bootstrap_with_seed_is_reproducible() {
        let dataset = sample_dataset();
        let first = dataset.bootstrap(&mut StdRng::seed_from_u64(1000));
        let second = dataset.bootstrap(&mut StdRng::seed_from_u64(1000));
        assert_eq!(first.y, second.y);
    }

    #[test]
    fn test_dataset_train_test_split() {
        let (train_dataset, test_dataset) = sample_dataset().train_test_split(0.75, None).unwrap();
        assert_eq!(train_dataset.x.nrows(), 3);
        assert_eq!(test_dataset.x.nrows(), 1);
    }

    #[test]
    fn test_dataset_train_test_split_rejects_bad_size() {
        let result = sample_dataset().train_test_split(1.5, Some(1));
        assert!(matches!(result, Err(ModelError::InvalidConfiguration(_))));
    }
}
