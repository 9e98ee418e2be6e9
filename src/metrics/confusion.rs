use std::collections::BTreeSet;

use nalgebra::{DMatrix, DVector};

use crate::{
    data::dataset::ClassLabel,
    error::{ModelError, Result},
};

type ConfusionMatrix = DMatrix<usize>;

pub trait ClassificationMetrics<T: ClassLabel> {
    /// Computes the confusion matrix based on the true labels and predicted labels.
    ///
    /// Rows are true classes and columns predicted classes, both in ascending
    /// class id order over every id seen in either vector.
    ///
    /// # Arguments
    ///
    /// * `y_true` - The true labels.
    /// * `y_pred` - The predicted labels.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when the vectors differ in length, `EmptyInput` when both are empty.
    fn confusion_matrix(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<ConfusionMatrix> {
        check_lengths(y_true.len(), y_pred.len())?;

        let classes: Vec<T> = y_true
            .iter()
            .chain(y_pred.iter())
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let position = |label: &T| classes.binary_search(label).unwrap_or_default();

        let mut matrix = DMatrix::zeros(classes.len(), classes.len());
        for (y_t, y_p) in y_true.iter().zip(y_pred.iter()) {
            matrix[(position(y_t), position(y_p))] += 1;
        }

        Ok(matrix)
    }

    /// Computes the accuracy based on the true labels and predicted labels.
    ///
    /// # Arguments
    ///
    /// * `y_true` - The true labels.
    /// * `y_pred` - The predicted labels.
    ///
    /// # Returns
    ///
    /// The share of rows where the prediction equals the true label.
    fn accuracy(&self, y_true: &DVector<T>, y_pred: &DVector<T>) -> Result<f64> {
        let matrix = self.confusion_matrix(y_true, y_pred)?;
        let correct: usize = matrix.diagonal().iter().sum();

        Ok(correct as f64 / y_true.len() as f64)
    }
}

pub(crate) fn check_lengths(true_len: usize, pred_len: usize) -> Result<()> {
    if true_len != pred_len {
        return Err(ModelError::ShapeMismatch(format!(
            "{} labels but {} predictions",
            true_len, pred_len
        )));
    }
    if true_len == 0 {
        return Err(ModelError::EmptyInput);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockClassifier;

    impl ClassificationMetrics<u8> for MockClassifier {}

    #[test]
    fn test_confusion_matrix() {
        let classifier = MockClassifier;

        let y_true = DVector::from_vec(vec![1, 0, 1, 0, 1]);
        let y_pred = DVector::from_vec(vec![1, 1, 0, 0, 1]);

        let result = classifier.confusion_matrix(&y_true, &y_pred).unwrap();

        let expected = DMatrix::from_vec(2, 2, vec![1, 1, 1, 2]);

        assert_eq!(result, expected);
    }

    #[test]
    fn test_confusion_matrix_unequal() {
        let classifier = MockClassifier;

        let y_true = DVector::from_vec(vec![1, 0, 1, 0, 1, 0]);
        let y_pred = DVector::from_vec(vec![1, 1, 0, 0, 1]);

        let result = classifier.confusion_matrix(&y_true, &y_pred);

        assert!(matches!(result, Err(ModelError::ShapeMismatch(_))));
    }

    #[test]
    fn test_confusion_matrix_multiclass() {
        let classifier = MockClassifier;

        let y_true = DVector::from_vec(vec![0, 1, 2, 1, 0, 2]);
        let y_pred = DVector::from_vec(vec![0, 2, 1, 1, 0, 2]);

        let result = classifier.confusion_matrix(&y_true, &y_pred).unwrap();
        let expected = DMatrix::from_vec(3, 3, vec![2, 0, 0, 0, 1, 1, 0, 1, 1]);

        assert_eq!(result, expected);
    }

    #[test]
    fn test_confusion_matrix_empty() {
        let classifier = MockClassifier;
        let empty = DVector::<u8>::zeros(0);

        assert_eq!(
            classifier.confusion_matrix(&empty, &empty),
            Err(ModelError::EmptyInput)
        );
    }

    #[test]
    fn test_accuracy() {
        let classifier = MockClassifier;

        let y_true = DVector::from_vec(vec![1, 0, 1, 0, 1]);
        let y_pred = DVector::from_vec(vec![1, 1, 0, 0, 1]);

        assert_eq!(classifier.accuracy(&y_true, &y_pred).unwrap(), 0.6);
    }

    #[test]
    fn test_accuracy_perfect_classification() {
        let classifier = MockClassifier;

        let y_true = DVector::from_vec(vec![1, 0, 1, 0, 1]);
        let y_pred = DVector::from_vec(vec![1, 0, 1, 0, 1]);

        assert_eq!(classifier.accuracy(&y_true, &y_pred).unwrap(), 1.0);
    }
}
