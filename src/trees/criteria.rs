//! Label statistics shared by the Gini classifier and the forest vote.
use std::collections::BTreeMap;

use crate::data::dataset::ClassLabel;

/// Occurrences of each class, ordered by class id.
fn class_counts<YT: ClassLabel>(labels: &[YT]) -> BTreeMap<YT, usize> {
    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(*label).or_insert(0) += 1;
    }
    counts
}

/// Most frequent label. Ties go to the lowest class id; `None` for no labels.
pub fn majority_label<YT: ClassLabel>(labels: &[YT]) -> Option<YT> {
    // `max_by_key` keeps the last maximum, so walk the ids from high to low.
    class_counts(labels)
        .into_iter()
        .rev()
        .max_by_key(|&(_, count)| count)
        .map(|(label, _)| label)
}

/// `1 - sum(p_c^2)` over class proportions. Zero for a pure or empty node.
pub fn gini_impurity<YT: ClassLabel>(labels: &[YT]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let total = labels.len() as f64;
    1.0 - class_counts(labels)
        .values()
        .map(|&count| {
            let p_class = count as f64 / total;
            p_class * p_class
        })
        .sum::<f64>()
}

pub fn is_pure<YT: ClassLabel>(labels: &[YT]) -> bool {
    labels.windows(2).all(|pair| pair[0] == pair[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_majority_label() {
        assert_eq!(majority_label(&[2u8, 1, 2, 0]), Some(2));
        assert_eq!(majority_label::<u8>(&[]), None);
    }

    #[test]
    fn test_majority_label_ties_go_to_lowest_id() {
        assert_eq!(majority_label(&[3u8, 1, 3, 1]), Some(1));
        assert_eq!(majority_label(&[5i32, 4, 9]), Some(4));
    }

    #[test]
    fn test_gini_impurity() {
        assert_relative_eq!(gini_impurity(&[1u8, 1, 1]), 0.0);
        assert_relative_eq!(gini_impurity(&[0u8, 1]), 0.5);
        assert_relative_eq!(gini_impurity(&[0u8, 1, 1]), 4.0 / 9.0, epsilon = 1e-12);
        assert_relative_eq!(gini_impurity::<u8>(&[]), 0.0);
    }

    #[test]
    fn test_is_pure() {
        assert!(is_pure(&[4u8, 4, 4]));
        assert!(is_pure(&[4u8]));
        assert!(!is_pure(&[4u8, 3]));
    }
}
