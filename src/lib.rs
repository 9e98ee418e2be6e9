//! # Rusty-trees
//!
//! `rusty-trees` provides three tree learners over numeric feature matrices:
//! a Gini-impurity decision tree classifier, a bagged random forest built from
//! it, and a gradient boosted regressor whose trees are fitted on
//! gradient/hessian statistics with Newton-step leaves.
//!
//! Inputs must already be fully numeric: no missing values, no categorical
//! columns. Every learner is fitted once with `fit` and then queried with
//! `predict`; both validate their input and return [`error::ModelError`] on
//! bad shapes, non-finite values or a missing fit.
//!
//! ## Example Usage
//!
//! ```rust
//! use rusty_trees::data::dataset::Dataset;
//! use rusty_trees::forests::classifier::RandomForestClassifier;
//! use nalgebra::{DMatrix, DVector};
//!
//! let x = DMatrix::from_row_slice(4, 2, &[0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0]);
//! let y = DVector::from_vec(vec![0u8, 0, 1, 1]);
//!
//! let dataset = Dataset::new(x, y);
//!
//! let mut forest = RandomForestClassifier::with_params(Some(5), None, Some(3), None, Some(42)).unwrap();
//!
//! forest.fit(&dataset).unwrap();
//!
//! let predictions = forest.predict(&dataset.x).unwrap();
//! assert_eq!(predictions.len(), 4);
//! ```

/// Gradient boosted regression trees
pub mod boosting;
/// Dataset and data manipulation utilities
pub mod data;
pub mod error;
/// Random Forests
pub mod forests;
/// Functions for evaluating model performance
pub mod metrics;
/// Decision trees
pub mod trees;
