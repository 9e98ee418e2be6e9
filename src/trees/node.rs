use std::fmt::{self, Debug, Display, Formatter};

use nalgebra::DVector;

use crate::data::dataset::Number;

/// Decision tree node
///
/// Rows with `features[feature_index] <= threshold` go left, the rest go right.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TreeNode<XT, V> {
    Leaf {
        value: V,
    },
    Internal {
        feature_index: usize,
        threshold: XT,
        left: Box<TreeNode<XT, V>>,
        right: Box<TreeNode<XT, V>>,
    },
}

impl<XT: Number, V> TreeNode<XT, V> {
    pub fn leaf(value: V) -> Self {
        TreeNode::Leaf { value }
    }

    pub fn internal(feature_index: usize, threshold: XT, left: Self, right: Self) -> Self {
        TreeNode::Internal {
            feature_index,
            threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// The stored value, for leaves only.
    pub fn value(&self) -> Option<&V> {
        match self {
            TreeNode::Leaf { value } => Some(value),
            TreeNode::Internal { .. } => None,
        }
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Internal { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Internal { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Walks from this node to a leaf and returns its value.
    pub fn traverse(&self, features: &DVector<XT>) -> &V {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value } => return value,
                TreeNode::Internal {
                    feature_index,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature_index] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    fn write_outline(&self, f: &mut Formatter<'_>, depth: usize) -> fmt::Result
    where
        XT: Display,
        V: Display,
    {
        let indent = "  ".repeat(depth);
        match self {
            TreeNode::Leaf { value } => writeln!(f, "{indent}Leaf: value={value}"),
            TreeNode::Internal {
                feature_index,
                threshold,
                left,
                right,
            } => {
                writeln!(f, "{indent}Feature {feature_index} <= {threshold}")?;
                left.write_outline(f, depth + 1)?;
                right.write_outline(f, depth + 1)
            }
        }
    }
}

/// Indented outline, one node per line, left subtree first.
impl<XT: Number, V: Display> Display for TreeNode<XT, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_outline(f, 0)
    }
}
