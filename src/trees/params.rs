use crate::error::{ModelError, Result};

/// Hard limit on tree height, applied whatever `max_depth` says.
pub const MAX_TREE_DEPTH: u16 = 1000;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeParams {
    pub min_samples_split: u16,
    pub max_depth: u16,
    pub max_features: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeParams {
    pub fn new() -> Self {
        Self {
            min_samples_split: 2,
            max_depth: 10,
            max_features: None,
            seed: None,
        }
    }

    pub fn set_min_samples_split(&mut self, min_samples_split: u16) -> Result<()> {
        check_min_samples_split(min_samples_split)?;
        self.min_samples_split = min_samples_split;
        Ok(())
    }

    pub fn set_max_depth(&mut self, max_depth: u16) -> Result<()> {
        check_max_depth(max_depth)?;
        self.max_depth = max_depth;
        Ok(())
    }

    pub fn set_max_features(&mut self, max_features: Option<usize>) -> Result<()> {
        if max_features == Some(0) {
            return Err(ModelError::InvalidConfiguration(
                "The number of candidate features must be greater than 0.".into(),
            ));
        }
        self.max_features = max_features;
        Ok(())
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    pub fn min_samples_split(&self) -> u16 {
        self.min_samples_split
    }

    pub fn max_depth(&self) -> u16 {
        self.max_depth
    }

    /// `max_depth` capped at [`MAX_TREE_DEPTH`].
    pub fn effective_max_depth(&self) -> u16 {
        effective_depth(self.max_depth)
    }

    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Re-checks every field, for params assembled through the public fields.
    pub fn validate(&self) -> Result<()> {
        check_min_samples_split(self.min_samples_split)?;
        check_max_depth(self.max_depth)?;
        if self.max_features == Some(0) {
            return Err(ModelError::InvalidConfiguration(
                "The number of candidate features must be greater than 0.".into(),
            ));
        }
        Ok(())
    }
}

pub(crate) fn check_min_samples_split(min_samples_split: u16) -> Result<()> {
    if min_samples_split < 2 {
        return Err(ModelError::InvalidConfiguration(
            "The minimum number of samples to split must be greater than 1.".into(),
        ));
    }
    Ok(())
}

pub(crate) fn check_max_depth(max_depth: u16) -> Result<()> {
    if max_depth < 1 {
        return Err(ModelError::InvalidConfiguration(
            "The maximum depth must be greater than 0.".into(),
        ));
    }
    Ok(())
}

pub(crate) fn effective_depth(max_depth: u16) -> u16 {
    if max_depth > MAX_TREE_DEPTH {
        tracing::warn!(
            requested = max_depth,
            ceiling = MAX_TREE_DEPTH,
            "max_depth exceeds the hard ceiling, clamping"
        );
        return MAX_TREE_DEPTH;
    }
    max_depth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = TreeParams::default();
        assert_eq!(params.max_depth(), 10);
        assert_eq!(params.min_samples_split(), 2);
        assert_eq!(params.max_features(), None);
        assert_eq!(params.seed(), None);
    }

    #[test]
    fn test_setters_reject_out_of_range() {
        let mut params = TreeParams::new();
        assert!(params.set_min_samples_split(1).is_err());
        assert!(params.set_max_depth(0).is_err());
        assert!(params.set_max_features(Some(0)).is_err());
        assert_eq!(params, TreeParams::new());
    }

    #[test]
    fn test_validate_catches_direct_field_writes() {
        let params = TreeParams {
            min_samples_split: 0,
            ..TreeParams::new()
        };
        assert!(matches!(
            params.validate(),
            Err(ModelError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_effective_depth_is_clamped() {
        let mut params = TreeParams::new();
        params.set_max_depth(u16::MAX).unwrap();
        assert_eq!(params.max_depth(), u16::MAX);
        assert_eq!(params.effective_max_depth(), MAX_TREE_DEPTH);

        params.set_max_depth(5).unwrap();
        assert_eq!(params.effective_max_depth(), 5);
    }
}
