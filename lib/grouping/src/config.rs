use crate::{GroupingError, Result};

/// Tuning knobs for the expansion controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingConfig {
    /// Largest pool requested from the candidate source, as a multiple of
    /// `limit * per_group`
    pub max_pool_multiplier: usize,
    /// Extra rounds run after the best `limit` groups are first complete,
    /// to absorb late higher-scoring members
    pub confirm_rounds: usize,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            max_pool_multiplier: 32,
            confirm_rounds: 1,
        }
    }
}

impl GroupingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_pool_multiplier == 0 {
            return Err(GroupingError::InvalidConfig(
                "max_pool_multiplier must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GroupingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.confirm_rounds, 1);
    }

    #[test]
    fn test_zero_multiplier_rejected() {
        let config = GroupingConfig {
            max_pool_multiplier: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(GroupingError::InvalidConfig(_))));
    }
}
