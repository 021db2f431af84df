//! Configuration for the transform dispatcher.

use serde::{Deserialize, Serialize};

/// Configuration for [`crate::GridTransformer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Worker threads for block dispatch. Zero uses the global rayon pool.
    pub num_threads: usize,

    /// Calls with fewer blocks than this run sequentially on the caller's thread.
    pub parallel_threshold: usize,

    /// Whether outputs carry the input's attributes when a call does not say.
    pub keep_attrs: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            num_threads: 0,
            parallel_threshold: 2,
            keep_attrs: true,
        }
    }
}

impl TransformConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GRID_TRANSFORM_THREADS") {
            if let Ok(threads) = val.parse() {
                config.num_threads = threads;
            }
        }

        if let Ok(val) = std::env::var("GRID_TRANSFORM_PARALLEL_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.parallel_threshold = threshold;
            }
        }

        if let Ok(val) = std::env::var("GRID_TRANSFORM_KEEP_ATTRS") {
            config.keep_attrs = val.to_lowercase() == "true" || val == "1";
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.parallel_threshold == 0 {
            return Err("parallel_threshold must be > 0".to_string());
        }

        if self.num_threads > 4096 {
            return Err("num_threads must be <= 4096".to_string());
        }

        Ok(())
    }

    /// Whether a call with `blocks` partitions should fan out to the pool.
    pub fn runs_parallel(&self, blocks: usize) -> bool {
        blocks >= self.parallel_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TransformConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.keep_attrs);
        assert!(!config.runs_parallel(1));
        assert!(config.runs_parallel(2));
    }

    #[test]
    fn test_validate_rejects_zero_threshold() {
        let config = TransformConfig {
            parallel_threshold: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err("parallel_threshold must be > 0".to_string())
        );
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = TransformConfig {
            num_threads: 4,
            parallel_threshold: 8,
            keep_attrs: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: TransformConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
