use crate::error::ClusterError;

/// Configuration for the incremental clustering engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Dispersion cutoff. Members farther than this from their own centroid
    /// become eviction candidates during re-partitioning.
    pub threshold: f64,

    /// Maximum number of eviction candidates taken from a single cluster
    /// per re-partitioning pass (the k farthest ones, not a cluster count).
    pub k: usize,

    /// Random seed for sampled initialization
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threshold: 1.0,
            k: 1,
            seed: 0,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with the given threshold and eviction limit
    pub fn new(threshold: f64, k: usize) -> Self {
        Self {
            threshold,
            k,
            ..Default::default()
        }
    }

    /// Set the dispersion threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the maximum evictions per cluster per pass
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check that the threshold is a non-negative number and `k > 0`.
    pub fn validate(&self) -> Result<(), ClusterError> {
        if self.k == 0 {
            return Err(ClusterError::InvalidK(
                "k must be greater than 0".to_string(),
            ));
        }
        if self.threshold.is_nan() || self.threshold < 0.0 {
            return Err(ClusterError::InvalidThreshold(format!(
                "threshold must be a non-negative number, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}
