//! Generator configuration.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::binder::DEFAULT_MAX_TABLE_ATTEMPTS;
use crate::error::{Result, SynthError};
use crate::renderer::Dialect;
use crate::sample::DEFAULT_SAMPLE_LIMIT;

/// Default probability of appending a comment to a payload.
pub const DEFAULT_COMMENT_RATE: f64 = 0.3;

/// Configuration for statement synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Probability of appending a comment to a payload (default: 0.3).
    pub comment_rate: f64,
    /// Rows read per sampling operation (default: 100).
    pub sample_limit: usize,
    /// Random draws per table id before the unconstrained fallback (default: 50).
    pub max_table_attempts: usize,
    /// Identifier quoting of the target database (default: mysql).
    pub dialect: Dialect,
    /// Seed for reproducible batches. None = seeded from entropy.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            comment_rate: DEFAULT_COMMENT_RATE,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            max_table_attempts: DEFAULT_MAX_TABLE_ATTEMPTS,
            dialect: Dialect::default(),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON configuration. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns a `Json` error for malformed input or a `ConfigError` for
    /// out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GeneratorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the comment probability.
    #[must_use]
    pub fn with_comment_rate(mut self, comment_rate: f64) -> Self {
        self.comment_rate = comment_rate;
        self
    }

    /// Sets the sample row limit.
    #[must_use]
    pub fn with_sample_limit(mut self, sample_limit: usize) -> Self {
        self.sample_limit = sample_limit;
        self
    }

    /// Sets the table draw budget.
    #[must_use]
    pub fn with_max_table_attempts(mut self, max_table_attempts: usize) -> Self {
        self.max_table_attempts = max_table_attempts;
        self
    }

    /// Sets the identifier dialect.
    #[must_use]
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Sets the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.comment_rate) {
            return Err(SynthError::ConfigError(format!(
                "comment_rate must be between 0 and 1, got {}",
                self.comment_rate
            )));
        }
        if self.sample_limit == 0 {
            return Err(SynthError::ConfigError(
                "sample_limit must be greater than 0".into(),
            ));
        }
        if self.max_table_attempts == 0 {
            return Err(SynthError::ConfigError(
                "max_table_attempts must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Random generator for a batch: seeded when `seed` is set.
    #[must_use]
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}
