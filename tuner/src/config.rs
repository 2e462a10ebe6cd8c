//! Tuner configuration types.
//!
//! Provides typed configuration for the search driver with bon builders.
//! Supports both explicit configuration and environment variable fallbacks.

use bon::bon;
use snafu::ResultExt;
use tunesmith_precision::Precision;
use tunesmith_space::{SamplingConfig, SearchMode, SwarmConfig, resolver::normalize_fraction, swarm_requested};

use crate::error::*;

/// Configuration for one tuning run.
#[derive(Debug, Clone, PartialEq)]
pub struct TunerConfig {
    /// Element precision to tune for.
    pub precision: Precision,
    /// Timed runs per configuration; `None` uses the declaration's default.
    pub num_runs: Option<usize>,
    /// Tuner-style fraction; `None` uses the declaration's default.
    pub fraction: Option<f64>,
    /// Total sampling draw budget.
    pub max_draws: u64,
    /// Consecutive rejected draws before sampling fails.
    pub max_consecutive_rejections: u64,
    /// Sampling seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// Tune the configurations found when sampling exhausts instead of failing.
    pub accept_partial_samples: bool,
    /// Replace uniform sampling with a particle swarm steered by measured times.
    pub swarm: Option<SwarmConfig>,
}

impl Default for TunerConfig {
    fn default() -> Self {
        let sampling = SamplingConfig::default();
        Self {
            precision: Precision::Single,
            num_runs: None,
            fraction: None,
            max_draws: sampling.max_draws,
            max_consecutive_rejections: sampling.max_consecutive_rejections,
            seed: None,
            accept_partial_samples: false,
            swarm: None,
        }
    }
}

#[bon]
impl TunerConfig {
    /// Create a tuner configuration with builder pattern.
    #[builder]
    pub fn new(
        #[builder(default)] precision: Precision,
        num_runs: Option<usize>,
        fraction: Option<f64>,
        #[builder(default = 1_000_000)] max_draws: u64,
        #[builder(default = 10_000)] max_consecutive_rejections: u64,
        seed: Option<u64>,
        #[builder(default = false)] accept_partial_samples: bool,
        swarm: Option<SwarmConfig>,
    ) -> Self {
        Self {
            precision,
            num_runs,
            fraction,
            max_draws,
            max_consecutive_rejections,
            seed,
            accept_partial_samples,
            swarm,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `TUNESMITH_PRECISION` - Precision code or name (default: 32)
    /// * `TUNESMITH_RUNS` - Timed runs per configuration (default: declaration)
    /// * `TUNESMITH_FRACTION` - Tuner-style fraction (default: declaration)
    /// * `TUNESMITH_MAX_DRAWS` - Total sampling draw budget (default: 1000000)
    /// * `TUNESMITH_MAX_REJECTIONS` - Consecutive rejections before failing (default: 10000)
    /// * `TUNESMITH_SEED` - Sampling seed (default: entropy)
    /// * `TUNESMITH_ACCEPT_PARTIAL` - Keep going after sampling exhausts if set
    /// * `TUNESMITH_HEURISTIC` - `pso` searches with a particle swarm, configured
    ///   by the `TUNESMITH_PSO_*` variables (see [`SwarmConfig::from_env`])
    pub fn from_env() -> Result<Self> {
        let precision = match std::env::var("TUNESMITH_PRECISION") {
            Ok(s) => s.parse().context(UnknownPrecisionSnafu)?,
            Err(_) => Precision::Single,
        };
        let num_runs = std::env::var("TUNESMITH_RUNS").ok().and_then(|s| s.parse().ok());
        let fraction = std::env::var("TUNESMITH_FRACTION").ok().and_then(|s| s.parse().ok());
        let max_draws = std::env::var("TUNESMITH_MAX_DRAWS").ok().and_then(|s| s.parse().ok()).unwrap_or(1_000_000);
        let max_consecutive_rejections =
            std::env::var("TUNESMITH_MAX_REJECTIONS").ok().and_then(|s| s.parse().ok()).unwrap_or(10_000);
        let seed = std::env::var("TUNESMITH_SEED").ok().and_then(|s| s.parse().ok());
        let accept_partial_samples = std::env::var("TUNESMITH_ACCEPT_PARTIAL").is_ok();
        let swarm = if swarm_requested() { Some(SwarmConfig::from_env().context(SpaceSnafu)?) } else { None };

        Ok(Self {
            precision,
            num_runs,
            fraction,
            max_draws,
            max_consecutive_rejections,
            seed,
            accept_partial_samples,
            swarm,
        })
    }

    /// Timed runs per configuration.
    pub fn runs(&self, declared: usize) -> usize {
        self.num_runs.unwrap_or(declared).max(1)
    }

    /// Search mode for a declaration whose default fraction is `declared`.
    ///
    /// A fraction of one is exhaustive even when a swarm is configured.
    pub fn search_mode(&self, declared: f64) -> Result<SearchMode> {
        let fraction = self.fraction.unwrap_or(declared);
        if fraction == 1.0 {
            return Ok(SearchMode::Exhaustive);
        }

        let sampling = SamplingConfig::builder()
            .fraction(normalize_fraction(fraction).context(SpaceSnafu)?)
            .max_draws(self.max_draws)
            .max_consecutive_rejections(self.max_consecutive_rejections)
            .maybe_seed(self.seed)
            .build()
            .context(SpaceSnafu)?;
        Ok(match &self.swarm {
            Some(swarm) => SearchMode::Swarm { sampling, swarm: swarm.clone() },
            None => SearchMode::Sampling(sampling),
        })
    }
}
