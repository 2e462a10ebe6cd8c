//! Search mode and sampling configuration.
//!
//! Provides typed configuration for configuration resolution with bon builders.
//! Supports both explicit configuration and environment variable fallbacks.

use bon::bon;
use snafu::ensure;

use crate::error::*;

// ============================================================================
// SEARCH MODE
// ============================================================================

/// How the resolver walks the parameter space.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchMode {
    /// Enumerate every valid configuration in lexicographic order.
    #[default]
    Exhaustive,

    /// Validate uniform random draws until the target count or budget is reached.
    Sampling(SamplingConfig),

    /// Particle swarm search steered by reported costs, with the sampling target and budgets.
    Swarm { sampling: SamplingConfig, swarm: SwarmConfig },
}

impl SearchMode {
    /// Interpret a tuner-style fraction.
    ///
    /// * `1.0` - exhaustive
    /// * `f > 1.0` - sample a `1/f` share of the space
    /// * `0 < f < 1` - sample an `f` share of the space
    pub fn from_fraction(fraction: f64) -> Result<Self> {
        if fraction == 1.0 {
            return Ok(Self::Exhaustive);
        }
        let config = SamplingConfig::builder().fraction(normalize_fraction(fraction)?).build()?;
        Ok(Self::Sampling(config))
    }

    /// Get search mode from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `TUNESMITH_FRACTION` - Tuner-style fraction; unset or `1` means exhaustive
    /// * `TUNESMITH_HEURISTIC` - `pso` (or `swarm`, `1`) searches with a particle swarm
    ///
    /// Sampling budgets are read by [`SamplingConfig::from_env`], swarm
    /// settings by [`SwarmConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        match env_parse::<f64>("TUNESMITH_FRACTION") {
            None => Ok(Self::Exhaustive),
            Some(fraction) if fraction == 1.0 => Ok(Self::Exhaustive),
            Some(_) if swarm_requested() => {
                Ok(Self::Swarm { sampling: SamplingConfig::from_env()?, swarm: SwarmConfig::from_env()? })
            }
            Some(_) => Ok(Self::Sampling(SamplingConfig::from_env()?)),
        }
    }

    pub fn is_exhaustive(&self) -> bool {
        matches!(self, Self::Exhaustive)
    }

    pub fn is_sampling(&self) -> bool {
        matches!(self, Self::Sampling(_))
    }

    pub fn is_swarm(&self) -> bool {
        matches!(self, Self::Swarm { .. })
    }
}

/// Whether `TUNESMITH_HEURISTIC` selects the particle swarm.
pub fn swarm_requested() -> bool {
    std::env::var("TUNESMITH_HEURISTIC")
        .is_ok_and(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "1" | "pso" | "swarm"))
}

/// Map a tuner-style fraction onto `(0, 1]`.
pub fn normalize_fraction(fraction: f64) -> Result<f64> {
    ensure!(fraction.is_finite() && fraction > 0.0, InvalidFractionSnafu { fraction });
    Ok(if fraction > 1.0 { 1.0 / fraction } else { fraction })
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

// ============================================================================
// SAMPLING CONFIGURATION
// ============================================================================

/// Configuration for random sampling of the parameter space.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// Share of the unpruned space to emit, in `(0, 1]`.
    pub fraction: f64,
    /// Total number of draws before sampling stops.
    pub max_draws: u64,
    /// Consecutive rejected draws before sampling fails.
    pub max_consecutive_rejections: u64,
    /// Seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { fraction: 1.0, max_draws: 1_000_000, max_consecutive_rejections: 10_000, seed: None }
    }
}

#[bon]
impl SamplingConfig {
    /// Create a sampling configuration with builder pattern.
    #[builder]
    pub fn new(
        #[builder(default = 1.0)] fraction: f64,
        #[builder(default = 1_000_000)] max_draws: u64,
        #[builder(default = 10_000)] max_consecutive_rejections: u64,
        seed: Option<u64>,
    ) -> Result<Self> {
        ensure!(fraction.is_finite() && fraction > 0.0 && fraction <= 1.0, InvalidFractionSnafu { fraction });
        Ok(Self { fraction, max_draws, max_consecutive_rejections, seed })
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `TUNESMITH_FRACTION` - Tuner-style fraction (default: 1)
    /// * `TUNESMITH_MAX_DRAWS` - Total draw budget (default: 1000000)
    /// * `TUNESMITH_MAX_REJECTIONS` - Consecutive rejections before failing (default: 10000)
    /// * `TUNESMITH_SEED` - RNG seed (default: entropy)
    pub fn from_env() -> Result<Self> {
        let fraction = normalize_fraction(env_parse("TUNESMITH_FRACTION").unwrap_or(1.0))?;
        let max_draws = env_parse("TUNESMITH_MAX_DRAWS").unwrap_or(1_000_000);
        let max_consecutive_rejections = env_parse("TUNESMITH_MAX_REJECTIONS").unwrap_or(10_000);
        let seed = env_parse("TUNESMITH_SEED");

        Ok(Self { fraction, max_draws, max_consecutive_rejections, seed })
    }

    /// Number of configurations to emit from a space of `total` raw configurations.
    ///
    /// This is `ceil(fraction * total)`, capped at `total`.
    pub fn target(&self, total: u128) -> usize {
        let wanted = (self.fraction * total as f64).ceil();
        let wanted = if wanted >= u128::MAX as f64 { u128::MAX } else { wanted as u128 };
        usize::try_from(wanted.min(total)).unwrap_or(usize::MAX)
    }
}

// ============================================================================
// SWARM CONFIGURATION
// ============================================================================

/// Particle swarm settings.
///
/// At every step each parameter of a particle takes the global best's value
/// with probability `influence_global`, the particle's own best with
/// `influence_local`, a random candidate with `influence_random`, and keeps
/// its current value otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct SwarmConfig {
    pub swarm_size: usize,
    pub influence_global: f64,
    pub influence_local: f64,
    pub influence_random: f64,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self { swarm_size: 8, influence_global: 0.3, influence_local: 0.6, influence_random: 0.1 }
    }
}

#[bon]
impl SwarmConfig {
    /// Create swarm settings with builder pattern.
    #[builder]
    pub fn new(
        #[builder(default = 8)] swarm_size: usize,
        #[builder(default = 0.3)] influence_global: f64,
        #[builder(default = 0.6)] influence_local: f64,
        #[builder(default = 0.1)] influence_random: f64,
    ) -> Result<Self> {
        ensure!(swarm_size > 0, InvalidSwarmSnafu { reason: "swarm size must be positive" });
        for (name, value) in
            [("global", influence_global), ("local", influence_local), ("random", influence_random)]
        {
            ensure!(
                (0.0..=1.0).contains(&value),
                InvalidSwarmSnafu { reason: format!("{name} influence {value} is outside [0, 1]") }
            );
        }
        let total = influence_global + influence_local + influence_random;
        ensure!(total <= 1.0 + 1e-9, InvalidSwarmSnafu { reason: format!("influences sum to {total}, above 1") });
        Ok(Self { swarm_size, influence_global, influence_local, influence_random })
    }

    /// Create swarm settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `TUNESMITH_PSO_SWARM_SIZE` - Number of particles (default: 8)
    /// * `TUNESMITH_PSO_INF_GLOBAL` - Pull toward the global best (default: 0.3)
    /// * `TUNESMITH_PSO_INF_LOCAL` - Pull toward the particle's best (default: 0.6)
    /// * `TUNESMITH_PSO_INF_RANDOM` - Random jumps (default: 0.1)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Self::builder()
            .swarm_size(env_parse("TUNESMITH_PSO_SWARM_SIZE").unwrap_or(defaults.swarm_size))
            .influence_global(env_parse("TUNESMITH_PSO_INF_GLOBAL").unwrap_or(defaults.influence_global))
            .influence_local(env_parse("TUNESMITH_PSO_INF_LOCAL").unwrap_or(defaults.influence_local))
            .influence_random(env_parse("TUNESMITH_PSO_INF_RANDOM").unwrap_or(defaults.influence_random))
            .build()
    }
}
