//! Resolution of valid configurations.
//!
//! One engine, parameterised by [`SearchMode`]:
//!
//! - [`Exhaustive`] - backtracking walk of the Cartesian product, pruning a
//!   subtree as soon as a constraint over its bound prefix fails
//! - [`Sampler`] - uniform random draws from the unpruned product, emitted
//!   without replacement
//! - [`ParticleSwarm`] - swarm moves steered by reported costs, falling back
//!   to uniform draws
//!
//! All yield `Result<Configuration>` and stop after the first error.

mod config;
mod exhaustive;
mod parallel;
mod sampling;
mod swarm;

use std::ops::AddAssign;

pub use config::{SamplingConfig, SearchMode, SwarmConfig, normalize_fraction, swarm_requested};
pub use exhaustive::Exhaustive;
pub use parallel::{collect_exhaustive_parallel, collect_sampled_parallel};
pub use sampling::Sampler;
pub use swarm::ParticleSwarm;

use crate::configuration::Configuration;
use crate::constraint::ConstraintSet;
use crate::error::*;

/// Counters collected while resolving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ResolverStats {
    /// Individual constraint evaluations.
    pub evaluations: u64,
    /// Exhaustive subtrees cut by a failing constraint.
    pub pruned: u64,
    /// Random draws.
    pub draws: u64,
    /// Draws failing a constraint.
    pub rejections: u64,
    /// Valid draws that repeated an emitted configuration.
    pub duplicates: u64,
    /// Configurations yielded.
    pub emitted: u64,
}

impl AddAssign for ResolverStats {
    fn add_assign(&mut self, rhs: Self) {
        self.evaluations += rhs.evaluations;
        self.pruned += rhs.pruned;
        self.draws += rhs.draws;
        self.rejections += rhs.rejections;
        self.duplicates += rhs.duplicates;
        self.emitted += rhs.emitted;
    }
}

/// Entry point binding a constraint set to a search mode.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    constraints: &'a ConstraintSet,
}

impl<'a> Resolver<'a> {
    pub fn new(constraints: &'a ConstraintSet) -> Self {
        Self { constraints }
    }

    pub fn exhaustive(&self) -> Exhaustive<'a> {
        Exhaustive::new(self.constraints)
    }

    pub fn sample(&self, config: &SamplingConfig) -> Sampler<'a> {
        Sampler::new(self.constraints, config.clone())
    }

    pub fn swarm(&self, sampling: &SamplingConfig, swarm: &SwarmConfig) -> ParticleSwarm<'a> {
        ParticleSwarm::new(self.constraints, sampling.clone(), swarm.clone())
    }

    pub fn resolve(&self, mode: &SearchMode) -> Configurations<'a> {
        match mode {
            SearchMode::Exhaustive => Configurations::Exhaustive(self.exhaustive()),
            SearchMode::Sampling(config) => Configurations::Sampling(self.sample(config)),
            SearchMode::Swarm { sampling, swarm } => Configurations::Swarm(self.swarm(sampling, swarm)),
        }
    }
}

/// Lazy stream of valid configurations in any mode.
#[derive(Debug)]
pub enum Configurations<'a> {
    Exhaustive(Exhaustive<'a>),
    Sampling(Sampler<'a>),
    Swarm(ParticleSwarm<'a>),
}

impl Configurations<'_> {
    pub fn stats(&self) -> &ResolverStats {
        match self {
            Self::Exhaustive(inner) => inner.stats(),
            Self::Sampling(inner) => inner.stats(),
            Self::Swarm(inner) => inner.stats(),
        }
    }

    /// Report the cost of the configuration yielded last.
    ///
    /// Only a swarm search uses costs; the other modes ignore them.
    pub fn record(&mut self, cost: Option<f64>) {
        if let Self::Swarm(inner) = self {
            inner.record(cost);
        }
    }

    /// Drain the stream, returning what was found before the first error.
    ///
    /// The error, if any, is returned alongside the partial result.
    pub fn collect_until_error(self) -> (Vec<Configuration>, Option<SpaceError>) {
        let mut found = Vec::new();
        for item in self {
            match item {
                Ok(config) => found.push(config),
                Err(err) => return (found, Some(err)),
            }
        }
        (found, None)
    }
}

impl Iterator for Configurations<'_> {
    type Item = Result<Configuration>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Exhaustive(inner) => inner.next(),
            Self::Sampling(inner) => inner.next(),
            Self::Swarm(inner) => inner.next(),
        }
    }
}
