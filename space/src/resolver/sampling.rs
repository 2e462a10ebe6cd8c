use std::collections::HashSet;
use std::iter::FusedIterator;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use super::{ResolverStats, SamplingConfig};
use crate::configuration::{Configuration, Values};
use crate::constraint::ConstraintSet;
use crate::error::*;
use crate::parameter::ParameterSpace;

/// Outcome of a single random draw.
pub(crate) enum Draw {
    Valid(Values),
    Rejected,
}

/// Draw one configuration uniformly from the unpruned product and validate it.
pub(crate) fn draw(
    constraints: &ConstraintSet,
    space: &ParameterSpace,
    rng: &mut StdRng,
    stats: &mut ResolverStats,
) -> Result<Draw> {
    stats.draws += 1;
    let values: Values = space.parameters().iter().map(|p| p.candidates()[rng.gen_range(0..p.len())]).collect();

    for constraint in constraints {
        stats.evaluations += 1;
        if !constraint.evaluate(&values)? {
            stats.rejections += 1;
            return Ok(Draw::Rejected);
        }
    }
    Ok(Draw::Valid(values))
}

pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Random sampling without replacement.
///
/// Stops once `ceil(fraction * N)` configurations were emitted or the draw
/// budget is spent. A rejected or duplicate draw extends the current run of
/// rejections; reaching `max_consecutive_rejections` yields
/// [`SpaceError::SampleExhaustion`].
#[derive(Debug)]
pub struct Sampler<'a> {
    constraints: &'a ConstraintSet,
    space: Arc<ParameterSpace>,
    config: SamplingConfig,
    rng: StdRng,
    target: usize,
    emitted: HashSet<Values>,
    consecutive: u64,
    stats: ResolverStats,
    done: bool,
}

impl<'a> Sampler<'a> {
    pub fn new(constraints: &'a ConstraintSet, config: SamplingConfig) -> Self {
        let space = Arc::clone(constraints.space());
        let target = config.target(space.cartesian_size());
        Self {
            constraints,
            space,
            rng: seeded_rng(config.seed),
            config,
            target,
            emitted: HashSet::new(),
            consecutive: 0,
            stats: ResolverStats::default(),
            done: false,
        }
    }

    /// Number of configurations the sampler aims to emit.
    pub fn target(&self) -> usize {
        self.target
    }

    pub fn stats(&self) -> &ResolverStats {
        &self.stats
    }

    fn finish(&mut self) {
        self.done = true;
        debug!(
            draws = self.stats.draws,
            rejections = self.stats.rejections,
            duplicates = self.stats.duplicates,
            emitted = self.stats.emitted,
            target = self.target,
            "sampled resolution finished"
        );
    }
}

impl Iterator for Sampler<'_> {
    type Item = Result<Configuration>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.emitted.len() >= self.target {
            self.finish();
            return None;
        }

        loop {
            if self.stats.draws >= self.config.max_draws {
                warn!(
                    found = self.emitted.len(),
                    target = self.target,
                    draws = self.stats.draws,
                    "sampling draw budget spent before reaching target"
                );
                self.finish();
                return None;
            }

            match draw(self.constraints, &self.space, &mut self.rng, &mut self.stats) {
                Err(err) => {
                    self.finish();
                    return Some(Err(err));
                }
                Ok(Draw::Valid(values)) if self.emitted.insert(values.clone()) => {
                    self.consecutive = 0;
                    self.stats.emitted += 1;
                    return Some(Ok(Configuration::new_unchecked(Arc::clone(&self.space), values)));
                }
                Ok(Draw::Valid(_)) => {
                    self.stats.duplicates += 1;
                    self.consecutive += 1;
                }
                Ok(Draw::Rejected) => self.consecutive += 1,
            }

            if self.consecutive >= self.config.max_consecutive_rejections {
                let (found, draws) = (self.emitted.len(), self.stats.draws);
                self.finish();
                return Some(SampleExhaustionSnafu { found, draws }.fail());
            }
        }
    }
}

impl FusedIterator for Sampler<'_> {}
