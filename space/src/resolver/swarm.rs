use std::collections::HashSet;
use std::iter::FusedIterator;
use std::sync::Arc;

use rand::Rng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use super::sampling::{Draw, draw, seeded_rng};
use super::{ResolverStats, SamplingConfig, SwarmConfig};
use crate::configuration::{Configuration, Values};
use crate::constraint::ConstraintSet;
use crate::error::*;
use crate::parameter::ParameterSpace;

#[derive(Debug, Clone, Default)]
struct Particle {
    position: Option<Values>,
    best: Option<(Values, f64)>,
}

/// Particle swarm search over valid configurations.
///
/// Particles take turns. A particle without a position starts from a uniform
/// draw; otherwise it moves per [`SwarmConfig`] and falls back to a uniform
/// draw when the move lands on an invalid or already visited configuration.
/// Costs reported through [`ParticleSwarm::record`] steer later moves; without
/// them the search degrades to random sampling.
///
/// Emission, budgets and exhaustion follow [`super::Sampler`]: at most
/// `ceil(fraction * N)` distinct configurations, every validated candidate
/// counts as a draw, and `max_consecutive_rejections` failed candidates in a
/// row yield [`SpaceError::SampleExhaustion`].
#[derive(Debug)]
pub struct ParticleSwarm<'a> {
    constraints: &'a ConstraintSet,
    space: Arc<ParameterSpace>,
    sampling: SamplingConfig,
    swarm: SwarmConfig,
    rng: StdRng,
    target: usize,
    particles: Vec<Particle>,
    global_best: Option<(Values, f64)>,
    visited: HashSet<Values>,
    turn: usize,
    pending: Option<usize>,
    consecutive: u64,
    stats: ResolverStats,
    done: bool,
}

impl<'a> ParticleSwarm<'a> {
    pub fn new(constraints: &'a ConstraintSet, sampling: SamplingConfig, swarm: SwarmConfig) -> Self {
        let space = Arc::clone(constraints.space());
        let target = sampling.target(space.cartesian_size());
        Self {
            constraints,
            space,
            rng: seeded_rng(sampling.seed),
            particles: vec![Particle::default(); swarm.swarm_size.max(1)],
            sampling,
            swarm,
            target,
            global_best: None,
            visited: HashSet::new(),
            turn: 0,
            pending: None,
            consecutive: 0,
            stats: ResolverStats::default(),
            done: false,
        }
    }

    /// Number of configurations the search aims to emit.
    pub fn target(&self) -> usize {
        self.target
    }

    pub fn stats(&self) -> &ResolverStats {
        &self.stats
    }

    /// Lowest cost recorded so far, with its configuration.
    pub fn best(&self) -> Option<(Configuration, f64)> {
        self.global_best
            .as_ref()
            .map(|(values, cost)| (Configuration::new_unchecked(Arc::clone(&self.space), values.clone()), *cost))
    }

    /// Report the cost of the configuration yielded last; lower is better.
    ///
    /// `None` marks a configuration that could not be measured. Only the first
    /// report after each yield counts.
    pub fn record(&mut self, cost: Option<f64>) {
        let Some(index) = self.pending.take() else {
            return;
        };
        let Some(cost) = cost.filter(|cost| !cost.is_nan()) else {
            return;
        };
        let particle = &mut self.particles[index];
        let Some(position) = particle.position.clone() else {
            return;
        };

        if particle.best.as_ref().is_none_or(|(_, best)| cost < *best) {
            particle.best = Some((position.clone(), cost));
        }
        if self.global_best.as_ref().is_none_or(|(_, best)| cost < *best) {
            self.global_best = Some((position, cost));
        }
    }

    /// Candidate reached by moving particle `index`, if it has a position.
    fn step(&mut self, index: usize) -> Option<Values> {
        let particle = &self.particles[index];
        let position = particle.position.as_ref()?;

        let global = self.swarm.influence_global;
        let local = global + self.swarm.influence_local;
        let random = local + self.swarm.influence_random;

        let mut values = Values::with_capacity(position.len());
        for (dim, param) in self.space.parameters().iter().enumerate() {
            let roll: f64 = self.rng.r#gen();
            let value = match roll {
                r if r < global => self.global_best.as_ref().map_or(position[dim], |(best, _)| best[dim]),
                r if r < local => particle.best.as_ref().map_or(position[dim], |(best, _)| best[dim]),
                r if r < random => param.candidates()[self.rng.gen_range(0..param.len())],
                _ => position[dim],
            };
            values.push(value);
        }
        Some(values)
    }

    fn check(&mut self, values: &[usize]) -> Result<bool> {
        self.stats.draws += 1;
        for constraint in self.constraints {
            self.stats.evaluations += 1;
            if !constraint.evaluate(values)? {
                self.stats.rejections += 1;
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn accept(&mut self, index: usize, values: Values) -> Configuration {
        self.visited.insert(values.clone());
        self.particles[index].position = Some(values.clone());
        self.pending = Some(index);
        self.consecutive = 0;
        self.stats.emitted += 1;
        Configuration::new_unchecked(Arc::clone(&self.space), values)
    }

    fn budget_spent(&mut self) -> bool {
        if self.stats.draws < self.sampling.max_draws {
            return false;
        }
        warn!(
            found = self.visited.len(),
            target = self.target,
            draws = self.stats.draws,
            "swarm draw budget spent before reaching target"
        );
        self.finish();
        true
    }

    fn finish(&mut self) {
        self.done = true;
        debug!(
            particles = self.particles.len(),
            draws = self.stats.draws,
            rejections = self.stats.rejections,
            duplicates = self.stats.duplicates,
            emitted = self.stats.emitted,
            target = self.target,
            best = ?self.global_best.as_ref().map(|(_, cost)| *cost),
            "swarm search finished"
        );
    }
}

impl Iterator for ParticleSwarm<'_> {
    type Item = Result<Configuration>;

    fn next(&mut self) -> Option<Self::Item> {
        self.pending = None;
        if self.done {
            return None;
        }
        if self.visited.len() >= self.target {
            self.finish();
            return None;
        }
        if self.budget_spent() {
            return None;
        }

        let index = self.turn;
        self.turn = (self.turn + 1) % self.particles.len();

        if let Some(values) = self.step(index) {
            match self.check(&values) {
                Err(err) => {
                    self.finish();
                    return Some(Err(err));
                }
                Ok(true) if !self.visited.contains(&values) => return Some(Ok(self.accept(index, values))),
                Ok(true) => self.stats.duplicates += 1,
                Ok(false) => {}
            }
            self.consecutive += 1;
        }

        loop {
            if self.consecutive >= self.sampling.max_consecutive_rejections {
                let (found, draws) = (self.visited.len(), self.stats.draws);
                self.finish();
                return Some(SampleExhaustionSnafu { found, draws }.fail());
            }
            if self.budget_spent() {
                return None;
            }

            match draw(self.constraints, &self.space, &mut self.rng, &mut self.stats) {
                Err(err) => {
                    self.finish();
                    return Some(Err(err));
                }
                Ok(Draw::Valid(values)) if !self.visited.contains(&values) => {
                    return Some(Ok(self.accept(index, values)));
                }
                Ok(Draw::Valid(_)) => {
                    self.stats.duplicates += 1;
                    self.consecutive += 1;
                }
                Ok(Draw::Rejected) => self.consecutive += 1,
            }
        }
    }
}

impl FusedIterator for ParticleSwarm<'_> {}
