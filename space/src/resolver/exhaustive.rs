use std::iter::FusedIterator;
use std::ops::Range;
use std::sync::Arc;

use tracing::debug;

use super::ResolverStats;
use crate::configuration::{Configuration, Values};
use crate::constraint::{Constraint, ConstraintSet};
use crate::error::*;
use crate::parameter::ParameterSpace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fresh,
    Running,
    Done,
}

/// Backtracking enumeration of every valid configuration.
///
/// Parameters are bound in insertion order and candidates in candidate
/// order, so the output is lexicographic. Each constraint runs at the depth
/// where its last parameter becomes bound; a failure prunes the whole
/// subtree below that binding.
#[derive(Debug)]
pub struct Exhaustive<'a> {
    space: Arc<ParameterSpace>,
    /// Constraints reading no parameters; checked once before the walk.
    root: Vec<&'a Constraint>,
    /// `schedule[d]` holds constraints whose deepest parameter is `d`.
    schedule: Vec<Vec<&'a Constraint>>,
    /// Next candidate index to try, per depth.
    cursor: Vec<usize>,
    values: Vec<usize>,
    depth: usize,
    first: Range<usize>,
    state: State,
    stats: ResolverStats,
}

impl<'a> Exhaustive<'a> {
    pub fn new(constraints: &'a ConstraintSet) -> Self {
        let space = Arc::clone(constraints.space());
        let width = space.len();

        let mut root = Vec::new();
        let mut schedule = vec![Vec::new(); width];
        for constraint in constraints {
            match constraint.ready_at() {
                Some(depth) => schedule[depth].push(constraint),
                None => root.push(constraint),
            }
        }

        let first = 0..space.parameters().first().map_or(0, |p| p.len());
        Self {
            space,
            root,
            schedule,
            cursor: vec![0; width],
            values: vec![0; width],
            depth: 0,
            first,
            state: State::Fresh,
            stats: ResolverStats::default(),
        }
    }

    /// Restrict the first parameter to the given candidate indices.
    pub(crate) fn with_first_range(mut self, range: Range<usize>) -> Self {
        self.first = range;
        self
    }

    pub fn stats(&self) -> &ResolverStats {
        &self.stats
    }

    fn limit(&self, depth: usize) -> usize {
        if depth == 0 { self.first.end } else { self.space.parameters()[depth].len() }
    }

    fn check(&mut self, constraints: &[&'a Constraint]) -> Result<bool> {
        for constraint in constraints {
            self.stats.evaluations += 1;
            if !constraint.evaluate(&self.values)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn finish(&mut self) {
        self.state = State::Done;
        debug!(
            evaluations = self.stats.evaluations,
            pruned = self.stats.pruned,
            emitted = self.stats.emitted,
            "exhaustive resolution finished"
        );
    }

    fn fail(&mut self, err: SpaceError) -> Option<Result<Configuration>> {
        self.finish();
        Some(Err(err))
    }

    fn start(&mut self) -> Option<Option<Result<Configuration>>> {
        self.state = State::Running;
        let root = std::mem::take(&mut self.root);
        match self.check(&root) {
            Err(err) => return Some(self.fail(err)),
            Ok(false) => {
                self.stats.pruned += 1;
                self.finish();
                return Some(None);
            }
            Ok(true) => {}
        }

        if self.space.is_empty() {
            self.stats.emitted += 1;
            self.finish();
            return Some(Some(Ok(Configuration::new_unchecked(Arc::clone(&self.space), Values::new()))));
        }

        self.depth = 0;
        self.cursor[0] = self.first.start;
        None
    }
}

impl Iterator for Exhaustive<'_> {
    type Item = Result<Configuration>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.state {
            State::Done => return None,
            State::Fresh => {
                if let Some(early) = self.start() {
                    return early;
                }
            }
            State::Running => {}
        }

        loop {
            let depth = self.depth;
            if self.cursor[depth] >= self.limit(depth) {
                if depth == 0 {
                    self.finish();
                    return None;
                }
                self.depth -= 1;
                continue;
            }

            let index = self.cursor[depth];
            self.cursor[depth] += 1;
            self.values[depth] = self.space.parameters()[depth].candidates()[index];

            let ready = std::mem::take(&mut self.schedule[depth]);
            let verdict = self.check(&ready);
            self.schedule[depth] = ready;

            match verdict {
                Err(err) => return self.fail(err),
                Ok(false) => {
                    self.stats.pruned += 1;
                    continue;
                }
                Ok(true) => {}
            }

            if depth + 1 == self.values.len() {
                self.stats.emitted += 1;
                return Some(Ok(Configuration::new_unchecked(Arc::clone(&self.space), self.values.as_slice())));
            }

            self.depth += 1;
            self.cursor[self.depth] = 0;
        }
    }
}

impl FusedIterator for Exhaustive<'_> {}
