use std::sync::Arc;

use smallvec::SmallVec;
use snafu::ensure;

use crate::configuration::Configuration;
use crate::error::*;
use crate::parameter::ParameterSpace;
use crate::predicate::Predicate;

/// A predicate bound to an ordered list of parameter names.
#[derive(Debug, Clone)]
pub struct Constraint {
    predicate: Predicate,
    names: Vec<String>,
    positions: SmallVec<[usize; 4]>,
}

impl Constraint {
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Positions of the bound parameters in the owning space.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Deepest parameter the constraint reads; `None` when it reads nothing.
    pub fn ready_at(&self) -> Option<usize> {
        self.positions.iter().copied().max()
    }

    /// Evaluate against positional values of the whole space.
    ///
    /// Only the positions this constraint reads need to be bound.
    pub fn evaluate(&self, values: &[usize]) -> Result<bool> {
        let args: SmallVec<[usize; 4]> = self.positions.iter().map(|&i| values[i]).collect();
        self.predicate.evaluate(&args)
    }
}

/// Ordered constraints over one shared [`ParameterSpace`].
#[derive(Debug, Clone)]
pub struct ConstraintSet {
    space: Arc<ParameterSpace>,
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new(space: Arc<ParameterSpace>) -> Self {
        Self { space, constraints: Vec::new() }
    }

    pub fn space(&self) -> &Arc<ParameterSpace> {
        &self.space
    }

    /// Bind `predicate` to `names`, resolving each name against the space.
    pub fn add(&mut self, predicate: Predicate, names: &[&str]) -> Result<()> {
        predicate.check_arity(names.len())?;
        let positions = names.iter().map(|name| self.space.require(name)).collect::<Result<_>>()?;
        let names = names.iter().map(|name| name.to_string()).collect();
        self.constraints.push(Constraint { predicate, names, positions });
        Ok(())
    }

    /// Chaining form of [`add`](Self::add).
    pub fn with(mut self, predicate: Predicate, names: &[&str]) -> Result<Self> {
        self.add(predicate, names)?;
        Ok(self)
    }

    /// Append every constraint of `other`, which must be built over the same space.
    pub fn extend(&mut self, other: &ConstraintSet) -> Result<()> {
        ensure!(Arc::ptr_eq(&self.space, &other.space) || self.space == other.space, SpaceMismatchSnafu);
        self.constraints.extend(other.constraints.iter().cloned());
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Check every constraint against fully bound positional values.
    pub fn check_values(&self, values: &[usize]) -> Result<bool> {
        ensure!(
            values.len() == self.space.len(),
            IncompleteConfigurationSnafu { expected: self.space.len(), found: values.len() }
        );
        for constraint in &self.constraints {
            if !constraint.evaluate(values)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Re-check a finished configuration against every constraint.
    pub fn is_satisfied(&self, config: &Configuration) -> Result<bool> {
        Ok(self.first_violation(config)?.is_none())
    }

    /// First constraint, in insertion order, that `config` violates.
    pub fn first_violation(&self, config: &Configuration) -> Result<Option<&Constraint>> {
        ensure!(
            Arc::ptr_eq(&self.space, config.space()) || *self.space == **config.space(),
            SpaceMismatchSnafu
        );
        for constraint in &self.constraints {
            if !constraint.evaluate(config.values())? {
                return Ok(Some(constraint));
            }
        }
        Ok(None)
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.constraints.iter()
    }
}
