use std::collections::HashMap;

use smallvec::SmallVec;
use snafu::{OptionExt, ensure};

use crate::error::*;

/// Candidate values of one parameter, in priority order.
pub type Candidates = SmallVec<[usize; 8]>;

/// A named compile-time choice with a finite, ordered domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TunableParameter {
    name: String,
    candidates: Candidates,
}

impl TunableParameter {
    /// Repeated candidates are dropped; the first occurrence keeps its position.
    pub fn new(name: impl Into<String>, candidates: impl IntoIterator<Item = usize>) -> Result<Self> {
        let name = name.into();
        let mut unique = Candidates::new();
        for value in candidates {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
        ensure!(!unique.is_empty(), EmptyDomainSnafu { name });
        Ok(Self { name, candidates: unique })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    /// Number of candidates; never zero.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn contains(&self, value: usize) -> bool {
        self.candidates.contains(&value)
    }
}

/// Ordered collection of tunable parameters.
///
/// Insertion order is the canonical order for exhaustive expansion and for
/// positional access to configuration values. Parameters cannot be removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSpace {
    parameters: Vec<TunableParameter>,
    index: HashMap<String, usize>,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, candidates: impl IntoIterator<Item = usize>) -> Result<()> {
        let name = name.into();
        ensure!(!self.index.contains_key(&name), DuplicateParameterSnafu { name });

        let parameter = TunableParameter::new(name.clone(), candidates)?;
        self.index.insert(name, self.parameters.len());
        self.parameters.push(parameter);
        Ok(())
    }

    /// Chaining form of [`add`](Self::add).
    pub fn with(mut self, name: impl Into<String>, candidates: impl IntoIterator<Item = usize>) -> Result<Self> {
        self.add(name, candidates)?;
        Ok(self)
    }

    pub fn all_names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.parameters.iter().map(TunableParameter::name)
    }

    pub fn parameters(&self) -> &[TunableParameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&TunableParameter> {
        self.position(name).map(|i| &self.parameters[i])
    }

    pub fn candidates(&self, name: &str) -> Option<&[usize]> {
        self.parameter(name).map(TunableParameter::candidates)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Like [`position`](Self::position), but an absent name is an error.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.position(name).context(UnknownParameterSnafu { name })
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Size of the unpruned Cartesian product, saturating at `u128::MAX`.
    ///
    /// An empty space has exactly one (empty) configuration.
    pub fn cartesian_size(&self) -> u128 {
        self.parameters.iter().fold(1u128, |acc, p| acc.saturating_mul(p.len() as u128))
    }
}
