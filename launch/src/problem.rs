use std::fmt;

use serde::{Deserialize, Serialize};
use snafu::OptionExt;

use crate::error::*;

/// Named problem dimensions such as `m`, `n` and `k`, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProblemSize {
    dims: Vec<(String, usize)>,
}

impl ProblemSize {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing an earlier value in place.
    pub fn with(mut self, name: impl Into<String>, value: usize) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: usize) {
        let name = name.into();
        match self.dims.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.dims.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.dims.iter().find(|(n, _)| n == name).map(|&(_, v)| v)
    }

    pub fn require(&self, name: &str) -> Result<usize> {
        self.get(name).context(MissingValueSnafu { name })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.dims.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }

    /// Product of the named dimensions; an empty list gives 1.
    pub fn product<S: AsRef<str>>(&self, names: &[S]) -> Result<usize> {
        names.iter().try_fold(1usize, |acc, name| {
            let value = self.require(name.as_ref())?;
            acc.checked_mul(value).context(OverflowSnafu { axis: "problem", dim: 0usize })
        })
    }
}

impl<S: Into<String>> FromIterator<(S, usize)> for ProblemSize {
    fn from_iter<I: IntoIterator<Item = (S, usize)>>(iter: I) -> Self {
        let mut problem = Self::new();
        for (name, value) in iter {
            problem.set(name, value);
        }
        problem
    }
}

impl fmt::Display for ProblemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}
