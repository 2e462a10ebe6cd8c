//! Predicates over positional parameter values.
//!
//! Built-in shapes cover the divisibility relations tile-size parameters
//! usually need. Arithmetic is done in `u128`, so products of two `usize`
//! candidates never overflow. Any modulo or quotient by zero is reported as
//! [`SpaceError::DivisionByZero`].

use std::fmt;
use std::sync::Arc;

use snafu::ensure;

use crate::error::*;

/// Shared closure backing a custom predicate.
pub type PredicateFn = Arc<dyn Fn(&[usize]) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum Predicate {
    /// `v[0] % v[1] == 0`.
    IsMultiple,
    /// `v[0] % (v[1] * v[2]) == 0`.
    IsMultipleOfProduct,
    /// `v[0] % ((v[1] * v[2]) / v[3]) == 0`, with truncating division.
    IsMultipleOfProductDividedBy,
    /// `v[0] == v[1]`.
    AreEqual,
    /// Arbitrary predicate. With `arity: None` any number of values is accepted.
    Custom { name: Arc<str>, arity: Option<usize>, func: PredicateFn },
}

impl Predicate {
    pub fn custom(name: impl Into<Arc<str>>, func: impl Fn(&[usize]) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom { name: name.into(), arity: None, func: Arc::new(func) }
    }

    pub fn custom_with_arity(
        name: impl Into<Arc<str>>,
        arity: usize,
        func: impl Fn(&[usize]) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Custom { name: name.into(), arity: Some(arity), func: Arc::new(func) }
    }

    /// Number of values the predicate reads, if fixed.
    pub const fn arity(&self) -> Option<usize> {
        match self {
            Self::IsMultiple | Self::AreEqual => Some(2),
            Self::IsMultipleOfProduct => Some(3),
            Self::IsMultipleOfProductDividedBy => Some(4),
            Self::Custom { arity, .. } => *arity,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::IsMultiple => "IsMultiple",
            Self::IsMultipleOfProduct => "IsMultipleOfProduct",
            Self::IsMultipleOfProductDividedBy => "IsMultipleOfProductDividedBy",
            Self::AreEqual => "AreEqual",
            Self::Custom { name, .. } => name.as_ref(),
        }
    }

    pub fn check_arity(&self, found: usize) -> Result<()> {
        if let Some(expected) = self.arity() {
            ensure!(expected == found, ArityMismatchSnafu { predicate: self.name(), expected, found });
        }
        Ok(())
    }

    pub fn evaluate(&self, values: &[usize]) -> Result<bool> {
        self.check_arity(values.len())?;

        let v = |i: usize| values[i] as u128;
        match self {
            Self::IsMultiple => self.is_multiple(v(0), v(1), values),
            Self::IsMultipleOfProduct => self.is_multiple(v(0), v(1) * v(2), values),
            Self::IsMultipleOfProductDividedBy => {
                ensure!(v(3) != 0, DivisionByZeroSnafu { predicate: self.name(), values });
                self.is_multiple(v(0), (v(1) * v(2)) / v(3), values)
            }
            Self::AreEqual => Ok(values[0] == values[1]),
            Self::Custom { func, .. } => Ok(func(values)),
        }
    }

    fn is_multiple(&self, value: u128, divisor: u128, values: &[usize]) -> Result<bool> {
        ensure!(divisor != 0, DivisionByZeroSnafu { predicate: self.name(), values });
        Ok(value % divisor == 0)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom { name, arity, .. } => {
                f.debug_struct("Custom").field("name", name).field("arity", arity).finish()
            }
            other => f.write_str(other.name()),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
