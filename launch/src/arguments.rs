//! Positional kernel argument binding.
//!
//! An [`ArgumentLayout`] lists the kernel's parameters in signature order.
//! Binding a layout never consults the resolver: it reads the problem size,
//! the buffers, the scalars and (for runtime parameters) the configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ensure};
use tunesmith_precision::{Precision, Scalar};
use tunesmith_space::{Configuration, ParameterSpace};

use crate::error::*;
use crate::problem::ProblemSize;

/// Role of a problem buffer. The discriminant is the conventional buffer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumIter, strum::FromRepr)]
#[derive(Serialize, Deserialize)]
pub enum BufferRole {
    X = 0,
    Y = 1,
    A = 2,
    B = 3,
    C = 4,
    Temp = 5,
}

impl BufferRole {
    pub const fn id(&self) -> usize {
        *self as usize
    }
}

/// One positional kernel parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgumentSlot {
    /// Problem dimension narrowed to `i32`.
    Dimension(String),
    Alpha,
    Beta,
    Buffer(BufferRole),
    /// Element offset into a buffer; always zero while tuning.
    Offset(BufferRole),
    /// Leading-dimension stride, taken from a problem dimension.
    LeadingDimension(String),
    /// Fixed behavioural flag.
    Flag { name: String, value: i32 },
    /// Tuning parameter passed at launch time instead of compiled in.
    Parameter(String),
}

/// A bound kernel argument. `B` is the caller's buffer handle.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelArg<B> {
    Int(i32),
    Scalar(Scalar),
    Buffer(B),
}

impl<B> KernelArg<B> {
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_buffer(&self) -> Option<&B> {
        match self {
            Self::Buffer(b) => Some(b),
            _ => None,
        }
    }
}

/// Buffer handles keyed by role.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemBuffers<B> {
    buffers: BTreeMap<BufferRole, B>,
}

impl<B> Default for ProblemBuffers<B> {
    fn default() -> Self {
        Self { buffers: BTreeMap::new() }
    }
}

impl<B> ProblemBuffers<B> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, role: BufferRole, buffer: B) -> Self {
        self.buffers.insert(role, buffer);
        self
    }

    pub fn insert(&mut self, role: BufferRole, buffer: B) -> Option<B> {
        self.buffers.insert(role, buffer)
    }

    pub fn get(&self, role: BufferRole) -> Option<&B> {
        self.buffers.get(&role)
    }

    pub fn require(&self, role: BufferRole) -> Result<&B> {
        self.get(role).context(MissingBufferSnafu { role })
    }
}

impl<B> FromIterator<(BufferRole, B)> for ProblemBuffers<B> {
    fn from_iter<I: IntoIterator<Item = (BufferRole, B)>>(iter: I) -> Self {
        Self { buffers: iter.into_iter().collect() }
    }
}

/// The alpha and beta coefficients of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProblemScalars {
    pub alpha: Scalar,
    pub beta: Scalar,
}

impl ProblemScalars {
    pub fn new(precision: Precision, alpha: (f64, f64), beta: (f64, f64)) -> Self {
        Self { alpha: precision.scalar(alpha.0, alpha.1), beta: precision.scalar(beta.0, beta.1) }
    }

    /// Tuning defaults: `2.0` for real precisions, `2.0 + 0.5i` for complex ones.
    pub fn tuning_defaults(precision: Precision) -> Self {
        Self::new(precision, (2.0, 0.5), (2.0, 0.5))
    }
}

/// A buffer the tuner must allocate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferSpec {
    pub role: BufferRole,
    /// Problem dimensions whose product is the element count.
    pub dims: Vec<String>,
    pub is_input: bool,
    pub is_output: bool,
}

impl BufferSpec {
    pub fn new(role: BufferRole, dims: &[&str]) -> Self {
        Self { role, dims: dims.iter().map(|d| d.to_string()).collect(), is_input: false, is_output: false }
    }

    pub fn input(mut self) -> Self {
        self.is_input = true;
        self
    }

    pub fn output(mut self) -> Self {
        self.is_output = true;
        self
    }

    /// Element count for `problem`.
    pub fn len(&self, problem: &ProblemSize) -> Result<usize> {
        problem.product(&self.dims)
    }

    pub fn bytes(&self, problem: &ProblemSize, precision: Precision) -> Result<usize> {
        let len = self.len(problem)?;
        len.checked_mul(precision.bytes()).context(OverflowSnafu { axis: "buffer", dim: self.role.id() })
    }
}

/// Kernel signature as an ordered list of slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentLayout {
    slots: Vec<ArgumentSlot>,
}

impl ArgumentLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(mut self, slot: ArgumentSlot) -> Self {
        self.slots.push(slot);
        self
    }

    pub fn dimension(self, name: &str) -> Self {
        self.slot(ArgumentSlot::Dimension(name.to_string()))
    }

    pub fn alpha(self) -> Self {
        self.slot(ArgumentSlot::Alpha)
    }

    pub fn beta(self) -> Self {
        self.slot(ArgumentSlot::Beta)
    }

    /// Buffer handle, zero offset and leading dimension, in that order.
    pub fn matrix(self, role: BufferRole, leading_dimension: &str) -> Self {
        self.slot(ArgumentSlot::Buffer(role))
            .slot(ArgumentSlot::Offset(role))
            .slot(ArgumentSlot::LeadingDimension(leading_dimension.to_string()))
    }

    pub fn flag(self, name: &str, value: i32) -> Self {
        self.slot(ArgumentSlot::Flag { name: name.to_string(), value })
    }

    pub fn parameter(self, name: &str) -> Self {
        self.slot(ArgumentSlot::Parameter(name.to_string()))
    }

    pub fn slots(&self) -> &[ArgumentSlot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Check that every runtime parameter slot names a parameter of `space`.
    pub fn validate(&self, space: &ParameterSpace) -> Result<()> {
        for slot in &self.slots {
            if let ArgumentSlot::Parameter(name) = slot {
                ensure!(space.position(name).is_some(), UnknownParameterSnafu { name });
            }
        }
        Ok(())
    }

    /// Bind every slot, in order.
    pub fn bind<B: Clone>(
        &self,
        problem: &ProblemSize,
        config: &Configuration,
        buffers: &ProblemBuffers<B>,
        scalars: &ProblemScalars,
    ) -> Result<Vec<KernelArg<B>>> {
        self.slots
            .iter()
            .map(|slot| {
                Ok(match slot {
                    ArgumentSlot::Dimension(name) | ArgumentSlot::LeadingDimension(name) => {
                        KernelArg::Int(narrow(name, problem.require(name)?)?)
                    }
                    ArgumentSlot::Alpha => KernelArg::Scalar(scalars.alpha),
                    ArgumentSlot::Beta => KernelArg::Scalar(scalars.beta),
                    ArgumentSlot::Buffer(role) => KernelArg::Buffer(buffers.require(*role)?.clone()),
                    ArgumentSlot::Offset(_) => KernelArg::Int(0),
                    ArgumentSlot::Flag { value, .. } => KernelArg::Int(*value),
                    ArgumentSlot::Parameter(name) => {
                        let value = config.get(name).context(UnknownParameterSnafu { name })?;
                        KernelArg::Int(narrow(name, value)?)
                    }
                })
            })
            .collect()
    }
}

fn narrow(name: &str, value: usize) -> Result<i32> {
    i32::try_from(value).ok().context(DimensionOverflowSnafu { name, value })
}
