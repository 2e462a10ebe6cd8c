//! Launch geometry derivation.
//!
//! The global size starts from the problem size, rounded up to a multiple of
//! the base local size. Scale rules then multiply local or global dimensions
//! by a parameter value, and divide rules ceil-divide global dimensions.
//! Within a derivation every scale rule runs before any divide rule, so the
//! result does not depend on how rules were interleaved when declared.

use std::fmt;

use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ensure};
use tunesmith_space::{Configuration, ParameterSpace};

use crate::error::*;
use crate::limits::DeviceLimits;
use crate::problem::ProblemSize;

/// How one launch dimension reacts to a tuning parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryRule {
    /// `local[dim] *= cfg[param]`.
    ScaleLocal { dim: usize, param: String },
    /// `global[dim] *= cfg[param]`.
    ScaleGlobal { dim: usize, param: String },
    /// `global[dim] = ceil(global[dim] / cfg[param])`.
    DivideGlobal { dim: usize, param: String },
}

impl GeometryRule {
    pub fn dim(&self) -> usize {
        match self {
            Self::ScaleLocal { dim, .. } | Self::ScaleGlobal { dim, .. } | Self::DivideGlobal { dim, .. } => *dim,
        }
    }

    pub fn param(&self) -> &str {
        match self {
            Self::ScaleLocal { param, .. } | Self::ScaleGlobal { param, .. } | Self::DivideGlobal { param, .. } => {
                param
            }
        }
    }

    pub fn is_scale(&self) -> bool {
        !matches!(self, Self::DivideGlobal { .. })
    }
}

/// Local and global launch dimensions. Every dimension is at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaunchGeometry {
    pub local: Vec<usize>,
    pub global: Vec<usize>,
}

impl LaunchGeometry {
    pub fn rank(&self) -> usize {
        self.local.len()
    }

    /// Threads in one work-group.
    pub fn local_threads(&self) -> usize {
        self.local.iter().product()
    }

    /// Work-groups per dimension, rounding partial groups up.
    pub fn work_groups(&self) -> Vec<usize> {
        self.global.iter().zip(&self.local).map(|(g, l)| g.div_ceil(*l)).collect()
    }

    /// Check the geometry and a local memory footprint against device limits.
    pub fn check_limits(&self, limits: &DeviceLimits, local_memory: usize) -> Result<()> {
        let threads = self.local_threads();
        ensure!(
            threads <= limits.max_work_group_size,
            DeviceLimitExceededSnafu {
                limit_type: "work-group size",
                value: threads,
                max: limits.max_work_group_size
            }
        );
        for (&size, &max) in self.local.iter().zip(&limits.max_work_item_sizes) {
            ensure!(size <= max, DeviceLimitExceededSnafu { limit_type: "work-item size", value: size, max });
        }
        ensure!(
            local_memory <= limits.max_local_memory,
            DeviceLimitExceededSnafu {
                limit_type: "local memory",
                value: local_memory,
                max: limits.max_local_memory
            }
        );
        Ok(())
    }
}

impl fmt::Display for LaunchGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "global {:?} local {:?}", self.global, self.local)
    }
}

fn round_up(value: usize, multiple: usize, dim: usize) -> Result<usize> {
    value.div_ceil(multiple).checked_mul(multiple).context(OverflowSnafu { axis: "global", dim })
}

/// Derive the launch geometry of `config`.
///
/// `base_global` is the problem extent per dimension; `base_local` the
/// untransformed work-group shape.
pub fn derive(
    base_local: &[usize],
    base_global: &[usize],
    rules: &[GeometryRule],
    config: &Configuration,
) -> Result<LaunchGeometry> {
    let rank = base_local.len();
    ensure!(
        base_global.len() == rank,
        RankMismatchSnafu { what: "base global", expected: rank, found: base_global.len() }
    );

    let mut local = base_local.to_vec();
    let mut global = Vec::with_capacity(rank);
    for (dim, (&l, &g)) in base_local.iter().zip(base_global).enumerate() {
        ensure!(l > 0, ZeroLaunchDimensionSnafu { axis: "local", dim, cause: "base local size" });
        ensure!(g > 0, ZeroLaunchDimensionSnafu { axis: "global", dim, cause: "problem size" });
        global.push(round_up(g, l, dim)?);
    }

    let value = |rule: &GeometryRule| -> Result<usize> {
        ensure!(rule.dim() < rank, DimensionOutOfRangeSnafu { dim: rule.dim(), rank });
        config.get(rule.param()).context(MissingValueSnafu { name: rule.param() })
    };

    for rule in rules.iter().filter(|r| r.is_scale()) {
        let (factor, dim) = (value(rule)?, rule.dim());
        let (axis, target) = match rule {
            GeometryRule::ScaleLocal { .. } => ("local", &mut local[dim]),
            _ => ("global", &mut global[dim]),
        };
        ensure!(factor > 0, ZeroLaunchDimensionSnafu { axis, dim, cause: format!("scaled by '{}'", rule.param()) });
        *target = target.checked_mul(factor).context(OverflowSnafu { axis, dim })?;
    }

    for rule in rules.iter().filter(|r| !r.is_scale()) {
        let (divisor, dim) = (value(rule)?, rule.dim());
        ensure!(divisor > 0, ZeroDivisorSnafu { dim, param: rule.param() });
        global[dim] = global[dim].div_ceil(divisor);
    }

    Ok(LaunchGeometry { local, global })
}

/// Base geometry and rules of one kernel, expressed over problem dimension names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryTemplate {
    global_dims: Vec<String>,
    base_local: Vec<usize>,
    reference_local: Vec<usize>,
    rules: Vec<GeometryRule>,
}

impl GeometryTemplate {
    /// `global_dims[i]` names the problem dimension seeding global dimension `i`.
    pub fn new<S: Into<String>>(global_dims: impl IntoIterator<Item = S>, base_local: impl Into<Vec<usize>>) -> Self {
        let base_local = base_local.into();
        Self {
            global_dims: global_dims.into_iter().map(Into::into).collect(),
            reference_local: base_local.clone(),
            base_local,
            rules: Vec::new(),
        }
    }

    /// Local size of the reference kernel used for correctness checks.
    pub fn with_reference_local(mut self, reference_local: impl Into<Vec<usize>>) -> Self {
        self.reference_local = reference_local.into();
        self
    }

    pub fn with_rule(mut self, rule: GeometryRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// One `ScaleLocal` per dimension; `params[i]` scales dimension `i`.
    pub fn mul_local(self, params: &[&str]) -> Self {
        self.per_dim(params, |dim, param| GeometryRule::ScaleLocal { dim, param })
    }

    /// One `ScaleGlobal` per dimension; `params[i]` scales dimension `i`.
    pub fn mul_global(self, params: &[&str]) -> Self {
        self.per_dim(params, |dim, param| GeometryRule::ScaleGlobal { dim, param })
    }

    /// One `DivideGlobal` per dimension; `params[i]` divides dimension `i`.
    pub fn div_global(self, params: &[&str]) -> Self {
        self.per_dim(params, |dim, param| GeometryRule::DivideGlobal { dim, param })
    }

    fn per_dim(mut self, params: &[&str], rule: impl Fn(usize, String) -> GeometryRule) -> Self {
        self.rules.extend(params.iter().enumerate().map(|(dim, param)| rule(dim, param.to_string())));
        self
    }

    pub fn rank(&self) -> usize {
        self.base_local.len()
    }

    pub fn global_dims(&self) -> &[String] {
        &self.global_dims
    }

    pub fn base_local(&self) -> &[usize] {
        &self.base_local
    }

    pub fn reference_local(&self) -> &[usize] {
        &self.reference_local
    }

    pub fn rules(&self) -> &[GeometryRule] {
        &self.rules
    }

    /// Check ranks, dimension indices and parameter names against `space`.
    pub fn validate(&self, space: &ParameterSpace) -> Result<()> {
        let rank = self.rank();
        ensure!(
            self.global_dims.len() == rank,
            RankMismatchSnafu { what: "global dimension names", expected: rank, found: self.global_dims.len() }
        );
        ensure!(
            self.reference_local.len() == rank,
            RankMismatchSnafu { what: "reference local size", expected: rank, found: self.reference_local.len() }
        );
        for (dim, &l) in self.base_local.iter().chain(&self.reference_local).enumerate() {
            ensure!(l > 0, ZeroLaunchDimensionSnafu { axis: "local", dim: dim % rank, cause: "declared local size" });
        }
        for rule in &self.rules {
            ensure!(rule.dim() < rank, DimensionOutOfRangeSnafu { dim: rule.dim(), rank });
            ensure!(space.position(rule.param()).is_some(), UnknownParameterSnafu { name: rule.param() });
        }
        Ok(())
    }

    /// Problem extents seeding the global size.
    pub fn base_global(&self, problem: &ProblemSize) -> Result<Vec<usize>> {
        self.global_dims.iter().map(|name| problem.require(name)).collect()
    }

    pub fn derive(&self, problem: &ProblemSize, config: &Configuration) -> Result<LaunchGeometry> {
        derive(&self.base_local, &self.base_global(problem)?, &self.rules, config)
    }

    /// Geometry of the reference kernel: no rules, reference local size.
    pub fn reference(&self, problem: &ProblemSize) -> Result<LaunchGeometry> {
        let base_global = self.base_global(problem)?;
        ensure!(
            base_global.len() == self.reference_local.len(),
            RankMismatchSnafu {
                what: "reference local size",
                expected: base_global.len(),
                found: self.reference_local.len(),
            }
        );
        let mut global = Vec::with_capacity(base_global.len());
        for (dim, (&g, &l)) in base_global.iter().zip(&self.reference_local).enumerate() {
            ensure!(l > 0, ZeroLaunchDimensionSnafu { axis: "local", dim, cause: "reference local size" });
            ensure!(g > 0, ZeroLaunchDimensionSnafu { axis: "global", dim, cause: "problem size" });
            global.push(round_up(g, l, dim)?);
        }
        Ok(LaunchGeometry { local: self.reference_local.clone(), global })
    }
}
