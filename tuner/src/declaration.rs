//! Per-kernel tuning declarations.

use std::fmt;
use std::sync::Arc;

use bon::bon;
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, ensure};
use tunesmith_launch::{ArgumentLayout, BufferSpec, GeometryTemplate, ProblemSize};
use tunesmith_precision::Precision;
use tunesmith_space::{Configuration, ConstraintSet, ParameterSpace, resolver::normalize_fraction};

use crate::error::*;

/// Local memory footprint of a configuration, in elements.
pub type LocalMemoryFn = Arc<dyn Fn(&Configuration) -> usize + Send + Sync>;

/// Work performed by one kernel launch: `factor * product(dims)`, reported in `unit`.
///
/// `factor` already carries the unit scale, so dividing the amount by the
/// elapsed time in nanoseconds gives the figure in `unit` (e.g. GFLOPS).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub unit: String,
    pub factor: f64,
    pub dims: Vec<String>,
}

impl Metric {
    pub fn new(unit: impl Into<String>, factor: f64, dims: &[&str]) -> Self {
        Self { unit: unit.into(), factor, dims: dims.iter().map(|d| d.to_string()).collect() }
    }

    pub fn amount(&self, problem: &ProblemSize) -> Result<f64> {
        let product = problem.product(&self.dims).context(LaunchSnafu)?;
        Ok(self.factor * product as f64)
    }
}

/// Everything the engine needs to know about one tunable kernel.
#[derive(Clone)]
pub struct TuningDeclaration {
    family: String,
    kernel_name: String,
    problem_defaults: ProblemSize,
    geometry: GeometryTemplate,
    constraints: ConstraintSet,
    arguments: ArgumentLayout,
    buffers: Vec<BufferSpec>,
    metric: Metric,
    default_fraction: f64,
    default_runs: usize,
    local_memory: Option<LocalMemoryFn>,
}

#[bon]
impl TuningDeclaration {
    /// Create a declaration, validating every part against the parameter space
    /// and the default problem size.
    #[builder]
    pub fn new(
        #[builder(into)] family: String,
        #[builder(into)] kernel_name: String,
        problem_defaults: ProblemSize,
        geometry: GeometryTemplate,
        constraints: ConstraintSet,
        arguments: ArgumentLayout,
        #[builder(default)] buffers: Vec<BufferSpec>,
        metric: Metric,
        #[builder(default = 1.0)] default_fraction: f64,
        #[builder(default = 4)] default_runs: usize,
        local_memory: Option<LocalMemoryFn>,
    ) -> Result<Self> {
        let space = constraints.space();
        geometry.validate(space).context(LaunchSnafu)?;
        arguments.validate(space).context(LaunchSnafu)?;
        normalize_fraction(default_fraction).context(SpaceSnafu)?;
        ensure!(default_runs > 0, InvalidProblemSnafu { reason: "default_runs must be positive" });

        let declaration = Self {
            family,
            kernel_name,
            problem_defaults,
            geometry,
            constraints,
            arguments,
            buffers,
            metric,
            default_fraction,
            default_runs,
            local_memory,
        };
        declaration.check_problem(&declaration.problem_defaults)?;
        Ok(declaration)
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn kernel_name(&self) -> &str {
        &self.kernel_name
    }

    pub fn problem_defaults(&self) -> &ProblemSize {
        &self.problem_defaults
    }

    pub fn geometry(&self) -> &GeometryTemplate {
        &self.geometry
    }

    pub fn space(&self) -> &Arc<ParameterSpace> {
        self.constraints.space()
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn arguments(&self) -> &ArgumentLayout {
        &self.arguments
    }

    pub fn buffers(&self) -> &[BufferSpec] {
        &self.buffers
    }

    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    pub fn default_fraction(&self) -> f64 {
        self.default_fraction
    }

    pub fn default_runs(&self) -> usize {
        self.default_runs
    }

    /// Local memory used by `config`, in bytes; zero when undeclared.
    pub fn local_memory(&self, config: &Configuration, precision: Precision) -> usize {
        self.local_memory.as_ref().map_or(0, |f| f(config).saturating_mul(precision.bytes()))
    }

    /// Problem dimensions the declaration reads, each with a positive value in `problem`.
    pub fn check_problem(&self, problem: &ProblemSize) -> Result<()> {
        let referenced = self
            .geometry
            .global_dims()
            .iter()
            .chain(self.buffers.iter().flat_map(|b| &b.dims))
            .chain(&self.metric.dims)
            .chain(self.arguments.slots().iter().filter_map(|slot| match slot {
                tunesmith_launch::ArgumentSlot::Dimension(name)
                | tunesmith_launch::ArgumentSlot::LeadingDimension(name) => Some(name),
                _ => None,
            }));

        for name in referenced {
            match problem.get(name) {
                Some(0) => return InvalidProblemSnafu { reason: format!("dimension '{name}' is zero") }.fail(),
                Some(_) => {}
                None => return InvalidProblemSnafu { reason: format!("dimension '{name}' is missing") }.fail(),
            }
        }
        Ok(())
    }
}

impl fmt::Debug for TuningDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TuningDeclaration")
            .field("family", &self.family)
            .field("kernel_name", &self.kernel_name)
            .field("problem_defaults", &self.problem_defaults)
            .field("parameters", &self.space().len())
            .field("constraints", &self.constraints.len())
            .field("default_fraction", &self.default_fraction)
            .field("default_runs", &self.default_runs)
            .finish_non_exhaustive()
    }
}
