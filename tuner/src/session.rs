//! A declaration bound to one problem, precision and device.

use bon::bon;
use serde::Serialize;
use snafu::ResultExt;
use tunesmith_launch::{
    BufferRole, DeviceLimits, KernelArg, LaunchGeometry, ProblemBuffers, ProblemScalars, ProblemSize,
};
use tunesmith_precision::Precision;
use tunesmith_space::{Configuration, Configurations, Resolver, SearchMode};

use crate::declaration::TuningDeclaration;
use crate::error::*;

/// Everything needed to compile and launch one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KernelLaunch<B> {
    pub kernel_name: String,
    pub precision: Precision,
    pub configuration: Configuration,
    /// Compile-time defines: every tuning parameter, then `PRECISION`.
    pub defines: Vec<(String, usize)>,
    pub geometry: LaunchGeometry,
    #[serde(skip)]
    pub arguments: Vec<KernelArg<B>>,
}

/// A declaration bound to a problem size, precision and device limits.
#[derive(Debug, Clone)]
pub struct TuningSession {
    declaration: TuningDeclaration,
    problem: ProblemSize,
    precision: Precision,
    limits: DeviceLimits,
}

#[bon]
impl TuningSession {
    /// Bind a declaration. Dimensions missing from `problem` take the declared defaults.
    #[builder]
    pub fn new(
        declaration: TuningDeclaration,
        problem: Option<ProblemSize>,
        #[builder(default)] precision: Precision,
        #[builder(default)] limits: DeviceLimits,
    ) -> Result<Self> {
        let mut merged = declaration.problem_defaults().clone();
        for (name, value) in problem.iter().flat_map(|p| p.iter()) {
            merged.set(name, value);
        }
        declaration.check_problem(&merged)?;
        Ok(Self { declaration, problem: merged, precision, limits })
    }

    pub fn declaration(&self) -> &TuningDeclaration {
        &self.declaration
    }

    pub fn problem(&self) -> &ProblemSize {
        &self.problem
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }

    /// Default alpha/beta for this session's precision.
    pub fn default_scalars(&self) -> ProblemScalars {
        ProblemScalars::tuning_defaults(self.precision)
    }

    pub fn enumerate_configurations(&self, mode: &SearchMode) -> Configurations<'_> {
        Resolver::new(self.declaration.constraints()).resolve(mode)
    }

    pub fn derive_geometry(&self, config: &Configuration) -> Result<LaunchGeometry> {
        self.declaration.geometry().derive(&self.problem, config).context(LaunchSnafu)
    }

    /// Geometry of the reference kernel used for correctness checks.
    pub fn reference_geometry(&self) -> Result<LaunchGeometry> {
        self.declaration.geometry().reference(&self.problem).context(LaunchSnafu)
    }

    pub fn bind_arguments<B: Clone>(
        &self,
        config: &Configuration,
        buffers: &ProblemBuffers<B>,
        scalars: &ProblemScalars,
    ) -> Result<Vec<KernelArg<B>>> {
        self.declaration.arguments().bind(&self.problem, config, buffers, scalars).context(LaunchSnafu)
    }

    /// Local memory `config` needs, in bytes.
    pub fn local_memory(&self, config: &Configuration) -> usize {
        self.declaration.local_memory(config, self.precision)
    }

    /// Check a derived geometry and the configuration's local memory against the device.
    pub fn check_limits(&self, config: &Configuration, geometry: &LaunchGeometry) -> Result<()> {
        geometry.check_limits(&self.limits, self.local_memory(config)).context(LaunchSnafu)
    }

    /// Element counts of the buffers the caller must allocate.
    pub fn buffer_sizes(&self) -> Result<Vec<(BufferRole, usize)>> {
        self.declaration
            .buffers()
            .iter()
            .map(|spec| Ok((spec.role, spec.len(&self.problem).context(LaunchSnafu)?)))
            .collect()
    }

    /// Work done by one launch, in the metric's unit times nanoseconds.
    pub fn metric_amount(&self) -> Result<f64> {
        self.declaration.metric().amount(&self.problem)
    }

    /// Derive the geometry and bind the arguments of `config`.
    pub fn prepare<B: Clone>(
        &self,
        config: &Configuration,
        buffers: &ProblemBuffers<B>,
        scalars: &ProblemScalars,
    ) -> Result<KernelLaunch<B>> {
        let geometry = self.derive_geometry(config)?;
        self.prepare_with_geometry(config, geometry, buffers, scalars)
    }

    pub(crate) fn prepare_with_geometry<B: Clone>(
        &self,
        config: &Configuration,
        geometry: LaunchGeometry,
        buffers: &ProblemBuffers<B>,
        scalars: &ProblemScalars,
    ) -> Result<KernelLaunch<B>> {
        let arguments = self.bind_arguments(config, buffers, scalars)?;
        let mut defines = config.to_defines();
        defines.push(("PRECISION".to_string(), self.precision.code() as usize));

        Ok(KernelLaunch {
            kernel_name: self.declaration.kernel_name().to_string(),
            precision: self.precision,
            configuration: config.clone(),
            defines,
            geometry,
            arguments,
        })
    }
}
