//! Search driver loop.
//!
//! The [`Tuner`] walks a session's configurations, skips those the device
//! cannot launch, hands each remaining [`KernelLaunch`] to a [`KernelTimer`]
//! and collects the timings into a [`TuningReport`].

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use snafu::ResultExt;
use tracing::{debug, info, warn};
use tunesmith_launch::{DeviceLimits, LaunchGeometry, ProblemBuffers, ProblemScalars, ProblemSize};
use tunesmith_precision::Precision;
use tunesmith_space::{Configuration, SearchMode, SpaceError};

use crate::config::TunerConfig;
use crate::error::*;
use crate::registry::registry;
use crate::session::{KernelLaunch, TuningSession};

/// Compiles and times kernel launches on a device.
///
/// Returns the representative duration of one launch over `runs` timed runs,
/// or `None` when the configuration failed to compile or run. An `Err` aborts
/// the whole search.
pub trait KernelTimer<B> {
    type Error: std::error::Error + Send + Sync + 'static;

    fn time(&mut self, launch: &KernelLaunch<B>, runs: usize) -> std::result::Result<Option<Duration>, Self::Error>;
}

/// Timing of one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuningResult {
    pub configuration: Configuration,
    pub geometry: LaunchGeometry,
    pub time: Duration,
    /// Metric value; GFLOPS for the built-in families.
    pub gflops: f64,
}

impl fmt::Display for TuningResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {:.3} ms | {:.1}", self.configuration, self.time.as_secs_f64() * 1e3, self.gflops)
    }
}

/// Outcome of one tuning run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuningReport {
    pub family: String,
    pub kernel_name: String,
    pub precision: Precision,
    pub problem: ProblemSize,
    pub unit: String,
    /// Successful timings, fastest first.
    pub results: Vec<TuningResult>,
    /// Configurations handed to the timer.
    pub evaluated: usize,
    /// Configurations beyond the device limits.
    pub skipped: usize,
    /// Configurations the timer reported as failed.
    pub failed: usize,
    /// Sampling stopped short of its target.
    pub partial: bool,
    pub elapsed: Duration,
}

impl TuningReport {
    pub fn best(&self) -> Option<&TuningResult> {
        self.results.first()
    }
}

impl fmt::Display for TuningReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "=== Tuning report: {} / {} ({}, {}) ===",
            self.family, self.kernel_name, self.precision, self.problem
        )?;
        writeln!(
            f,
            "Evaluated {} configs ({} skipped, {} failed) in {:.1}ms{}",
            self.evaluated,
            self.skipped,
            self.failed,
            self.elapsed.as_secs_f64() * 1e3,
            if self.partial { ", partial sample" } else { "" },
        )?;

        let Some(best) = self.best() else {
            return writeln!(f, "No configuration completed");
        };
        writeln!(f, "Best: {best} {}", self.unit)?;

        if self.results.len() > 1 {
            writeln!(f, "\nTop configurations:")?;
            for (i, result) in self.results.iter().take(5).enumerate() {
                let slowdown = result.time.as_secs_f64() / best.time.as_secs_f64().max(f64::MIN_POSITIVE);
                writeln!(f, "  #{}: {result} {} | {slowdown:.2}x vs best", i + 1, self.unit)?;
            }
        }
        Ok(())
    }
}

/// Search driver.
#[derive(Debug, Clone, Default)]
pub struct Tuner {
    config: TunerConfig,
}

impl Tuner {
    pub fn new(config: TunerConfig) -> Self {
        Self { config }
    }

    /// A tuner configured from `TUNESMITH_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(TunerConfig::from_env()?))
    }

    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    /// Bind the registered `family` to a problem at the configured precision.
    pub fn session(&self, family: &str, problem: Option<ProblemSize>, limits: DeviceLimits) -> Result<TuningSession> {
        TuningSession::builder()
            .declaration(registry().get(family)?)
            .maybe_problem(problem)
            .precision(self.config.precision)
            .limits(limits)
            .build()
    }

    /// Search mode for `session`, with the configured fraction overriding the declared one.
    pub fn search_mode(&self, session: &TuningSession) -> Result<SearchMode> {
        self.config.search_mode(session.declaration().default_fraction())
    }

    /// Time every configuration of `session` and rank the results.
    ///
    /// Measured times are fed back to the search, which only a swarm uses.
    #[tracing::instrument(skip_all, fields(family = session.declaration().family(), precision = %session.precision()))]
    pub fn run<B, T>(
        &self,
        session: &TuningSession,
        buffers: &ProblemBuffers<B>,
        scalars: &ProblemScalars,
        timer: &mut T,
    ) -> Result<TuningReport>
    where
        B: Clone,
        T: KernelTimer<B>,
    {
        let start = Instant::now();
        let mode = self.search_mode(session)?;
        let runs = self.config.runs(session.declaration().default_runs());
        let amount = session.metric_amount()?;

        let mut results = Vec::new();
        let (mut evaluated, mut skipped, mut failed) = (0, 0, 0);
        let mut partial = false;

        let mut configurations = session.enumerate_configurations(&mode);
        while let Some(item) = configurations.next() {
            let config = match item {
                Ok(config) => config,
                Err(SpaceError::SampleExhaustion { found, draws }) if self.config.accept_partial_samples => {
                    warn!(found, draws, "sampling exhausted, tuning the configurations found so far");
                    partial = true;
                    break;
                }
                Err(source) => return Err(source).context(SpaceSnafu),
            };

            let geometry = session.derive_geometry(&config)?;
            if let Err(error) = session.check_limits(&config, &geometry) {
                debug!(config = %config, %geometry, %error, "skipping configuration");
                skipped += 1;
                configurations.record(None);
                continue;
            }

            let launch = session.prepare_with_geometry(&config, geometry, buffers, scalars)?;
            evaluated += 1;

            let timed = timer
                .time(&launch, runs)
                .map_err(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>)
                .context(TimerSnafu)?;

            let Some(time) = timed else {
                debug!(config = %launch.configuration, "configuration failed to run");
                failed += 1;
                configurations.record(None);
                continue;
            };
            configurations.record(Some(time.as_nanos() as f64));

            let gflops = amount / time.as_nanos().max(1) as f64;
            debug!(config = %launch.configuration, time_ns = time.as_nanos() as u64, gflops, "timed configuration");
            results.push(TuningResult { configuration: launch.configuration, geometry: launch.geometry, time, gflops });
        }

        results.sort_by_key(|result| result.time);

        let declaration = session.declaration();
        let report = TuningReport {
            family: declaration.family().to_string(),
            kernel_name: declaration.kernel_name().to_string(),
            precision: session.precision(),
            problem: session.problem().clone(),
            unit: declaration.metric().unit.clone(),
            results,
            evaluated,
            skipped,
            failed,
            partial,
            elapsed: start.elapsed(),
        };

        match report.best() {
            Some(best) => info!(
                config = %best.configuration,
                time_ns = best.time.as_nanos() as u64,
                gflops = best.gflops,
                evaluated,
                skipped,
                failed,
                "best configuration"
            ),
            None => warn!(evaluated, skipped, failed, "no configuration completed"),
        }

        Ok(report)
    }
}
