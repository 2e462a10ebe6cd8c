//! Error types for the tuning driver.

use snafu::Snafu;
use tunesmith_launch::LaunchError;
use tunesmith_space::SpaceError;

/// Result type for tuning operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while tuning.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Parameter space or resolver error.
    #[snafu(display("Parameter space error: {source}"))]
    Space { source: SpaceError },

    /// Geometry derivation or argument binding error.
    #[snafu(display("Launch error: {source}"))]
    Launch { source: LaunchError },

    /// The external kernel timer failed.
    #[snafu(display("Kernel timer failed: {source}"))]
    Timer { source: Box<dyn std::error::Error + Send + Sync> },

    /// No declaration registered under this family name.
    #[snafu(display("Unknown kernel family '{name}'"))]
    UnknownFamily { name: String },

    /// Precision could not be parsed.
    #[snafu(display("Unknown precision: {source}"))]
    UnknownPrecision { source: tunesmith_precision::Error },

    /// Problem size unusable for this declaration.
    #[snafu(display("Invalid problem: {reason}"))]
    InvalidProblem { reason: String },
}
