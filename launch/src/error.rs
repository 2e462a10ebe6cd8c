use snafu::Snafu;

use crate::arguments::BufferRole;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum LaunchError {
    #[snafu(display("global dimension {dim} divided by '{param}', which is zero"))]
    ZeroDivisor { dim: usize, param: String },

    #[snafu(display("{axis} dimension {dim} became zero ({cause})"))]
    ZeroLaunchDimension { axis: &'static str, dim: usize, cause: String },

    #[snafu(display("rule addresses dimension {dim}, but the geometry has rank {rank}"))]
    DimensionOutOfRange { dim: usize, rank: usize },

    #[snafu(display("{what} has rank {found}, expected {expected}"))]
    RankMismatch { what: &'static str, expected: usize, found: usize },

    #[snafu(display("no value for '{name}'"))]
    MissingValue { name: String },

    #[snafu(display("{axis} dimension {dim} overflows"))]
    Overflow { axis: &'static str, dim: usize },

    #[snafu(display("'{name}' = {value} does not fit a 32-bit kernel argument"))]
    DimensionOverflow { name: String, value: usize },

    #[snafu(display("no buffer bound for role {role}"))]
    MissingBuffer { role: BufferRole },

    #[snafu(display("unknown tuning parameter '{name}'"))]
    UnknownParameter { name: String },

    #[snafu(display("launch would exceed device limit: {limit_type} {value} > max {max}"))]
    DeviceLimitExceeded { limit_type: &'static str, value: usize, max: usize },
}

pub type Result<T, E = LaunchError> = std::result::Result<T, E>;
