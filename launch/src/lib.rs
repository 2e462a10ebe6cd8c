//! From a configuration to something a device can launch.
//!
//! - [`geometry`] - Local/global launch dimensions derived from the problem size and a configuration
//! - [`limits`] - Device launch limits
//! - [`arguments`] - Declarative positional kernel argument layouts
//! - [`problem`] - Named problem dimensions
//!
//! Everything here is pure: deriving a geometry or binding arguments twice
//! with the same inputs gives the same result.

pub mod arguments;
pub mod error;
pub mod geometry;
pub mod limits;
pub mod problem;

#[cfg(test)]
pub mod test;

pub use arguments::{ArgumentLayout, ArgumentSlot, BufferRole, BufferSpec, KernelArg, ProblemBuffers, ProblemScalars};
pub use error::{LaunchError, Result};
pub use geometry::{GeometryRule, GeometryTemplate, LaunchGeometry, derive};
pub use limits::DeviceLimits;
pub use problem::ProblemSize;
