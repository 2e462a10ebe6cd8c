//! Kernel tuning driver.
//!
//! A [`TuningDeclaration`] describes one kernel family: its parameter space,
//! constraints, launch geometry, argument layout and performance metric.
//! A [`TuningSession`] binds a declaration to a problem size, precision and
//! device, and the [`Tuner`] walks the session's configurations, timing each
//! through a caller-supplied [`KernelTimer`].
//!
//! Compiling kernels, allocating device memory and measuring time are the
//! caller's business; this crate only decides what to launch and how.

pub mod config;
pub mod declaration;
pub mod driver;
pub mod error;
pub mod kernels;
pub mod registry;
pub mod session;


pub use config::TunerConfig;
pub use declaration::{LocalMemoryFn, Metric, TuningDeclaration};
pub use driver::{KernelTimer, Tuner, TuningReport, TuningResult};
pub use error::{Error, Result};
pub use registry::{KernelRegistry, declaration, registry};
pub use session::{KernelLaunch, TuningSession};

pub use tunesmith_launch as launch;
pub use tunesmith_precision as precision;
pub use tunesmith_space as space;
