//! Parameter spaces and constraint resolution for kernel auto-tuning.
//!
//! # Module Organization
//!
//! - [`parameter`] - Named tunable parameters and the [`ParameterSpace`] holding them
//! - [`predicate`] - Built-in and custom predicates over parameter values
//! - [`constraint`] - Predicates bound to parameter names, composed into a [`ConstraintSet`]
//! - [`configuration`] - One fully bound assignment of values
//! - [`resolver`] - Exhaustive, sampled and swarm enumeration of valid configurations
//!
//! A space is frozen behind an `Arc` once constraints are attached, so every
//! configuration produced from it shares the same parameter order.

pub mod configuration;
pub mod constraint;
pub mod error;
pub mod parameter;
pub mod predicate;
pub mod resolver;


pub use configuration::Configuration;
pub use constraint::{Constraint, ConstraintSet};
pub use error::{Result, SpaceError};
pub use parameter::{ParameterSpace, TunableParameter};
pub use predicate::Predicate;
pub use resolver::{
    Configurations, Exhaustive, ParticleSwarm, Resolver, ResolverStats, Sampler, SamplingConfig, SearchMode,
    SwarmConfig, collect_exhaustive_parallel, collect_sampled_parallel, swarm_requested,
};
