//! Direct GEMM (`XgemmDirectTN`) tuning declarations.
//!
//! Two variations share constraints, geometry and arguments:
//!
//! - `xgemm_direct_1` - a small space, explored exhaustively, with the thread
//!   and loader dimensions pinned equal
//! - `xgemm_direct_2` - a large space, sampled at 1/64

use std::sync::Arc;

use snafu::ResultExt;
use tunesmith_launch::{ArgumentLayout, BufferRole, BufferSpec, GeometryTemplate, ProblemSize};
use tunesmith_space::{Configuration, ConstraintSet, ParameterSpace, Predicate};

use crate::declaration::{Metric, TuningDeclaration};
use crate::error::*;

pub const KERNEL_NAME: &str = "XgemmDirectTN";
pub const LIMITED: &str = "xgemm_direct_1";
pub const SAMPLED: &str = "xgemm_direct_2";

const DIMS: [usize; 3] = [8, 16, 32];
const VECTOR_WIDTHS: [usize; 4] = [1, 2, 4, 8];

/// Small variation, explored exhaustively.
pub fn limited() -> Result<TuningDeclaration> {
    let space = ParameterSpace::new()
        .with("WGD", [8, 16, 32])
        .and_then(|s| s.with("MDIMCD", DIMS))
        .and_then(|s| s.with("NDIMCD", DIMS))
        .and_then(|s| s.with("MDIMAD", DIMS))
        .and_then(|s| s.with("NDIMBD", DIMS))
        .and_then(|s| s.with("KWID", [2]))
        .and_then(|s| s.with("VWMD", VECTOR_WIDTHS))
        .and_then(|s| s.with("VWND", VECTOR_WIDTHS))
        .and_then(|s| s.with("PADA", [1]))
        .and_then(|s| s.with("PADB", [1]))
        .context(SpaceSnafu)?;

    let mut constraints = base_constraints(Arc::new(space))?;
    let pins = ConstraintSet::new(Arc::clone(constraints.space()))
        .with(Predicate::AreEqual, &["MDIMCD", "MDIMAD"])
        .and_then(|c| c.with(Predicate::AreEqual, &["NDIMCD", "NDIMBD"]))
        .context(SpaceSnafu)?;
    constraints.extend(&pins).context(SpaceSnafu)?;

    declaration(LIMITED, constraints, 1.0)
}

/// Large variation, sampled at 1/64.
pub fn sampled() -> Result<TuningDeclaration> {
    let space = ParameterSpace::new()
        .with("WGD", [8, 16, 32, 64])
        .and_then(|s| s.with("MDIMCD", DIMS))
        .and_then(|s| s.with("NDIMCD", DIMS))
        .and_then(|s| s.with("MDIMAD", DIMS))
        .and_then(|s| s.with("NDIMBD", DIMS))
        .and_then(|s| s.with("KWID", [2, 8, 16]))
        .and_then(|s| s.with("VWMD", VECTOR_WIDTHS))
        .and_then(|s| s.with("VWND", VECTOR_WIDTHS))
        .and_then(|s| s.with("PADA", [0, 1]))
        .and_then(|s| s.with("PADB", [0, 1]))
        .context(SpaceSnafu)?;

    declaration(SAMPLED, base_constraints(Arc::new(space))?, 64.0)
}

fn base_constraints(space: Arc<ParameterSpace>) -> Result<ConstraintSet> {
    let mut set = ConstraintSet::new(space);
    // Unrolling the WGD loop by KWID
    set.add(Predicate::IsMultiple, &["WGD", "KWID"]).context(SpaceSnafu)?;
    // Integer work per thread
    set.add(Predicate::IsMultipleOfProduct, &["WGD", "MDIMCD", "VWMD"]).context(SpaceSnafu)?;
    set.add(Predicate::IsMultipleOfProduct, &["WGD", "NDIMCD", "VWND"]).context(SpaceSnafu)?;
    // Integer loads per loader thread
    set.add(Predicate::IsMultipleOfProduct, &["WGD", "MDIMAD", "VWMD"]).context(SpaceSnafu)?;
    set.add(Predicate::IsMultipleOfProduct, &["WGD", "NDIMBD", "VWND"]).context(SpaceSnafu)?;
    // KDIMAD = (MDIMCD * NDIMCD) / MDIMAD and KDIMBD = (MDIMCD * NDIMCD) / NDIMBD must divide WGD
    set.add(Predicate::IsMultipleOfProductDividedBy, &["WGD", "MDIMCD", "NDIMCD", "MDIMAD"]).context(SpaceSnafu)?;
    set.add(Predicate::IsMultipleOfProductDividedBy, &["WGD", "MDIMCD", "NDIMCD", "NDIMBD"]).context(SpaceSnafu)?;
    Ok(set)
}

/// Both A and B tiles live in local memory, each padded by one row when enabled.
fn local_memory(config: &Configuration) -> usize {
    let value = |name| config.get(name).unwrap_or(0);
    let wgd = value("WGD");
    wgd * (wgd + value("PADA")) + wgd * (wgd + value("PADB"))
}

fn declaration(family: &str, constraints: ConstraintSet, default_fraction: f64) -> Result<TuningDeclaration> {
    let geometry = GeometryTemplate::new(["m", "n"], [1, 1])
        .with_reference_local([8, 8])
        .mul_local(&["MDIMCD", "NDIMCD"])
        .mul_global(&["MDIMCD", "NDIMCD"])
        .div_global(&["WGD", "WGD"]);

    let arguments = ArgumentLayout::new()
        .dimension("m")
        .dimension("n")
        .dimension("k")
        .alpha()
        .beta()
        .matrix(BufferRole::A, "k")
        .matrix(BufferRole::B, "n")
        .matrix(BufferRole::C, "n")
        .flag("c_do_transpose", 1)
        .flag("a_conjugate", 0)
        .flag("b_conjugate", 0);

    let buffers = vec![
        BufferSpec::new(BufferRole::A, &["m", "k"]).input(),
        BufferSpec::new(BufferRole::B, &["n", "k"]).input(),
        BufferSpec::new(BufferRole::C, &["m", "n"]).input().output(),
    ];

    TuningDeclaration::builder()
        .family(family)
        .kernel_name(KERNEL_NAME)
        .problem_defaults(ProblemSize::new().with("m", 256).with("n", 256).with("k", 256))
        .geometry(geometry)
        .constraints(constraints)
        .arguments(arguments)
        .buffers(buffers)
        .metric(Metric::new("GFLOPS", 2.0, &["m", "n", "k"]))
        .default_fraction(default_fraction)
        .default_runs(4)
        .local_memory(Arc::new(local_memory))
        .build()
}
