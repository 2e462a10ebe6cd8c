use std::sync::Arc;

use tunesmith_launch::{ArgumentLayout, GeometryTemplate, LaunchError, ProblemSize};
use tunesmith_precision::Precision;
use tunesmith_space::{Configuration, ConstraintSet, ParameterSpace, SpaceError};

use crate::*;

fn constraints() -> ConstraintSet {
    let space = ParameterSpace::new().with("WG", [8, 16]).unwrap().with("PAD", [0, 1]).unwrap();
    ConstraintSet::new(Arc::new(space))
}

fn problem() -> ProblemSize {
    ProblemSize::new().with("n", 64)
}

fn geometry() -> GeometryTemplate {
    GeometryTemplate::new(["n"], [1]).mul_local(&["WG"]).mul_global(&["WG"])
}

fn metric() -> Metric {
    Metric::new("GB/s", 4.0, &["n"])
}

#[test]
fn test_minimal_declaration() {
    let declaration = TuningDeclaration::builder()
        .family("copy")
        .kernel_name("Copy")
        .problem_defaults(problem())
        .geometry(geometry())
        .constraints(constraints())
        .arguments(ArgumentLayout::new().dimension("n").parameter("WG"))
        .metric(metric())
        .build()
        .unwrap();

    assert_eq!(declaration.default_fraction(), 1.0);
    assert_eq!(declaration.default_runs(), 4);
    assert!(declaration.buffers().is_empty());

    let config = Configuration::from_values(Arc::clone(declaration.space()), &[16, 1]).unwrap();
    assert_eq!(declaration.local_memory(&config, Precision::Double), 0);
    assert_eq!(declaration.metric().amount(declaration.problem_defaults()).unwrap(), 256.0);
}

#[test]
fn test_local_memory_in_bytes() {
    let declaration = TuningDeclaration::builder()
        .family("copy")
        .kernel_name("Copy")
        .problem_defaults(problem())
        .geometry(geometry())
        .constraints(constraints())
        .arguments(ArgumentLayout::new())
        .metric(metric())
        .local_memory(Arc::new(|config: &Configuration| config.get("WG").unwrap() + config.get("PAD").unwrap()))
        .build()
        .unwrap();

    let config = Configuration::from_values(Arc::clone(declaration.space()), &[16, 1]).unwrap();
    assert_eq!(declaration.local_memory(&config, Precision::Single), 68);
    assert_eq!(declaration.local_memory(&config, Precision::ComplexDouble), 272);
}

#[test]
fn test_geometry_names_unknown_parameter() {
    let err = TuningDeclaration::builder()
        .family("copy")
        .kernel_name("Copy")
        .problem_defaults(problem())
        .geometry(geometry().div_global(&["TILE"]))
        .constraints(constraints())
        .arguments(ArgumentLayout::new())
        .metric(metric())
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Launch { source: LaunchError::UnknownParameter { ref name } } if name == "TILE"));
}

#[test]
fn test_argument_names_unknown_parameter() {
    let err = TuningDeclaration::builder()
        .family("copy")
        .kernel_name("Copy")
        .problem_defaults(problem())
        .geometry(geometry())
        .constraints(constraints())
        .arguments(ArgumentLayout::new().parameter("VW"))
        .metric(metric())
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Launch { source: LaunchError::UnknownParameter { ref name } } if name == "VW"));
}

#[test]
fn test_invalid_default_fraction() {
    let err = TuningDeclaration::builder()
        .family("copy")
        .kernel_name("Copy")
        .problem_defaults(problem())
        .geometry(geometry())
        .constraints(constraints())
        .arguments(ArgumentLayout::new())
        .metric(metric())
        .default_fraction(0.0)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Space { source: SpaceError::InvalidFraction { .. } }));
}

#[test]
fn test_zero_default_runs() {
    let err = TuningDeclaration::builder()
        .family("copy")
        .kernel_name("Copy")
        .problem_defaults(problem())
        .geometry(geometry())
        .constraints(constraints())
        .arguments(ArgumentLayout::new())
        .metric(metric())
        .default_runs(0)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::InvalidProblem { .. }));
}

#[test]
fn test_default_problem_missing_dimension() {
    let err = TuningDeclaration::builder()
        .family("copy")
        .kernel_name("Copy")
        .problem_defaults(problem())
        .geometry(geometry())
        .constraints(constraints())
        .arguments(ArgumentLayout::new().dimension("m"))
        .metric(metric())
        .build()
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid problem: dimension 'm' is missing");
}

#[test]
fn test_metric_amount() {
    let metric = Metric::new("GFLOPS", 2.0, &["m", "n", "k"]);
    let problem = ProblemSize::new().with("m", 4).with("n", 8).with("k", 16);
    assert_eq!(metric.amount(&problem).unwrap(), 1024.0);
    assert!(matches!(
        metric.amount(&ProblemSize::new().with("m", 4)),
        Err(Error::Launch { source: LaunchError::MissingValue { .. } })
    ));
}
