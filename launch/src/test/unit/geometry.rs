use test_case::test_case;

use crate::test::helpers::*;
use crate::*;

#[test]
fn test_gemm_geometry() {
    let geometry = gemm_template().derive(&square(256), &gemm_config(32, 16, 16)).unwrap();
    assert_eq!(geometry.local, [16, 16]);
    assert_eq!(geometry.global, [128, 128]);
    assert_eq!(geometry.local_threads(), 256);
    assert_eq!(geometry.work_groups(), [8, 8]);
    assert_eq!(geometry.to_string(), "global [128, 128] local [16, 16]");
}

#[test_case(256, 8, 8, 8, [8, 8], [256, 256] ; "one thread per element of a tile")]
#[test_case(256, 64, 8, 32, [8, 32], [32, 128] ; "uneven dimensions")]
#[test_case(100, 32, 16, 8, [16, 8], [50, 25] ; "problem not a multiple of the tile")]
#[test_case(1, 64, 32, 32, [32, 32], [1, 1] ; "tiny problem")]
fn test_derive(size: usize, wgd: usize, mdimcd: usize, ndimcd: usize, local: [usize; 2], global: [usize; 2]) {
    let geometry = gemm_template().derive(&square(size), &gemm_config(wgd, mdimcd, ndimcd)).unwrap();
    assert_eq!(geometry.local, local);
    assert_eq!(geometry.global, global);
}

#[test]
fn test_global_rounded_to_base_local() {
    let config = gemm_config(8, 8, 8);
    let geometry = derive(&[4, 3], &[10, 10], &[], &config).unwrap();
    assert_eq!(geometry.global, [12, 12]);
    assert_eq!(geometry.local, [4, 3]);
}

#[test]
fn test_scale_rules_run_before_divide_rules() {
    let config = gemm_config(32, 16, 8);
    let divide_first = [
        GeometryRule::DivideGlobal { dim: 0, param: "WGD".into() },
        GeometryRule::ScaleGlobal { dim: 0, param: "MDIMCD".into() },
    ];
    let scale_first = [divide_first[1].clone(), divide_first[0].clone()];

    // ceil(ceil(100 * 16) / 32) = 50, while ceil(100 / 32) * 16 would be 64.
    let a = derive(&[1], &[100], &divide_first, &config).unwrap();
    let b = derive(&[1], &[100], &scale_first, &config).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.global, [50]);
}

#[test]
fn test_zero_divisor() {
    let space = std::sync::Arc::new(tunesmith_space::ParameterSpace::new().with("D", [0, 2]).unwrap());
    let config = tunesmith_space::Configuration::from_values(space, &[0]).unwrap();
    let rules = [GeometryRule::DivideGlobal { dim: 0, param: "D".into() }];
    assert_eq!(
        derive(&[1], &[64], &rules, &config).unwrap_err(),
        LaunchError::ZeroDivisor { dim: 0, param: "D".into() }
    );
}

#[test]
fn test_zero_scale_factor() {
    let space = std::sync::Arc::new(tunesmith_space::ParameterSpace::new().with("S", [0]).unwrap());
    let config = tunesmith_space::Configuration::from_values(space, &[0]).unwrap();
    let rules = [GeometryRule::ScaleLocal { dim: 0, param: "S".into() }];
    assert!(matches!(
        derive(&[1], &[64], &rules, &config),
        Err(LaunchError::ZeroLaunchDimension { axis: "local", dim: 0, .. })
    ));
}

#[test]
fn test_zero_problem_dimension() {
    let err = gemm_template().derive(&square(0), &gemm_config(8, 8, 8)).unwrap_err();
    assert!(matches!(err, LaunchError::ZeroLaunchDimension { axis: "global", .. }));
}

#[test]
fn test_missing_values() {
    let problem = ProblemSize::new().with("m", 64);
    assert_eq!(
        gemm_template().derive(&problem, &gemm_config(8, 8, 8)).unwrap_err(),
        LaunchError::MissingValue { name: "n".into() }
    );

    let rules = [GeometryRule::ScaleLocal { dim: 0, param: "KWID".into() }];
    assert_eq!(
        derive(&[1], &[64], &rules, &gemm_config(8, 8, 8)).unwrap_err(),
        LaunchError::MissingValue { name: "KWID".into() }
    );
}

#[test]
fn test_overflow_reported() {
    let rules = [GeometryRule::ScaleGlobal { dim: 0, param: "WGD".into() }];
    let err = derive(&[1], &[usize::MAX / 2], &rules, &gemm_config(64, 8, 8)).unwrap_err();
    assert_eq!(err, LaunchError::Overflow { axis: "global", dim: 0 });
}

#[test]
fn test_rank_mismatch() {
    let err = derive(&[1, 1], &[64], &[], &gemm_config(8, 8, 8)).unwrap_err();
    assert!(matches!(err, LaunchError::RankMismatch { expected: 2, found: 1, .. }));
}

#[test]
fn test_validate() {
    let space = gemm_space();
    gemm_template().validate(&space).unwrap();

    let unknown = gemm_template().div_global(&["KWID"]);
    assert_eq!(unknown.validate(&space).unwrap_err(), LaunchError::UnknownParameter { name: "KWID".into() });

    let out_of_range = gemm_template().with_rule(GeometryRule::ScaleLocal { dim: 2, param: "WGD".into() });
    assert_eq!(out_of_range.validate(&space).unwrap_err(), LaunchError::DimensionOutOfRange { dim: 2, rank: 2 });

    let ragged = GeometryTemplate::new(["m"], [1, 1]);
    assert!(matches!(ragged.validate(&space), Err(LaunchError::RankMismatch { .. })));
}

#[test]
fn test_reference_geometry_ignores_rules() {
    let reference = gemm_template().reference(&square(100)).unwrap();
    assert_eq!(reference.local, [8, 8]);
    assert_eq!(reference.global, [104, 104]);
}

#[test]
fn test_device_limits() {
    let geometry = gemm_template().derive(&square(256), &gemm_config(32, 32, 16)).unwrap();
    let limits = DeviceLimits::builder().max_work_group_size(256).max_work_item_sizes(vec![256, 256]).build();

    assert_eq!(
        geometry.check_limits(&limits, 0).unwrap_err(),
        LaunchError::DeviceLimitExceeded { limit_type: "work-group size", value: 512, max: 256 }
    );

    let small = gemm_template().derive(&square(256), &gemm_config(32, 16, 8)).unwrap();
    small.check_limits(&limits, 1024).unwrap();
    assert!(matches!(
        small.check_limits(&limits, 64 * 1024),
        Err(LaunchError::DeviceLimitExceeded { limit_type: "local memory", .. })
    ));

    let narrow = DeviceLimits::builder().max_work_item_sizes(vec![8, 8]).build();
    assert!(matches!(
        small.check_limits(&narrow, 0),
        Err(LaunchError::DeviceLimitExceeded { limit_type: "work-item size", value: 16, max: 8 })
    ));
    small.check_limits(&DeviceLimits::unlimited(), usize::MAX).unwrap();
}

#[test]
fn test_geometry_json() {
    let geometry = gemm_template().derive(&square(256), &gemm_config(32, 16, 16)).unwrap();
    let json = serde_json::to_value(&geometry).unwrap();
    assert_eq!(json, serde_json::json!({ "local": [16, 16], "global": [128, 128] }));
    assert_eq!(serde_json::from_value::<LaunchGeometry>(json).unwrap(), geometry);

    let template = gemm_template();
    let text = serde_json::to_string(&template).unwrap();
    assert_eq!(serde_json::from_str::<GeometryTemplate>(&text).unwrap(), template);
}
