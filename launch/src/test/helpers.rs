use std::sync::Arc;

use tunesmith_space::{Configuration, ParameterSpace};

use crate::*;

pub fn gemm_space() -> Arc<ParameterSpace> {
    Arc::new(
        ParameterSpace::new()
            .with("WGD", [8, 16, 32, 64])
            .unwrap()
            .with("MDIMCD", [8, 16, 32])
            .unwrap()
            .with("NDIMCD", [8, 16, 32])
            .unwrap(),
    )
}

pub fn gemm_config(wgd: usize, mdimcd: usize, ndimcd: usize) -> Configuration {
    Configuration::from_values(gemm_space(), &[wgd, mdimcd, ndimcd]).unwrap()
}

pub fn gemm_template() -> GeometryTemplate {
    GeometryTemplate::new(["m", "n"], [1, 1])
        .with_reference_local([8, 8])
        .mul_local(&["MDIMCD", "NDIMCD"])
        .mul_global(&["MDIMCD", "NDIMCD"])
        .div_global(&["WGD", "WGD"])
}

pub fn square(size: usize) -> ProblemSize {
    ProblemSize::new().with("m", size).with("n", size).with("k", size)
}
