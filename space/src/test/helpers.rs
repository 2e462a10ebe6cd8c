//! Shared fixtures for resolver tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::*;

/// Build a space from `(name, candidates)` pairs.
pub fn space(params: &[(&str, &[usize])]) -> Arc<ParameterSpace> {
    let mut space = ParameterSpace::new();
    for (name, candidates) in params {
        space.add(*name, candidates.iter().copied()).unwrap();
    }
    Arc::new(space)
}

/// The direct GEMM tile space: `limited` selects the small exhaustive variant.
pub fn xgemm_direct(limited: bool) -> ConstraintSet {
    let dims: &[usize] = &[8, 16, 32];
    let vws: &[usize] = &[1, 2, 4, 8];
    let space = if limited {
        space(&[
            ("WGD", &[8, 16, 32]),
            ("MDIMCD", dims),
            ("NDIMCD", dims),
            ("MDIMAD", dims),
            ("NDIMBD", dims),
            ("KWID", &[2]),
            ("VWMD", vws),
            ("VWND", vws),
            ("PADA", &[1]),
            ("PADB", &[1]),
        ])
    } else {
        space(&[
            ("WGD", &[8, 16, 32, 64]),
            ("MDIMCD", dims),
            ("NDIMCD", dims),
            ("MDIMAD", dims),
            ("NDIMBD", dims),
            ("KWID", &[2, 8, 16]),
            ("VWMD", vws),
            ("VWND", vws),
            ("PADA", &[0, 1]),
            ("PADB", &[0, 1]),
        ])
    };

    let mut set = ConstraintSet::new(space)
        .with(Predicate::IsMultiple, &["WGD", "KWID"])
        .unwrap()
        .with(Predicate::IsMultipleOfProduct, &["WGD", "MDIMCD", "VWMD"])
        .unwrap()
        .with(Predicate::IsMultipleOfProduct, &["WGD", "NDIMCD", "VWND"])
        .unwrap()
        .with(Predicate::IsMultipleOfProduct, &["WGD", "MDIMAD", "VWMD"])
        .unwrap()
        .with(Predicate::IsMultipleOfProduct, &["WGD", "NDIMBD", "VWND"])
        .unwrap()
        .with(Predicate::IsMultipleOfProductDividedBy, &["WGD", "MDIMCD", "NDIMCD", "MDIMAD"])
        .unwrap()
        .with(Predicate::IsMultipleOfProductDividedBy, &["WGD", "MDIMCD", "NDIMCD", "NDIMBD"])
        .unwrap();

    if limited {
        let pins = ConstraintSet::new(Arc::clone(set.space()))
            .with(Predicate::AreEqual, &["MDIMCD", "MDIMAD"])
            .unwrap()
            .with(Predicate::AreEqual, &["NDIMCD", "NDIMBD"])
            .unwrap();
        set.extend(&pins).unwrap();
    }
    set
}

/// Every configuration of the product, filtered by the constraints, in lexicographic order.
pub fn brute_force(constraints: &ConstraintSet) -> Vec<Vec<usize>> {
    let space = constraints.space();
    let mut all: Vec<Vec<usize>> = vec![Vec::new()];
    for param in space.parameters() {
        all = all
            .into_iter()
            .flat_map(|prefix| {
                param.candidates().iter().map(move |&v| {
                    let mut next = prefix.clone();
                    next.push(v);
                    next
                })
            })
            .collect();
    }
    all.into_iter().filter(|values| constraints.check_values(values).unwrap()).collect()
}

pub fn values_of(configs: &[Configuration]) -> Vec<Vec<usize>> {
    configs.iter().map(|c| c.values().to_vec()).collect()
}

/// Constraint set over eight candidates that rejects every draw and counts its calls.
pub fn rejecting(calls: &Arc<AtomicU64>) -> ConstraintSet {
    let calls = Arc::clone(calls);
    let never = Predicate::custom("never", move |_| {
        calls.fetch_add(1, Ordering::Relaxed);
        false
    });
    ConstraintSet::new(space(&[("A", &[1, 2, 3, 4, 5, 6, 7, 8])])).with(never, &["A"]).unwrap()
}
