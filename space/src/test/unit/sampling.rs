use std::collections::HashSet;

use crate::test::helpers::*;
use crate::*;

fn sampling(fraction: f64, seed: u64) -> SamplingConfig {
    SamplingConfig::builder().fraction(fraction).seed(seed).build().unwrap()
}

#[test]
fn test_sampled_target_and_validity() {
    let set = xgemm_direct(false);
    let config = sampling(1.0 / 64.0, 7);
    let mut sampler = Resolver::new(&set).sample(&config);
    assert_eq!(sampler.target(), 972);

    let found: Vec<_> = sampler.by_ref().collect::<Result<_>>().unwrap();
    assert_eq!(found.len(), 972);
    assert_eq!(found.iter().collect::<HashSet<_>>().len(), 972);
    for config in &found {
        assert!(set.is_satisfied(config).unwrap(), "{config}");
    }

    let stats = sampler.stats();
    assert_eq!(stats.emitted, 972);
    assert_eq!(stats.draws, stats.emitted + stats.rejections + stats.duplicates);
}

#[test]
fn test_seed_reproduces_sequence() {
    let set = xgemm_direct(false);
    let config = sampling(0.01, 1234);
    let first: Vec<_> = Resolver::new(&set).sample(&config).collect::<Result<_>>().unwrap();
    let second: Vec<_> = Resolver::new(&set).sample(&config).collect::<Result<_>>().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_full_fraction_converges_to_exhaustive() {
    let set = ConstraintSet::new(space(&[("A", &[1, 2, 3, 4]), ("B", &[1, 2, 4])]))
        .with(Predicate::IsMultiple, &["A", "B"])
        .unwrap();
    let config =
        SamplingConfig::builder().seed(3).max_draws(100_000).max_consecutive_rejections(5_000).build().unwrap();

    // Only 7 of the 12 configurations are valid, so the target of 12 is unreachable.
    let (sampled, err) = Resolver::new(&set).resolve(&SearchMode::Sampling(config)).collect_until_error();
    assert!(matches!(err, Some(SpaceError::SampleExhaustion { found: 7, .. })));

    let sampled: HashSet<_> = sampled.into_iter().collect();
    let exhaustive: HashSet<_> = Resolver::new(&set).exhaustive().collect::<Result<_>>().unwrap();
    assert_eq!(sampled, exhaustive);
}

#[test]
fn test_unsatisfiable_space_exhausts() {
    let set = ConstraintSet::new(space(&[("A", &[3, 5]), ("B", &[2, 4])]))
        .with(Predicate::IsMultiple, &["A", "B"])
        .unwrap();
    let config = SamplingConfig::builder().fraction(0.5).seed(1).max_consecutive_rejections(50).build().unwrap();
    let mut sampler = Resolver::new(&set).sample(&config);

    assert_eq!(sampler.next(), Some(Err(SpaceError::SampleExhaustion { found: 0, draws: 50 })));
    assert_eq!(sampler.next(), None);
}

#[test]
fn test_draw_budget_ends_normally() {
    let set = xgemm_direct(false);
    let config = SamplingConfig::builder().fraction(0.5).seed(9).max_draws(200).build().unwrap();
    let mut sampler = Resolver::new(&set).sample(&config);

    let found: Vec<_> = sampler.by_ref().collect::<Result<_>>().unwrap();
    assert!(found.len() < sampler.target());
    assert_eq!(sampler.stats().draws, 200);
}

#[test]
fn test_division_by_zero_propagates() {
    let set = ConstraintSet::new(space(&[("A", &[4]), ("B", &[0])])).with(Predicate::IsMultiple, &["A", "B"]).unwrap();
    let mut sampler = Resolver::new(&set).sample(&sampling(1.0, 0));
    assert!(matches!(sampler.next(), Some(Err(SpaceError::DivisionByZero { .. }))));
    assert!(sampler.next().is_none());
}
