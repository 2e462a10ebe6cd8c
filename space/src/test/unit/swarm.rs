use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use test_case::test_case;

use crate::test::helpers::*;
use crate::*;

fn sampling(fraction: f64, seed: u64) -> SamplingConfig {
    SamplingConfig::builder().fraction(fraction).seed(seed).build().unwrap()
}

fn cost(config: &Configuration) -> f64 {
    config.values().iter().sum::<usize>() as f64
}

/// Drive `swarm` to completion, reporting [`cost`] for every configuration.
fn drive(swarm: &mut ParticleSwarm<'_>) -> Vec<Configuration> {
    let mut found = Vec::new();
    while let Some(config) = swarm.next() {
        let config = config.unwrap();
        swarm.record(Some(cost(&config)));
        found.push(config);
    }
    found
}

#[test]
fn test_swarm_target_and_validity() {
    let set = xgemm_direct(false);
    let mut swarm = Resolver::new(&set).swarm(&sampling(1.0 / 64.0, 7), &SwarmConfig::default());
    assert_eq!(swarm.target(), 972);

    let found = drive(&mut swarm);
    assert_eq!(found.len(), 972);
    assert_eq!(found.iter().collect::<HashSet<_>>().len(), 972);
    for config in &found {
        assert!(set.is_satisfied(config).unwrap(), "{config}");
    }

    let stats = swarm.stats();
    assert_eq!(stats.emitted, 972);
    assert_eq!(stats.draws, stats.emitted + stats.rejections + stats.duplicates);
}

#[test]
fn test_swarm_tracks_lowest_cost() {
    let set = xgemm_direct(false);
    let mut swarm = Resolver::new(&set).swarm(&sampling(0.01, 42), &SwarmConfig::default());
    assert!(swarm.best().is_none());

    let found = drive(&mut swarm);
    let lowest = found.iter().min_by(|a, b| cost(a).total_cmp(&cost(b))).unwrap();
    let (best, best_cost) = swarm.best().unwrap();
    assert_eq!(best_cost, cost(lowest));
    assert_eq!(cost(&best), best_cost);

    // Nothing is pending once the search is done.
    swarm.record(Some(-1.0));
    assert_eq!(swarm.best().unwrap().1, best_cost);
}

#[test]
fn test_swarm_ignores_missing_costs() {
    let set = xgemm_direct(true);
    let mut swarm = Resolver::new(&set).swarm(&sampling(0.5, 3), &SwarmConfig::default());

    let first = swarm.next().unwrap().unwrap();
    swarm.record(None);
    swarm.record(Some(1.0));
    assert!(swarm.best().is_none());

    let second = swarm.next().unwrap().unwrap();
    swarm.record(Some(f64::NAN));
    assert!(swarm.best().is_none());

    let third = swarm.next().unwrap().unwrap();
    swarm.record(Some(5.0));
    swarm.record(Some(1.0));
    assert_eq!(swarm.best(), Some((third.clone(), 5.0)));
    assert_ne!(first, third);
    assert_ne!(second, third);
}

#[test]
fn test_swarm_seed_reproduces_sequence() {
    let set = xgemm_direct(false);
    let config = sampling(0.01, 1234);
    let first = drive(&mut Resolver::new(&set).swarm(&config, &SwarmConfig::default()));
    let second = drive(&mut Resolver::new(&set).swarm(&config, &SwarmConfig::default()));
    assert_eq!(first, second);
}

#[test_case(1 ; "single particle")]
#[test_case(8 ; "default swarm")]
#[test_case(64 ; "large swarm")]
fn test_swarm_unsatisfiable_space_exhausts(swarm_size: usize) {
    let set = ConstraintSet::new(space(&[("A", &[3, 5]), ("B", &[2, 4])]))
        .with(Predicate::IsMultiple, &["A", "B"])
        .unwrap();
    let config = SamplingConfig::builder().fraction(0.5).seed(1).max_consecutive_rejections(50).build().unwrap();
    let swarm = SwarmConfig::builder().swarm_size(swarm_size).build().unwrap();

    let mode = SearchMode::Swarm { sampling: config, swarm };
    let (found, err) = Resolver::new(&set).resolve(&mode).collect_until_error();
    assert!(found.is_empty());
    assert!(matches!(err, Some(SpaceError::SampleExhaustion { found: 0, draws: 50 })));
}

#[test]
fn test_swarm_respects_draw_budget() {
    let calls = Arc::new(AtomicU64::new(0));
    let set = rejecting(&calls);
    let config = SamplingConfig::builder().max_draws(10).max_consecutive_rejections(1000).seed(3).build().unwrap();

    let mut swarm = Resolver::new(&set).swarm(&config, &SwarmConfig::default());
    assert!(swarm.next().is_none());
    assert!(swarm.next().is_none());
    assert_eq!(calls.load(Ordering::Relaxed), 10);
    assert_eq!(swarm.stats().draws, 10);
}

#[test]
fn test_record_is_ignored_outside_swarm() {
    let set = xgemm_direct(true);
    let mut configurations = Resolver::new(&set).resolve(&SearchMode::Exhaustive);
    configurations.next();
    configurations.record(Some(1.0));
    assert_eq!(configurations.count(), 45);
}
