use std::collections::HashSet;

use proptest::prelude::*;

use super::generators::*;
use crate::test::helpers::*;
use crate::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Exhaustive resolution is brute-force filtering: same members, same order.
    #[test]
    fn exhaustive_equals_brute_force(set in constrained_space()) {
        let found: Vec<_> = Resolver::new(&set).exhaustive().collect::<Result<_>>().unwrap();
        prop_assert_eq!(values_of(&found), brute_force(&set));
    }

    #[test]
    fn exhaustive_output_satisfies_every_constraint(set in constrained_space()) {
        for config in Resolver::new(&set).exhaustive() {
            let config = config.unwrap();
            prop_assert!(set.is_satisfied(&config).unwrap());
        }
    }

    #[test]
    fn unconstrained_count_is_product(space in small_space()) {
        let set = ConstraintSet::new(space);
        let count = Resolver::new(&set).exhaustive().count();
        prop_assert_eq!(count as u128, set.space().cartesian_size());
    }

    #[test]
    fn parallel_exhaustive_matches_sequential(set in constrained_space()) {
        let sequential: Vec<_> = Resolver::new(&set).exhaustive().collect::<Result<_>>().unwrap();
        prop_assert_eq!(collect_exhaustive_parallel(&set).unwrap(), sequential);
    }

    /// Sampled configurations are valid, unique and never exceed the target.
    #[test]
    fn sampling_postcondition(set in constrained_space(), fraction in 0.05f64..=1.0, seed in any::<u64>()) {
        let config = SamplingConfig::builder()
            .fraction(fraction)
            .seed(seed)
            .max_consecutive_rejections(200)
            .build()
            .unwrap();
        let sampler = Resolver::new(&set).sample(&config);
        let target = sampler.target();
        let (found, err) = Configurations::Sampling(sampler).collect_until_error();

        prop_assert!(found.len() <= target);
        prop_assert_eq!(found.iter().collect::<HashSet<_>>().len(), found.len());
        for config in &found {
            prop_assert!(set.is_satisfied(config).unwrap());
        }
        match err {
            None => prop_assert_eq!(found.len(), target),
            Some(SpaceError::SampleExhaustion { found: count, .. }) => prop_assert_eq!(count, found.len()),
            Some(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }

    /// Swarm output obeys the sampling postcondition whatever costs are reported.
    #[test]
    fn swarm_postcondition(
        set in constrained_space(),
        fraction in 0.05f64..=1.0,
        seed in any::<u64>(),
        swarm_size in 1usize..=6,
        costs in prop::collection::vec(prop::option::of(-1.0e3f64..1.0e3), 1..16),
    ) {
        let sampling = SamplingConfig::builder()
            .fraction(fraction)
            .seed(seed)
            .max_consecutive_rejections(200)
            .build()
            .unwrap();
        let swarm = SwarmConfig::builder().swarm_size(swarm_size).build().unwrap();
        let mut search = Resolver::new(&set).swarm(&sampling, &swarm);
        let target = search.target();

        let mut found = Vec::new();
        let mut err = None;
        while let Some(item) = search.next() {
            match item {
                Ok(config) => {
                    search.record(costs[found.len() % costs.len()]);
                    found.push(config);
                }
                Err(e) => err = Some(e),
            }
        }

        prop_assert!(found.len() <= target);
        prop_assert_eq!(found.iter().collect::<HashSet<_>>().len(), found.len());
        for config in &found {
            prop_assert!(set.is_satisfied(config).unwrap());
        }
        match err {
            None => prop_assert_eq!(found.len(), target),
            Some(SpaceError::SampleExhaustion { found: count, .. }) => prop_assert_eq!(count, found.len()),
            Some(other) => prop_assert!(false, "unexpected error {other:?}"),
        }
    }
}
