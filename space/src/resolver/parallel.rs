//! Parallel resolution on the rayon pool.
//!
//! Exhaustive resolution splits on the first parameter's candidates; each
//! subtree is an independent [`Exhaustive`] walk and the subtrees are joined
//! back in candidate order. Sampling runs independent batches that share a
//! lock-free emitted set.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use papaya::HashMap;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::sampling::{Draw, draw, seeded_rng};
use super::{Exhaustive, ResolverStats, SamplingConfig};
use crate::configuration::{Configuration, Values};
use crate::constraint::ConstraintSet;
use crate::error::*;

/// Every valid configuration, in the same order as [`Exhaustive`].
pub fn collect_exhaustive_parallel(constraints: &ConstraintSet) -> Result<Vec<Configuration>> {
    let width = constraints.space().parameters().first().map_or(0, |p| p.len());
    if width <= 1 {
        return Exhaustive::new(constraints).collect();
    }

    let subtrees: Vec<Result<Vec<Configuration>>> = (0..width)
        .into_par_iter()
        .map(|i| Exhaustive::new(constraints).with_first_range(i..i + 1).collect())
        .collect();

    let mut found = Vec::new();
    for subtree in subtrees {
        found.extend(subtree?);
    }
    debug!(subtrees = width, emitted = found.len(), "parallel exhaustive resolution finished");
    Ok(found)
}

struct BatchOutcome {
    stats: ResolverStats,
    exhausted: bool,
}

/// Sample the space with `batches` independent draw streams.
///
/// The draw budget is split between batches, the first `max_draws % batches`
/// taking one extra draw, so the total never exceeds it. Each batch tracks its
/// own consecutive rejections. With a seed, batch `i` is seeded with
/// `seed + i`; the set of configurations found still depends on thread
/// interleaving. The result is sorted by value.
pub fn collect_sampled_parallel(
    constraints: &ConstraintSet,
    config: &SamplingConfig,
    batches: usize,
) -> Result<Vec<Configuration>> {
    let space = constraints.space();
    let target = config.target(space.cartesian_size());
    let batches = batches.max(1);
    let share = config.max_draws / batches as u64;
    let extra = config.max_draws % batches as u64;

    let emitted: HashMap<Values, ()> = HashMap::new();
    let count = AtomicUsize::new(0);
    let stop = AtomicBool::new(false);

    let outcomes: Vec<Result<BatchOutcome>> = (0..batches)
        .into_par_iter()
        .map(|batch| {
            let mut rng = seeded_rng(config.seed.map(|seed| seed.wrapping_add(batch as u64)));
            let mut stats = ResolverStats::default();
            let mut consecutive = 0u64;
            let budget = share + u64::from((batch as u64) < extra);
            let guard = emitted.guard();

            while !stop.load(Ordering::Relaxed) && stats.draws < budget {
                let result = draw(constraints, space, &mut rng, &mut stats);
                match result {
                    Err(err) => {
                        stop.store(true, Ordering::Relaxed);
                        return Err(err);
                    }
                    Ok(Draw::Valid(values)) if emitted.insert(values.clone(), (), &guard).is_none() => {
                        if count.fetch_add(1, Ordering::AcqRel) >= target {
                            emitted.remove(&values, &guard);
                            stop.store(true, Ordering::Relaxed);
                            break;
                        }
                        stats.emitted += 1;
                        consecutive = 0;
                        if count.load(Ordering::Acquire) >= target {
                            stop.store(true, Ordering::Relaxed);
                        }
                        continue;
                    }
                    Ok(Draw::Valid(_)) => {
                        stats.duplicates += 1;
                        consecutive += 1;
                    }
                    Ok(Draw::Rejected) => consecutive += 1,
                }

                if consecutive >= config.max_consecutive_rejections {
                    return Ok(BatchOutcome { stats, exhausted: true });
                }
            }
            Ok(BatchOutcome { stats, exhausted: false })
        })
        .collect();

    let mut stats = ResolverStats::default();
    let mut exhausted = false;
    for outcome in outcomes {
        let outcome = outcome?;
        stats += outcome.stats;
        exhausted |= outcome.exhausted;
    }

    let guard = emitted.guard();
    let mut found: Vec<Values> = emitted.iter(&guard).map(|(values, _)| values.clone()).collect();
    found.sort_unstable();

    debug!(
        batches,
        draws = stats.draws,
        rejections = stats.rejections,
        duplicates = stats.duplicates,
        emitted = found.len(),
        target,
        "parallel sampled resolution finished"
    );

    if found.len() < target {
        if exhausted {
            return SampleExhaustionSnafu { found: found.len(), draws: stats.draws }.fail();
        }
        warn!(found = found.len(), target, draws = stats.draws, "sampling draw budget spent before reaching target");
    }

    Ok(found.into_iter().map(|values| Configuration::new_unchecked(Arc::clone(space), values)).collect())
}
