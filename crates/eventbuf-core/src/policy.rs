use std::hash::Hash;

use rand::seq::SliceRandom;
use rand::RngCore;

use crate::demand::DemandMap;

/// Decides how a fixed number of available events is split across
/// subscribers with outstanding demand.
///
/// Implementations are pure with respect to their inputs: `demands` is
/// never mutated, and the only non-determinism is the caller-supplied `rng`.
/// The contract every implementation must uphold (verified by the property
/// tests in this crate):
///
/// - `assigned.total() + remaining.total() == demands.total()`
/// - `assigned.total() == min(demands.total(), event_count)`
/// - for every subscriber `s`, `assigned.get(s) + remaining.get(s) == demands.get(s)`
pub trait AssignmentPolicy<S: Eq + Hash + Clone>: Send + Sync {
    /// Splits `event_count` events across `demands`, returning
    /// `(assigned, remaining)`.
    fn assign(
        &self,
        demands: &DemandMap<S>,
        event_count: usize,
        rng: &mut dyn RngCore,
    ) -> (DemandMap<S>, DemandMap<S>);
}

/// Spreads events as evenly as possible across demanders, honoring each
/// subscriber's individual cap.
///
/// Proceeds in rounds: each round computes a per-subscriber batch size of
/// `max(events_left / subscribers_left, 1)`, visits subscribers in a fresh
/// random order, and hands each one `min(batch, their_demand, events_left)`.
/// Subscribers whose demand is fully met drop out before the next round.
/// This is what distributes a remainder that doesn't divide evenly across
/// subscribers uniformly at random instead of always favoring the same
/// handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct Even;

impl<S: Eq + Hash + Clone + Send + Sync> AssignmentPolicy<S> for Even {
    fn assign(
        &self,
        demands: &DemandMap<S>,
        event_count: usize,
        rng: &mut dyn RngCore,
    ) -> (DemandMap<S>, DemandMap<S>) {
        if demands.total() <= event_count {
            return (demands.clone(), DemandMap::new());
        }

        let mut remaining = demands.clone();
        let mut assigned = DemandMap::new();
        let mut left = event_count;

        while left > 0 {
            let mut subs: Vec<S> = remaining.subscribers().cloned().collect();
            debug_assert!(!subs.is_empty(), "left > 0 implies demand remains");
            subs.shuffle(rng);

            let batch = (left / subs.len()).max(1);

            for sub in subs {
                if left == 0 {
                    break;
                }
                let their_demand = remaining.get(&sub);
                let amount = batch.min(their_demand).min(left);
                if amount == 0 {
                    continue;
                }
                assigned.add(sub.clone(), amount);
                remaining.subtract(&sub, amount);
                left -= amount;
            }
        }

        (assigned, remaining)
    }
}

/// Hands full demand to subscribers in an arbitrarily ordered subset: walk a
/// single random permutation once, giving each subscriber its entire
/// outstanding demand until events run out. At most one subscriber ends up
/// partially satisfied.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl<S: Eq + Hash + Clone + Send + Sync> AssignmentPolicy<S> for Greedy {
    fn assign(
        &self,
        demands: &DemandMap<S>,
        event_count: usize,
        rng: &mut dyn RngCore,
    ) -> (DemandMap<S>, DemandMap<S>) {
        let mut subs: Vec<S> = demands.subscribers().cloned().collect();
        subs.shuffle(rng);

        let mut remaining = demands.clone();
        let mut assigned = DemandMap::new();
        let mut left = event_count;

        for sub in subs {
            if left == 0 {
                break;
            }
            let their_demand = remaining.get(&sub);
            let amount = their_demand.min(left);
            if amount == 0 {
                continue;
            }
            assigned.add(sub.clone(), amount);
            remaining.subtract(&sub, amount);
            left -= amount;
        }

        (assigned, remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn demands_from(pairs: &[(&'static str, usize)]) -> DemandMap<&'static str> {
        let mut d = DemandMap::new();
        for &(sub, n) in pairs {
            d.add(sub, n);
        }
        d
    }

    #[test]
    fn even_splits_uneven_demands_honoring_caps() {
        // s1..s4 ask (10, 2, 3, 5); 13 events.
        let demands = demands_from(&[("s1", 10), ("s2", 2), ("s3", 3), ("s4", 5)]);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let (assigned, remaining) = Even.assign(&demands, 13, &mut rng);

        assert_eq!(assigned.get(&"s2"), 2);
        assert_eq!(assigned.get(&"s3"), 3);
        assert_eq!(assigned.get(&"s1"), 4);
        assert_eq!(assigned.get(&"s4"), 4);
        assert_eq!(assigned.total(), 13);

        assert_eq!(remaining.get(&"s1"), 6);
        assert_eq!(remaining.get(&"s2"), 0);
        assert_eq!(remaining.get(&"s3"), 0);
        assert_eq!(remaining.get(&"s4"), 1);
        assert_eq!(remaining.total(), 7);
    }

    #[test]
    fn even_remainder_randomization_distribution() {
        // Four subscribers each ask 2; append 5 events. Across many
        // seeds, each subscriber gets 1 or 2 and exactly one gets 2.
        for seed in 0..200u64 {
            let demands = demands_from(&[("s1", 2), ("s2", 2), ("s3", 2), ("s4", 2)]);
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let (assigned, _) = Even.assign(&demands, 5, &mut rng);

            assert_eq!(assigned.total(), 5);
            let counts: Vec<usize> = ["s1", "s2", "s3", "s4"]
                .iter()
                .map(|s| assigned.get(s))
                .collect();
            assert!(counts.iter().all(|&c| c == 1 || c == 2));
            assert_eq!(counts.iter().filter(|&&c| c == 2).count(), 1);
        }
    }

    #[test]
    fn even_demand_not_exceeding_events_returns_all() {
        let demands = demands_from(&[("s1", 3), ("s2", 4)]);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let (assigned, remaining) = Even.assign(&demands, 10, &mut rng);
        assert_eq!(assigned.total(), 7);
        assert!(remaining.is_empty());
    }

    #[test]
    fn greedy_at_most_one_partial() {
        for seed in 0..100u64 {
            let demands = demands_from(&[("s1", 4), ("s2", 4), ("s3", 4)]);
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let (assigned, _) = Greedy.assign(&demands, 9, &mut rng);

            let partial_count = ["s1", "s2", "s3"]
                .iter()
                .filter(|s| {
                    let got = assigned.get(s);
                    got > 0 && got < demands.get(s)
                })
                .count();
            assert!(partial_count <= 1);
            assert_eq!(assigned.total(), 9);
        }
    }

    #[test]
    fn greedy_empty_demands_yields_empty_assignment() {
        let demands: DemandMap<&str> = DemandMap::new();
        let mut rng = rand::rngs::StdRng::seed_from_u64(0);
        let (assigned, remaining) = Greedy.assign(&demands, 5, &mut rng);
        assert!(assigned.is_empty());
        assert!(remaining.is_empty());
    }
}
