//! Property-based tests for the demand map and assignment policies.

use eventbuf_core::{AssignmentPolicy, DemandMap, Even, Greedy};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn demands_from(pairs: &[(u32, usize)]) -> DemandMap<u32> {
    let mut d = DemandMap::new();
    for &(sub, n) in pairs {
        d.add(sub, n);
    }
    d
}

fn arb_demand_pairs() -> impl Strategy<Value = Vec<(u32, usize)>> {
    prop::collection::vec((0u32..16, 1usize..50), 0..12)
}

proptest! {
    /// `total` always equals the sum of all current values, and `size`
    /// always equals the number of keys, across any sequence of
    /// add/subtract/delete operations.
    #[test]
    fn demand_map_total_and_size_track_entries(
        ops in prop::collection::vec(
            prop_oneof![
                (0u32..8, 1usize..20).prop_map(|(s, n)| (0u8, s, n)),
                (0u32..8, 1usize..20).prop_map(|(s, n)| (1u8, s, n)),
                (0u32..8, 0usize..1).prop_map(|(s, _)| (2u8, s, 0)),
            ],
            0..50,
        ),
    ) {
        let mut d: DemandMap<u32> = DemandMap::new();
        for (kind, sub, n) in ops {
            match kind {
                0 => d.add(sub, n),
                1 => d.subtract(&sub, n),
                _ => { d.delete(&sub); }
            }
            prop_assert_eq!(d.total(), d.iter().map(|(_, v)| *v).sum::<usize>());
            prop_assert_eq!(d.size(), d.iter().count());
        }
    }

    /// `assigned.total() + remaining.total() == demands.total()` and
    /// `assigned.total() == min(demands.total(), event_count)` for Even.
    #[test]
    fn even_assignment_conserves_total(
        pairs in arb_demand_pairs(),
        event_count in 0usize..200,
        seed in any::<u64>(),
    ) {
        let demands = demands_from(&pairs);
        let mut rng = StdRng::seed_from_u64(seed);
        let (assigned, remaining) = Even.assign(&demands, event_count, &mut rng);

        prop_assert_eq!(assigned.total() + remaining.total(), demands.total());
        prop_assert_eq!(assigned.total(), demands.total().min(event_count));

        for sub in demands.subscribers() {
            prop_assert_eq!(assigned.get(sub) + remaining.get(sub), demands.get(sub));
        }
    }

    /// Same conservation laws for Greedy, plus the at-most-one-partial
    /// property.
    #[test]
    fn greedy_assignment_conserves_total_and_partials(
        pairs in arb_demand_pairs(),
        event_count in 0usize..200,
        seed in any::<u64>(),
    ) {
        let demands = demands_from(&pairs);
        let mut rng = StdRng::seed_from_u64(seed);
        let (assigned, remaining) = Greedy.assign(&demands, event_count, &mut rng);

        prop_assert_eq!(assigned.total() + remaining.total(), demands.total());
        prop_assert_eq!(assigned.total(), demands.total().min(event_count));

        let mut partials = 0;
        for sub in demands.subscribers() {
            let got = assigned.get(sub);
            let want = demands.get(sub);
            prop_assert_eq!(got + remaining.get(sub), want);
            if got > 0 && got < want {
                partials += 1;
            }
        }
        prop_assert!(partials <= 1);
    }
}
