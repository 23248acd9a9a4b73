use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

/// Per-subscriber outstanding request counts with a cached, constant-time
/// aggregate total.
///
/// A subscriber with zero demand is never stored (`get` simply reports 0
/// for anything absent). `total` is maintained incrementally on every
/// mutation rather than recomputed, so it stays O(1) regardless of `size`.
#[derive(Debug, Clone, Default)]
pub struct DemandMap<S> {
    entries: HashMap<S, usize>,
    total: usize,
}

impl<S: Eq + Hash + Clone> DemandMap<S> {
    /// An empty demand map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            total: 0,
        }
    }

    /// Adds `n` to `sub`'s demand. A no-op when `n == 0`.
    pub fn add(&mut self, sub: S, n: usize) {
        if n == 0 {
            return;
        }
        *self.entries.entry(sub).or_insert(0) += n;
        self.total += n;
        debug_assert_eq!(self.total, self.entries.values().sum::<usize>());
    }

    /// Subtracts up to `n` from `sub`'s demand, clamped at zero. A no-op when
    /// `n == 0` or `sub` is absent. Removes the entry entirely if the result
    /// is zero.
    pub fn subtract(&mut self, sub: &S, n: usize) {
        if n == 0 {
            return;
        }
        let Entry::Occupied(mut entry) = self.entries.entry(sub.clone()) else {
            return;
        };
        let current = *entry.get();
        let removed = n.min(current);
        if removed == current {
            entry.remove();
        } else {
            *entry.get_mut() -= removed;
        }
        self.total -= removed;
    }

    /// Removes `sub` entirely, returning the demand it held (0 if absent).
    pub fn delete(&mut self, sub: &S) -> usize {
        match self.entries.remove(sub) {
            Some(n) => {
                self.total -= n;
                n
            }
            None => 0,
        }
    }

    /// Current demand for `sub`, or 0 if it is not tracked.
    #[must_use]
    pub fn get(&self, sub: &S) -> usize {
        self.entries.get(sub).copied().unwrap_or(0)
    }

    /// Sum of all outstanding demand.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of subscribers with positive demand.
    #[must_use]
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no subscriber has outstanding demand.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the tracked subscriber handles. Iteration order is not
    /// meaningful, since assignment policies draw their own random
    /// permutation rather than relying on this order.
    pub fn subscribers(&self) -> impl Iterator<Item = &S> {
        self.entries.keys()
    }

    /// Snapshot of (subscriber, demand) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&S, &usize)> {
        self.entries.iter()
    }
}
