use std::hash::Hash;

use rand::RngCore;

use crate::demand::DemandMap;
use crate::fifo::{BoundedFifo, DropStrategy};
use crate::policy::AssignmentPolicy;

/// Snapshot of a buffer's occupancy, returned by [`Buffer::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferStats {
    pub buffered: usize,
    pub demand: usize,
}

/// Composes a bounded FIFO of events, a demand map, and an assignment
/// policy into the core of the buffer/fan-out engine.
///
/// `append`, `ask` and `delete` only mutate the queue/demand side; they
/// never trigger delivery themselves. Call [`Buffer::assign_events`] to
/// re-establish the invariant that either the queue or the demand map is
/// empty (or both).
pub struct Buffer<S, T> {
    events: BoundedFifo<T>,
    demands: DemandMap<S>,
    policy: Box<dyn AssignmentPolicy<S>>,
}

impl<S: Eq + Hash + Clone, T> Buffer<S, T> {
    /// Creates an empty buffer with the given fairness policy, queue
    /// capacity and overflow strategy.
    #[must_use]
    pub fn new(
        policy: Box<dyn AssignmentPolicy<S>>,
        capacity: usize,
        drop_strategy: DropStrategy,
    ) -> Self {
        Self {
            events: BoundedFifo::new(capacity, drop_strategy),
            demands: DemandMap::new(),
            policy,
        }
    }

    /// Appends events to the queue. Returns the number dropped by overflow.
    pub fn append(&mut self, events: impl IntoIterator<Item = T>) -> usize {
        self.events.append(events)
    }

    /// Records `n` units of demand for `sub`. A no-op when `n == 0`. Does
    /// not itself trigger an assignment.
    pub fn ask(&mut self, sub: S, n: usize) {
        self.demands.add(sub, n);
    }

    /// Removes all outstanding demand for `sub`.
    pub fn delete(&mut self, sub: &S) {
        self.demands.delete(sub);
    }

    /// Computes and applies an assignment: splits buffered events across
    /// subscribers with outstanding demand per the configured policy,
    /// draining delivered events from the queue and the corresponding
    /// demand. Returns `(subscriber, events)` pairs with non-empty slices
    /// only; order across subscribers carries no meaning.
    pub fn assign_events(&mut self, rng: &mut dyn RngCore) -> Vec<(S, Vec<T>)> {
        if self.events.is_empty() || self.demands.is_empty() {
            return Vec::new();
        }

        let (to_meet, remaining) = self.policy.assign(&self.demands, self.events.size(), rng);
        self.demands = remaining;

        let mut out = Vec::with_capacity(to_meet.size());
        for (sub, &n) in to_meet.iter() {
            if n == 0 {
                continue;
            }
            let slice = self.events.split(n);
            if !slice.is_empty() {
                out.push((sub.clone(), slice));
            }
        }
        out
    }

    /// Number of events currently buffered.
    #[must_use]
    pub fn size(&self) -> usize {
        self.events.size()
    }

    /// Current occupancy snapshot.
    #[must_use]
    pub fn stats(&self) -> BufferStats {
        BufferStats {
            buffered: self.events.size(),
            demand: self.demands.total(),
        }
    }

    pub(crate) fn demands(&self) -> &DemandMap<S> {
        &self.demands
    }

    pub(crate) fn demands_mut(&mut self) -> &mut DemandMap<S> {
        &mut self.demands
    }
}
