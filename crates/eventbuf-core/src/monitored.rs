use std::hash::Hash;

use rand::RngCore;

use crate::buffer::{Buffer, BufferStats};
use crate::error::SubscriberError;
use crate::liveness::{LivenessToken, LivenessTracker};

/// Composes [`Buffer`] with a [`LivenessTracker`], keeping the two in sync:
/// every subscriber with positive demand is watched, and removing from one
/// side removes from the other.
pub struct MonitoredBuffer<S, T> {
    buffer: Buffer<S, T>,
    liveness: LivenessTracker<S>,
}

impl<S: Eq + Hash + Clone, T> MonitoredBuffer<S, T> {
    #[must_use]
    pub fn new(buffer: Buffer<S, T>) -> Self {
        Self {
            buffer,
            liveness: LivenessTracker::new(),
        }
    }

    /// Appends events to the underlying buffer. Returns the drop count.
    pub fn append(&mut self, events: impl IntoIterator<Item = T>) -> usize {
        self.buffer.append(events)
    }

    /// Records demand for `sub` and ensures it is watched. `ask` may
    /// re-register demand for a subscriber whose demand previously dropped
    /// to zero while it stayed live, since liveness tracking is
    /// intentionally decoupled from demand presence, so `watch` here is
    /// idempotent rather than conditional on prior demand.
    pub fn ask(&mut self, sub: S, n: usize) -> LivenessToken {
        let token = self.liveness.watch(sub.clone());
        self.buffer.ask(sub, n);
        token
    }

    /// Removes `sub`'s demand and liveness registration.
    pub fn delete(&mut self, sub: &S) -> Result<(), SubscriberError> {
        self.liveness.unwatch(sub)?;
        self.buffer.delete(sub);
        Ok(())
    }

    /// Accepts a disappearance notification. On a matching token, removes
    /// `sub`'s demand as well as its liveness entry.
    pub fn on_down(&mut self, sub: &S, token: LivenessToken) -> Result<(), SubscriberError> {
        self.liveness.on_down(sub, token)?;
        self.buffer.delete(sub);
        Ok(())
    }

    /// Computes and applies an assignment; see [`Buffer::assign_events`].
    pub fn assign_events(&mut self, rng: &mut dyn RngCore) -> Vec<(S, Vec<T>)> {
        self.buffer.assign_events(rng)
    }

    /// Current buffered/demand occupancy.
    #[must_use]
    pub fn stats(&self) -> BufferStats {
        self.buffer.stats()
    }

    /// Number of subscribers currently watched (including those with zero
    /// demand that are still known).
    #[must_use]
    pub fn subscribed(&self) -> usize {
        self.liveness.size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fifo::DropStrategy;
    use crate::policy::Even;
    use rand::SeedableRng;

    fn rng() -> rand::rngs::StdRng {
        rand::rngs::StdRng::seed_from_u64(1)
    }

    fn new_monitored() -> MonitoredBuffer<&'static str, u32> {
        MonitoredBuffer::new(Buffer::new(Box::new(Even), 100, DropStrategy::DropOldest))
    }

    #[test]
    fn ask_watches_subscriber() {
        let mut mb = new_monitored();
        mb.ask("a", 3);
        assert_eq!(mb.subscribed(), 1);
        assert_eq!(mb.stats().demand, 3);
    }

    #[test]
    fn liveness_cleanup_removes_demand_and_subscription() {
        // Three subscribers ask (3, 7, 13); kill subscriber 2.
        let mut mb = new_monitored();
        let t1 = mb.ask("s1", 3);
        let t2 = mb.ask("s2", 7);
        let t3 = mb.ask("s3", 13);
        let _ = (t1, t3);

        assert_eq!(mb.stats().demand, 23);
        assert_eq!(mb.subscribed(), 3);

        mb.on_down(&"s2", t2).unwrap();

        assert_eq!(mb.stats().demand, 16);
        assert_eq!(mb.subscribed(), 2);
    }

    #[test]
    fn on_down_wrong_token_leaves_demand_intact() {
        let mut mb = new_monitored();
        let t1 = mb.ask("s1", 5);
        let _ = mb.delete(&"s1"); // unwatch, then re-ask below with a new epoch
        let t2 = mb.ask("s1", 2);
        assert!(mb.on_down(&"s1", t1).is_err());
        assert_eq!(mb.stats().demand, 2);
        mb.on_down(&"s1", t2).unwrap();
        assert_eq!(mb.stats().demand, 0);
    }

    #[test]
    fn ask_after_demand_drained_keeps_liveness() {
        let mut mb = new_monitored();
        mb.ask("a", 5);
        mb.append(0..5);
        mb.assign_events(&mut rng());
        assert_eq!(mb.stats().demand, 0);
        assert_eq!(mb.subscribed(), 1, "still watched with zero demand");

        mb.ask("a", 2);
        assert_eq!(mb.stats().demand, 2);
        assert_eq!(mb.subscribed(), 1);
    }
}
