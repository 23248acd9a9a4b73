use std::collections::VecDeque;

/// Which end of the queue loses events when `append` would push the queue
/// past `capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropStrategy {
    /// Discard from the head of the queue (the oldest buffered events).
    #[default]
    DropOldest,
    /// Discard from the tail of the incoming batch (the newest events).
    DropNewest,
}

/// A fixed-capacity FIFO of events with a configurable overflow policy.
///
/// Treated as a primitive by the rest of the crate: it only knows how to
/// hold events in order and shed them on overflow. It never inspects a
/// payload.
#[derive(Debug, Clone)]
pub struct BoundedFifo<T> {
    items: VecDeque<T>,
    capacity: usize,
    drop_strategy: DropStrategy,
}

impl<T> BoundedFifo<T> {
    /// Creates an empty queue.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize, drop_strategy: DropStrategy) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            drop_strategy,
        }
    }

    /// Appends `events` in order, applying the drop strategy if the queue
    /// would otherwise exceed `capacity`. Returns the number of events
    /// discarded by this call.
    pub fn append(&mut self, events: impl IntoIterator<Item = T>) -> usize {
        let mut dropped = 0;

        match self.drop_strategy {
            DropStrategy::DropNewest => {
                for event in events {
                    if self.items.len() < self.capacity {
                        self.items.push_back(event);
                    } else {
                        dropped += 1;
                    }
                }
            }
            DropStrategy::DropOldest => {
                for event in events {
                    if self.items.len() >= self.capacity {
                        self.items.pop_front();
                        dropped += 1;
                    }
                    self.items.push_back(event);
                }
            }
        }

        dropped
    }

    /// Removes up to `n` events from the head, in FIFO order.
    pub fn split(&mut self, n: usize) -> Vec<T> {
        let take = n.min(self.items.len());
        self.items.drain(..take).collect()
    }

    /// Number of events currently buffered.
    #[must_use]
    pub fn size(&self) -> usize {
        self.items.len()
    }

    /// Configured maximum occupancy.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `true` when no events are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_within_capacity_drops_nothing() {
        let mut fifo = BoundedFifo::new(5, DropStrategy::DropOldest);
        let dropped = fifo.append(0..3);
        assert_eq!(dropped, 0);
        assert_eq!(fifo.size(), 3);
    }

    #[test]
    fn drop_oldest_overflow_keeps_newest_capacity_events() {
        // capacity 10, drop_oldest, append 0..=10.
        let mut fifo = BoundedFifo::new(10, DropStrategy::DropOldest);
        let dropped = fifo.append(0..=10);
        assert_eq!(dropped, 1);
        assert_eq!(fifo.size(), 10);

        let taken = fifo.split(10);
        assert_eq!(taken, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn drop_newest_overflow_discards_incoming_tail() {
        let mut fifo = BoundedFifo::new(3, DropStrategy::DropNewest);
        let dropped = fifo.append(0..5);
        assert_eq!(dropped, 2);
        assert_eq!(fifo.split(10), vec![0, 1, 2]);
    }

    #[test]
    fn split_never_takes_more_than_size() {
        let mut fifo = BoundedFifo::new(4, DropStrategy::DropOldest);
        fifo.append([1, 2]);
        let (taken, _) = (fifo.split(10), ());
        assert_eq!(taken, vec![1, 2]);
        assert!(fifo.is_empty());
    }

    #[test]
    fn split_preserves_order_across_appends() {
        let mut fifo = BoundedFifo::new(10, DropStrategy::DropOldest);
        fifo.append([1, 2, 3]);
        fifo.append([4, 5]);
        assert_eq!(fifo.split(2), vec![1, 2]);
        assert_eq!(fifo.split(3), vec![3, 4, 5]);
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn zero_capacity_panics() {
        let _fifo: BoundedFifo<u8> = BoundedFifo::new(0, DropStrategy::DropOldest);
    }
}
