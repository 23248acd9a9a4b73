use std::time::Duration;

use eventbuf_core::DropStrategy;

/// Queue capacity and overflow behavior shared by both dispatcher kinds.
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    pub capacity: usize,
    pub drop_strategy: DropStrategy,
}

impl DispatcherConfig {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize, drop_strategy: DropStrategy) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        Self {
            capacity,
            drop_strategy,
        }
    }

    /// Small queue (64 events), suitable for low-volume fan-out or tests.
    #[must_use]
    pub fn small() -> Self {
        Self::new(64, DropStrategy::DropOldest)
    }

    /// Large queue (64K events) for high-volume producers.
    #[must_use]
    pub fn high_throughput() -> Self {
        Self::new(1 << 16, DropStrategy::DropOldest)
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self::new(1024, DropStrategy::DropOldest)
    }
}

/// Additional configuration for the batching dispatcher: the minimum
/// occupancy that forces an eager flush, and the maximum time events may
/// sit buffered before a deferred flush fires regardless of occupancy.
#[derive(Debug, Clone, Copy)]
pub struct BatchingConfig {
    pub batch_size: usize,
    pub max_delay: Duration,
}

impl BatchingConfig {
    /// # Panics
    ///
    /// Panics if `batch_size` is zero or `max_delay` is zero.
    #[must_use]
    pub fn new(batch_size: usize, max_delay: Duration) -> Self {
        assert!(batch_size >= 1, "batch_size must be at least 1");
        assert!(!max_delay.is_zero(), "max_delay must be positive");
        Self {
            batch_size,
            max_delay,
        }
    }
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self::new(256, Duration::from_millis(50))
    }
}
