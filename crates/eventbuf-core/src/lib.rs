//! In-process event buffering and fan-out core.
//!
//! This crate implements the sequential, value-oriented heart of the
//! eventbuf engine: a bounded FIFO of events ([`BoundedFifo`]), per-subscriber
//! demand accounting with a constant-time aggregate ([`DemandMap`]),
//! pluggable fairness policies for splitting events across demanders
//! ([`AssignmentPolicy`], [`Even`], [`Greedy`]), and the [`Buffer`] /
//! [`MonitoredBuffer`] types that compose them with a liveness tracker.
//!
//! Nothing here touches an async runtime or performs I/O; callers
//! serialize access externally, typically by placing a [`MonitoredBuffer`]
//! inside a single-task actor (see the `eventbuf-dispatch` crate).

mod buffer;
mod demand;
mod error;
mod fifo;
mod liveness;
mod liveness_watch;
mod monitored;
mod policy;

pub use buffer::{Buffer, BufferStats};
pub use demand::DemandMap;
pub use error::SubscriberError;
pub use fifo::{BoundedFifo, DropStrategy};
pub use liveness::{LivenessToken, LivenessTracker};
pub use liveness_watch::{LivenessWatch, ManualLiveness};
pub use monitored::MonitoredBuffer;
pub use policy::{AssignmentPolicy, Even, Greedy};
