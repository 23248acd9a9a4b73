//! Actor-based dispatchers over the `eventbuf-core` buffer: an
//! [`ImmediateDispatcher`] that assigns and delivers on every command, and a
//! [`BatchingDispatcher`] that defers delivery behind a minimum batch size
//! and a maximum delay.
//!
//! Both are single-task actors: one `tokio` task owns a `MonitoredBuffer`
//! and processes commands from its mailbox one at a time, so the core
//! crate's sequential types never need external synchronization.

mod batching;
mod config;
mod delivery;
mod error;
mod immediate;
mod mailbox;

pub use batching::BatchingDispatcher;
pub use config::{BatchingConfig, DispatcherConfig};
pub use delivery::{DeliveredMessage, DeliveryHook, DispatcherId};
pub use error::DispatchError;
pub use immediate::ImmediateDispatcher;
pub use mailbox::Stats;

pub use eventbuf_core::{AssignmentPolicy, DropStrategy, Even, Greedy, LivenessToken};
