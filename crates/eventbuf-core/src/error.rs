use thiserror::Error;

/// Errors surfaced by the liveness tracker and the monitored buffer that
/// composes it.
///
/// Neither variant indicates a bug: `NotSubscribed` means the caller raced
/// ahead of (or after) the subscriber's lifecycle, and `WrongToken` means a
/// disappearance signal arrived for an epoch that has already been
/// superseded. Both are routine and callers are expected to match on them
/// rather than propagate with `?` into something fatal.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubscriberError {
    /// The handle named in the call is not currently tracked.
    #[error("subscriber is not currently tracked")]
    NotSubscribed,
    /// The liveness token supplied does not match the currently stored one
    /// for this subscriber (a stale notification from a superseded epoch).
    #[error("liveness token does not match the current subscription epoch")]
    WrongToken,
}
