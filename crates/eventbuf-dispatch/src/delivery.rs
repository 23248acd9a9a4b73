/// Identifies the dispatcher instance a delivery originated from, so a
/// subscriber fed by several dispatchers can tell deliveries apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatcherId(u64);

static NEXT_DISPATCHER_ID: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Mints a fresh dispatcher identity, called once per actor spawn.
pub(crate) fn next_dispatcher_id() -> DispatcherId {
    DispatcherId(NEXT_DISPATCHER_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
}

/// The message shape a concrete transport hands a subscriber's mailbox:
/// a tag identifying the kind, the originating dispatcher, and the ordered
/// events assigned to that subscriber.
#[derive(Debug, Clone)]
pub enum DeliveredMessage<T> {
    Assigned {
        source: DispatcherId,
        events: Vec<T>,
    },
}

/// The dispatcher's output edge. Implementations deliver an assigned slice
/// of events to a subscriber; this is a non-blocking send, never a remote
/// call the dispatcher actor waits on.
///
/// Left abstract so the dispatcher crate carries no opinion on subscriber
/// transport (process-local mailbox, network session, test recorder, …).
pub trait DeliveryHook<S, T>: Send + Sync {
    /// Delivers `events` to `subscriber`. Called only with non-empty
    /// `events`, since empty assignments are filtered out by the dispatcher
    /// before this is invoked.
    fn deliver(&self, subscriber: &S, events: Vec<T>, source: DispatcherId);
}

/// A [`DeliveryHook`] backed by a plain closure, for tests and simple
/// integrations that don't need a full transport.
impl<S, T, F> DeliveryHook<S, T> for F
where
    F: Fn(&S, Vec<T>, DispatcherId) + Send + Sync,
{
    fn deliver(&self, subscriber: &S, events: Vec<T>, source: DispatcherId) {
        (self)(subscriber, events, source)
    }
}
