use thiserror::Error;

/// Errors returned from a dispatcher's public operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// `unsubscribe` named a handle that is not currently tracked.
    #[error("subscriber is not currently tracked")]
    NotSubscribed,
    /// The dispatcher actor has already shut down; its mailbox is closed.
    #[error("dispatcher has shut down")]
    ShutDown,
}

impl From<eventbuf_core::SubscriberError> for DispatchError {
    fn from(err: eventbuf_core::SubscriberError) -> Self {
        match err {
            eventbuf_core::SubscriberError::NotSubscribed => DispatchError::NotSubscribed,
            // A wrong-token disappearance signal is handled internally by
            // the dispatcher loop (dropped silently, never surfaced here);
            // this arm only exists so the conversion is total.
            eventbuf_core::SubscriberError::WrongToken => DispatchError::NotSubscribed,
        }
    }
}
