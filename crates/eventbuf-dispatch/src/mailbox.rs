use eventbuf_core::LivenessToken;
use tokio::sync::oneshot;

use crate::error::DispatchError;

/// Occupancy/registration snapshot returned by `stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub buffered: usize,
    pub subscribed: usize,
    pub demand: usize,
}

/// Commands accepted by both dispatcher actors. `Append`, `Unsubscribe` and
/// `Stats` carry a reply channel for a synchronous-looking response; `Ask`
/// and `Down` are fire-and-forget.
pub(crate) enum Command<S, T> {
    Append {
        events: Vec<T>,
        reply: oneshot::Sender<usize>,
    },
    Ask {
        sub: S,
        n: usize,
    },
    Unsubscribe {
        sub: S,
        reply: oneshot::Sender<Result<(), DispatchError>>,
    },
    Stats {
        reply: oneshot::Sender<Stats>,
    },
    Down {
        sub: S,
        token: LivenessToken,
    },
}
