use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

use crate::liveness::{LivenessToken, LivenessTracker};

/// The input side of liveness tracking: something external to a dispatcher
/// that can be asked to watch or stop watching a subscriber handle.
///
/// A dispatcher owns the output side (`MonitoredBuffer`'s `on_down`); an
/// integrator wires a concrete `LivenessWatch` implementation (backed by a
/// process monitor, a cluster membership feed, a heartbeat timeout, or, for
/// tests, [`ManualLiveness`]) to feed `Command::Down` into the dispatcher's
/// mailbox when a watched handle disappears.
pub trait LivenessWatch<S>: Send + Sync {
    /// Starts watching `sub`, returning its current epoch token.
    fn watch(&self, sub: &S) -> LivenessToken;

    /// Stops watching `sub`. A no-op if it was not being watched.
    fn unwatch(&self, sub: &S);
}

/// A [`LivenessWatch`] driven entirely by test or tooling code calling
/// `watch`/`unwatch` directly, with no real disappearance detection of its
/// own. Useful for integration tests that need to produce a genuine
/// [`LivenessToken`] to hand to a dispatcher's `notify_down`.
#[derive(Default)]
pub struct ManualLiveness<S: Eq + Hash + Clone> {
    inner: Mutex<LivenessTracker<S>>,
}

impl<S: Eq + Hash + Clone> ManualLiveness<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(LivenessTracker::new()),
        }
    }

    /// The token currently associated with `sub`, if it is being watched.
    #[must_use]
    pub fn current_token(&self, sub: &S) -> Option<LivenessToken> {
        self.inner.lock().unwrap().token_for(sub)
    }
}

impl<S: Eq + Hash + Clone + Send + 'static> LivenessWatch<S> for ManualLiveness<S> {
    fn watch(&self, sub: &S) -> LivenessToken {
        self.inner.lock().unwrap().watch(sub.clone())
    }

    fn unwatch(&self, sub: &S) {
        let _ = self.inner.lock().unwrap().unwatch(sub);
    }
}
