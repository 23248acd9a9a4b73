use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::SubscriberError;

/// Identifies a single subscription epoch. Re-subscribing the same handle
/// always yields a new token, so a disappearance signal carrying a stale
/// token can be told apart from one that matches the live epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LivenessToken(u64);

/// Maps subscriber handles to the liveness token of their current
/// subscription epoch.
///
/// `watch` is idempotent: watching an already-watched handle is a no-op,
/// it does not mint a new token. Tokens are minted only on first watch
/// after the handle was absent.
pub struct LivenessTracker<S> {
    tokens: HashMap<S, LivenessToken>,
    next_token: AtomicU64,
}

impl<S: Eq + Hash + Clone> LivenessTracker<S> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: HashMap::new(),
            next_token: AtomicU64::new(0),
        }
    }

    /// Registers `sub` for liveness tracking, returning its token. Idempotent:
    /// if `sub` is already watched, returns the existing token unchanged.
    pub fn watch(&mut self, sub: S) -> LivenessToken {
        if let Some(token) = self.tokens.get(&sub) {
            return *token;
        }
        let token = LivenessToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        self.tokens.insert(sub, token);
        token
    }

    /// Stops tracking `sub`, discarding any pending disappearance
    /// notification for it.
    pub fn unwatch(&mut self, sub: &S) -> Result<(), SubscriberError> {
        self.tokens
            .remove(sub)
            .map(|_| ())
            .ok_or(SubscriberError::NotSubscribed)
    }

    /// Accepts a disappearance notification for `sub` carrying `token`.
    /// Succeeds only if `token` matches the currently stored token; removes
    /// the entry on success.
    pub fn on_down(&mut self, sub: &S, token: LivenessToken) -> Result<(), SubscriberError> {
        match self.tokens.get(sub) {
            None => Err(SubscriberError::NotSubscribed),
            Some(&current) if current == token => {
                self.tokens.remove(sub);
                Ok(())
            }
            Some(_) => Err(SubscriberError::WrongToken),
        }
    }

    /// Number of subscribers currently watched.
    #[must_use]
    pub fn size(&self) -> usize {
        self.tokens.len()
    }

    /// `true` if `sub` is currently watched.
    #[must_use]
    pub fn is_watched(&self, sub: &S) -> bool {
        self.tokens.contains_key(sub)
    }

    /// The token currently associated with `sub`, if watched.
    #[must_use]
    pub fn token_for(&self, sub: &S) -> Option<LivenessToken> {
        self.tokens.get(sub).copied()
    }
}

impl<S: Eq + Hash + Clone> Default for LivenessTracker<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_is_idempotent() {
        let mut t: LivenessTracker<&str> = LivenessTracker::new();
        let first = t.watch("a");
        let second = t.watch("a");
        assert_eq!(first, second);
        assert_eq!(t.size(), 1);
    }

    #[test]
    fn resubscribe_after_unwatch_yields_fresh_token() {
        let mut t: LivenessTracker<&str> = LivenessTracker::new();
        let first = t.watch("a");
        t.unwatch(&"a").unwrap();
        let second = t.watch("a");
        assert_ne!(first, second);
    }

    #[test]
    fn on_down_wrong_token_is_rejected() {
        let mut t: LivenessTracker<&str> = LivenessTracker::new();
        let first = t.watch("a");
        t.unwatch(&"a").unwrap();
        let second = t.watch("a");
        assert!(matches!(
            t.on_down(&"a", first),
            Err(SubscriberError::WrongToken)
        ));
        assert!(t.on_down(&"a", second).is_ok());
        assert!(!t.is_watched(&"a"));
    }

    #[test]
    fn on_down_not_subscribed() {
        let mut t: LivenessTracker<&str> = LivenessTracker::new();
        assert!(matches!(
            t.on_down(&"a", LivenessToken(0)),
            Err(SubscriberError::NotSubscribed)
        ));
    }

    #[test]
    fn unwatch_absent_is_not_subscribed() {
        let mut t: LivenessTracker<&str> = LivenessTracker::new();
        assert!(matches!(
            t.unwatch(&"a"),
            Err(SubscriberError::NotSubscribed)
        ));
    }
}
