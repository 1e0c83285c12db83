//! One-shot deferred work tied to a cancellation token.
//!
//! The session loop is polled, so a timer is just a deadline checked on every
//! tick. Cancelling the token a timer was created with stops it from firing,
//! whoever holds the timer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Shared cancellation flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A deadline that fires at most once.
#[derive(Debug, Clone)]
pub struct Deferred<T> {
    due: Duration,
    token: CancellationToken,
    payload: T,
}

impl<T> Deferred<T> {
    pub fn new(due: Duration, token: CancellationToken, payload: T) -> Self {
        Self { due, token, payload }
    }

    pub fn due(&self) -> Duration {
        self.due
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once `now` has reached the deadline and the token is still live.
    pub fn is_due(&self, now: Duration) -> bool {
        !self.is_cancelled() && now >= self.due
    }

    /// Consumes the timer, yielding its payload.
    pub fn fire(self) -> T {
        self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_at_deadline() {
        let timer = Deferred::new(Duration::from_millis(45), CancellationToken::new(), 7);
        assert!(!timer.is_due(Duration::from_millis(44)));
        assert!(timer.is_due(Duration::from_millis(45)));
        assert_eq!(timer.fire(), 7);
    }

    #[test]
    fn test_cancelled_token_never_fires() {
        let token = CancellationToken::new();
        let timer = Deferred::new(Duration::from_millis(45), token.clone(), ());
        token.cancel();
        assert!(timer.is_cancelled());
        assert!(!timer.is_due(Duration::from_secs(10)));
    }
}
