//! Burst debouncing for viewport range requests.
//!
//! The first request of a burst runs immediately. Every later request that
//! arrives before the burst has gone quiet for a full delay window waits out
//! the delay first, and is dropped if it gets cancelled in the meantime.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use crate::cancel::CancellationToken;

/// Default delay applied to follow-up requests within a burst.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// What the debouncer decided for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceDecision {
    /// First request of a burst; run now.
    Immediate,
    /// Follow-up request; wait this long before running.
    Delayed(Duration),
}

/// Tracks request bursts and decides how long each request must wait.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    /// Create a debouncer with the given follow-up delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: Mutex::new(None),
        }
    }

    /// The follow-up delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a request arriving now and decide how it should run.
    pub fn arm(&self) -> DebounceDecision {
        let now = Instant::now();
        let mut last = self.last_request.lock();
        let decision = match *last {
            Some(previous) if now.duration_since(previous) < self.delay => {
                DebounceDecision::Delayed(self.delay)
            }
            _ => DebounceDecision::Immediate,
        };
        *last = Some(now);
        decision
    }

    /// Forget the current burst; the next request runs immediately.
    pub fn reset(&self) {
        *self.last_request.lock() = None;
    }

    /// Wait out `decision`.
    ///
    /// Returns `false` if `token` was cancelled before or during the wait.
    pub async fn settle(decision: DebounceDecision, token: &CancellationToken) -> bool {
        if let DebounceDecision::Delayed(delay) = decision {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = token.cancelled() => return false,
            }
        }
        !token.is_cancelled()
    }
}
