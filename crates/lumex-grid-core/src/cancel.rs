//! Cooperative cancellation for superseded data loads.
//!
//! Every data-load trigger arms a fresh [`CancellationToken`] and cancels the
//! previous one. Cancellation is never time-based: a token is cancelled only
//! because a newer request superseded it, or because the caller gave up.
//!
//! [`CancellationSlot`] holds the single "current" token and performs the
//! cancel-then-replace swap synchronously, so that by the time a new load's
//! future is handed back to the caller the previous load is already marked
//! stale.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::Notify;

/// A cancellation token shared between the party that starts a load and the
/// party that may supersede it.
///
/// Cloning a token yields a handle to the same cancellation state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<CancellationState>,
}

#[derive(Debug, Default)]
struct CancellationState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    /// Create a new, live token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation and wake any waiters.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            self.inner.notify.notify_waiters();
        }
    }

    /// Wait asynchronously until cancellation is requested.
    ///
    /// Returns immediately if already cancelled.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Returns `true` if both handles refer to the same token.
    pub fn same_token(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Holder of the single current token for one load pipeline.
#[derive(Debug, Default)]
pub struct CancellationSlot {
    current: Mutex<Option<CancellationToken>>,
}

impl CancellationSlot {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the current token (if any) and arm a fresh one.
    pub fn replace(&self) -> CancellationToken {
        let token = CancellationToken::new();
        self.install(token.clone());
        token
    }

    /// Cancel the current token (if any) and install `token` in its place.
    pub fn install(&self, token: CancellationToken) {
        let previous = self.current.lock().replace(token);
        if let Some(previous) = previous {
            previous.cancel();
        }
    }

    /// Cancel the current token and leave the slot empty.
    pub fn cancel(&self) {
        if let Some(previous) = self.current.lock().take() {
            previous.cancel();
        }
    }

    /// Returns `true` if `token` is still the slot's live token.
    pub fn is_current(&self, token: &CancellationToken) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|current| current.same_token(token) && !current.is_cancelled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_cancel() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_slot_replace_cancels_previous() {
        let slot = CancellationSlot::new();
        let first = slot.replace();
        let second = slot.replace();

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(slot.is_current(&second));
        assert!(!slot.is_current(&first));
    }

    #[test]
    fn test_slot_cancel_empties() {
        let slot = CancellationSlot::new();
        let token = slot.replace();
        slot.cancel();

        assert!(token.is_cancelled());
        assert!(!slot.is_current(&token));
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiter() {
        let token = CancellationToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });

        tokio::task::yield_now().await;
        token.cancel();
        handle.await.unwrap();
    }
}
