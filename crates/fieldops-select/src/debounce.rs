//! Trailing-edge debounce with a single pending-timer slot.
//!
//! Each [`Debouncer`] owns one slot. Scheduling aborts whatever timer was
//! pending and starts a new one; when a timer elapses it posts an event to the
//! owner's channel tagged with a token. The owner confirms the token with
//! [`Debouncer::acknowledge`] before acting, so a timer that elapsed just
//! before being superseded is ignored.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

#[derive(Debug)]
struct PendingTimer {
    token: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    next_token: u64,
    pending: Option<PendingTimer>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_token: 0,
            pending: None,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Starts a new timer, clearing the pending one. Returns the timer's token.
    ///
    /// When the delay elapses, `make_event(token)` is sent on `tx`.
    pub fn schedule<E, F>(&mut self, tx: &UnboundedSender<E>, make_event: F) -> u64
    where
        E: Send + 'static,
        F: FnOnce(u64) -> E + Send + 'static,
    {
        self.cancel();
        self.next_token += 1;
        let token = self.next_token;
        let delay = self.delay;
        let tx = tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the owner was dropped; nothing to notify.
            let _ = tx.send(make_event(token));
        });
        self.pending = Some(PendingTimer { token, handle });
        token
    }

    /// Clears the pending timer, if any.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes the pending slot if `token` belongs to it.
    ///
    /// Returns `false` for tokens of superseded or cancelled timers.
    pub fn acknowledge(&mut self, token: u64) -> bool {
        match &self.pending {
            Some(pending) if pending.token == token => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let token = debouncer.schedule(&tx, |t| t);
        assert!(debouncer.is_pending());

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, token);
        assert!(debouncer.acknowledge(fired));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_supersedes_previous_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let first = debouncer.schedule(&tx, |t| t);
        tokio::time::advance(Duration::from_millis(300)).await;
        let second = debouncer.schedule(&tx, |t| t);
        assert_ne!(first, second);

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired, second);
        assert!(rx.try_recv().is_err(), "superseded timer must not fire");
    }

    #[tokio::test(start_paused = true)]
    async fn stale_token_is_not_acknowledged() {
        let (tx, _rx) = mpsc::unbounded_channel::<u64>();
        let mut debouncer = Debouncer::new(Duration::from_millis(500));
        let first = debouncer.schedule(&tx, |t| t);
        let second = debouncer.schedule(&tx, |t| t);
        assert!(!debouncer.acknowledge(first));
        assert!(debouncer.acknowledge(second));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_clears_slot() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.schedule(&tx, |t| t);
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
    }
}
