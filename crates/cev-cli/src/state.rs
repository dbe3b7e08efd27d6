//! Async operation state shared by the views
//!
//! - [`AsyncState`] is the one tagged state an operation can be in.
//! - [`RequestContext`] hands out tickets; results carrying a ticket from an
//!   invalidated context are dropped.
//! - [`ControlLatch`] keeps a control from running twice at once.
//! - [`ScheduledTransition`] is a delayed navigation tied to a ticket.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq)]
pub enum AsyncState<T, E = String> {
    Idle,
    Pending,
    Succeeded(T),
    Failed(E),
}

impl<T, E> Default for AsyncState<T, E> {
    fn default() -> Self {
        AsyncState::Idle
    }
}

impl<T, E> AsyncState<T, E> {
    pub fn is_pending(&self) -> bool {
        matches!(self, AsyncState::Pending)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            AsyncState::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            AsyncState::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Move to `Pending`. Returns false if already pending.
    pub fn start(&mut self) -> bool {
        if self.is_pending() {
            return false;
        }
        *self = AsyncState::Pending;
        true
    }

    pub fn finish(&mut self, result: std::result::Result<T, E>) {
        *self = match result {
            Ok(value) => AsyncState::Succeeded(value),
            Err(error) => AsyncState::Failed(error),
        };
    }

    pub fn reset(&mut self) {
        *self = AsyncState::Idle;
    }
}

/// Epoch counter owned by one view.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    epoch: Arc<AtomicU64>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> RequestTicket {
        RequestTicket {
            epoch: self.epoch.clone(),
            issued: self.epoch.load(Ordering::Acquire),
        }
    }

    /// Called when the view is left. Outstanding tickets go stale.
    pub fn invalidate(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }
}

#[derive(Debug, Clone)]
pub struct RequestTicket {
    epoch: Arc<AtomicU64>,
    issued: u64,
}

impl RequestTicket {
    pub fn is_current(&self) -> bool {
        self.epoch.load(Ordering::Acquire) == self.issued
    }

    /// `Some(value)` while the issuing context is still live.
    pub fn accept<T>(&self, value: T) -> Option<T> {
        self.is_current().then_some(value)
    }
}

/// Per-control busy flag.
#[derive(Debug, Default)]
pub struct ControlLatch {
    busy: AtomicBool,
}

impl ControlLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// `None` while a previous guard is alive.
    pub fn try_acquire(&self) -> Option<LatchGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LatchGuard { latch: self })
    }
}

#[must_use]
#[derive(Debug)]
pub struct LatchGuard<'a> {
    latch: &'a ControlLatch,
}

impl Drop for LatchGuard<'_> {
    fn drop(&mut self) {
        self.latch.busy.store(false, Ordering::Release);
    }
}

/// Navigation to `target` once `delay` has passed, unless the ticket went
/// stale in the meantime.
#[derive(Debug, Clone)]
pub struct ScheduledTransition<T> {
    target: T,
    deadline: Instant,
    ticket: RequestTicket,
}

impl<T> ScheduledTransition<T> {
    pub fn new(target: T, delay: Duration, ticket: RequestTicket) -> Self {
        Self {
            target,
            deadline: Instant::now() + delay,
            ticket,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Wait for the deadline, then yield the target if still wanted.
    pub async fn fire(self) -> Option<T> {
        tokio::time::sleep_until(self.deadline).await;
        self.ticket.accept(self.target)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_async_state_transitions() {
        let mut state: AsyncState<u32> = AsyncState::default();
        assert_eq!(state, AsyncState::Idle);

        assert!(state.start());
        assert!(state.is_pending());
        assert!(!state.start());

        state.finish(Ok(7));
        assert_eq!(state.value(), Some(&7));
        assert!(state.error().is_none());

        assert!(state.start());
        state.finish(Err("boom".to_string()));
        assert_eq!(state.error().map(String::as_str), Some("boom"));
        assert!(state.value().is_none());

        state.reset();
        assert_eq!(state, AsyncState::Idle);
    }

    #[test]
    fn test_ticket_goes_stale_on_invalidate() {
        let context = RequestContext::new();
        let first = context.ticket();
        assert!(first.is_current());
        assert_eq!(first.accept("rows"), Some("rows"));

        context.invalidate();
        assert!(!first.is_current());
        assert_eq!(first.accept("rows"), None);

        assert!(context.ticket().is_current());
    }

    #[test]
    fn test_latch_rejects_reentry() {
        let latch = ControlLatch::new();
        let guard = latch.try_acquire();
        assert!(guard.is_some());
        assert!(latch.is_busy());
        assert!(latch.try_acquire().is_none());

        drop(guard);
        assert!(!latch.is_busy());
        assert!(latch.try_acquire().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_fires_after_delay_not_before() {
        let context = RequestContext::new();
        let transition = ScheduledTransition::new(42, Duration::from_millis(1500), context.ticket());

        let fire = transition.fire();
        tokio::pin!(fire);

        assert!(tokio::time::timeout(Duration::from_millis(1499), &mut fire).await.is_err());
        assert_eq!(fire.await, Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_cancelled_when_view_left() {
        let context = RequestContext::new();
        let transition = ScheduledTransition::new("detail", Duration::from_millis(1500), context.ticket());
        assert_eq!(transition.target(), &"detail");

        context.invalidate();
        assert_eq!(transition.fire().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transition_remaining() {
        let context = RequestContext::new();
        let transition = ScheduledTransition::new((), Duration::from_secs(2), context.ticket());
        tokio::time::advance(Duration::from_millis(500)).await;
        assert_eq!(transition.remaining(), Duration::from_millis(1500));
    }
}
