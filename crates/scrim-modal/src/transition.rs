#![forbid(unsafe_code)]

//! Transition completion waits.
//!
//! A [`TransitionRequest`] names an element, a duration and whether the fade
//! is enabled. [`TransitionWaiter::begin`] either resolves it on the spot or
//! hands back a [`PendingTransition`] that completes on whichever comes first:
//!
//! 1) the page reports the native transition-completion event for its id
//! 2) the page clock reaches the deadline (timer fallback for environments
//!    where the event never fires)
//!
//! Every wait carries a process-wide [`TransitionId`]. A completion only ever
//! resolves the wait it was watched for, never a later wait on the same
//! element.
//!
//! # Failure Modes
//!
//! - A request without an element resolves immediately; there is nothing to
//!   observe.
//! - Zero-duration requests resolve immediately.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use scrim_backend::{Page, TransitionId, TransitionTarget};
use tracing::trace;

/// One transition to wait for. Created per wait, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRequest<E> {
    pub target: TransitionTarget,
    pub element: Option<E>,
    pub duration: Duration,
    pub enabled: bool,
}

impl<E> TransitionRequest<E> {
    /// An enabled request with no element attached yet.
    pub fn new(target: TransitionTarget, duration: Duration) -> Self {
        Self {
            target,
            element: None,
            duration,
            enabled: true,
        }
    }

    pub fn element(mut self, element: Option<E>) -> Self {
        self.element = element;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

static NEXT_TRANSITION_ID: AtomicU64 = AtomicU64::new(1);

/// A wait that has not resolved yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
    id: TransitionId,
    target: TransitionTarget,
    deadline: Duration,
}

impl PendingTransition {
    #[inline]
    pub fn id(&self) -> TransitionId {
        self.id
    }

    #[inline]
    pub fn target(&self) -> TransitionTarget {
        self.target
    }

    /// Page time at which the timer fallback fires.
    #[inline]
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    #[inline]
    pub fn is_expired(&self, now: Duration) -> bool {
        now >= self.deadline
    }
}

/// Result of starting a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionWait {
    Resolved,
    Pending(PendingTransition),
}

impl TransitionWait {
    #[inline]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

/// Starts transition waits against a page.
#[derive(Debug, Default)]
pub struct TransitionWaiter {
    skip: bool,
}

impl TransitionWaiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every wait immediately. Meant for test suites that do not
    /// want to drive transition events.
    pub fn skip_transitions(&mut self, skip: bool) {
        self.skip = skip;
    }

    #[inline]
    pub fn is_skipping(&self) -> bool {
        self.skip
    }

    /// Start waiting for `request` on `page`.
    pub fn begin<P: Page>(
        &mut self,
        page: &P,
        request: TransitionRequest<P::Element>,
    ) -> TransitionWait {
        let target = request.target;
        if !request.enabled || self.skip || request.duration.is_zero() {
            trace!(
                target: "scrim.transition",
                %target,
                enabled = request.enabled,
                skip = self.skip,
                "transition resolved immediately"
            );
            return TransitionWait::Resolved;
        }
        let Some(element) = request.element else {
            trace!(target: "scrim.transition", %target, "no element to observe");
            return TransitionWait::Resolved;
        };

        let id = TransitionId::new(NEXT_TRANSITION_ID.fetch_add(1, Ordering::Relaxed));
        page.watch_transition(id, &element, target);
        let pending = PendingTransition {
            id,
            target,
            deadline: page.now().saturating_add(request.duration),
        };
        trace!(
            target: "scrim.transition",
            %target,
            id = pending.id.get(),
            deadline_ms = pending.deadline.as_millis() as u64,
            "transition pending"
        );
        TransitionWait::Pending(pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrim_backend::ElementMetrics;
    use scrim_web::MemoryPage;

    fn page_with_dialog() -> (MemoryPage, scrim_web::MemoryElement) {
        let page = MemoryPage::new();
        let dialog = page.create_element(ElementMetrics::default());
        (page, dialog)
    }

    #[test]
    fn disabled_request_resolves_immediately() {
        let (page, dialog) = page_with_dialog();
        let mut waiter = TransitionWaiter::new();
        let request = TransitionRequest::new(TransitionTarget::Dialog, Duration::from_millis(300))
            .element(Some(dialog))
            .enabled(false);
        assert!(waiter.begin(&page, request).is_resolved());
        assert!(page.watched_transitions().is_empty());
    }

    #[test]
    fn zero_duration_resolves_immediately() {
        let (page, dialog) = page_with_dialog();
        let mut waiter = TransitionWaiter::new();
        let request =
            TransitionRequest::new(TransitionTarget::Dialog, Duration::ZERO).element(Some(dialog));
        assert!(waiter.begin(&page, request).is_resolved());
    }

    #[test]
    fn skip_resolves_enabled_requests() {
        let (page, dialog) = page_with_dialog();
        let mut waiter = TransitionWaiter::new();
        waiter.skip_transitions(true);
        let request = TransitionRequest::new(TransitionTarget::Backdrop, Duration::from_millis(150))
            .element(Some(dialog));
        assert!(waiter.begin(&page, request).is_resolved());
        assert!(waiter.is_skipping());
    }

    #[test]
    fn missing_element_resolves_immediately() {
        let page = MemoryPage::new();
        let mut waiter = TransitionWaiter::new();
        let request = TransitionRequest::new(TransitionTarget::Dialog, Duration::from_millis(300));
        assert!(waiter.begin(&page, request).is_resolved());
    }

    #[test]
    fn pending_wait_carries_deadline_and_watches_element() {
        let (page, dialog) = page_with_dialog();
        page.advance(Duration::from_millis(40));
        let mut waiter = TransitionWaiter::new();
        let request = TransitionRequest::new(TransitionTarget::Dialog, Duration::from_millis(300))
            .element(Some(dialog));
        let TransitionWait::Pending(pending) = waiter.begin(&page, request) else {
            panic!("expected a pending transition");
        };
        assert_eq!(pending.target(), TransitionTarget::Dialog);
        assert_eq!(pending.deadline(), Duration::from_millis(340));
        assert!(!pending.is_expired(Duration::from_millis(339)));
        assert!(pending.is_expired(Duration::from_millis(340)));
        assert_eq!(
            page.watched_transitions(),
            vec![(dialog, TransitionTarget::Dialog)]
        );
        assert!(page.is_watching(pending.id()));
    }

    #[test]
    fn pending_ids_increase_across_waiters() {
        let (page, dialog) = page_with_dialog();
        let mut ids = Vec::new();
        for _ in 0..3 {
            // A fresh waiter per modal must not restart the sequence.
            let mut waiter = TransitionWaiter::new();
            let request =
                TransitionRequest::new(TransitionTarget::Dialog, Duration::from_millis(10))
                    .element(Some(dialog));
            if let TransitionWait::Pending(p) = waiter.begin(&page, request) {
                ids.push(p.id());
            }
        }
        assert_eq!(ids.len(), 3);
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "{ids:?}");
    }
}
