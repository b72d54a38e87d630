#![forbid(unsafe_code)]

//! Backdrop show/hide.
//!
//! The backdrop has its own visibility flag, independent of the modal
//! state: it becomes shown at the start of a show sequence and stops being
//! shown only once its fade-out finished.
//!
//! # Failure Modes
//!
//! - An enabled backdrop whose element is not mounted when it must fade is a
//!   host bug. Debug builds assert; release builds log and carry on as if
//!   the fade had completed.
//! - A backdrop that never reached its fade-in (the show was superseded
//!   before the render pass mounted it) has nothing to fade out; hiding it
//!   completes at once.

use std::time::Duration;

use scrim_backend::{Page, TransitionTarget};
use tracing::{error, trace};

use crate::transition::{PendingTransition, TransitionRequest, TransitionWait, TransitionWaiter};

/// Backdrop options in effect for one step of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackdropSettings {
    pub enabled: bool,
    pub animate: bool,
    pub duration: Duration,
}

/// What the sequence must wait for before moving past the backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropProgress {
    Done,
    /// The element is not mounted yet; resume after the next render pass.
    AwaitRender,
    Await(PendingTransition),
}

#[derive(Debug, Default)]
pub struct BackdropController {
    shown: bool,
    /// The current show got as far as fading the mounted element in.
    faded_in: bool,
}

impl BackdropController {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Start showing the backdrop.
    pub fn show<P: Page>(
        &mut self,
        page: &P,
        waiter: &mut TransitionWaiter,
        settings: BackdropSettings,
        element: Option<&P::Element>,
    ) -> BackdropProgress {
        if !settings.enabled {
            return BackdropProgress::Done;
        }
        self.shown = true;
        trace!(target: "scrim.backdrop", mounted = element.is_some(), "backdrop shown");
        match element {
            Some(element) => {
                self.faded_in = true;
                fade(page, waiter, settings, element)
            }
            None => BackdropProgress::AwaitRender,
        }
    }

    /// Continue a show after the render pass that mounts the backdrop.
    pub fn resume_show<P: Page>(
        &mut self,
        page: &P,
        waiter: &mut TransitionWaiter,
        settings: BackdropSettings,
        element: Option<&P::Element>,
    ) -> BackdropProgress {
        if !settings.enabled {
            return BackdropProgress::Done;
        }
        match element {
            Some(element) => {
                self.faded_in = true;
                fade(page, waiter, settings, element)
            }
            None => {
                missing_backdrop("show");
                BackdropProgress::Done
            }
        }
    }

    /// Start hiding the backdrop. Call [`finish_hide`](Self::finish_hide)
    /// once the returned progress resolves.
    pub fn hide<P: Page>(
        &mut self,
        page: &P,
        waiter: &mut TransitionWaiter,
        settings: BackdropSettings,
        element: Option<&P::Element>,
    ) -> BackdropProgress {
        if !settings.enabled {
            return BackdropProgress::Done;
        }
        match element {
            Some(element) => fade(page, waiter, settings, element),
            None if !self.faded_in => {
                trace!(target: "scrim.backdrop", "backdrop never mounted; nothing to fade out");
                BackdropProgress::Done
            }
            None => {
                missing_backdrop("hide");
                BackdropProgress::Done
            }
        }
    }

    pub fn finish_hide(&mut self) {
        if self.shown {
            trace!(target: "scrim.backdrop", "backdrop hidden");
        }
        self.shown = false;
        self.faded_in = false;
    }
}

fn fade<P: Page>(
    page: &P,
    waiter: &mut TransitionWaiter,
    settings: BackdropSettings,
    element: &P::Element,
) -> BackdropProgress {
    let request = TransitionRequest::new(TransitionTarget::Backdrop, settings.duration)
        .element(Some(element.clone()))
        .enabled(settings.animate);
    match waiter.begin(page, request) {
        TransitionWait::Resolved => BackdropProgress::Done,
        TransitionWait::Pending(pending) => BackdropProgress::Await(pending),
    }
}

fn missing_backdrop(phase: &'static str) {
    error!(target: "scrim.backdrop", phase, "backdrop element is not mounted");
    debug_assert!(false, "backdrop element should be mounted");
}
