#![forbid(unsafe_code)]

//! The modal show/hide sequencer.
//!
//! [`Modal`] owns the lifecycle state and drives the backdrop, scroll
//! compensation and transition waits through a fixed sequence of steps.
//! Whenever a step has to wait (for a render pass or a transition) the
//! sequence parks a [`SequenceToken`] with the step to resume; the host
//! wakes it through [`Modal::after_render`], [`Modal::transition_ended`] or
//! [`Modal::poll`].
//!
//! # Invariants
//!
//! - State only changes through one path that checks the legal edges.
//! - Every resumed step re-checks its token before touching state or the
//!   page. A newer sequence, or [`Modal::destroy`], silently abandons
//!   everything parked before it.
//! - `show` is ignored unless the modal is closed; `hide` is ignored while
//!   closing or closed.
//! - A transition wait is resolved only by the completion watched for it.
//!   Starting a sequence, or destroying the modal, releases the page watches
//!   of every wait parked before it.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use scrim_backend::ElementMetrics;
//! use scrim_core::{ModalConfig, ModalState};
//! use scrim_modal::Modal;
//! use scrim_web::MemoryPage;
//!
//! let page = Rc::new(MemoryPage::new());
//! let mut modal = Modal::new(page.clone(), ModalConfig::new().fade(false));
//! modal.mount_backdrop(Some(page.create_element(ElementMetrics::default())));
//! modal.mount_dialog(Some(page.create_element(ElementMetrics::default())));
//!
//! modal.set_open(true);
//! assert_eq!(modal.state(), ModalState::Open);
//! assert!(page.has_body_class("modal-open"));
//!
//! modal.set_open(false);
//! assert_eq!(modal.state(), ModalState::Closed);
//! ```

use std::rc::Rc;

use scrim_backend::{MODAL_OPEN_CLASS, Page, TransitionTarget};
use scrim_core::{ModalConfig, ModalState, SequenceSource, SequenceToken, StateChange};
use tracing::{debug, debug_span, trace};

use crate::backdrop::{BackdropController, BackdropProgress, BackdropSettings};
use crate::lifecycle::{Checkpoint, HideDecision, LifecycleNotifier};
use crate::scroll::{ScrollAdjustment, ScrollCompensator};
use crate::transition::{PendingTransition, TransitionRequest, TransitionWait, TransitionWaiter};

/// User intents routed to the modal by its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalAction {
    /// An explicit close control.
    Close,
    /// A click that landed on the backdrop itself.
    BackdropClicked,
    EscapePressed,
}

/// Handles to the rendered dialog and backdrop roots.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalElements<E> {
    pub dialog: Option<E>,
    pub backdrop: Option<E>,
}

impl<E> Default for ModalElements<E> {
    fn default() -> Self {
        Self {
            dialog: None,
            backdrop: None,
        }
    }
}

/// Where a parked sequence picks up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    BackdropMounted,
    BackdropShown,
    DialogMounted,
    DialogShown,
    DialogHidden,
    BackdropHidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wait {
    Render,
    Transition(PendingTransition),
}

impl Wait {
    fn transition(self) -> Option<PendingTransition> {
        match self {
            Self::Render => None,
            Self::Transition(pending) => Some(pending),
        }
    }
}

#[derive(Debug)]
struct Suspension {
    token: SequenceToken,
    step: Step,
    wait: Wait,
}

/// One modal dialog rendered into a shared page.
pub struct Modal<P: Page> {
    page: Rc<P>,
    config: ModalConfig,
    state: ModalState,
    elements: ModalElements<P::Element>,
    backdrop: BackdropController,
    scroll: ScrollCompensator<P::Element>,
    waiter: TransitionWaiter,
    notifier: LifecycleNotifier,
    sequences: SequenceSource,
    suspended: Vec<Suspension>,
    open_intent: Option<bool>,
}

impl<P: Page> Modal<P> {
    /// Create a closed modal on `page`.
    pub fn new(page: Rc<P>, config: ModalConfig) -> Self {
        let scroll = ScrollCompensator::new(&*page);
        Self {
            page,
            config,
            state: ModalState::Closed,
            elements: ModalElements::default(),
            backdrop: BackdropController::new(),
            scroll,
            waiter: TransitionWaiter::new(),
            notifier: LifecycleNotifier::new(),
            sequences: SequenceSource::new(),
            suspended: Vec::new(),
            open_intent: None,
        }
    }

    // ====================================================================
    // Callbacks
    // ====================================================================

    /// Called once the dialog is open, before its fade-in.
    pub fn on_show(mut self, f: impl FnMut() + 'static) -> Self {
        self.notifier.set_on_show(f);
        self
    }

    /// Called once the dialog's fade-in completed.
    pub fn on_shown(mut self, f: impl FnMut() + 'static) -> Self {
        self.notifier.set_on_shown(f);
        self
    }

    /// Called by [`close`](Self::close); returning `false` keeps the modal
    /// open.
    pub fn on_hide<D: Into<HideDecision>>(mut self, f: impl FnMut() -> D + 'static) -> Self {
        self.notifier.set_on_hide(f);
        self
    }

    /// Called once the modal is fully closed.
    pub fn on_hidden(mut self, f: impl FnMut() + 'static) -> Self {
        self.notifier.set_on_hidden(f);
        self
    }

    /// Called by [`submit`](Self::submit) when the dialog has no form.
    pub fn on_submit(mut self, f: impl FnMut() + 'static) -> Self {
        self.notifier.set_on_submit(f);
        self
    }

    pub fn on_state_change(mut self, f: impl FnMut(StateChange) + 'static) -> Self {
        self.notifier.set_on_state_change(f);
        self
    }

    // ====================================================================
    // Host inputs
    // ====================================================================

    /// Record the rendered dialog root, or `None` once it left the page.
    pub fn mount_dialog(&mut self, dialog: Option<P::Element>) {
        if self.elements.dialog != dialog {
            self.scroll.invalidate_width();
            self.elements.dialog = dialog;
        }
    }

    pub fn mount_backdrop(&mut self, backdrop: Option<P::Element>) {
        self.elements.backdrop = backdrop;
    }

    /// Replace the configuration. Takes effect at the next step of any
    /// sequence in flight.
    pub fn set_config(&mut self, config: ModalConfig) {
        self.config = config;
    }

    /// Visibility intent from the host. Only changes of the value act:
    /// `true` shows, `false` hides, repeats are ignored.
    pub fn set_open(&mut self, open: bool) {
        if self.open_intent == Some(open) {
            return;
        }
        self.open_intent = Some(open);
        if open {
            self.show();
        } else {
            self.hide();
        }
    }

    /// Resolve every transition wait immediately instead of waiting for
    /// the page. Meant for tests.
    pub fn skip_transitions(&mut self, skip: bool) {
        self.waiter.skip_transitions(skip);
    }

    // ====================================================================
    // Sequences
    // ====================================================================

    pub fn show(&mut self) {
        if self.is_destroyed() || !self.state.is_closed() {
            trace!(target: "scrim.modal", state = %self.state, "show ignored");
            return;
        }
        let token = self.sequences.begin();
        self.release_watches();
        let _span = debug_span!(
            target: "scrim.modal",
            "modal.sequence",
            kind = "show",
            generation = token.generation()
        )
        .entered();
        debug!(target: "scrim.modal", "show started");

        self.transition_to(ModalState::Opening);
        self.add_body_class();
        let settings = self.backdrop_settings();
        let progress = self.backdrop.show(
            &*self.page,
            &mut self.waiter,
            settings,
            self.elements.backdrop.as_ref(),
        );
        self.continue_backdrop_show(token, progress);
    }

    pub fn hide(&mut self) {
        if self.is_destroyed() || !self.state.is_visible() {
            trace!(target: "scrim.modal", state = %self.state, "hide ignored");
            return;
        }
        let token = self.sequences.begin();
        self.release_watches();
        let _span = debug_span!(
            target: "scrim.modal",
            "modal.sequence",
            kind = "hide",
            generation = token.generation()
        )
        .entered();
        debug!(target: "scrim.modal", "hide started");

        self.transition_to(ModalState::Closing);
        let request = TransitionRequest::new(TransitionTarget::Dialog, self.config.transition_duration)
            .element(self.elements.dialog.clone())
            .enabled(self.uses_transition());
        match self.waiter.begin(&*self.page, request) {
            TransitionWait::Resolved => self.hide_backdrop(token),
            TransitionWait::Pending(pending) => {
                self.park(token, Step::DialogHidden, Wait::Transition(pending));
            }
        }
    }

    /// User-initiated close: asks `on_hide` first.
    ///
    /// Only acts while the modal is visible (opening or open). A closing or
    /// closed modal ignores the call without consulting `on_hide`.
    pub fn close(&mut self) {
        if self.is_destroyed() || !self.state.is_visible() {
            return;
        }
        let token = self.sequences.current();
        match self.notifier.request_hide(&token) {
            HideDecision::Proceed => self.hide(),
            HideDecision::Cancel => {
                debug!(target: "scrim.modal", "close cancelled by on_hide");
            }
        }
    }

    /// Submit the dialog: forms in its body get a `submit` event, otherwise
    /// `on_submit` is called.
    pub fn submit(&mut self) {
        if self.is_destroyed() {
            return;
        }
        let forms = self
            .elements
            .dialog
            .as_ref()
            .map(|dialog| self.page.body_forms(dialog))
            .unwrap_or_default();
        if forms.is_empty() {
            self.notifier.submit();
        } else {
            trace!(target: "scrim.modal", forms = forms.len(), "dispatching submit");
            for form in &forms {
                self.page.dispatch_submit(form);
            }
        }
    }

    /// Route a user action. Returns `true` if it led to a close attempt.
    pub fn handle_action(&mut self, action: ModalAction) -> bool {
        let allowed = match action {
            ModalAction::Close => true,
            ModalAction::BackdropClicked => self.config.backdrop_close,
            ModalAction::EscapePressed => self.config.keyboard,
        };
        if !allowed || self.is_destroyed() || !self.state.is_visible() {
            return false;
        }
        self.close();
        true
    }

    /// Re-run the dialog padding after the window changed size.
    pub fn handle_resize(&mut self) {
        if self.is_destroyed() || self.state.is_closed() || self.page.render_context().is_static() {
            return;
        }
        if let Some(dialog) = self.elements.dialog.clone() {
            self.scroll.check_overflow(&*self.page);
            self.scroll.adjust_dialog(&*self.page, &dialog);
        }
    }

    /// Tear down: invalidate every parked step, drop the body marker and
    /// restore the body padding. Idempotent; also run on drop.
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.sequences.destroy();
        self.release_watches();
        debug!(target: "scrim.modal", state = %self.state, "modal destroyed");
        self.remove_body_class();
        self.scroll.reset_page_scrollbar(&*self.page);
    }

    // ====================================================================
    // Resumption
    // ====================================================================

    /// The host finished a render pass.
    pub fn after_render(&mut self) {
        let ready = self.take_parked(|s| s.wait == Wait::Render);
        for suspension in ready {
            self.resume(suspension);
        }
    }

    /// The host observed the end of a transition on `target` itself, outside
    /// the page's watches. Resolves the oldest live wait on that target.
    ///
    /// Pages that report completions through
    /// [`Page::take_transition_end`] need only [`poll`](Self::poll), which
    /// matches each completion to the exact wait it was watched for.
    pub fn transition_ended(&mut self, target: TransitionTarget) {
        let matching =
            |s: &Suspension| matches!(s.wait, Wait::Transition(p) if p.target() == target);
        // Anything stale waiting on this target is abandoned on the way.
        let stale = self.take_parked(|s| matching(s) && !s.token.is_live());
        for suspension in stale {
            self.resume(suspension);
        }
        if let Some(index) = self.suspended.iter().position(matching) {
            let suspension = self.suspended.remove(index);
            self.resume(suspension);
        }
    }

    /// Resolve waits whose watched transition completed, then fire expired
    /// fallbacks.
    pub fn poll(&mut self) {
        let page = Rc::clone(&self.page);
        let completed = self.take_parked(|s| {
            s.wait
                .transition()
                .is_some_and(|pending| page.take_transition_end(pending.id()))
        });
        for suspension in completed {
            self.resume(suspension);
        }
        let now = self.page.now();
        let expired =
            self.take_parked(|s| matches!(s.wait, Wait::Transition(p) if p.is_expired(now)));
        for suspension in expired {
            trace!(target: "scrim.transition", step = ?suspension.step, "fallback timer fired");
            self.resume(suspension);
        }
    }

    fn park(&mut self, token: SequenceToken, step: Step, wait: Wait) {
        trace!(target: "scrim.modal", ?step, ?wait, "sequence parked");
        self.suspended.push(Suspension { token, step, wait });
    }

    fn take_parked(&mut self, pred: impl Fn(&Suspension) -> bool) -> Vec<Suspension> {
        let (ready, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.suspended)
            .into_iter()
            .partition(|s| pred(s));
        self.suspended = rest;
        ready
    }

    /// Stop the page observing every parked transition. The suspensions stay
    /// parked and are abandoned when they come due.
    fn release_watches(&self) {
        for pending in self.suspended.iter().filter_map(|s| s.wait.transition()) {
            self.page.unwatch_transition(pending.id());
        }
    }

    fn resume(&mut self, suspension: Suspension) {
        let Suspension { token, step, wait } = suspension;
        if let Some(pending) = wait.transition() {
            self.page.unwatch_transition(pending.id());
        }
        if !token.is_live() {
            trace!(
                target: "scrim.modal",
                ?step,
                generation = token.generation(),
                "abandoned continuation"
            );
            return;
        }
        let _span = debug_span!(
            target: "scrim.modal",
            "modal.sequence",
            kind = "resume",
            generation = token.generation()
        )
        .entered();

        match step {
            Step::BackdropMounted => {
                let settings = self.backdrop_settings();
                let progress = self.backdrop.resume_show(
                    &*self.page,
                    &mut self.waiter,
                    settings,
                    self.elements.backdrop.as_ref(),
                );
                self.continue_backdrop_show(token, progress);
            }
            Step::BackdropShown => self.show_dialog(token),
            Step::DialogMounted => {
                if self.elements.dialog.is_none() {
                    debug!(target: "scrim.modal", "dialog not mounted after render; show abandoned");
                    return;
                }
                self.present_dialog(token);
            }
            Step::DialogShown => {
                self.notifier.notify(Checkpoint::Shown, &token);
            }
            Step::DialogHidden => self.hide_backdrop(token),
            Step::BackdropHidden => self.finish_hide(token),
        }
    }

    // ====================================================================
    // Show steps
    // ====================================================================

    fn continue_backdrop_show(&mut self, token: SequenceToken, progress: BackdropProgress) {
        match progress {
            BackdropProgress::Done => self.show_dialog(token),
            BackdropProgress::AwaitRender => self.park(token, Step::BackdropMounted, Wait::Render),
            BackdropProgress::Await(pending) => {
                self.park(token, Step::BackdropShown, Wait::Transition(pending));
            }
        }
    }

    fn show_dialog(&mut self, token: SequenceToken) {
        self.scroll.check_overflow(&*self.page);
        self.scroll
            .set_page_scrollbar(&*self.page, self.elements.dialog.as_ref());
        if self.elements.dialog.is_none() {
            self.park(token, Step::DialogMounted, Wait::Render);
            return;
        }
        self.present_dialog(token);
    }

    fn present_dialog(&mut self, token: SequenceToken) {
        let Some(dialog) = self.elements.dialog.clone() else {
            return;
        };
        // A static document has no layout to reset or measure.
        if !self.page.render_context().is_static() {
            self.page.set_scroll_top(&dialog, 0.0);
            self.scroll.adjust_dialog(&*self.page, &dialog);
        }
        self.transition_to(ModalState::Open);
        self.notifier.notify(Checkpoint::Show, &token);

        let request = TransitionRequest::new(TransitionTarget::Dialog, self.config.transition_duration)
            .element(Some(dialog))
            .enabled(self.uses_transition());
        match self.waiter.begin(&*self.page, request) {
            TransitionWait::Resolved => {
                self.notifier.notify(Checkpoint::Shown, &token);
            }
            TransitionWait::Pending(pending) => {
                self.park(token, Step::DialogShown, Wait::Transition(pending));
            }
        }
    }

    // ====================================================================
    // Hide steps
    // ====================================================================

    fn hide_backdrop(&mut self, token: SequenceToken) {
        let settings = self.backdrop_settings();
        let progress = self.backdrop.hide(
            &*self.page,
            &mut self.waiter,
            settings,
            self.elements.backdrop.as_ref(),
        );
        match progress {
            BackdropProgress::Done | BackdropProgress::AwaitRender => self.finish_hide(token),
            BackdropProgress::Await(pending) => {
                self.park(token, Step::BackdropHidden, Wait::Transition(pending));
            }
        }
    }

    fn finish_hide(&mut self, token: SequenceToken) {
        self.backdrop.finish_hide();
        self.remove_body_class();
        self.scroll.reset_adjustments();
        self.scroll.reset_page_scrollbar(&*self.page);
        self.transition_to(ModalState::Closed);
        self.notifier.notify(Checkpoint::Hidden, &token);
        debug!(target: "scrim.modal", "hide finished");
    }

    // ====================================================================
    // Helpers
    // ====================================================================

    fn transition_to(&mut self, next: ModalState) {
        let change = StateChange::new(self.state, next);
        debug_assert!(change.is_legal(), "illegal modal state change: {change}");
        debug!(target: "scrim.modal", from = %change.from, to = %change.to, "state change");
        self.state = next;
        self.notifier.state_changed(change);
    }

    fn backdrop_settings(&self) -> BackdropSettings {
        BackdropSettings {
            enabled: self.config.backdrop,
            animate: self.uses_transition(),
            duration: self.config.backdrop_transition_duration,
        }
    }

    fn add_body_class(&self) {
        if !self.page.render_context().is_static() {
            self.page.add_body_class(MODAL_OPEN_CLASS);
            return;
        }
        // Attribute access is all a static document offers.
        let existing = self.page.body_attribute("class").unwrap_or_default();
        if existing.split_whitespace().any(|c| c == MODAL_OPEN_CLASS) {
            return;
        }
        let value = format!("{MODAL_OPEN_CLASS} {existing}");
        self.page.set_body_attribute("class", value.trim_end());
    }

    fn remove_body_class(&self) {
        if self.page.render_context().is_static() {
            return;
        }
        self.page.remove_body_class(MODAL_OPEN_CLASS);
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    #[inline]
    pub fn state(&self) -> ModalState {
        self.state
    }

    #[inline]
    pub fn is_in_dom(&self) -> bool {
        self.state.is_in_dom()
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.state.is_visible()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    #[inline]
    pub fn is_backdrop_shown(&self) -> bool {
        self.backdrop.is_shown()
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.sequences.is_destroyed()
    }

    pub fn config(&self) -> &ModalConfig {
        &self.config
    }

    pub fn elements(&self) -> &ModalElements<P::Element> {
        &self.elements
    }

    pub fn page(&self) -> &Rc<P> {
        &self.page
    }

    /// Padding layout code should apply to the dialog.
    pub fn dialog_adjustment(&self) -> ScrollAdjustment {
        self.scroll.adjustment()
    }

    /// Fade is on and the page runs CSS transitions.
    pub fn uses_transition(&self) -> bool {
        self.config.resolved_fade(self.page.render_context()) && self.page.supports_transitions()
    }

    /// Render where declared rather than in the shared destination.
    pub fn renders_in_place(&self) -> bool {
        self.config.render_in_place || !self.page.has_destination()
    }

    /// Parked steps that can still run.
    pub fn pending_waits(&self) -> usize {
        self.suspended.iter().filter(|s| s.token.is_live()).count()
    }
}

impl<P: Page> Drop for Modal<P> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<P: Page> std::fmt::Debug for Modal<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Modal")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("elements", &self.elements)
            .field("backdrop_shown", &self.backdrop.is_shown())
            .field("generation", &self.sequences.generation())
            .field("parked", &self.suspended.len())
            .finish()
    }
}
