#![forbid(unsafe_code)]

//! Lifecycle callbacks.
//!
//! [`LifecycleNotifier`] owns the host's callbacks and decides whether a
//! checkpoint may fire.
//!
//! # Invariants
//!
//! - Each checkpoint fires at most once per sequence.
//! - `Shown` fires only after `Show` in the same sequence.
//! - Nothing fires for a dead [`SequenceToken`].

use std::fmt;

use bitflags::bitflags;
use scrim_core::{SequenceToken, StateChange};
use tracing::trace;

bitflags! {
    /// Checkpoints already fired in the current sequence.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Checkpoints: u8 {
        const SHOW = 0b0001;
        const SHOWN = 0b0010;
        const HIDE = 0b0100;
        const HIDDEN = 0b1000;
    }
}

/// A point in the show/hide lifecycle that notifies the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Checkpoint {
    Show,
    Shown,
    Hide,
    Hidden,
}

impl Checkpoint {
    pub const fn flag(self) -> Checkpoints {
        match self {
            Self::Show => Checkpoints::SHOW,
            Self::Shown => Checkpoints::SHOWN,
            Self::Hide => Checkpoints::HIDE,
            Self::Hidden => Checkpoints::HIDDEN,
        }
    }

    const fn requires(self) -> Checkpoints {
        match self {
            Self::Shown => Checkpoints::SHOW,
            _ => Checkpoints::empty(),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Shown => "shown",
            Self::Hide => "hide",
            Self::Hidden => "hidden",
        }
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answer of the `on_hide` callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HideDecision {
    #[default]
    Proceed,
    Cancel,
}

impl From<()> for HideDecision {
    fn from((): ()) -> Self {
        Self::Proceed
    }
}

impl From<bool> for HideDecision {
    fn from(proceed: bool) -> Self {
        if proceed { Self::Proceed } else { Self::Cancel }
    }
}

type Callback = Box<dyn FnMut()>;

/// Host callbacks plus the per-sequence bookkeeping that gates them.
#[derive(Default)]
pub struct LifecycleNotifier {
    on_show: Option<Callback>,
    on_shown: Option<Callback>,
    on_hide: Option<Box<dyn FnMut() -> HideDecision>>,
    on_hidden: Option<Callback>,
    on_submit: Option<Callback>,
    on_state_change: Option<Box<dyn FnMut(StateChange)>>,
    generation: u64,
    fired: Checkpoints,
}

impl LifecycleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_on_show(&mut self, f: impl FnMut() + 'static) {
        self.on_show = Some(Box::new(f));
    }

    pub fn set_on_shown(&mut self, f: impl FnMut() + 'static) {
        self.on_shown = Some(Box::new(f));
    }

    pub fn set_on_hide<D: Into<HideDecision>>(&mut self, mut f: impl FnMut() -> D + 'static) {
        self.on_hide = Some(Box::new(move || f().into()));
    }

    pub fn set_on_hidden(&mut self, f: impl FnMut() + 'static) {
        self.on_hidden = Some(Box::new(f));
    }

    pub fn set_on_submit(&mut self, f: impl FnMut() + 'static) {
        self.on_submit = Some(Box::new(f));
    }

    pub fn set_on_state_change(&mut self, f: impl FnMut(StateChange) + 'static) {
        self.on_state_change = Some(Box::new(f));
    }

    /// Checkpoints fired so far in the sequence of `token`.
    pub fn fired(&self, token: &SequenceToken) -> Checkpoints {
        if token.generation() == self.generation {
            self.fired
        } else {
            Checkpoints::empty()
        }
    }

    /// Claim `checkpoint` for `token`'s sequence. Returns `false` if it may
    /// not fire.
    fn claim(&mut self, checkpoint: Checkpoint, token: &SequenceToken) -> bool {
        if !token.is_live() {
            trace!(
                target: "scrim.modal",
                %checkpoint,
                generation = token.generation(),
                "checkpoint skipped for dead sequence"
            );
            return false;
        }
        if token.generation() != self.generation {
            self.generation = token.generation();
            self.fired = Checkpoints::empty();
        }
        let flag = checkpoint.flag();
        if self.fired.contains(flag) || !self.fired.contains(checkpoint.requires()) {
            trace!(target: "scrim.modal", %checkpoint, fired = ?self.fired, "checkpoint not due");
            return false;
        }
        self.fired.insert(flag);
        true
    }

    /// Fire `checkpoint` if it is due. Returns whether it fired.
    ///
    /// `Hide` goes through [`request_hide`](Self::request_hide) instead.
    pub fn notify(&mut self, checkpoint: Checkpoint, token: &SequenceToken) -> bool {
        debug_assert_ne!(checkpoint, Checkpoint::Hide, "use request_hide");
        if !self.claim(checkpoint, token) {
            return false;
        }
        trace!(target: "scrim.modal", %checkpoint, generation = token.generation(), "checkpoint");
        let callback = match checkpoint {
            Checkpoint::Show => self.on_show.as_mut(),
            Checkpoint::Shown => self.on_shown.as_mut(),
            Checkpoint::Hidden => self.on_hidden.as_mut(),
            Checkpoint::Hide => None,
        };
        if let Some(callback) = callback {
            callback();
        }
        true
    }

    /// Ask the host whether a close may proceed.
    ///
    /// A cancelled request leaves the checkpoint unclaimed so a later close
    /// asks again.
    pub fn request_hide(&mut self, token: &SequenceToken) -> HideDecision {
        if !self.claim(Checkpoint::Hide, token) {
            return HideDecision::Proceed;
        }
        let decision = self
            .on_hide
            .as_mut()
            .map_or(HideDecision::Proceed, |callback| callback());
        if decision == HideDecision::Cancel {
            self.fired.remove(Checkpoints::HIDE);
        }
        trace!(target: "scrim.modal", ?decision, "hide requested");
        decision
    }

    pub fn submit(&mut self) {
        if let Some(callback) = self.on_submit.as_mut() {
            callback();
        }
    }

    pub fn state_changed(&mut self, change: StateChange) {
        if let Some(callback) = self.on_state_change.as_mut() {
            callback(change);
        }
    }
}

impl fmt::Debug for LifecycleNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleNotifier")
            .field("generation", &self.generation)
            .field("fired", &self.fired)
            .field("on_show", &self.on_show.is_some())
            .field("on_shown", &self.on_shown.is_some())
            .field("on_hide", &self.on_hide.is_some())
            .field("on_hidden", &self.on_hidden.is_some())
            .field("on_submit", &self.on_submit.is_some())
            .finish()
    }
}
