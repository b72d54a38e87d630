#![forbid(unsafe_code)]

//! Modal lifecycle state.
//!
//! State machine: Closed → Opening → Open → Closing → Closed
//!
//! A hide that starts while a show is still in flight moves Opening → Closing
//! directly. No other edges exist.
//!
//! # Invariants
//!
//! - `is_in_dom() == (state != Closed)`
//! - `is_visible() == matches!(state, Open | Opening)`
//!
//! Both are pure functions of the state and are never stored.

use std::fmt;

/// Current phase of the modal lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ModalState {
    /// Not rendered.
    #[default]
    Closed,
    /// Rendered; backdrop and dialog are fading in.
    Opening,
    /// Fully shown.
    Open,
    /// Rendered; dialog and backdrop are fading out.
    Closing,
}

impl ModalState {
    /// All states, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Closed, Self::Opening, Self::Open, Self::Closing];

    /// Whether the modal markup should be in the rendered tree.
    #[inline]
    pub const fn is_in_dom(self) -> bool {
        !matches!(self, Self::Closed)
    }

    /// Whether the dialog should carry its "shown" presentation.
    #[inline]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Open | Self::Opening)
    }

    #[inline]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    #[inline]
    pub const fn is_opening(self) -> bool {
        matches!(self, Self::Opening)
    }

    #[inline]
    pub const fn is_closing(self) -> bool {
        matches!(self, Self::Closing)
    }

    #[inline]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Check whether `self → next` is a legal edge.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Closed, Self::Opening)
                | (Self::Opening, Self::Open)
                | (Self::Open, Self::Closing)
                | (Self::Closing, Self::Closed)
                | (Self::Opening, Self::Closing)
        )
    }

    /// Stable lowercase name, used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Closing => "closing",
        }
    }
}

impl fmt::Display for ModalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single observed state edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateChange {
    pub from: ModalState,
    pub to: ModalState,
}

impl StateChange {
    #[inline]
    pub const fn new(from: ModalState, to: ModalState) -> Self {
        Self { from, to }
    }

    /// Whether this change follows a legal edge.
    #[inline]
    pub const fn is_legal(self) -> bool {
        self.from.can_transition_to(self.to)
    }
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
