#![forbid(unsafe_code)]

//! Core types for the scrim modal sequencer.
//!
//! This crate has no knowledge of the host page. It provides:
//!
//! - [`ModalState`] - the single source of truth for the modal lifecycle
//! - [`ModalConfig`] - recognized options and their defaults
//! - [`SequenceSource`] / [`SequenceToken`] - liveness tokens threaded
//!   through every suspension point of a show/hide sequence
//! - [`RenderContext`] - interactive browser vs. non-interactive rendering
//!
//! # Role in scrim
//! `scrim-backend` builds the host boundary on top of these types and
//! `scrim-modal` drives them.

pub mod config;
pub mod sequence;
pub mod state;

pub use config::{ConfigError, DialogPosition, ModalConfig};
pub use sequence::{SequenceSource, SequenceToken};
pub use state::{ModalState, StateChange};

/// Where the modal is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RenderContext {
    /// A real browser document with layout, class lists and transitions.
    #[default]
    Interactive,
    /// A non-interactive rendering context (server-side rendering) that
    /// only offers attribute get/set on the body.
    Static,
}

impl RenderContext {
    /// Returns `true` for the non-interactive context.
    #[inline]
    pub const fn is_static(self) -> bool {
        matches!(self, Self::Static)
    }
}
