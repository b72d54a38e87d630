#![forbid(unsafe_code)]

//! Show/hide sequencing for modal dialogs.
//!
//! [`Modal`] coordinates a backdrop, a dialog, CSS transition timing, page
//! scroll compensation and lifecycle callbacks on top of a host
//! [`Page`](scrim_backend::Page). The pieces it drives are public so hosts
//! can reuse them on their own:
//!
//! - [`TransitionWaiter`] - transition waits with a timer fallback
//! - [`ScrollCompensator`] - body and dialog padding for the hidden scrollbar
//! - [`BackdropController`] - backdrop visibility and fades
//! - [`LifecycleNotifier`] - at-most-once, in-order checkpoint callbacks
//!
//! # Driving a modal
//!
//! Nothing in this crate runs on its own. The host calls
//! [`Modal::after_render`] after each render pass and [`Modal::poll`] from
//! its frame or timer loop. `poll` picks up the transition completions the
//! page watched for each wait and fires expired fallbacks. Hosts that see
//! transition ends outside the page can report them through
//! [`Modal::transition_ended`].

pub mod backdrop;
pub mod lifecycle;
pub mod machine;
pub mod scroll;
pub mod transition;

pub use backdrop::{BackdropController, BackdropProgress, BackdropSettings};
pub use lifecycle::{Checkpoint, Checkpoints, HideDecision, LifecycleNotifier};
pub use machine::{Modal, ModalAction, ModalElements};
pub use scroll::{ScrollAdjustment, ScrollCompensator};
pub use transition::{PendingTransition, TransitionRequest, TransitionWait, TransitionWaiter};
