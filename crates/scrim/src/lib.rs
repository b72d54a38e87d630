#![forbid(unsafe_code)]

//! scrim public facade crate.
//!
//! Re-exports the modal sequencer, its configuration and the host pages,
//! plus a prelude for day-to-day use.
//!
//! ```
//! use std::rc::Rc;
//! use scrim::prelude::*;
//!
//! let page = Rc::new(MemoryPage::new());
//! let mut modal = Modal::new(page.clone(), ModalConfig::new().fade(false));
//! modal.mount_backdrop(Some(page.create_element(ElementMetrics::default())));
//! modal.mount_dialog(Some(page.create_element(ElementMetrics::default())));
//!
//! modal.set_open(true);
//! assert!(modal.is_open());
//! assert!(modal.handle_action(ModalAction::EscapePressed));
//! assert_eq!(modal.state(), ModalState::Closed);
//! ```

// --- Core re-exports -------------------------------------------------------

pub use scrim_core::{
    ConfigError, DialogPosition, ModalConfig, ModalState, RenderContext, SequenceSource,
    SequenceToken, StateChange,
};

// --- Host re-exports -------------------------------------------------------

pub use scrim_backend::{
    BodyAttributes, ElementMetrics, MODAL_OPEN_CLASS, Page, ScrollLedger, TransitionId,
    TransitionTarget, ViewportMetrics,
};
#[cfg(target_arch = "wasm32")]
pub use scrim_web::DomPage;
pub use scrim_web::{MemoryElement, MemoryPage, Mutation};

// --- Sequencer re-exports --------------------------------------------------

pub use scrim_modal::{
    Checkpoint, HideDecision, Modal, ModalAction, ModalElements, ScrollAdjustment,
};

#[cfg(feature = "logging")]
pub mod logging;

pub mod prelude {
    pub use crate::{
        ElementMetrics, HideDecision, MemoryPage, Modal, ModalAction, ModalConfig, ModalState,
        Page, TransitionTarget,
    };

    pub use crate::{backend, core, modal, web};
}

pub use scrim_backend as backend;
pub use scrim_core as core;
pub use scrim_modal as modal;
pub use scrim_web as web;
