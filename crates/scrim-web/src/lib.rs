#![forbid(unsafe_code)]

//! `scrim-web` provides the documents a modal is rendered into.
//!
//! - [`MemoryPage`]: a host-driven, deterministic document. The host
//!   advances the clock and reports transition ends explicitly, and every
//!   write is recorded as a [`Mutation`]. Used by tests and by
//!   non-interactive (server-side) rendering.
//! - `DomPage` (wasm32 only): the browser document through `web-sys`.

pub mod memory;

#[cfg(target_arch = "wasm32")]
pub mod dom;

#[cfg(target_arch = "wasm32")]
pub use dom::DomPage;
pub use memory::{MemoryElement, MemoryPage, Mutation};
