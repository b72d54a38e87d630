// SPDX-License-Identifier: MIT
//! Generation tokens for show/hide sequences.
//!
//! Every show or hide starts a new sequence by calling
//! [`SequenceSource::begin`]. The returned [`SequenceToken`] travels with each
//! suspended continuation; on resumption the continuation checks
//! [`SequenceToken::is_live`] and abandons itself if a newer sequence has
//! started or the owner was destroyed. There is no unwinding: abandoned work
//! simply never runs.
//!
//! # Example
//!
//! ```
//! use scrim_core::SequenceSource;
//!
//! let source = SequenceSource::new();
//! let show = source.begin();
//! assert!(show.is_live());
//!
//! let hide = source.begin();
//! assert!(!show.is_live());
//! assert!(hide.is_live());
//!
//! source.destroy();
//! assert!(!hide.is_live());
//! ```

#![forbid(unsafe_code)]

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// The control handle owned by a modal instance.
///
/// Dropping the source does **not** destroy it; call
/// [`destroy`](Self::destroy) explicitly.
pub struct SequenceSource {
    inner: Arc<SequenceInner>,
}

struct SequenceInner {
    generation: AtomicU64,
    destroyed: AtomicBool,
}

/// A cloneable handle identifying one sequence.
#[derive(Clone)]
pub struct SequenceToken {
    inner: Arc<SequenceInner>,
    generation: u64,
}

impl SequenceSource {
    /// Create a source at generation 0 with no sequence started.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SequenceInner {
                generation: AtomicU64::new(0),
                destroyed: AtomicBool::new(false),
            }),
        }
    }

    /// Start a new sequence, invalidating every earlier token.
    pub fn begin(&self) -> SequenceToken {
        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        SequenceToken {
            inner: Arc::clone(&self.inner),
            generation,
        }
    }

    /// Token for the most recently started sequence.
    pub fn current(&self) -> SequenceToken {
        SequenceToken {
            inner: Arc::clone(&self.inner),
            generation: self.generation(),
        }
    }

    /// Current generation number.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Mark the owner destroyed. All tokens become dead, including ones
    /// handed out later.
    pub fn destroy(&self) {
        self.inner.destroyed.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::Acquire)
    }
}

impl Default for SequenceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SequenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceSource")
            .field("generation", &self.generation())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

impl SequenceToken {
    /// `true` while this is the newest sequence and the owner is alive.
    #[inline]
    pub fn is_live(&self) -> bool {
        !self.inner.destroyed.load(Ordering::Acquire)
            && self.inner.generation.load(Ordering::Acquire) == self.generation
    }

    /// Generation this token was issued for.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl fmt::Debug for SequenceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceToken")
            .field("generation", &self.generation)
            .field("live", &self.is_live())
            .finish()
    }
}
