#![forbid(unsafe_code)]
#![doc = "Host page traits for scrim: platform abstraction for the document a modal lives in."]
#![doc = ""]
#![doc = "This crate defines the boundary between the modal sequencer and concrete"]
#![doc = "documents (the in-memory `MemoryPage` and the browser `DomPage` in `scrim-web`)."]

pub mod ledger;

use core::fmt;
use core::time::Duration;

pub use ledger::{LedgerId, Restore, ScrollLedger};
pub use scrim_core::RenderContext;

/// Class added to the page body while a modal is in the DOM.
pub const MODAL_OPEN_CLASS: &str = "modal-open";

/// Class given to the temporary element used to measure the scrollbar.
pub const SCROLLBAR_PROBE_CLASS: &str = "modal-scrollbar-measure";

/// Which element a transition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionTarget {
    Dialog,
    Backdrop,
}

impl TransitionTarget {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dialog => "dialog",
            Self::Backdrop => "backdrop",
        }
    }
}

impl fmt::Display for TransitionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one transition wait.
///
/// Ids are unique across every modal of a process, so a page shared by
/// several modals can key its watches by id alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u64);

impl TransitionId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of the page geometry needed for scroll compensation.
///
/// All values are CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportMetrics {
    /// `window.innerWidth`; `None` when the host does not report it.
    pub inner_width: Option<f64>,
    /// Left edge of the document element's bounding rect.
    pub document_left: f64,
    /// Right edge of the document element's bounding rect.
    pub document_right: f64,
    /// Client height of the document element.
    pub document_client_height: f64,
    /// Client width of the page body.
    pub body_client_width: f64,
}

impl ViewportMetrics {
    /// A viewport of `width` x `height` whose body fills the width exactly.
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            inner_width: Some(width),
            document_left: 0.0,
            document_right: width,
            document_client_height: height,
            body_client_width: width,
        }
    }

    /// Full window width, falling back to the document rect when the inner
    /// width is missing or zero.
    pub fn full_width(&self) -> f64 {
        match self.inner_width {
            Some(width) if width > 0.0 => width,
            _ => self.document_right - self.document_left.abs(),
        }
    }
}

/// Geometry of a single element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ElementMetrics {
    pub offset_width: f64,
    pub client_width: f64,
    pub scroll_height: f64,
}

/// Restricted document surface: attribute get/set on the body.
///
/// This is everything a non-interactive rendering context is guaranteed to
/// offer. No class-list API is assumed.
pub trait BodyAttributes {
    fn body_attribute(&self, name: &str) -> Option<String>;

    fn set_body_attribute(&self, name: &str, value: &str);
}

/// Full document abstraction driven by the modal sequencer.
///
/// Methods take `&self`: a page is shared by every modal rendered into it and
/// implementations use interior mutability, as the DOM itself does.
pub trait Page: BodyAttributes {
    /// Handle to a rendered element.
    type Element: Clone + PartialEq + fmt::Debug;

    /// Interactive browser or non-interactive rendering.
    fn render_context(&self) -> RenderContext;

    /// Monotonic time since an unspecified epoch.
    fn now(&self) -> Duration;

    /// Whether the host runs CSS transitions at all.
    fn supports_transitions(&self) -> bool {
        true
    }

    /// Whether a shared destination element exists for modals to render into.
    fn has_destination(&self) -> bool {
        true
    }

    fn add_body_class(&self, class: &str);

    fn remove_body_class(&self, class: &str);

    /// Inline `padding-right` of the body, verbatim (empty when unset).
    fn body_padding_right(&self) -> String;

    fn set_body_padding_right(&self, value: &str);

    fn viewport(&self) -> ViewportMetrics;

    fn element_metrics(&self, element: &Self::Element) -> ElementMetrics;

    fn set_scroll_top(&self, element: &Self::Element, value: f64);

    /// Insert a hidden scrollbar probe right after `after`, or at the end of
    /// the body when `after` is `None`. Returns `None` if the host could not
    /// create it.
    fn insert_probe(&self, after: Option<&Self::Element>) -> Option<Self::Element>;

    fn remove_element(&self, element: &Self::Element);

    /// Forms inside the body section of `dialog`.
    fn body_forms(&self, dialog: &Self::Element) -> Vec<Self::Element>;

    /// Dispatch a bubbling, cancelable `submit` event at `form`.
    fn dispatch_submit(&self, form: &Self::Element);

    /// Start observing the native transition-completion event of `element`
    /// on behalf of wait `id`.
    fn watch_transition(
        &self,
        id: TransitionId,
        element: &Self::Element,
        target: TransitionTarget,
    ) {
        let _ = (id, element, target);
    }

    /// Stop observing wait `id` and forget any completion not yet taken.
    /// Unknown ids are ignored.
    fn unwatch_transition(&self, id: TransitionId) {
        let _ = id;
    }

    /// Whether the transition watched as `id` completed. A `true` answer
    /// consumes the completion and ends the watch.
    fn take_transition_end(&self, id: TransitionId) -> bool {
        let _ = id;
        false
    }

    /// The page-wide ledger for body padding adjustments.
    fn scroll_ledger(&self) -> &ScrollLedger;
}

/// Parse a CSS length the way `parseInt` does: leading integer, anything
/// after it ignored, `0` when there is none.
pub fn parse_px(value: &str) -> f64 {
    let trimmed = value.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<u64>()
        .map(|n| sign * n as f64)
        .unwrap_or(0.0)
}

/// Format a pixel length for an inline style.
pub fn format_px(value: f64) -> String {
    format!("{value}px")
}
