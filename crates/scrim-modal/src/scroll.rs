#![forbid(unsafe_code)]

//! Page-scroll compensation.
//!
//! While a modal is open the page body stops scrolling, which makes its
//! scrollbar disappear and the content jump sideways. The compensator pads
//! the body by the scrollbar width for the duration of the modal and pads
//! the dialog itself when only one of the two overflows.
//!
//! # Invariants
//!
//! - A padding recorded by [`ScrollCompensator::set_page_scrollbar`] is
//!   restored exactly once, before the next application or on teardown.
//! - The scrollbar width is measured at most once per mounted dialog.
//!
//! # Failure Modes
//!
//! - A host that cannot create the measurement probe reports a width of 0.

use scrim_backend::{LedgerId, Page, Restore, format_px, parse_px};
use tracing::{debug, trace};

/// Padding applied to the dialog element, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollAdjustment {
    pub padding_left: Option<f64>,
    pub padding_right: Option<f64>,
}

impl ScrollAdjustment {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.padding_left.is_none() && self.padding_right.is_none()
    }
}

/// Measured scrollbar width and the dialog it was measured against.
#[derive(Debug, Clone)]
struct CachedWidth<E> {
    anchor: Option<E>,
    width: f64,
}

/// Body and dialog padding bookkeeping for one modal.
#[derive(Debug)]
pub struct ScrollCompensator<E> {
    body_overflowing: bool,
    adjustment: ScrollAdjustment,
    cached: Option<CachedWidth<E>>,
    ledger_id: LedgerId,
}

impl<E: Clone + PartialEq> ScrollCompensator<E> {
    /// Register a new participant in `page`'s scroll ledger.
    pub fn new<P: Page<Element = E>>(page: &P) -> Self {
        Self {
            body_overflowing: false,
            adjustment: ScrollAdjustment::default(),
            cached: None,
            ledger_id: page.scroll_ledger().register(),
        }
    }

    #[inline]
    pub fn adjustment(&self) -> ScrollAdjustment {
        self.adjustment
    }

    #[inline]
    pub fn is_body_overflowing(&self) -> bool {
        self.body_overflowing
    }

    /// Forget the measured scrollbar width.
    pub fn invalidate_width(&mut self) {
        self.cached = None;
    }

    /// Re-read whether the body is narrower than the window.
    pub fn check_overflow<P: Page<Element = E>>(&mut self, page: &P) -> bool {
        let viewport = page.viewport();
        self.body_overflowing = viewport.body_client_width < viewport.full_width();
        trace!(
            target: "scrim.scroll",
            overflowing = self.body_overflowing,
            body = viewport.body_client_width,
            full = viewport.full_width(),
            "checked body overflow"
        );
        self.body_overflowing
    }

    /// Width of the page scrollbar, measured with a probe placed after
    /// `dialog` (or at the end of the body).
    pub fn scrollbar_width<P: Page<Element = E>>(&mut self, page: &P, dialog: Option<&E>) -> f64 {
        if let Some(cached) = self.cached.as_ref().filter(|c| c.anchor.as_ref() == dialog) {
            return cached.width;
        }

        let width = match page.insert_probe(dialog) {
            Some(probe) => {
                let metrics = page.element_metrics(&probe);
                page.remove_element(&probe);
                metrics.offset_width - metrics.client_width
            }
            None => {
                debug!(target: "scrim.scroll", "scrollbar probe unavailable");
                0.0
            }
        };
        trace!(target: "scrim.scroll", width, "measured scrollbar");
        self.cached = Some(CachedWidth {
            anchor: dialog.cloned(),
            width,
        });
        width
    }

    /// Compute the dialog padding that keeps it centred.
    pub fn adjust_dialog<P: Page<Element = E>>(
        &mut self,
        page: &P,
        dialog: &E,
    ) -> ScrollAdjustment {
        let dialog_overflowing =
            page.element_metrics(dialog).scroll_height > page.viewport().document_client_height;
        let width = self.scrollbar_width(page, Some(dialog));

        self.adjustment = ScrollAdjustment {
            padding_left: (!self.body_overflowing && dialog_overflowing).then_some(width),
            padding_right: (self.body_overflowing && !dialog_overflowing).then_some(width),
        };
        trace!(
            target: "scrim.scroll",
            dialog_overflowing,
            body_overflowing = self.body_overflowing,
            adjustment = ?self.adjustment,
            "adjusted dialog"
        );
        self.adjustment
    }

    pub fn reset_adjustments(&mut self) {
        self.adjustment = ScrollAdjustment::default();
    }

    /// Record the body padding and widen it by the scrollbar width when the
    /// body overflows.
    pub fn set_page_scrollbar<P: Page<Element = E>>(&mut self, page: &P, dialog: Option<&E>) {
        if page.render_context().is_static() {
            return;
        }
        let ledger = page.scroll_ledger();
        if ledger.is_saved(self.ledger_id) {
            self.reset_page_scrollbar(page);
        }

        let current = page.body_padding_right();
        ledger.save(self.ledger_id, &current);
        if self.body_overflowing {
            let padded = parse_px(&current) + self.scrollbar_width(page, dialog);
            let value = format_px(padded);
            debug!(target: "scrim.scroll", from = %current, to = %value, "padding body");
            page.set_body_padding_right(&value);
        }
    }

    /// Put back the body padding recorded by the last
    /// [`set_page_scrollbar`](Self::set_page_scrollbar).
    pub fn reset_page_scrollbar<P: Page<Element = E>>(&mut self, page: &P) {
        let ledger = page.scroll_ledger();
        if page.render_context().is_static() {
            ledger.forget(self.ledger_id);
            return;
        }
        match ledger.restore(self.ledger_id) {
            Restore::Write(value) => {
                debug!(target: "scrim.scroll", to = %value, "restoring body padding");
                page.set_body_padding_right(&value);
            }
            Restore::Deferred => {
                trace!(target: "scrim.scroll", "body padding owned by a nested modal");
            }
            Restore::Nothing => {}
        }
    }

    /// Whether a body padding is currently recorded for this modal.
    pub fn is_page_scrollbar_set<P: Page<Element = E>>(&self, page: &P) -> bool {
        page.scroll_ledger().is_saved(self.ledger_id)
    }
}
