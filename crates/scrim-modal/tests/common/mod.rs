//! Shared harness for modal integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use scrim_backend::{ElementMetrics, ViewportMetrics};
use scrim_core::{ModalConfig, ModalState};
use scrim_modal::Modal;
use scrim_web::{MemoryElement, MemoryPage};

/// What the host observed, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seen {
    Show,
    Shown,
    Hide,
    Hidden,
    Submit,
    State(ModalState, ModalState),
}

pub type Log = Rc<RefCell<Vec<Seen>>>;

pub struct Harness {
    pub page: Rc<MemoryPage>,
    pub modal: Modal<MemoryPage>,
    pub log: Log,
    pub dialog: MemoryElement,
    pub backdrop: MemoryElement,
}

impl Harness {
    /// A modal with both elements mounted on a non-overflowing page.
    pub fn new(config: ModalConfig) -> Self {
        Self::on_page(Rc::new(MemoryPage::new()), config)
    }

    pub fn on_page(page: Rc<MemoryPage>, config: ModalConfig) -> Self {
        Self::customized(page, config, |modal| modal)
    }

    /// Like [`Harness::on_page`], with a chance to replace callbacks.
    pub fn customized(
        page: Rc<MemoryPage>,
        config: ModalConfig,
        customize: impl FnOnce(Modal<MemoryPage>) -> Modal<MemoryPage>,
    ) -> Self {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut modal = customize(recording(Modal::new(page.clone(), config), &log));
        let dialog = page.create_element(ElementMetrics::default());
        let backdrop = page.create_element(ElementMetrics::default());
        modal.mount_dialog(Some(dialog));
        modal.mount_backdrop(Some(backdrop));
        Self {
            page,
            modal,
            log,
            dialog,
            backdrop,
        }
    }

    /// Advance the page clock and let the modal observe it.
    pub fn tick(&mut self, ms: u64) {
        self.page.advance(Duration::from_millis(ms));
        self.modal.poll();
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.log.borrow().clone()
    }

    /// Lifecycle callbacks only, without state changes.
    pub fn callbacks(&self) -> Vec<Seen> {
        self.log
            .borrow()
            .iter()
            .copied()
            .filter(|s| !matches!(s, Seen::State(..)))
            .collect()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }
}

/// Attach callbacks that append to `log`.
pub fn recording(modal: Modal<MemoryPage>, log: &Log) -> Modal<MemoryPage> {
    let (a, b, c, d, e, f) = (
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
    );
    modal
        .on_show(move || a.borrow_mut().push(Seen::Show))
        .on_shown(move || b.borrow_mut().push(Seen::Shown))
        .on_hide(move || c.borrow_mut().push(Seen::Hide))
        .on_hidden(move || d.borrow_mut().push(Seen::Hidden))
        .on_submit(move || e.borrow_mut().push(Seen::Submit))
        .on_state_change(move |change| f.borrow_mut().push(Seen::State(change.from, change.to)))
}

/// A page whose body is 15px narrower than the window.
pub fn overflowing_page() -> MemoryPage {
    let page = MemoryPage::new().with_scrollbar(15.0);
    page.set_viewport(ViewportMetrics {
        body_client_width: 1009.0,
        ..ViewportMetrics::new(1024.0, 768.0)
    });
    page
}
