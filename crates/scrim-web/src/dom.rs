#![forbid(unsafe_code)]

//! Browser document through `web-sys`.
//!
//! Each transition wait installs a `transitionend` listener on its element,
//! keyed by the wait's id. The listener only records events whose target is
//! the element itself; bubbling ends from descendants are ignored. A listener
//! is removed as soon as its completion is taken or the wait is released, so
//! waits resolved by the timer fallback leave nothing behind.
//!
//! # Failure Modes
//!
//! DOM calls that throw are logged under `scrim.web` and otherwise ignored;
//! the sequencer carries on with whatever state the page ended up in.

use core::time::Duration;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use scrim_backend::{
    BodyAttributes, ElementMetrics, Page, RenderContext, SCROLLBAR_PROBE_CLASS, ScrollLedger,
    TransitionId, TransitionTarget, ViewportMetrics,
};
use tracing::{trace, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Event, EventInit, EventTarget, HtmlElement, Window};
use web_time::Instant;

const BODY_FORM_SELECTOR: &str = ".modal-body form";

const TRANSITION_END: &str = "transitionend";

/// An installed `transitionend` listener. Dropping the closure without
/// removing the listener first would leave a dangling callback in the page.
struct Listener {
    element: HtmlElement,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn remove(self) {
        log_failure(
            "unwatch_transition",
            self.element.remove_event_listener_with_callback(
                TRANSITION_END,
                self.callback.as_ref().unchecked_ref(),
            ),
        );
    }
}

/// The live browser document.
pub struct DomPage {
    window: Window,
    document: Document,
    body: HtmlElement,
    destination_id: Option<String>,
    ended: Rc<RefCell<HashSet<TransitionId>>>,
    listeners: RefCell<HashMap<TransitionId, Listener>>,
    epoch: Instant,
    ledger: ScrollLedger,
}

impl DomPage {
    /// Bind to the current window's document. `None` outside a browser or
    /// before `<body>` exists.
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        let body = document.body()?;
        Some(Self {
            window,
            document,
            body,
            destination_id: None,
            ended: Rc::new(RefCell::new(HashSet::new())),
            listeners: RefCell::new(HashMap::new()),
            epoch: Instant::now(),
            ledger: ScrollLedger::new(),
        })
    }

    /// Id of the shared element modals render into.
    #[must_use]
    pub fn with_destination(mut self, id: impl Into<String>) -> Self {
        self.destination_id = Some(id.into());
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Installed transition listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl Drop for DomPage {
    fn drop(&mut self) {
        for (_, listener) in self.listeners.get_mut().drain() {
            listener.remove();
        }
    }
}

fn log_failure(operation: &'static str, result: Result<(), JsValue>) {
    if let Err(err) = result {
        warn!(target: "scrim.web", operation, ?err, "DOM call failed");
    }
}

impl BodyAttributes for DomPage {
    fn body_attribute(&self, name: &str) -> Option<String> {
        self.body.get_attribute(name)
    }

    fn set_body_attribute(&self, name: &str, value: &str) {
        log_failure("set_attribute", self.body.set_attribute(name, value));
    }
}

impl Page for DomPage {
    type Element = HtmlElement;

    fn render_context(&self) -> RenderContext {
        RenderContext::Interactive
    }

    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }

    fn supports_transitions(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str("TransitionEvent")).unwrap_or(false)
    }

    fn has_destination(&self) -> bool {
        self.destination_id
            .as_deref()
            .is_some_and(|id| self.document.get_element_by_id(id).is_some())
    }

    fn add_body_class(&self, class: &str) {
        log_failure("add_class", self.body.class_list().add_1(class));
    }

    fn remove_body_class(&self, class: &str) {
        log_failure("remove_class", self.body.class_list().remove_1(class));
    }

    fn body_padding_right(&self) -> String {
        self.body
            .style()
            .get_property_value("padding-right")
            .unwrap_or_default()
    }

    fn set_body_padding_right(&self, value: &str) {
        log_failure(
            "set_padding_right",
            self.body.style().set_property("padding-right", value),
        );
    }

    fn viewport(&self) -> ViewportMetrics {
        let inner_width = self.window.inner_width().ok().and_then(|w| w.as_f64());
        let (document_left, document_right, document_client_height) =
            match self.document.document_element() {
                Some(root) => {
                    let rect = root.get_bounding_client_rect();
                    (rect.left(), rect.right(), f64::from(root.client_height()))
                }
                None => (0.0, 0.0, 0.0),
            };
        ViewportMetrics {
            inner_width,
            document_left,
            document_right,
            document_client_height,
            body_client_width: f64::from(self.body.client_width()),
        }
    }

    fn element_metrics(&self, element: &HtmlElement) -> ElementMetrics {
        ElementMetrics {
            offset_width: f64::from(element.offset_width()),
            client_width: f64::from(element.client_width()),
            scroll_height: f64::from(element.scroll_height()),
        }
    }

    fn set_scroll_top(&self, element: &HtmlElement, value: f64) {
        element.set_scroll_top(value as i32);
    }

    fn insert_probe(&self, after: Option<&HtmlElement>) -> Option<HtmlElement> {
        let probe = self
            .document
            .create_element("div")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        probe.set_class_name(SCROLLBAR_PROBE_CLASS);
        let inserted = match after {
            Some(anchor) => anchor.after_with_node_1(&probe),
            None => self.body.append_child(&probe).map(|_| ()),
        };
        match inserted {
            Ok(()) => Some(probe),
            Err(err) => {
                warn!(target: "scrim.web", ?err, "could not insert scrollbar probe");
                None
            }
        }
    }

    fn remove_element(&self, element: &HtmlElement) {
        element.remove();
    }

    fn body_forms(&self, dialog: &HtmlElement) -> Vec<HtmlElement> {
        let Ok(list) = dialog.query_selector_all(BODY_FORM_SELECTOR) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .collect()
    }

    fn dispatch_submit(&self, form: &HtmlElement) {
        let init = EventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        match Event::new_with_event_init_dict("submit", &init) {
            Ok(event) => log_failure("dispatch_submit", form.dispatch_event(&event).map(|_| ())),
            Err(err) => warn!(target: "scrim.web", ?err, "could not create submit event"),
        }
    }

    fn watch_transition(
        &self,
        id: TransitionId,
        element: &HtmlElement,
        target: TransitionTarget,
    ) {
        let ended = Rc::clone(&self.ended);
        let watched = element.clone();
        let callback = Closure::wrap(Box::new(move |event: Event| {
            let own: &EventTarget = watched.as_ref();
            if event.target().as_ref() == Some(own) {
                ended.borrow_mut().insert(id);
            }
        }) as Box<dyn FnMut(Event)>);
        let added = element
            .add_event_listener_with_callback(TRANSITION_END, callback.as_ref().unchecked_ref());
        if let Err(err) = added {
            warn!(target: "scrim.web", %id, %target, ?err, "could not watch transition");
            return;
        }
        let listener = Listener {
            element: element.clone(),
            callback,
        };
        if let Some(previous) = self.listeners.borrow_mut().insert(id, listener) {
            previous.remove();
        }
    }

    fn unwatch_transition(&self, id: TransitionId) {
        self.ended.borrow_mut().remove(&id);
        let removed = self.listeners.borrow_mut().remove(&id);
        if let Some(listener) = removed {
            trace!(target: "scrim.web", %id, "transition listener removed");
            listener.remove();
        }
    }

    fn take_transition_end(&self, id: TransitionId) -> bool {
        if !self.ended.borrow_mut().remove(&id) {
            return false;
        }
        let removed = self.listeners.borrow_mut().remove(&id);
        if let Some(listener) = removed {
            listener.remove();
        }
        true
    }

    fn scroll_ledger(&self) -> &ScrollLedger {
        &self.ledger
    }
}
