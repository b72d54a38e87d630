#![forbid(unsafe_code)]

//! Deterministic in-memory document.

use core::time::Duration;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use scrim_backend::{
    BodyAttributes, ElementMetrics, Page, RenderContext, ScrollLedger, TransitionId,
    TransitionTarget, ViewportMetrics,
};

/// Width the scrollbar probe reports as its outer width.
const PROBE_WIDTH: f64 = 100.0;

/// Handle to an element of a [`MemoryPage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryElement(u32);

impl MemoryElement {
    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }
}

/// A write made to a [`MemoryPage`].
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    AddClass(String),
    RemoveClass(String),
    SetAttribute { name: String, value: String },
    SetPaddingRight(String),
    SetScrollTop { element: MemoryElement, value: f64 },
    InsertProbe { after: Option<MemoryElement> },
    RemoveElement(MemoryElement),
    Submit(MemoryElement),
}

#[derive(Debug, Clone, Default)]
struct Record {
    metrics: ElementMetrics,
    scroll_top: Option<f64>,
    form_of: Option<MemoryElement>,
    probe: bool,
    removed: bool,
}

/// A registered transition watch. Behaves like a one-shot listener: the
/// first completion on its target marks it, later ones are not seen.
#[derive(Debug, Clone, Copy)]
struct Watch {
    id: TransitionId,
    element: MemoryElement,
    target: TransitionTarget,
    ended: bool,
}

/// A page whose clock, geometry and transition events are driven by the
/// host.
#[derive(Debug)]
pub struct MemoryPage {
    context: RenderContext,
    now: Cell<Duration>,
    supports_transitions: Cell<bool>,
    destination: Cell<bool>,
    viewport: Cell<ViewportMetrics>,
    scrollbar_width: Cell<f64>,
    attributes: RefCell<BTreeMap<String, String>>,
    padding_right: RefCell<String>,
    elements: RefCell<Vec<Record>>,
    probes_created: Cell<usize>,
    watches: RefCell<Vec<Watch>>,
    mutations: RefCell<Vec<Mutation>>,
    ledger: ScrollLedger,
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::with_context(RenderContext::Interactive)
    }
}

impl MemoryPage {
    /// An interactive page with a 1024x768 viewport and no scrollbar.
    pub fn new() -> Self {
        Self::default()
    }

    /// A non-interactive page: only body attributes may be touched.
    pub fn new_static() -> Self {
        Self::with_context(RenderContext::Static)
    }

    fn with_context(context: RenderContext) -> Self {
        Self {
            context,
            now: Cell::new(Duration::ZERO),
            supports_transitions: Cell::new(true),
            destination: Cell::new(true),
            viewport: Cell::new(ViewportMetrics::new(1024.0, 768.0)),
            scrollbar_width: Cell::new(0.0),
            attributes: RefCell::new(BTreeMap::new()),
            padding_right: RefCell::new(String::new()),
            elements: RefCell::new(Vec::new()),
            probes_created: Cell::new(0),
            watches: RefCell::new(Vec::new()),
            mutations: RefCell::new(Vec::new()),
            ledger: ScrollLedger::new(),
        }
    }

    #[must_use]
    pub fn with_scrollbar(self, width: f64) -> Self {
        self.scrollbar_width.set(width);
        self
    }

    /// Start with an inline body padding. Not recorded as a mutation.
    #[must_use]
    pub fn with_body_padding(self, value: &str) -> Self {
        *self.padding_right.borrow_mut() = value.to_owned();
        self
    }

    /// Start with body attribute `name` set. Not recorded as a mutation.
    #[must_use]
    pub fn with_body_attribute(self, name: &str, value: &str) -> Self {
        self.attributes
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
        self
    }

    // --- host controls ---

    pub fn set_time(&self, now: Duration) {
        self.now.set(now);
    }

    pub fn advance(&self, dt: Duration) {
        self.now.set(self.now.get().saturating_add(dt));
    }

    pub fn set_viewport(&self, viewport: ViewportMetrics) {
        self.viewport.set(viewport);
    }

    pub fn set_scrollbar_width(&self, width: f64) {
        self.scrollbar_width.set(width);
    }

    pub fn set_supports_transitions(&self, supported: bool) {
        self.supports_transitions.set(supported);
    }

    pub fn set_destination(&self, present: bool) {
        self.destination.set(present);
    }

    /// Add an element to the page.
    pub fn create_element(&self, metrics: ElementMetrics) -> MemoryElement {
        self.push_record(Record {
            metrics,
            ..Record::default()
        })
    }

    pub fn set_element_metrics(&self, element: MemoryElement, metrics: ElementMetrics) {
        if let Some(record) = self.elements.borrow_mut().get_mut(element.0 as usize) {
            record.metrics = metrics;
        }
    }

    /// Add a form inside the body section of `dialog`.
    pub fn add_form(&self, dialog: MemoryElement) -> MemoryElement {
        self.push_record(Record {
            form_of: Some(dialog),
            ..Record::default()
        })
    }

    /// Fire the transition-completion event on `target`. Only watches
    /// registered at this moment observe it.
    pub fn finish_transition(&self, target: TransitionTarget) {
        for watch in self.watches.borrow_mut().iter_mut() {
            if watch.target == target {
                watch.ended = true;
            }
        }
    }

    fn push_record(&self, record: Record) -> MemoryElement {
        let mut elements = self.elements.borrow_mut();
        let id = u32::try_from(elements.len()).unwrap_or(u32::MAX);
        elements.push(record);
        MemoryElement(id)
    }

    fn record(&self, mutation: Mutation) {
        self.mutations.borrow_mut().push(mutation);
    }

    // --- inspection ---

    pub fn has_body_class(&self, class: &str) -> bool {
        self.attributes
            .borrow()
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn scroll_top(&self, element: MemoryElement) -> Option<f64> {
        self.elements
            .borrow()
            .get(element.0 as usize)
            .and_then(|record| record.scroll_top)
    }

    pub fn is_removed(&self, element: MemoryElement) -> bool {
        self.elements
            .borrow()
            .get(element.0 as usize)
            .is_some_and(|record| record.removed)
    }

    /// Watches still waiting for their completion event, in order.
    pub fn watched_transitions(&self) -> Vec<(MemoryElement, TransitionTarget)> {
        self.watches
            .borrow()
            .iter()
            .filter(|watch| !watch.ended)
            .map(|watch| (watch.element, watch.target))
            .collect()
    }

    /// Whether `id` is registered, ended or not.
    pub fn is_watching(&self, id: TransitionId) -> bool {
        self.watches.borrow().iter().any(|watch| watch.id == id)
    }

    /// Registered watches, including ended ones not yet taken.
    pub fn watch_count(&self) -> usize {
        self.watches.borrow().len()
    }

    pub fn submitted_forms(&self) -> Vec<MemoryElement> {
        self.mutations
            .borrow()
            .iter()
            .filter_map(|m| match m {
                Mutation::Submit(form) => Some(*form),
                _ => None,
            })
            .collect()
    }

    /// Scrollbar probes currently in the page.
    pub fn live_probes(&self) -> usize {
        self.elements
            .borrow()
            .iter()
            .filter(|record| record.probe && !record.removed)
            .count()
    }

    pub fn probes_created(&self) -> usize {
        self.probes_created.get()
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.mutations.borrow().clone()
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.borrow().len()
    }

    pub fn clear_mutations(&self) {
        self.mutations.borrow_mut().clear();
    }

    fn assert_interactive(&self, operation: &str) {
        assert!(
            !self.context.is_static(),
            "{operation} is not available in a static document"
        );
    }
}

impl BodyAttributes for MemoryPage {
    fn body_attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    fn set_body_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
        self.record(Mutation::SetAttribute {
            name: name.to_owned(),
            value: value.to_owned(),
        });
    }
}

impl Page for MemoryPage {
    type Element = MemoryElement;

    fn render_context(&self) -> RenderContext {
        self.context
    }

    fn now(&self) -> Duration {
        self.now.get()
    }

    fn supports_transitions(&self) -> bool {
        self.supports_transitions.get()
    }

    fn has_destination(&self) -> bool {
        self.destination.get()
    }

    fn add_body_class(&self, class: &str) {
        self.assert_interactive("add_body_class");
        let mut attributes = self.attributes.borrow_mut();
        let classes = attributes.entry("class".to_owned()).or_default();
        if !classes.split_whitespace().any(|c| c == class) {
            if !classes.is_empty() {
                classes.push(' ');
            }
            classes.push_str(class);
        }
        drop(attributes);
        self.record(Mutation::AddClass(class.to_owned()));
    }

    fn remove_body_class(&self, class: &str) {
        self.assert_interactive("remove_body_class");
        if let Some(classes) = self.attributes.borrow_mut().get_mut("class") {
            *classes = classes
                .split_whitespace()
                .filter(|c| *c != class)
                .collect::<Vec<_>>()
                .join(" ");
        }
        self.record(Mutation::RemoveClass(class.to_owned()));
    }

    fn body_padding_right(&self) -> String {
        self.padding_right.borrow().clone()
    }

    fn set_body_padding_right(&self, value: &str) {
        *self.padding_right.borrow_mut() = value.to_owned();
        self.record(Mutation::SetPaddingRight(value.to_owned()));
    }

    fn viewport(&self) -> ViewportMetrics {
        self.viewport.get()
    }

    fn element_metrics(&self, element: &MemoryElement) -> ElementMetrics {
        self.elements
            .borrow()
            .get(element.0 as usize)
            .map(|record| record.metrics)
            .unwrap_or_default()
    }

    fn set_scroll_top(&self, element: &MemoryElement, value: f64) {
        if let Some(record) = self.elements.borrow_mut().get_mut(element.0 as usize) {
            record.scroll_top = Some(value);
        }
        self.record(Mutation::SetScrollTop {
            element: *element,
            value,
        });
    }

    fn insert_probe(&self, after: Option<&MemoryElement>) -> Option<MemoryElement> {
        let probe = self.push_record(Record {
            metrics: ElementMetrics {
                offset_width: PROBE_WIDTH,
                client_width: PROBE_WIDTH - self.scrollbar_width.get(),
                scroll_height: 0.0,
            },
            probe: true,
            ..Record::default()
        });
        self.probes_created.set(self.probes_created.get() + 1);
        self.record(Mutation::InsertProbe {
            after: after.copied(),
        });
        Some(probe)
    }

    fn remove_element(&self, element: &MemoryElement) {
        if let Some(record) = self.elements.borrow_mut().get_mut(element.0 as usize) {
            record.removed = true;
        }
        self.record(Mutation::RemoveElement(*element));
    }

    fn body_forms(&self, dialog: &MemoryElement) -> Vec<MemoryElement> {
        self.elements
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, record)| record.form_of == Some(*dialog) && !record.removed)
            .filter_map(|(id, _)| u32::try_from(id).ok().map(MemoryElement))
            .collect()
    }

    fn dispatch_submit(&self, form: &MemoryElement) {
        self.record(Mutation::Submit(*form));
    }

    fn watch_transition(
        &self,
        id: TransitionId,
        element: &MemoryElement,
        target: TransitionTarget,
    ) {
        self.watches.borrow_mut().push(Watch {
            id,
            element: *element,
            target,
            ended: false,
        });
    }

    fn unwatch_transition(&self, id: TransitionId) {
        self.watches.borrow_mut().retain(|watch| watch.id != id);
    }

    fn take_transition_end(&self, id: TransitionId) -> bool {
        let mut watches = self.watches.borrow_mut();
        match watches.iter().position(|watch| watch.id == id && watch.ended) {
            Some(index) => {
                watches.remove(index);
                true
            }
            None => false,
        }
    }

    fn scroll_ledger(&self) -> &ScrollLedger {
        &self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn body_classes_behave_like_a_class_list() {
        let page = MemoryPage::new().with_body_attribute("class", "app");
        page.add_body_class("modal-open");
        page.add_body_class("modal-open");
        assert_eq!(page.body_attribute("class").as_deref(), Some("app modal-open"));
        page.remove_body_class("modal-open");
        assert_eq!(page.body_attribute("class").as_deref(), Some("app"));
        assert!(!page.has_body_class("modal-open"));
    }

    #[test]
    #[should_panic(expected = "not available in a static document")]
    fn static_page_rejects_class_list() {
        MemoryPage::new_static().add_body_class("modal-open");
    }

    #[test]
    fn probe_reports_configured_scrollbar() {
        let page = MemoryPage::new().with_scrollbar(17.0);
        let dialog = page.create_element(ElementMetrics::default());
        let probe = page.insert_probe(Some(&dialog)).expect("probe");
        let metrics = page.element_metrics(&probe);
        assert_eq!(metrics.offset_width - metrics.client_width, 17.0);
        assert_eq!(page.live_probes(), 1);
        page.remove_element(&probe);
        assert_eq!(page.live_probes(), 0);
        assert_eq!(
            page.mutations(),
            vec![
                Mutation::InsertProbe {
                    after: Some(dialog)
                },
                Mutation::RemoveElement(probe),
            ]
        );
    }

    #[test]
    fn forms_belong_to_their_dialog() {
        let page = MemoryPage::new();
        let a = page.create_element(ElementMetrics::default());
        let b = page.create_element(ElementMetrics::default());
        let form = page.add_form(a);
        assert_eq!(page.body_forms(&a), vec![form]);
        assert!(page.body_forms(&b).is_empty());
    }

    #[test]
    fn transition_end_is_seen_once_per_watch() {
        let page = MemoryPage::new();
        let dialog = page.create_element(ElementMetrics::default());
        let backdrop = page.create_element(ElementMetrics::default());
        let (fade_in, fade_out) = (TransitionId::new(1), TransitionId::new(2));
        page.watch_transition(fade_in, &dialog, TransitionTarget::Dialog);
        page.watch_transition(TransitionId::new(3), &backdrop, TransitionTarget::Backdrop);

        page.finish_transition(TransitionTarget::Dialog);
        assert!(page.take_transition_end(fade_in));
        assert!(!page.take_transition_end(fade_in));
        assert!(!page.take_transition_end(TransitionId::new(3)));

        // An event before the watch exists is not observed.
        page.finish_transition(TransitionTarget::Dialog);
        page.watch_transition(fade_out, &dialog, TransitionTarget::Dialog);
        assert!(!page.take_transition_end(fade_out));
        assert_eq!(
            page.watched_transitions(),
            vec![
                (backdrop, TransitionTarget::Backdrop),
                (dialog, TransitionTarget::Dialog),
            ]
        );
    }

    #[test]
    fn unwatched_transition_forgets_its_end() {
        let page = MemoryPage::new();
        let dialog = page.create_element(ElementMetrics::default());
        let id = TransitionId::new(7);
        page.watch_transition(id, &dialog, TransitionTarget::Dialog);
        page.finish_transition(TransitionTarget::Dialog);
        page.unwatch_transition(id);
        assert!(!page.take_transition_end(id));
        assert_eq!(page.watch_count(), 0);
        page.unwatch_transition(id);
    }

    #[test]
    fn clock_is_host_driven() {
        let page = MemoryPage::new();
        page.advance(Duration::from_millis(16));
        page.advance(Duration::from_millis(16));
        assert_eq!(page.now(), Duration::from_millis(32));
        page.set_time(Duration::from_secs(1));
        assert_eq!(page.now(), Duration::from_secs(1));
    }
}
