//! Close intents, the on-hide veto, and submit routing.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{Harness, Seen};
use pretty_assertions::assert_eq;
use scrim_core::{ModalConfig, ModalState};
use scrim_modal::{HideDecision, ModalAction};
use scrim_web::MemoryPage;

fn open(config: ModalConfig) -> Harness {
    let mut h = Harness::new(config.fade(false));
    h.modal.show();
    h.clear_log();
    h
}

#[test]
fn escape_closes_when_keyboard_enabled() {
    let mut h = open(ModalConfig::new());
    assert!(h.modal.handle_action(ModalAction::EscapePressed));
    assert_eq!(h.modal.state(), ModalState::Closed);
    assert_eq!(h.callbacks(), vec![Seen::Hide, Seen::Hidden]);
}

#[test]
fn escape_is_ignored_without_keyboard() {
    let mut h = open(ModalConfig::new().keyboard(false));
    assert!(!h.modal.handle_action(ModalAction::EscapePressed));
    assert_eq!(h.modal.state(), ModalState::Open);
    assert!(h.callbacks().is_empty());
}

#[test]
fn backdrop_click_respects_backdrop_close() {
    let mut h = open(ModalConfig::new().backdrop_close(false));
    assert!(!h.modal.handle_action(ModalAction::BackdropClicked));
    assert_eq!(h.modal.state(), ModalState::Open);

    let mut h = open(ModalConfig::new());
    assert!(h.modal.handle_action(ModalAction::BackdropClicked));
    assert_eq!(h.modal.state(), ModalState::Closed);
}

#[test]
fn explicit_close_always_applies() {
    let mut h = open(ModalConfig::new().keyboard(false).backdrop_close(false));
    assert!(h.modal.handle_action(ModalAction::Close));
    assert_eq!(h.modal.state(), ModalState::Closed);
}

#[test]
fn actions_on_a_closed_modal_do_nothing() {
    let mut h = Harness::new(ModalConfig::new());
    assert!(!h.modal.handle_action(ModalAction::Close));
    h.modal.close();
    assert!(h.callbacks().is_empty());
}

#[test]
fn on_hide_can_veto_a_close() {
    let allow = Rc::new(Cell::new(false));
    let asked = Rc::new(Cell::new(0));
    let (a, n) = (allow.clone(), asked.clone());
    let mut h = Harness::customized(
        Rc::new(MemoryPage::new()),
        ModalConfig::new().fade(false),
        |modal| {
            modal.on_hide(move || {
                n.set(n.get() + 1);
                a.get()
            })
        },
    );
    h.modal.show();

    h.modal.close();
    assert_eq!(h.modal.state(), ModalState::Open);
    h.modal.close();
    assert_eq!(h.modal.state(), ModalState::Open);
    assert_eq!(asked.get(), 2);

    allow.set(true);
    h.modal.close();
    assert_eq!(h.modal.state(), ModalState::Closed);
    assert_eq!(asked.get(), 3);
}

#[test]
fn hide_decision_callbacks_may_return_the_enum() {
    let mut h = Harness::customized(
        Rc::new(MemoryPage::new()),
        ModalConfig::new().fade(false),
        |modal| modal.on_hide(|| HideDecision::Cancel),
    );
    h.modal.show();
    assert!(h.modal.handle_action(ModalAction::EscapePressed));
    assert_eq!(h.modal.state(), ModalState::Open);
}

#[test]
fn close_while_closing_does_not_ask_again() {
    let mut h = Harness::new(ModalConfig::new().backdrop(false));
    h.modal.skip_transitions(true);
    h.modal.show();
    h.modal.skip_transitions(false);
    h.clear_log();

    h.modal.close();
    assert_eq!(h.modal.state(), ModalState::Closing);
    h.modal.close();
    h.tick(300);
    assert_eq!(h.callbacks(), vec![Seen::Hide, Seen::Hidden]);
}

#[test]
fn close_during_opening_asks_and_supersedes() {
    let mut h = Harness::new(ModalConfig::new());
    h.modal.show();
    h.modal.close();
    assert_eq!(h.modal.state(), ModalState::Closing);
    h.tick(300);
    h.tick(150);
    assert_eq!(h.modal.state(), ModalState::Closed);
    assert_eq!(h.callbacks(), vec![Seen::Hide, Seen::Hidden]);
}

#[test]
fn submit_without_forms_calls_on_submit_once() {
    let mut h = open(ModalConfig::new());
    h.modal.submit();
    assert_eq!(h.callbacks(), vec![Seen::Submit]);
    assert!(h.page.submitted_forms().is_empty());
}

#[test]
fn submit_with_forms_dispatches_to_each_form() {
    let mut h = open(ModalConfig::new());
    let first = h.page.add_form(h.dialog);
    let second = h.page.add_form(h.dialog);
    h.modal.submit();
    assert_eq!(h.page.submitted_forms(), vec![first, second]);
    assert!(h.callbacks().is_empty());
}

#[test]
fn submit_ignores_forms_of_other_dialogs() {
    let mut h = open(ModalConfig::new());
    let other = h.page.create_element(Default::default());
    h.page.add_form(other);
    h.modal.submit();
    assert_eq!(h.callbacks(), vec![Seen::Submit]);
}
