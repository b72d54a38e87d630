//! Body and dialog padding through full show/hide sequences.

mod common;

use std::rc::Rc;

use common::{Harness, overflowing_page};
use pretty_assertions::assert_eq;
use scrim_backend::{ElementMetrics, Page, ViewportMetrics};
use scrim_core::ModalConfig;
use scrim_modal::ScrollAdjustment;

fn quiet() -> ModalConfig {
    ModalConfig::new().fade(false)
}

#[test]
fn overflowing_body_is_padded_while_open() {
    let page = Rc::new(overflowing_page().with_body_padding("4px"));
    let mut h = Harness::on_page(page, quiet());

    h.modal.show();
    assert_eq!(h.page.body_padding_right(), "19px");
    assert_eq!(
        h.modal.dialog_adjustment(),
        ScrollAdjustment {
            padding_left: None,
            padding_right: Some(15.0),
        }
    );

    h.modal.hide();
    assert_eq!(h.page.body_padding_right(), "4px");
    assert!(h.modal.dialog_adjustment().is_empty());
}

#[test]
fn unset_padding_is_restored_to_empty() {
    let page = Rc::new(overflowing_page());
    let mut h = Harness::on_page(page, quiet());
    h.modal.show();
    assert_eq!(h.page.body_padding_right(), "15px");
    h.modal.hide();
    assert_eq!(h.page.body_padding_right(), "");
}

#[test]
fn body_that_fits_is_left_alone() {
    let page = Rc::new(common::overflowing_page());
    page.set_viewport(ViewportMetrics::new(1024.0, 768.0));
    let mut h = Harness::on_page(page, quiet());
    h.modal.show();
    assert_eq!(h.page.body_padding_right(), "");
    assert!(h.modal.dialog_adjustment().is_empty());
}

#[test]
fn repeated_cycles_never_accumulate_padding() {
    let page = Rc::new(overflowing_page().with_body_padding("2px"));
    let mut h = Harness::on_page(page, quiet());
    for _ in 0..5 {
        h.modal.show();
        assert_eq!(h.page.body_padding_right(), "17px");
        h.modal.hide();
        assert_eq!(h.page.body_padding_right(), "2px");
    }
    assert_eq!(h.page.scroll_ledger().depth(), 0);
}

#[test]
fn scrollbar_is_measured_once_per_dialog() {
    let page = Rc::new(overflowing_page());
    let mut h = Harness::on_page(page, quiet());
    h.modal.show();
    h.modal.hide();
    h.modal.show();
    assert_eq!(h.page.probes_created(), 1);
    assert_eq!(h.page.live_probes(), 0);

    let replacement = h.page.create_element(ElementMetrics::default());
    h.modal.hide();
    h.modal.mount_dialog(Some(replacement));
    h.modal.show();
    assert_eq!(h.page.probes_created(), 2);
}

#[test]
fn resize_recomputes_dialog_padding() {
    let page = Rc::new(overflowing_page());
    let mut h = Harness::on_page(page, quiet());
    h.modal.show();
    assert_eq!(h.modal.dialog_adjustment().padding_right, Some(15.0));

    h.page.set_viewport(ViewportMetrics::new(1024.0, 768.0));
    h.page.set_element_metrics(
        h.dialog,
        ElementMetrics {
            scroll_height: 2000.0,
            ..ElementMetrics::default()
        },
    );
    h.modal.handle_resize();
    assert_eq!(
        h.modal.dialog_adjustment(),
        ScrollAdjustment {
            padding_left: Some(15.0),
            padding_right: None,
        }
    );
}

#[test]
fn resize_while_closed_is_ignored() {
    let page = Rc::new(overflowing_page());
    let mut h = Harness::on_page(page, quiet());
    h.modal.handle_resize();
    assert!(h.modal.dialog_adjustment().is_empty());
    assert_eq!(h.page.mutation_count(), 0);
}

#[test]
fn nested_modals_restore_the_original_padding() {
    let page = Rc::new(overflowing_page().with_body_padding("1px"));
    let mut outer = Harness::on_page(page.clone(), quiet());
    let mut inner = Harness::on_page(page.clone(), quiet());

    outer.modal.show();
    inner.modal.show();
    assert_eq!(page.body_padding_right(), "31px");

    // Closing the outer one first must not clobber the inner one's padding.
    outer.modal.hide();
    assert_eq!(page.body_padding_right(), "31px");
    inner.modal.hide();
    assert_eq!(page.body_padding_right(), "1px");
}

#[test]
fn nested_modals_in_stack_order() {
    let page = Rc::new(overflowing_page());
    let mut outer = Harness::on_page(page.clone(), quiet());
    let mut inner = Harness::on_page(page.clone(), quiet());

    outer.modal.show();
    inner.modal.show();
    inner.modal.hide();
    assert_eq!(page.body_padding_right(), "15px");
    outer.modal.hide();
    assert_eq!(page.body_padding_right(), "");
}
