/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Duration;

use input_traits::{
    DocumentPoint, DomEventType, NodeId, PlatformTouchEvent, PlatformTouchPoint, TouchId,
    TouchPointState, WheelPhase,
};

use crate::fake_host::{FakeHost, ROOT, handler, hover, press, rect, release};
use crate::wheel::wheel;

fn one_box() -> (FakeHost, NodeId) {
    let mut host = FakeHost::new();
    let a = host.add_element(ROOT, rect(0., 0., 100., 100.));
    host.node_mut(a).focusable = true;
    (host, a)
}

#[test]
fn test_removed_press_target_gets_no_click() {
    let (host, a) = one_box();
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(50., 50., 0));
    assert_eq!(handler.click_node(), Some(a));

    handler.node_will_be_removed(a);
    handler.host_mut().remove(a);
    assert_eq!(handler.click_node(), None);
    assert_eq!(handler.mouse_press_node(), None);
    assert_eq!(handler.node_under_mouse(), None);

    handler.handle_mouse_release_event(&release(50., 50., 10));
    assert_eq!(handler.host().targets_of(DomEventType::MouseUp), vec![ROOT]);
    assert!(handler.host().targets_of(DomEventType::Click).is_empty());
}

#[test]
fn test_press_target_removed_by_mousedown_is_not_kept() {
    let (mut host, a) = one_box();
    host.remove_on = Some((DomEventType::MouseDown, a));
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(50., 50., 0));
    assert_eq!(handler.host().targets_of(DomEventType::MouseDown), vec![a]);
    assert_eq!(handler.mouse_press_node(), None);
}

#[test]
fn test_removing_an_ancestor_clears_its_descendants() {
    let mut host = FakeHost::new();
    let outer = host.add_element(ROOT, rect(0., 0., 200., 200.));
    let inner = host.add_element(outer, rect(0., 0., 100., 100.));
    let mut handler = handler(host);

    handler.handle_mouse_move_event(&hover(50., 50., 0));
    assert_eq!(handler.node_under_mouse(), Some(inner));

    handler.node_will_be_removed(outer);
    assert_eq!(handler.node_under_mouse(), None);
}

#[test]
fn test_removing_an_unrelated_node_keeps_state() {
    let (mut host, a) = one_box();
    let other = host.add_element(ROOT, rect(300., 300., 50., 50.));
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(50., 50., 0));
    handler.node_will_be_removed(other);
    assert_eq!(handler.click_node(), Some(a));
    assert_eq!(handler.mouse_press_node(), Some(a));
}

#[test]
fn test_touch_on_a_removed_node_goes_to_its_parent() {
    let (mut host, a) = one_box();
    host.touch_listeners = true;
    let mut handler = handler(host);

    let touch = |state, millis| {
        PlatformTouchEvent::new(
            vec![PlatformTouchPoint::new(
                TouchId(0),
                state,
                DocumentPoint::new(50., 50.),
            )],
            Duration::from_millis(millis),
        )
    };

    handler.handle_touch_event(&touch(TouchPointState::Pressed, 0));
    assert_eq!(handler.host().targets_of(DomEventType::TouchStart), vec![a]);

    handler.node_will_be_removed(a);
    handler.host_mut().remove(a);

    handler.handle_touch_event(&touch(TouchPointState::Moved, 10));
    assert_eq!(handler.host().targets_of(DomEventType::TouchMove), vec![ROOT]);
}

#[test]
fn test_removed_wheel_latch_latches_again() {
    let (host, a) = one_box();
    let mut handler = handler(host);

    handler.handle_wheel_event(&wheel(WheelPhase::Began, 50., 50., 10., 0));
    handler.node_will_be_removed(a);
    handler.host_mut().remove(a);
    handler.handle_wheel_event(&wheel(WheelPhase::Changed, 50., 50., 10., 10));

    assert_eq!(handler.host().targets_of(DomEventType::Wheel), vec![a, ROOT]);
}

#[test]
fn test_reset_forgets_the_pointer() {
    let (host, _) = one_box();
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(50., 50., 0));
    assert!(handler.mouse_pressed());

    handler.reset();
    assert!(!handler.mouse_pressed());
    assert_eq!(handler.click_count(), 0);
    assert_eq!(handler.click_node(), None);
    assert_eq!(handler.last_known_mouse_position(), None);
    assert_eq!(handler.next_timer_deadline(), None);
}
