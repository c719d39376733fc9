/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Duration;

use input_traits::{
    DocumentPoint, DocumentVector, DomEventType, InputPreferences, NodeId, PlatformWheelEvent,
    ScrollAxis, WheelDelta, WheelMode, WheelPhase,
};

use crate::fake_host::{FakeHost, ROOT, Scroll, handler, handler_with_prefs, rect};

fn two_boxes() -> (FakeHost, NodeId, NodeId) {
    let mut host = FakeHost::new();
    let a = host.add_element(ROOT, rect(0., 0., 100., 100.));
    let b = host.add_element(ROOT, rect(200., 0., 100., 100.));
    (host, a, b)
}

pub(crate) fn wheel(
    phase: WheelPhase,
    x: f32,
    y: f32,
    dy: f64,
    millis: u64,
) -> PlatformWheelEvent {
    let delta = WheelDelta {
        x: 0.,
        y: dy,
        z: 0.,
        mode: WheelMode::DeltaPixel,
    };
    let mut event = PlatformWheelEvent::new(
        delta,
        DocumentPoint::new(x, y),
        Duration::from_millis(millis),
    );
    event.phase = phase;
    event
}

#[test]
fn test_gesture_stays_latched_to_its_first_target() {
    let (host, a, b) = two_boxes();
    let mut handler = handler(host);

    handler.handle_wheel_event(&wheel(WheelPhase::Began, 50., 50., 10., 0));
    handler.handle_wheel_event(&wheel(WheelPhase::Changed, 250., 50., 10., 10));
    // A discrete event is never latched.
    handler.handle_wheel_event(&wheel(WheelPhase::None, 250., 50., 10., 20));

    assert_eq!(handler.host().targets_of(DomEventType::Wheel), vec![a, a, b]);
}

#[test]
fn test_new_gesture_latches_again() {
    let (host, a, b) = two_boxes();
    let mut handler = handler(host);

    handler.handle_wheel_event(&wheel(WheelPhase::Began, 50., 50., 10., 0));
    handler.handle_wheel_event(&wheel(WheelPhase::Changed, 50., 50., 10., 10));
    handler.handle_wheel_event(&wheel(WheelPhase::Began, 250., 50., 10., 20));

    assert_eq!(handler.host().targets_of(DomEventType::Wheel), vec![a, a, b]);
}

#[test]
fn test_latching_can_be_turned_off() {
    let (host, a, b) = two_boxes();
    let prefs = InputPreferences {
        wheel_latching: false,
        ..InputPreferences::default()
    };
    let mut handler = handler_with_prefs(host, prefs);

    handler.handle_wheel_event(&wheel(WheelPhase::Began, 50., 50., 10., 0));
    handler.handle_wheel_event(&wheel(WheelPhase::Changed, 250., 50., 10., 10));

    assert_eq!(handler.host().targets_of(DomEventType::Wheel), vec![a, b]);
}

#[test]
fn test_cancelled_wheel_does_not_scroll() {
    let (mut host, a, _) = two_boxes();
    host.prevented.push((DomEventType::Wheel, a));
    let mut handler = handler(host);

    assert!(handler.handle_wheel_event(&wheel(WheelPhase::None, 50., 50., 10., 0)));
    assert!(handler.host().scrolls.is_empty());
}

#[test]
fn test_unscrollable_content_scrolls_the_view() {
    let (host, a, _) = two_boxes();
    let mut handler = handler(host);

    assert!(!handler.handle_wheel_event(&wheel(WheelPhase::None, 50., 50., -10., 0)));
    assert_eq!(
        handler.host().scrolls,
        vec![
            Scroll::Node(a, ScrollAxis::Vertical, -10.),
            Scroll::View(DocumentVector::new(0., -10.)),
        ]
    );
}

#[test]
fn test_scrolled_box_stops_the_wheel() {
    let (mut host, a, _) = two_boxes();
    host.nodes_scroll = true;
    let mut handler = handler(host);

    assert!(handler.handle_wheel_event(&wheel(WheelPhase::None, 50., 50., 10., 0)));
    assert_eq!(
        handler.host().scrolls,
        vec![Scroll::Node(a, ScrollAxis::Vertical, 10.)]
    );
}
