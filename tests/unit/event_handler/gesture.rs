/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Duration;

use input_traits::{
    DocumentPoint, DocumentSize, DocumentVector, DomEventType, GestureType, InputPreferences,
    NodeId, PlatformGestureEvent, ScrollAxis,
};

use crate::fake_host::{FakeHost, ROOT, Scroll, handler, handler_with_prefs, rect};

fn button_page() -> (FakeHost, NodeId) {
    let mut host = FakeHost::new();
    let button = host.add_element(ROOT, rect(10., 10., 100., 30.));
    host.node_mut(button).focusable = true;
    (host, button)
}

fn gesture(gesture_type: GestureType, x: f32, y: f32, millis: u64) -> PlatformGestureEvent {
    PlatformGestureEvent::new(
        gesture_type,
        DocumentPoint::new(x, y),
        Duration::from_millis(millis),
    )
}

fn mouse_event_types(host: &FakeHost) -> Vec<DomEventType> {
    host.event_types()
        .into_iter()
        .filter(|event_type| {
            matches!(
                event_type,
                DomEventType::MouseMove |
                    DomEventType::MouseDown |
                    DomEventType::MouseUp |
                    DomEventType::Click |
                    DomEventType::DblClick
            )
        })
        .collect()
}

#[test]
fn test_tap_is_a_move_press_and_release() {
    let (host, button) = button_page();
    let mut handler = handler(host);

    handler.handle_gesture_event(&gesture(GestureType::Tap, 20., 20., 0));

    assert_eq!(
        mouse_event_types(handler.host()),
        vec![
            DomEventType::MouseMove,
            DomEventType::MouseDown,
            DomEventType::MouseUp,
            DomEventType::Click
        ]
    );
    assert_eq!(handler.host().targets_of(DomEventType::Click), vec![button]);
}

#[test]
fn test_double_tap_fires_dblclick() {
    let (host, button) = button_page();
    let mut handler = handler(host);

    handler.handle_gesture_event(
        &gesture(GestureType::Tap, 20., 20., 0).with_delta(DocumentVector::new(2., 0.)),
    );

    assert_eq!(handler.host().targets_of(DomEventType::DblClick), vec![button]);
    let click = handler.host().last_event_of(DomEventType::Click).unwrap();
    assert_eq!(click.detail.as_mouse().unwrap().detail, 2);
}

#[test]
fn test_scroll_gesture_scrolls_the_node_it_began_on() {
    let (host, button) = button_page();
    let mut handler = handler(host);

    handler.handle_gesture_event(&gesture(GestureType::ScrollBegin, 20., 20., 0));
    assert_eq!(
        handler.gesture_adapter().scroll_gesture_handling_node(),
        Some(button)
    );

    // The finger has left the button, but the gesture still belongs to it.
    handler.handle_gesture_event(
        &gesture(GestureType::ScrollUpdate, 500., 500., 10)
            .with_delta(DocumentVector::new(0., -30.)),
    );
    assert_eq!(
        handler.host().scrolls,
        vec![
            Scroll::Node(button, ScrollAxis::Vertical, -30.),
            Scroll::View(DocumentVector::new(0., -30.)),
        ]
    );

    assert!(handler.handle_gesture_event(&gesture(GestureType::ScrollEnd, 500., 500., 20)));
    assert_eq!(handler.gesture_adapter().scroll_gesture_handling_node(), None);
}

#[test]
fn test_empty_scroll_update_does_nothing() {
    let (host, _) = button_page();
    let mut handler = handler(host);

    handler.handle_gesture_event(&gesture(GestureType::ScrollBegin, 20., 20., 0));
    assert!(!handler.handle_gesture_event(&gesture(GestureType::ScrollUpdate, 20., 20., 10)));
    assert!(handler.host().scrolls.is_empty());
}

#[test]
fn test_cancelled_gesture_event_claims_the_scroll() {
    let (mut host, button) = button_page();
    host.prevented.push((DomEventType::GestureScrollStart, button));
    let prefs = InputPreferences {
        dispatch_gesture_events: true,
        ..InputPreferences::default()
    };
    let mut handler = handler_with_prefs(host, prefs);

    assert!(handler.handle_gesture_event(&gesture(GestureType::ScrollBegin, 20., 20., 0)));
    assert_eq!(
        handler.host().targets_of(DomEventType::GestureScrollStart),
        vec![button]
    );
    assert_eq!(
        handler.gesture_adapter().scroll_gesture_handling_node(),
        Some(button)
    );
}

#[test]
fn test_tap_down_stops_scroll_animations() {
    let (host, _) = button_page();
    let mut handler = handler(host);

    assert!(!handler.handle_gesture_event(&gesture(GestureType::TapDown, 20., 20., 0)));
    assert_eq!(handler.host().cancelled_scroll_animations, 1);
    assert!(handler.host().events.is_empty());
}

#[test]
fn test_long_press_shows_one_context_menu() {
    let (host, button) = button_page();
    let mut handler = handler(host);

    handler.handle_gesture_event(&gesture(GestureType::LongPress, 20., 20., 0));
    assert_eq!(handler.host().targets_of(DomEventType::ContextMenu), vec![button]);

    // The long tap that ends the press has nothing left to show.
    assert!(!handler.handle_gesture_event(&gesture(GestureType::LongTap, 20., 20., 500)));
    assert_eq!(handler.host().targets_of(DomEventType::ContextMenu), vec![button]);
}

#[test]
fn test_long_tap_alone_shows_the_context_menu() {
    let (host, button) = button_page();
    let mut handler = handler(host);

    handler.handle_gesture_event(&gesture(GestureType::LongTap, 20., 20., 0));
    assert_eq!(handler.host().targets_of(DomEventType::ContextMenu), vec![button]);
}

#[test]
fn test_tap_snaps_to_a_nearby_link() {
    let mut host = FakeHost::new();
    let link = host.add_element(ROOT, rect(100., 100., 40., 20.));
    host.node_mut(link).link = true;
    let prefs = InputPreferences {
        supports_touch_adjustment: true,
        ..InputPreferences::default()
    };
    let mut handler = handler_with_prefs(host, prefs);

    handler.handle_gesture_event(
        &gesture(GestureType::Tap, 95., 95., 0).with_area(DocumentSize::new(20., 20.)),
    );
    assert_eq!(handler.host().targets_of(DomEventType::Click), vec![link]);
}

#[test]
fn test_touch_adjustment_prefers_clickable_nodes() {
    let mut host = FakeHost::new();
    host.add_element(ROOT, rect(40., 40., 20., 20.));
    let link = host.add_element(ROOT, rect(62., 40., 20., 20.));
    host.node_mut(link).link = true;
    let mut handler = handler(host);

    let center = DocumentPoint::new(50., 50.);
    let radius = DocumentSize::new(15., 15.);
    let best = handler.best_clickable_node_for_touch_point(center, radius);
    assert_eq!(best, Some((link, DocumentPoint::new(62., 50.))));

    let zoomable = handler.best_zoomable_area_for_touch_point(center, radius);
    assert_eq!(zoomable.map(|(node, _)| node), Some(NodeId::new(1, 0)));
}
