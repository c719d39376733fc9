/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Duration;

use input_traits::{
    Cursor, DocumentPoint, DomEventType, InputPreferences, MouseAction, MouseButton, NodeId,
    ScrollbarId, Selection, TextGranularity, TextPosition,
};
use keyboard_types::Modifiers;

use crate::fake_host::{
    FakeHost, ROOT, drag_to, handler, handler_with_prefs, hover, mouse_event, press, rect,
    release,
};

fn button_page() -> (FakeHost, NodeId) {
    let mut host = FakeHost::new();
    let button = host.add_element(ROOT, rect(10., 10., 100., 30.));
    host.node_mut(button).focusable = true;
    (host, button)
}

/// A paragraph holding "hello world", one text run ten pixels per character wide.
fn text_page() -> (FakeHost, NodeId, NodeId) {
    let mut host = FakeHost::new();
    let paragraph = host.add_element(ROOT, rect(10., 10., 300., 20.));
    let text = host.add_text(paragraph, rect(10., 10., 300., 20.), "hello world");
    (host, paragraph, text)
}

fn two_boxes() -> (FakeHost, NodeId, NodeId) {
    let mut host = FakeHost::new();
    let a = host.add_element(ROOT, rect(0., 0., 100., 100.));
    let b = host.add_element(ROOT, rect(200., 0., 100., 100.));
    (host, a, b)
}

fn at(node: NodeId, offset: u32) -> TextPosition {
    TextPosition { node, offset }
}

#[test]
fn test_click_fires_after_mousedown_and_mouseup() {
    let (host, button) = button_page();
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(20., 20., 0));
    assert!(!handler.handle_mouse_release_event(&release(20., 20., 50)));

    assert_eq!(
        handler.host().event_types(),
        vec![
            DomEventType::MouseOver,
            DomEventType::MouseEnter,
            DomEventType::MouseEnter,
            DomEventType::MouseDown,
            DomEventType::SelectStart,
            DomEventType::MouseUp,
            DomEventType::Click,
        ]
    );
    assert_eq!(handler.host().targets_of(DomEventType::MouseEnter), vec![ROOT, button]);
    assert_eq!(handler.host().targets_of(DomEventType::Click), vec![button]);

    let click = handler.host().last_event_of(DomEventType::Click).unwrap();
    assert_eq!(click.detail.as_mouse().unwrap().detail, 1);
    assert_eq!(handler.host().focus_changes, vec![Some(button)]);

    // The release ends the click sequence.
    assert_eq!(handler.click_count(), 0);
    assert_eq!(handler.click_node(), None);
    assert!(!handler.mouse_pressed());
}

#[test]
fn test_mouse_events_never_target_text_nodes() {
    let (host, paragraph, _) = text_page();
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(35., 15., 0));
    handler.handle_mouse_release_event(&release(35., 15., 10));

    assert_eq!(handler.host().targets_of(DomEventType::MouseDown), vec![paragraph]);
    assert_eq!(handler.host().targets_of(DomEventType::MouseUp), vec![paragraph]);
    assert_eq!(handler.host().targets_of(DomEventType::Click), vec![paragraph]);
}

#[test]
fn test_release_on_another_element_is_not_a_click() {
    let (host, a, b) = two_boxes();
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(50., 50., 0));
    handler.handle_mouse_release_event(&release(250., 50., 10));

    assert_eq!(handler.host().targets_of(DomEventType::MouseDown), vec![a]);
    assert_eq!(handler.host().targets_of(DomEventType::MouseUp), vec![b]);
    assert!(handler.host().targets_of(DomEventType::Click).is_empty());
}

#[test]
fn test_right_button_release_is_not_a_click() {
    let (host, button) = button_page();
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&mouse_event(
        MouseAction::Pressed,
        Some(MouseButton::Right),
        20.,
        20.,
        0,
    ));
    handler.handle_mouse_release_event(&mouse_event(
        MouseAction::Released,
        Some(MouseButton::Right),
        20.,
        20.,
        10,
    ));

    assert_eq!(handler.host().targets_of(DomEventType::MouseUp), vec![button]);
    assert!(handler.host().targets_of(DomEventType::Click).is_empty());
    assert!(handler.host().targets_of(DomEventType::ContextMenu).is_empty());
}

#[test]
fn test_double_click_selects_a_word_and_fires_dblclick() {
    let (host, paragraph, text) = text_page();
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(35., 15., 0));
    handler.handle_mouse_release_event(&release(35., 15., 10));
    assert_eq!(handler.host().selection, Some(Selection::caret(at(text, 3))));

    handler.handle_mouse_press_event(&press(35., 15., 100));
    assert_eq!(handler.click_count(), 2);
    assert_eq!(
        handler.host().selection,
        Some(Selection::range(at(text, 0), at(text, 5), TextGranularity::Word))
    );

    handler.handle_mouse_release_event(&release(35., 15., 110));
    let types = handler.host().event_types();
    let last_click = types.iter().rposition(|t| *t == DomEventType::Click).unwrap();
    let dblclick = types.iter().position(|t| *t == DomEventType::DblClick).unwrap();
    assert!(last_click < dblclick);
    assert_eq!(handler.host().targets_of(DomEventType::DblClick), vec![paragraph]);

    let dblclick = handler.host().last_event_of(DomEventType::DblClick).unwrap();
    assert_eq!(dblclick.detail.as_mouse().unwrap().detail, 2);

    // The release keeps the word selected.
    assert_eq!(
        handler.host().selection,
        Some(Selection::range(at(text, 0), at(text, 5), TextGranularity::Word))
    );
}

#[test]
fn test_triple_click_selects_the_paragraph() {
    let (host, _, text) = text_page();
    let mut handler = handler(host);

    for (index, millis) in [0, 100, 200].into_iter().enumerate() {
        handler.handle_mouse_press_event(&press(35., 15., millis));
        assert_eq!(handler.click_count(), index as u32 + 1);
        handler.handle_mouse_release_event(&release(35., 15., millis + 10));
    }

    assert_eq!(
        handler.host().selection,
        Some(Selection::range(at(text, 0), at(text, 11), TextGranularity::Paragraph))
    );
}

#[test]
fn test_fourth_and_fifth_clicks_keep_the_paragraph() {
    let (host, _, text) = text_page();
    let mut handler = handler(host);

    for (index, millis) in [0, 100, 200, 300, 400].into_iter().enumerate() {
        handler.handle_mouse_press_event(&press(35., 15., millis));
        assert_eq!(handler.click_count(), index as u32 + 1);
        handler.handle_mouse_release_event(&release(35., 15., millis + 10));
    }

    assert_eq!(
        handler.host().selection,
        Some(Selection::range(at(text, 0), at(text, 11), TextGranularity::Paragraph))
    );
    assert_eq!(handler.host().targets_of(DomEventType::DblClick).len(), 1);
    let click = handler.host().last_event_of(DomEventType::Click).unwrap();
    assert_eq!(click.detail.as_mouse().unwrap().detail, 5);
}

#[test]
fn test_slow_second_press_starts_a_new_click_sequence() {
    let (host, _, _) = text_page();
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(35., 15., 0));
    handler.handle_mouse_release_event(&release(35., 15., 10));
    handler.handle_mouse_press_event(&press(35., 15., 400));
    assert_eq!(handler.click_count(), 1);
    assert!(handler.host().targets_of(DomEventType::DblClick).is_empty());
}

#[test]
fn test_platform_click_count_is_used_as_is() {
    let (host, _) = button_page();
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(20., 20., 0).with_click_count(3));
    assert_eq!(handler.click_count(), 3);
    let mousedown = handler.host().last_event_of(DomEventType::MouseDown).unwrap();
    assert_eq!(mousedown.detail.as_mouse().unwrap().detail, 3);
}

#[test]
fn test_shift_click_extends_the_selection() {
    let (host, _, text) = text_page();
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(20., 15., 0));
    handler.handle_mouse_release_event(&release(20., 15., 10));
    assert_eq!(handler.host().selection, Some(Selection::caret(at(text, 1))));

    handler.handle_mouse_press_event(&press(80., 15., 1000).with_modifiers(Modifiers::SHIFT));
    assert_eq!(
        handler.host().selection,
        Some(Selection::range(at(text, 1), at(text, 7), TextGranularity::Character))
    );
}

#[test]
fn test_moving_between_siblings_fires_out_before_over() {
    let (host, a, b) = two_boxes();
    let mut handler = handler(host);

    handler.handle_mouse_move_event(&hover(50., 50., 0));
    assert_eq!(handler.node_under_mouse(), Some(a));
    handler.host_mut().clear_records();

    handler.handle_mouse_move_event(&hover(250., 50., 10));
    let events: Vec<_> = handler
        .host()
        .events
        .iter()
        .map(|(target, event)| (event.event_type, *target))
        .collect();
    assert_eq!(
        events,
        vec![
            (DomEventType::MouseOut, a),
            (DomEventType::MouseLeave, a),
            (DomEventType::MouseOver, b),
            (DomEventType::MouseEnter, b),
            (DomEventType::MouseMove, b),
        ]
    );

    let mouseout = handler.host().last_event_of(DomEventType::MouseOut).unwrap();
    assert_eq!(mouseout.detail.as_mouse().unwrap().related_target, Some(b));
    let mouseover = handler.host().last_event_of(DomEventType::MouseOver).unwrap();
    assert_eq!(mouseover.detail.as_mouse().unwrap().related_target, Some(a));
}

#[test]
fn test_hover_cursor_follows_content() {
    let mut host = FakeHost::new();
    let link = host.add_element(ROOT, rect(0., 0., 100., 20.));
    host.node_mut(link).link = true;
    let paragraph = host.add_element(ROOT, rect(0., 100., 300., 20.));
    host.add_text(paragraph, rect(0., 100., 300., 20.), "some text");
    let mut handler = handler(host);

    handler.handle_mouse_move_event(&hover(10., 10., 0));
    assert_eq!(handler.current_cursor(), Some(Cursor::Pointer));

    handler.handle_mouse_move_event(&hover(10., 110., 10));
    assert_eq!(handler.current_cursor(), Some(Cursor::Text));

    handler.handle_mouse_move_event(&hover(500., 500., 20));
    assert_eq!(handler.current_cursor(), Some(Cursor::Default));

    // The embedder only hears about changes.
    handler.handle_mouse_move_event(&hover(510., 500., 30));
    assert_eq!(
        handler.host().cursors,
        vec![Cursor::Pointer, Cursor::Text, Cursor::Default]
    );
}

#[test]
fn test_cancelled_mousedown_keeps_focus_and_selection() {
    let (mut host, button) = button_page();
    host.prevented.push((DomEventType::MouseDown, button));
    let mut handler = handler(host);

    assert!(handler.handle_mouse_press_event(&press(20., 20., 0)));
    assert!(handler.host().focus_changes.is_empty());
    assert!(handler.host().targets_of(DomEventType::SelectStart).is_empty());
    assert_eq!(handler.host().selection, None);
}

#[test]
fn test_vetoed_focus_change_swallows_the_press() {
    let (mut host, _) = button_page();
    host.veto_focus_changes = true;
    let mut handler = handler(host);

    assert!(handler.handle_mouse_press_event(&press(20., 20., 0)));
    assert!(handler.host().targets_of(DomEventType::SelectStart).is_empty());
}

#[test]
fn test_cancelled_selectstart_leaves_the_selection_alone() {
    let (mut host, _, text) = text_page();
    host.prevented.push((DomEventType::SelectStart, text));
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(35., 15., 0));
    assert_eq!(handler.host().selection, None);
}

#[test]
fn test_dragging_over_text_extends_the_selection_and_autoscrolls() {
    let (host, _, text) = text_page();
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(20., 15., 0));
    assert!(handler.handle_mouse_move_event(&drag_to(80., 15., 50)));

    assert_eq!(
        handler.host().selection,
        Some(Selection::range(at(text, 1), at(text, 7), TextGranularity::Character))
    );
    assert!(handler.is_autoscroll_in_progress());
    assert_eq!(handler.current_cursor(), Some(Cursor::Text));

    let deadline = handler.next_timer_deadline().unwrap();
    handler.fire_timers(deadline);
    assert_eq!(handler.host().autoscroll_steps, vec![ROOT]);

    handler.handle_mouse_release_event(&release(80., 15., 150));
    assert!(!handler.is_autoscroll_in_progress());
    assert_eq!(handler.host().stopped_autoscrolls, vec![ROOT]);
    assert_eq!(
        handler.host().selection,
        Some(Selection::range(at(text, 1), at(text, 7), TextGranularity::Character))
    );
}

#[test]
fn test_node_removed_by_mousedown_listener_gets_no_click() {
    let (mut host, button) = button_page();
    host.remove_on = Some((DomEventType::MouseDown, button));
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(20., 20., 0));
    handler.handle_mouse_release_event(&release(20., 20., 10));

    assert_eq!(handler.host().targets_of(DomEventType::MouseUp), vec![ROOT]);
    assert!(handler.host().targets_of(DomEventType::Click).is_empty());
}

#[test]
fn test_middle_button_pan_ends_on_the_next_press() {
    let (host, _, _) = two_boxes();
    let prefs = InputPreferences {
        supports_pan_scroll: true,
        ..InputPreferences::default()
    };
    let mut handler = handler_with_prefs(host, prefs);

    let middle = |action, millis| mouse_event(action, Some(MouseButton::Middle), 50., 50., millis);
    assert!(handler.handle_mouse_press_event(&middle(MouseAction::Pressed, 0)));
    assert!(handler.is_pan_scroll_in_progress());
    assert_eq!(handler.current_cursor(), Some(Cursor::AllScroll));

    // Releasing without moving leaves the pan running until the next press.
    handler.handle_mouse_release_event(&middle(MouseAction::Released, 10));
    assert!(handler.is_pan_scroll_in_progress());
    assert!(handler.host().targets_of(DomEventType::Click).is_empty());

    handler.host_mut().clear_records();
    assert!(handler.handle_mouse_press_event(&press(50., 50., 500)));
    assert!(!handler.is_pan_scroll_in_progress());
    assert_eq!(handler.host().stopped_autoscrolls, vec![ROOT]);
    assert_eq!(handler.current_cursor(), Some(Cursor::Default));
    assert!(handler.host().targets_of(DomEventType::MouseDown).is_empty());
}

#[test]
fn test_context_menu_key_targets_the_focused_element() {
    let (mut host, button) = button_page();
    host.focused = Some(button);
    let mut handler = handler(host);

    assert!(!handler.send_context_menu_event_for_key());
    assert_eq!(handler.host().targets_of(DomEventType::ContextMenu), vec![button]);
    let contextmenu = handler.host().last_event_of(DomEventType::ContextMenu).unwrap();
    assert_eq!(
        contextmenu.detail.as_mouse().unwrap().client_point,
        DocumentPoint::new(10., 39.)
    );
}

#[test]
fn test_pan_dragged_away_from_its_origin_ends_on_release() {
    let (host, _, _) = two_boxes();
    let prefs = InputPreferences {
        supports_pan_scroll: true,
        ..InputPreferences::default()
    };
    let mut handler = handler_with_prefs(host, prefs);

    let middle = |action, x, millis| mouse_event(action, Some(MouseButton::Middle), x, 50., millis);
    handler.handle_mouse_press_event(&middle(MouseAction::Pressed, 50., 0));
    handler.handle_mouse_move_event(&middle(MouseAction::Moved, 200., 20));
    handler.fire_timers(Duration::from_millis(50));
    assert_eq!(handler.current_cursor(), Some(Cursor::EResize));
    assert!(handler.host().stopped_autoscrolls.is_empty());

    handler.handle_mouse_release_event(&middle(MouseAction::Released, 200., 60));
    assert!(!handler.is_pan_scroll_in_progress());
    assert_eq!(handler.host().stopped_autoscrolls, vec![ROOT]);
    assert_eq!(handler.current_cursor(), Some(Cursor::Default));
    assert_eq!(handler.next_timer_deadline(), None);
}

#[test]
fn test_release_on_a_scrollbar_ends_the_press() {
    let (mut host, _, _) = text_page();
    host.view_scrollbar = Some((ScrollbarId(1), rect(780., 0., 20., 600.)));
    let mut handler = handler(host);

    handler.handle_mouse_press_event(&press(790., 300., 0));
    assert!(handler.mouse_pressed());
    assert!(handler.drag_gesture().mouse_down_may_start_drag());

    handler.handle_mouse_release_event(&release(790., 300., 10));
    assert_eq!(handler.host().scrollbar_releases, vec![ScrollbarId(1)]);
    assert!(!handler.mouse_pressed());
    assert!(!handler.drag_gesture().mouse_down_may_start_drag());
    assert!(handler.host().targets_of(DomEventType::Click).is_empty());
}
