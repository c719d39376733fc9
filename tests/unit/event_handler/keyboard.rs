/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Duration;

use event_handler::COMPOSITION_EVENT_KEY_CODE;
use input_traits::{
    DomEventType, EventDefault, FocusDirection, InputPreferences, KeyEventKind,
    KeyboardEventDetail, LogicalScrollDirection, MouseAction, MouseButton, NodeId,
    PlatformKeyboardEvent,
};
use keyboard_types::{Code, Key, KeyState, KeyboardEvent, Modifiers, NamedKey};

use crate::fake_host::{FakeHost, ROOT, Scroll, handler, handler_with_prefs, mouse_event, rect};

fn key_event(
    kind: KeyEventKind,
    key: Key,
    code: Code,
    modifiers: Modifiers,
) -> PlatformKeyboardEvent {
    let state = match kind {
        KeyEventKind::KeyUp => KeyState::Up,
        _ => KeyState::Down,
    };
    let event = KeyboardEvent {
        state,
        key,
        code,
        modifiers,
        ..Default::default()
    };
    PlatformKeyboardEvent::new(kind, event, Duration::ZERO)
}

fn key_down(key: Key, code: Code, modifiers: Modifiers) -> PlatformKeyboardEvent {
    key_event(KeyEventKind::KeyDown, key, code, modifiers)
}

fn character(text: &str, code: Code) -> PlatformKeyboardEvent {
    key_down(Key::Character(text.into()), code, Modifiers::empty())
}

fn focused_input() -> (FakeHost, NodeId) {
    let mut host = FakeHost::new();
    let input = host.add_element(ROOT, rect(10., 10., 200., 20.));
    host.node_mut(input).focusable = true;
    host.node_mut(input).editable = true;
    host.focused = Some(input);
    (host, input)
}

#[test]
fn test_key_down_splits_into_keydown_and_keypress() {
    let (host, input) = focused_input();
    let mut handler = handler(host);

    assert!(!handler.handle_keyboard_event(&character("a", Code::KeyA)));

    assert_eq!(
        handler.host().event_types(),
        vec![DomEventType::KeyDown, DomEventType::KeyPress]
    );
    assert_eq!(handler.host().targets_of(DomEventType::KeyPress), vec![input]);

    let keydown = handler.host().last_event_of(DomEventType::KeyDown).unwrap();
    match keydown.detail.as_keyboard() {
        Some(KeyboardEventDetail::KeyDown(raw)) => {
            assert_eq!(raw.code, Code::KeyA);
            assert_eq!(raw.key_code, 65);
        },
        detail => panic!("unexpected detail {:?}", detail),
    }
    let keypress = handler.host().last_event_of(DomEventType::KeyPress).unwrap();
    match keypress.detail.as_keyboard() {
        Some(KeyboardEventDetail::KeyPress(input)) => assert_eq!(input.text, "a"),
        detail => panic!("unexpected detail {:?}", detail),
    }

    // Editing sees both phases.
    assert_eq!(handler.host().editing_keys.len(), 2);
}

#[test]
fn test_cancelled_keydown_suppresses_keypress() {
    let (mut host, input) = focused_input();
    host.prevented.push((DomEventType::KeyDown, input));
    let mut handler = handler(host);

    assert!(handler.handle_keyboard_event(&character("a", Code::KeyA)));
    assert_eq!(handler.host().event_types(), vec![DomEventType::KeyDown]);
    assert!(handler.host().editing_keys.is_empty());
}

#[test]
fn test_keydown_cancelled_by_an_ancestor_suppresses_keypress() {
    let (mut host, _) = focused_input();
    host.prevented.push((DomEventType::KeyDown, ROOT));
    let mut handler = handler(host);

    assert!(handler.handle_keyboard_event(&character("a", Code::KeyA)));
    assert!(handler.host().targets_of(DomEventType::KeyPress).is_empty());
}

#[test]
fn test_input_method_keys_report_the_composition_key_code() {
    let (mut host, _) = focused_input();
    host.input_method_consumes_keys = true;
    let mut handler = handler(host);

    assert!(handler.handle_keyboard_event(&character("a", Code::KeyA)));
    assert_eq!(handler.host().event_types(), vec![DomEventType::KeyDown]);

    let keydown = handler.host().last_event_of(DomEventType::KeyDown).unwrap();
    assert_eq!(keydown.initial_default, EventDefault::Handled);
    match keydown.detail.as_keyboard() {
        Some(KeyboardEventDetail::KeyDown(raw)) => {
            assert_eq!(raw.key_code, COMPOSITION_EVENT_KEY_CODE)
        },
        detail => panic!("unexpected detail {:?}", detail),
    }
}

#[test]
fn test_keys_go_to_the_root_without_focus() {
    let mut handler = handler(FakeHost::new());
    handler.handle_keyboard_event(&character("x", Code::KeyX));
    assert_eq!(handler.host().targets_of(DomEventType::KeyDown), vec![ROOT]);
    assert_eq!(handler.host().targets_of(DomEventType::KeyPress), vec![ROOT]);
}

#[test]
fn test_raw_key_down_and_char_are_dispatched_separately() {
    let (host, _) = focused_input();
    let mut handler = handler(host);

    handler.handle_keyboard_event(&key_event(
        KeyEventKind::RawKeyDown,
        Key::Character("q".into()),
        Code::KeyQ,
        Modifiers::empty(),
    ));
    assert_eq!(handler.host().event_types(), vec![DomEventType::KeyDown]);

    handler.handle_keyboard_event(&key_event(
        KeyEventKind::Char,
        Key::Character("q".into()),
        Code::KeyQ,
        Modifiers::empty(),
    ));
    handler.handle_keyboard_event(&key_event(
        KeyEventKind::KeyUp,
        Key::Character("q".into()),
        Code::KeyQ,
        Modifiers::empty(),
    ));
    assert_eq!(
        handler.host().event_types(),
        vec![DomEventType::KeyDown, DomEventType::KeyPress, DomEventType::KeyUp]
    );
}

#[test]
fn test_access_key_runs_before_keydown_and_cancels_it() {
    let mut host = FakeHost::new();
    let save = host.add_element(ROOT, rect(0., 0., 50., 20.));
    host.node_mut(save).access_key = Some("s".to_owned());
    let mut handler = handler(host);

    assert!(handler.handle_keyboard_event(&key_down(
        Key::Character("s".into()),
        Code::KeyS,
        Modifiers::ALT,
    )));

    assert_eq!(handler.host().access_key_actions, vec![save]);
    let keydown = handler.host().last_event_of(DomEventType::KeyDown).unwrap();
    assert_eq!(keydown.initial_default, EventDefault::Prevented);
    assert!(handler.host().targets_of(DomEventType::KeyPress).is_empty());
}

#[test]
fn test_access_key_needs_its_modifiers() {
    let mut host = FakeHost::new();
    let save = host.add_element(ROOT, rect(0., 0., 50., 20.));
    host.node_mut(save).access_key = Some("s".to_owned());
    let mut handler = handler(host);

    handler.handle_keyboard_event(&character("s", Code::KeyS));
    assert!(handler.host().access_key_actions.is_empty());
    assert_eq!(handler.host().targets_of(DomEventType::KeyPress), vec![ROOT]);

    // Shift never takes part in the match.
    handler.handle_keyboard_event(&key_down(
        Key::Character("S".into()),
        Code::KeyS,
        Modifiers::ALT | Modifiers::SHIFT,
    ));
    assert_eq!(handler.host().access_key_actions, vec![save]);
}

#[test]
fn test_tab_advances_focus() {
    let (host, _) = focused_input();
    let mut handler = handler(host);

    assert!(handler.handle_keyboard_event(&key_down(
        Key::Named(NamedKey::Tab),
        Code::Tab,
        Modifiers::empty(),
    )));
    assert!(handler.handle_keyboard_event(&key_down(
        Key::Named(NamedKey::Tab),
        Code::Tab,
        Modifiers::SHIFT,
    )));
    assert_eq!(
        handler.host().focus_moves,
        vec![FocusDirection::Forward, FocusDirection::Backward]
    );
    assert!(handler.host().targets_of(DomEventType::KeyPress).is_empty());
}

#[test]
fn test_control_tab_is_left_to_the_embedder() {
    let (host, _) = focused_input();
    let mut handler = handler(host);

    assert!(!handler.handle_keyboard_event(&key_down(
        Key::Named(NamedKey::Tab),
        Code::Tab,
        Modifiers::CONTROL,
    )));
    assert!(handler.host().focus_moves.is_empty());
}

#[test]
fn test_space_scrolls_a_page() {
    let mut handler = handler(FakeHost::new());

    assert!(handler.handle_keyboard_event(&character(" ", Code::Space)));
    assert_eq!(
        handler.host().scrolls,
        vec![Scroll::Logical(LogicalScrollDirection::BlockForward)]
    );
}

#[test]
fn test_key_press_ends_a_pan_scroll_without_dispatching() {
    let prefs = InputPreferences {
        supports_pan_scroll: true,
        ..InputPreferences::default()
    };
    let mut handler = handler_with_prefs(FakeHost::new(), prefs);
    handler.handle_mouse_press_event(&mouse_event(
        MouseAction::Pressed,
        Some(MouseButton::Middle),
        100.,
        100.,
        0,
    ));
    assert!(handler.is_pan_scroll_in_progress());
    handler.host_mut().clear_records();

    assert!(handler.handle_keyboard_event(&character("a", Code::KeyA)));
    assert!(!handler.is_pan_scroll_in_progress());
    assert!(handler.host().events.is_empty());
}
