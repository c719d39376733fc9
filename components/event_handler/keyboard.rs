/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use input_traits::{
    CharacterInput, DomEvent, DomEventType, EventDefault, EventDetail, EventHandlerHost,
    FocusDirection, KeyEventKind, KeyboardEventDetail, LogicalScrollDirection, NodeId,
    PlatformKeyboardEvent, RawKeyDown, ScrollGranularity,
};
use keyboard_types::{Key, Modifiers, NamedKey};
use log::debug;

use crate::EventHandler;

/// The legacy key code of a keydown that an input method consumed.
pub const COMPOSITION_EVENT_KEY_CODE: u32 = 229;

/// The modifiers that take part in matching access keys and keyboard shortcuts.
/// Shift and the lock keys never do.
const COMMAND_MODIFIERS: Modifiers = Modifiers::ALT
    .union(Modifiers::ALT_GRAPH)
    .union(Modifiers::CONTROL)
    .union(Modifiers::META);

/// The raw phase of a key press: which key went down, without the text it types.
pub(crate) fn raw_key_down(event: &PlatformKeyboardEvent) -> RawKeyDown {
    RawKeyDown {
        key: event.event.key.clone(),
        code: event.event.code,
        location: event.event.location,
        modifiers: event.event.modifiers,
        repeat: event.event.repeat,
        is_composing: event.event.is_composing,
        key_code: event.key_code,
    }
}

/// The character phase of a key press, or `None` for keys that type nothing.
pub(crate) fn character_input(event: &PlatformKeyboardEvent) -> Option<CharacterInput> {
    if event.text.is_empty() {
        return None;
    }
    Some(CharacterInput {
        text: event.text.clone(),
        modifiers: event.event.modifiers,
        repeat: event.event.repeat,
    })
}

fn focus_direction_for_key(key: &Key) -> Option<FocusDirection> {
    match key {
        Key::Named(NamedKey::ArrowDown) => Some(FocusDirection::Down),
        Key::Named(NamedKey::ArrowUp) => Some(FocusDirection::Up),
        Key::Named(NamedKey::ArrowLeft) => Some(FocusDirection::Left),
        Key::Named(NamedKey::ArrowRight) => Some(FocusDirection::Right),
        _ => None,
    }
}

impl<H: EventHandlerHost> EventHandler<H> {
    /// Handles a key event. A combined `KeyDown` is split into a `keydown` carrying the
    /// key and a `keypress` carrying its text; the `keypress` only follows a `keydown`
    /// that was neither cancelled, handled nor consumed by an input method.
    pub fn handle_keyboard_event(&mut self, event: &PlatformKeyboardEvent) -> bool {
        debug!("{:?}: {:?}", event.kind, event.event.key);
        self.now = event.timestamp;
        self.active_modifiers = event.modifiers();

        if event.event.key == Key::Named(NamedKey::CapsLock) {
            self.host.caps_lock_state_may_have_changed();
        }

        // Any key ends a pan scroll, and goes nowhere else.
        if self.is_pan_scroll_in_progress() {
            if matches!(event.kind, KeyEventKind::KeyDown | KeyEventKind::RawKeyDown) {
                self.stop_autoscroll(false);
            }
            return true;
        }

        let Some(target) = self.keyboard_event_target() else {
            return false;
        };

        // Access keys run before the keydown and cannot be cancelled by it.
        let matched_an_access_key =
            event.kind == KeyEventKind::KeyDown && self.handle_access_key(event);

        match event.kind {
            KeyEventKind::KeyUp => {
                let detail = KeyboardEventDetail::KeyUp(raw_key_down(event));
                return self
                    .dispatch_key_event(target, DomEventType::KeyUp, detail, EventDefault::Allowed)
                    .is_consumed();
            },
            KeyEventKind::Char => {
                let Some(input) = character_input(event) else {
                    return false;
                };
                return self
                    .dispatch_key_press(target, input, EventDefault::Allowed)
                    .is_consumed();
            },
            KeyEventKind::KeyDown | KeyEventKind::RawKeyDown => {},
        }

        let mut key_down = raw_key_down(event);
        let mut initial_default = if matched_an_access_key {
            EventDefault::Prevented
        } else {
            EventDefault::Allowed
        };

        if event.kind == KeyEventKind::RawKeyDown {
            let result = self.dispatch_key_down(target, key_down, initial_default);
            // A keypress must not reach the frame focus moved to.
            return result.is_consumed() || self.host.focused_frame().is_some();
        }

        // The input method sees the key before the page, and the page cannot take it
        // back from it.
        let handled_by_input_method = self.host.handle_input_method_keydown(&key_down);
        if handled_by_input_method {
            key_down.key_code = COMPOSITION_EVENT_KEY_CODE;
            initial_default = EventDefault::Handled;
        }

        let key_down_result = self
            .dispatch_key_down(target, key_down, initial_default)
            .is_consumed() ||
            self.host.focused_frame().is_some();
        if handled_by_input_method || key_down_result {
            return key_down_result;
        }

        // The keydown listeners may have moved focus.
        let Some(target) = self.keyboard_event_target() else {
            return false;
        };
        let Some(input) = character_input(event) else {
            return key_down_result;
        };
        self.dispatch_key_press(target, input, EventDefault::Allowed)
            .is_consumed()
    }

    /// Runs the action of the element whose access key is the key pressed with the
    /// access key modifiers. Returns true if there was one.
    pub fn handle_access_key(&mut self, event: &PlatformKeyboardEvent) -> bool {
        if event.modifiers() & COMMAND_MODIFIERS != self.prefs.access_key_modifiers {
            return false;
        }
        let key = event.unmodified_text.to_lowercase();
        if key.is_empty() {
            return false;
        }

        // Whether an element can be activated depends on layout.
        self.host.update_layout();
        let Some(element) = self.host.element_by_access_key(&key) else {
            return false;
        };
        debug!("Access key {:?} activates {:?}", key, element);
        self.host.perform_access_key_action(element);
        true
    }

    fn keyboard_event_target(&self) -> Option<NodeId> {
        self.host
            .focused_element()
            .filter(|element| self.host.is_connected(*element))
            .or_else(|| self.host.root_element())
    }

    fn dispatch_key_event(
        &mut self,
        target: NodeId,
        event_type: DomEventType,
        detail: KeyboardEventDetail,
        initial_default: EventDefault,
    ) -> EventDefault {
        let event = DomEvent::new(event_type, EventDetail::Keyboard(detail))
            .with_initial_default(initial_default);
        self.host.dispatch_event(target, event)
    }

    fn dispatch_key_down(
        &mut self,
        target: NodeId,
        key_down: RawKeyDown,
        initial_default: EventDefault,
    ) -> EventDefault {
        let detail = KeyboardEventDetail::KeyDown(key_down.clone());
        let result =
            self.dispatch_key_event(target, DomEventType::KeyDown, detail, initial_default);
        if result == EventDefault::Allowed && self.default_key_down_handler(target, &key_down) {
            return EventDefault::Handled;
        }
        result
    }

    fn dispatch_key_press(
        &mut self,
        target: NodeId,
        input: CharacterInput,
        initial_default: EventDefault,
    ) -> EventDefault {
        let detail = KeyboardEventDetail::KeyPress(input.clone());
        let result =
            self.dispatch_key_event(target, DomEventType::KeyPress, detail, initial_default);
        if result == EventDefault::Allowed && self.default_key_press_handler(target, &input) {
            return EventDefault::Handled;
        }
        result
    }

    /// Editing commands get the first chance at a keydown, then focus navigation.
    fn default_key_down_handler(&mut self, target: NodeId, key_down: &RawKeyDown) -> bool {
        if self.host.is_connected(target) &&
            self.host
                .handle_editing_key(target, &KeyboardEventDetail::KeyDown(key_down.clone()))
        {
            return true;
        }

        match &key_down.key {
            Key::Named(NamedKey::Tab) => self.default_tab_event_handler(key_down.modifiers),
            Key::Named(NamedKey::Backspace) => {
                self.default_backspace_event_handler(key_down.modifiers)
            },
            Key::Named(NamedKey::ContextMenu) => self.send_context_menu_event_for_key(),
            key => match focus_direction_for_key(key) {
                Some(direction) => self.default_arrow_event_handler(direction, key_down.modifiers),
                None => false,
            },
        }
    }

    fn default_key_press_handler(&mut self, target: NodeId, input: &CharacterInput) -> bool {
        if self.host.is_connected(target) &&
            self.host
                .handle_editing_key(target, &KeyboardEventDetail::KeyPress(input.clone()))
        {
            return true;
        }
        if input.char_code() == ' ' as u32 {
            return self.default_space_event_handler(input.modifiers);
        }
        false
    }

    fn default_tab_event_handler(&mut self, modifiers: Modifiers) -> bool {
        if modifiers.intersects(Modifiers::CONTROL | Modifiers::META | Modifiers::ALT_GRAPH) {
            return false;
        }
        if !self.prefs.tab_key_cycles_through_elements || self.host.in_design_mode() {
            return false;
        }
        let direction = if modifiers.contains(Modifiers::SHIFT) {
            FocusDirection::Backward
        } else {
            FocusDirection::Forward
        };
        self.host.advance_focus(direction)
    }

    fn default_backspace_event_handler(&mut self, modifiers: Modifiers) -> bool {
        if modifiers.intersects(COMMAND_MODIFIERS) || !self.prefs.backspace_navigates_back {
            return false;
        }
        self.host
            .navigate_history(modifiers.contains(Modifiers::SHIFT))
    }

    fn default_arrow_event_handler(
        &mut self,
        direction: FocusDirection,
        modifiers: Modifiers,
    ) -> bool {
        if modifiers.intersects(
            Modifiers::CONTROL | Modifiers::META | Modifiers::ALT_GRAPH | Modifiers::SHIFT,
        ) {
            return false;
        }
        // Arrows move the caret in design mode.
        if !self.prefs.spatial_navigation || self.host.in_design_mode() {
            return false;
        }
        self.host.advance_focus(direction)
    }

    fn default_space_event_handler(&mut self, modifiers: Modifiers) -> bool {
        if modifiers.intersects(COMMAND_MODIFIERS) {
            return false;
        }
        let direction = if modifiers.contains(Modifiers::SHIFT) {
            LogicalScrollDirection::BlockBackward
        } else {
            LogicalScrollDirection::BlockForward
        };
        self.host
            .logical_scroll(direction, ScrollGranularity::ByPage)
    }
}
