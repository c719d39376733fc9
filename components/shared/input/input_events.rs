/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Duration;

use keyboard_types::{Key, KeyboardEvent, Modifiers, NamedKey};
use serde::{Deserialize, Serialize};

use crate::{DocumentPoint, DocumentSize, DocumentVector, ScreenPoint};

/// A raw input event delivered by the platform layer.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub enum InputEvent {
    Gesture(PlatformGestureEvent),
    Keyboard(PlatformKeyboardEvent),
    MouseButton(PlatformMouseEvent),
    MouseMove(PlatformMouseEvent),
    Touch(PlatformTouchEvent),
    Wheel(PlatformWheelEvent),
}

impl InputEvent {
    pub fn point(&self) -> Option<DocumentPoint> {
        match self {
            InputEvent::Gesture(event) => Some(event.point),
            InputEvent::Keyboard(..) => None,
            InputEvent::MouseButton(event) => Some(event.point),
            InputEvent::MouseMove(event) => Some(event.point),
            InputEvent::Touch(event) => event.points.first().map(|point| point.point),
            InputEvent::Wheel(event) => Some(event.point),
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            InputEvent::Gesture(event) => event.modifiers,
            InputEvent::Keyboard(event) => event.event.modifiers,
            InputEvent::MouseButton(event) | InputEvent::MouseMove(event) => event.modifiers,
            InputEvent::Touch(event) => event.modifiers,
            InputEvent::Wheel(event) => event.modifiers,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Back,
    Forward,
    Other(u16),
}

impl<T: Into<u64>> From<T> for MouseButton {
    fn from(value: T) -> Self {
        let value = value.into();
        match value {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            3 => MouseButton::Back,
            4 => MouseButton::Forward,
            _ => MouseButton::Other(value as u16),
        }
    }
}

impl From<MouseButton> for i16 {
    fn from(value: MouseButton) -> Self {
        match value {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
            MouseButton::Other(value) => value as i16,
        }
    }
}

/// What happened to the mouse.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum MouseAction {
    /// A button went down.
    Pressed,
    /// A button went up.
    Released,
    /// The pointer moved, with or without buttons held.
    Moved,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlatformMouseEvent {
    pub action: MouseAction,
    /// The button that changed state, or the button held during a move.
    pub button: Option<MouseButton>,
    pub point: DocumentPoint,
    pub screen_point: ScreenPoint,
    /// The click count computed by the platform, if it computes one.
    pub click_count: Option<u32>,
    pub modifiers: Modifiers,
    pub timestamp: Duration,
}

impl PlatformMouseEvent {
    pub fn new(
        action: MouseAction,
        button: Option<MouseButton>,
        point: DocumentPoint,
        timestamp: Duration,
    ) -> Self {
        Self {
            action,
            button,
            point,
            screen_point: ScreenPoint::new(point.x, point.y),
            click_count: None,
            modifiers: Modifiers::empty(),
            timestamp,
        }
    }

    pub fn with_click_count(mut self, click_count: u32) -> Self {
        self.click_count = Some(click_count);
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn shift_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Mode to measure WheelDelta floats in
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub enum WheelMode {
    /// Delta values are specified in pixels
    DeltaPixel = 0x00,
    /// Delta values are specified in lines
    DeltaLine = 0x01,
    /// Delta values are specified in pages
    DeltaPage = 0x02,
}

/// The Wheel event deltas in every direction
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct WheelDelta {
    /// Delta in the left/right direction
    pub x: f64,
    /// Delta in the up/down direction
    pub y: f64,
    /// Delta in the direction going into/out of the screen
    pub z: f64,
    /// Mode to measure the floats in
    pub mode: WheelMode,
}

/// Where a wheel event sits within one continuous scroll gesture.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum WheelPhase {
    /// A discrete event that is not part of a gesture. Never latched.
    #[default]
    None,
    Began,
    Changed,
    Ended,
    /// Inertial scrolling that follows the end of the gesture.
    Momentum,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlatformWheelEvent {
    pub delta: WheelDelta,
    pub point: DocumentPoint,
    pub screen_point: ScreenPoint,
    pub phase: WheelPhase,
    pub modifiers: Modifiers,
    pub timestamp: Duration,
}

impl PlatformWheelEvent {
    pub fn new(delta: WheelDelta, point: DocumentPoint, timestamp: Duration) -> Self {
        Self {
            delta,
            point,
            screen_point: ScreenPoint::new(point.x, point.y),
            phase: WheelPhase::None,
            modifiers: Modifiers::empty(),
            timestamp,
        }
    }

    /// Whether this event continues a gesture whose first target should keep receiving
    /// the deltas.
    pub fn is_latchable(&self) -> bool {
        self.phase != WheelPhase::None
    }
}

/// The kind of keyboard event the platform delivered.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum KeyEventKind {
    /// A combined key press that still has to be split into a raw key down and a
    /// character event.
    KeyDown,
    /// A key press already stripped of its text; a separate `Char` event follows.
    RawKeyDown,
    /// The character produced by a key press.
    Char,
    KeyUp,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlatformKeyboardEvent {
    pub kind: KeyEventKind,
    pub event: KeyboardEvent,
    /// The text this key press produces, with modifiers applied.
    pub text: String,
    /// The text this key press would produce without modifiers.
    pub unmodified_text: String,
    /// The legacy key code reported for the key.
    pub key_code: u32,
    pub timestamp: Duration,
}

impl PlatformKeyboardEvent {
    pub fn new(kind: KeyEventKind, event: KeyboardEvent, timestamp: Duration) -> Self {
        let text = match event.key {
            Key::Character(ref text) => text.clone(),
            Key::Named(NamedKey::Enter) => "\r".to_owned(),
            _ => String::new(),
        };
        let key_code = event.key.legacy_keycode();
        Self {
            kind,
            unmodified_text: text.clone(),
            text,
            event,
            key_code,
            timestamp,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        self.event.modifiers
    }
}

/// An opaque identifier for a touch point.
///
/// <http://w3c.github.io/touch-events/#widl-Touch-identifier>
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct TouchId(pub i32);

/// The state of one touch point within a platform touch event. The order matches the
/// order in which changed touches are dispatched.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum TouchPointState {
    Released,
    Pressed,
    Moved,
    /// The point is still down and did not move. Never reported as a change.
    Stationary,
    Cancelled,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlatformTouchPoint {
    pub id: TouchId,
    pub state: TouchPointState,
    pub point: DocumentPoint,
    pub screen_point: ScreenPoint,
    pub radius: DocumentSize,
    pub rotation_angle: f32,
    pub force: f32,
}

impl PlatformTouchPoint {
    pub fn new(id: TouchId, state: TouchPointState, point: DocumentPoint) -> Self {
        Self {
            id,
            state,
            point,
            screen_point: ScreenPoint::new(point.x, point.y),
            radius: DocumentSize::new(1., 1.),
            rotation_angle: 0.,
            force: 1.,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlatformTouchEvent {
    pub points: Vec<PlatformTouchPoint>,
    pub modifiers: Modifiers,
    pub timestamp: Duration,
}

impl PlatformTouchEvent {
    pub fn new(points: Vec<PlatformTouchPoint>, timestamp: Duration) -> Self {
        Self {
            points,
            modifiers: Modifiers::empty(),
            timestamp,
        }
    }
}

/// The gesture recognized by the platform.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GestureType {
    ScrollBegin,
    ScrollEnd,
    ScrollUpdate,
    /// A scroll update that must not chain to ancestors of the node that scrolled last.
    ScrollUpdateWithoutPropagation,
    /// A tap; `delta.x` carries the tap count when positive.
    Tap,
    TapDown,
    ShowPress,
    TwoFingerTap,
    LongPress,
    LongTap,
    PinchBegin,
    PinchEnd,
    PinchUpdate,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct PlatformGestureEvent {
    pub gesture_type: GestureType,
    pub point: DocumentPoint,
    pub screen_point: ScreenPoint,
    pub delta: DocumentVector,
    /// The contact area of the finger, used for touch adjustment.
    pub area: DocumentSize,
    pub modifiers: Modifiers,
    pub timestamp: Duration,
}

impl PlatformGestureEvent {
    pub fn new(gesture_type: GestureType, point: DocumentPoint, timestamp: Duration) -> Self {
        Self {
            gesture_type,
            point,
            screen_point: ScreenPoint::new(point.x, point.y),
            delta: DocumentVector::zero(),
            area: DocumentSize::zero(),
            modifiers: Modifiers::empty(),
            timestamp,
        }
    }

    pub fn with_delta(mut self, delta: DocumentVector) -> Self {
        self.delta = delta;
        self
    }

    pub fn with_area(mut self, area: DocumentSize) -> Self {
        self.area = area;
        self
    }
}
