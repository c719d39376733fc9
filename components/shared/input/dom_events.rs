/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The DOM-level events the event handler synthesizes and hands to the
//! [`crate::EventSink`].

use keyboard_types::{Code, Key, Location, Modifiers};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use strum::{AsRefStr, Display, EnumString};

use crate::{
    DocumentPoint, DocumentSize, DocumentVector, GestureType, MouseButton, NodeId, ScreenPoint,
    TouchId, WheelMode,
};

/// The type of a synthesized DOM event, named as the DOM names it.
#[derive(
    AsRefStr, Clone, Copy, Debug, Deserialize, Display, EnumString, Eq, Hash, PartialEq, Serialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum DomEventType {
    MouseDown,
    MouseUp,
    Click,
    DblClick,
    MouseMove,
    MouseOver,
    MouseOut,
    MouseEnter,
    MouseLeave,
    ContextMenu,
    Wheel,
    KeyDown,
    KeyPress,
    KeyUp,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    DragStart,
    Drag,
    DragEnter,
    DragOver,
    DragLeave,
    Drop,
    DragEnd,
    SelectStart,
    GestureScrollStart,
    GestureScrollEnd,
    GestureScrollUpdate,
    GestureTap,
    GestureTapDown,
    GestureLongPress,
    GestureLongTap,
    GestureTwoFingerTap,
}

impl DomEventType {
    pub fn for_gesture(gesture_type: GestureType) -> Option<Self> {
        Some(match gesture_type {
            GestureType::ScrollBegin => DomEventType::GestureScrollStart,
            GestureType::ScrollEnd => DomEventType::GestureScrollEnd,
            GestureType::ScrollUpdate | GestureType::ScrollUpdateWithoutPropagation => {
                DomEventType::GestureScrollUpdate
            },
            GestureType::Tap => DomEventType::GestureTap,
            GestureType::TapDown => DomEventType::GestureTapDown,
            GestureType::LongPress => DomEventType::GestureLongPress,
            GestureType::LongTap => DomEventType::GestureLongTap,
            GestureType::TwoFingerTap => DomEventType::GestureTwoFingerTap,
            GestureType::ShowPress |
            GestureType::PinchBegin |
            GestureType::PinchEnd |
            GestureType::PinchUpdate => return None,
        })
    }
}

/// The default-action state of a dispatched event.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub enum EventDefault {
    /// The default action may run.
    #[default]
    Allowed,
    /// A listener called `preventDefault()`.
    Prevented,
    /// A default handler already performed the default action.
    Handled,
}

impl EventDefault {
    /// Whether the platform should treat the event as consumed.
    pub fn is_consumed(self) -> bool {
        self != EventDefault::Allowed
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DomEvent {
    pub event_type: DomEventType,
    pub bubbles: bool,
    pub cancelable: bool,
    /// The state the event starts out in. An event that starts out prevented or
    /// handled keeps that state whatever its listeners do.
    pub initial_default: EventDefault,
    pub detail: EventDetail,
}

impl DomEvent {
    pub fn new(event_type: DomEventType, detail: EventDetail) -> Self {
        let bubbles = !matches!(
            event_type,
            DomEventType::MouseEnter | DomEventType::MouseLeave
        );
        let cancelable = !matches!(
            event_type,
            DomEventType::MouseEnter |
                DomEventType::MouseLeave |
                DomEventType::DragLeave |
                DomEventType::DragEnd |
                DomEventType::TouchCancel
        );
        Self {
            event_type,
            bubbles,
            cancelable,
            initial_default: EventDefault::Allowed,
            detail,
        }
    }

    pub fn with_initial_default(mut self, initial_default: EventDefault) -> Self {
        self.initial_default = initial_default;
        self
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum EventDetail {
    None,
    Mouse(MouseEventDetail),
    Wheel(WheelEventDetail),
    Keyboard(KeyboardEventDetail),
    Touch(TouchEventDetail),
    Drag(DragEventDetail),
    Gesture(GestureEventDetail),
}

impl EventDetail {
    pub fn as_mouse(&self) -> Option<&MouseEventDetail> {
        match self {
            EventDetail::Mouse(detail) => Some(detail),
            EventDetail::Drag(detail) => Some(&detail.mouse),
            EventDetail::Wheel(detail) => Some(&detail.mouse),
            _ => None,
        }
    }

    pub fn as_keyboard(&self) -> Option<&KeyboardEventDetail> {
        match self {
            EventDetail::Keyboard(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn as_touch(&self) -> Option<&TouchEventDetail> {
        match self {
            EventDetail::Touch(detail) => Some(detail),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MouseEventDetail {
    pub button: Option<MouseButton>,
    pub client_point: DocumentPoint,
    pub screen_point: ScreenPoint,
    /// The click count, the `detail` attribute of the DOM event.
    pub detail: u32,
    pub modifiers: Modifiers,
    pub related_target: Option<NodeId>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct WheelEventDetail {
    pub mouse: MouseEventDetail,
    pub delta: DocumentVector,
    pub delta_z: f64,
    pub mode: WheelMode,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DragEventDetail {
    pub mouse: MouseEventDetail,
    pub data_transfer: DataTransferAccess,
}

/// What script may do with the data store of a drag in progress.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum DataTransferAccess {
    /// Script may write data and set the drag image (during `dragstart`).
    Writable,
    /// Only the drag image may still change.
    ImageWritable,
    /// Script may read the data (during `drop`).
    ReadOnly,
    /// Script may see the data types but not the data.
    Protected,
    /// The data store is inaccessible.
    Numb,
}

/// A key press in its raw phase: identifies the physical key, carries no text.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RawKeyDown {
    pub key: Key,
    pub code: Code,
    pub location: Location,
    pub modifiers: Modifiers,
    pub repeat: bool,
    pub is_composing: bool,
    pub key_code: u32,
}

/// A key press in its character phase: carries text, no key code.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CharacterInput {
    pub text: String,
    pub modifiers: Modifiers,
    pub repeat: bool,
}

impl CharacterInput {
    pub fn char_code(&self) -> u32 {
        self.text.chars().next().map_or(0, |c| c as u32)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum KeyboardEventDetail {
    KeyDown(RawKeyDown),
    KeyPress(CharacterInput),
    KeyUp(RawKeyDown),
}

impl KeyboardEventDetail {
    pub fn modifiers(&self) -> Modifiers {
        match self {
            KeyboardEventDetail::KeyDown(raw) | KeyboardEventDetail::KeyUp(raw) => raw.modifiers,
            KeyboardEventDetail::KeyPress(input) => input.modifiers,
        }
    }
}

/// <https://w3c.github.io/touch-events/#touch-interface>
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Touch {
    pub identifier: TouchId,
    pub target: NodeId,
    pub page_point: DocumentPoint,
    pub screen_point: ScreenPoint,
    pub radius: DocumentSize,
    pub rotation_angle: f32,
    pub force: f32,
}

pub type TouchList = SmallVec<[Touch; 2]>;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TouchEventDetail {
    /// Every touch point still on the surface.
    pub touches: TouchList,
    /// The touches in `touches` whose target is this event's target.
    pub target_touches: TouchList,
    /// The touches that changed to this event's state.
    pub changed_touches: TouchList,
    pub modifiers: Modifiers,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GestureEventDetail {
    pub point: DocumentPoint,
    pub screen_point: ScreenPoint,
    pub delta: DocumentVector,
    pub modifiers: Modifiers,
}
