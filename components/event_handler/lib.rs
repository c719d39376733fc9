/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#![deny(unsafe_code)]

//! The input event handler of one view. It turns the raw mouse, wheel, keyboard,
//! touch and gesture events of the platform into DOM events, and decides along the
//! way what the user is doing: clicking, double clicking, selecting text, dragging,
//! autoscrolling or panning.
//!
//! The handler owns no document state. Everything it needs from the engine goes
//! through the collaborator traits of [`input_traits::EventHandlerHost`].

mod autoscroll;
mod click;
mod cursor;
mod drag;
mod event_handler;
mod gesture;
mod keyboard;
mod mouse;
mod selection;
mod timer;
mod touch;
mod wheel;

pub use crate::autoscroll::{AutoscrollController, AutoscrollMode};
pub use crate::drag::DragGestureTracker;
pub use crate::event_handler::EventHandler;
pub use crate::gesture::GestureToMouseAdapter;
pub use crate::keyboard::COMPOSITION_EVENT_KEY_CODE;
pub use crate::selection::{SelectionGestureTracker, SelectionInitiationState};
