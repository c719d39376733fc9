/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Types shared between the event handler and the engine that embeds it: the platform
//! input events it consumes, the DOM events it produces, and the collaborator traits it
//! calls into for hit testing, dispatch, focus, editing, scrolling and drag sessions.

#![deny(unsafe_code)]

pub mod cursor;
pub mod dom_events;
pub mod host;
pub mod input_events;
pub mod prefs;

use std::fmt;

use euclid::{Point2D, Rect, Size2D, Vector2D};
use serde::{Deserialize, Serialize};

pub use crate::cursor::{Cursor, CursorImage, CursorStyle, CustomCursor};
pub use crate::dom_events::*;
pub use crate::hit_test::{HitTestRequest, HitTestResult, TouchAdjustmentCandidate};
pub use crate::host::*;
pub use crate::input_events::*;
pub use crate::prefs::{EditableLinkBehavior, EditingBehavior, InputPreferences, PrefsError};

/// One CSS pixel in document coordinates.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum CSSPixel {}

/// One device pixel in screen coordinates.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum DevicePixel {}

pub type DocumentPoint = Point2D<f32, CSSPixel>;
pub type DocumentVector = Vector2D<f32, CSSPixel>;
pub type DocumentSize = Size2D<f32, CSSPixel>;
pub type DocumentRect = Rect<f32, CSSPixel>;
pub type ScreenPoint = Point2D<f32, DevicePixel>;

/// A handle to a node owned by the engine's node arena.
///
/// The generation distinguishes a node from a later node that reuses the same arena
/// slot, so a stale handle never aliases a live node. Whether the node is still part of
/// a document is only known to the engine, see [`NodeQueries::is_connected`].
#[derive(Clone, Copy, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}

/// Identifies a document. Touch sequences are confined to the document that received
/// their first touch point.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct DocumentId(pub u32);

/// Identifies an embedded frame or widget that handles its own input.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct FrameId(pub u32);

/// Identifies a scrollbar owned by the engine.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct ScrollbarId(pub u32);
