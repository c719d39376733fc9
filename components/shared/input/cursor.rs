/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use euclid::Point2D;
use serde::{Deserialize, Serialize};

use crate::DevicePixel;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Cursor {
    None,
    Default,
    Pointer,
    ContextMenu,
    Help,
    Progress,
    Wait,
    Cell,
    Crosshair,
    Text,
    VerticalText,
    Alias,
    Copy,
    Move,
    NoDrop,
    NotAllowed,
    Grab,
    Grabbing,
    EResize,
    NResize,
    NeResize,
    NwResize,
    SResize,
    SeResize,
    SwResize,
    WResize,
    EwResize,
    NsResize,
    NeswResize,
    NwseResize,
    ColResize,
    RowResize,
    AllScroll,
    ZoomIn,
    ZoomOut,
    /// A cursor image supplied by the page.
    Custom(CustomCursor),
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CustomCursor {
    pub image: u32,
    pub hot_spot: Point2D<i32, DevicePixel>,
}

/// One entry of the `cursor` property's image list.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct CursorImage {
    pub image: u32,
    pub width: u32,
    pub height: u32,
    pub hot_spot: Point2D<i32, DevicePixel>,
    /// The image failed to load.
    pub has_error: bool,
}

/// The computed cursor-related style of a node.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct CursorStyle {
    /// `None` for `cursor: auto`.
    pub cursor: Option<Cursor>,
    /// Candidate images in order of preference, tried before `cursor`.
    pub images: Vec<CursorImage>,
    /// A cursor the node's renderer insists on, such as over a frame border.
    pub renderer_override: Option<Cursor>,
}
