/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The interfaces through which the event handler reaches the rest of the engine.
//!
//! The handler never holds references into the engine. Every node it remembers is a
//! [`NodeId`] and every use of one goes through these traits, so a node destroyed
//! between two events is observed as disconnected rather than dereferenced.

use std::cmp::Ordering;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{
    Cursor, CursorStyle, DocumentId, DocumentPoint, DocumentRect, DocumentSize, DocumentVector,
    DomEvent, EventDefault, FrameId, HitTestRequest, HitTestResult, KeyboardEventDetail, NodeId,
    PlatformGestureEvent, PlatformMouseEvent, PlatformWheelEvent, RawKeyDown, ScrollbarId,
    TouchAdjustmentCandidate,
};

bitflags! {
    /// The kinds of drag a node can be the source of.
    #[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
    pub struct DragSourceAction: u8 {
        /// An element with `draggable=true` whose drag is driven by script.
        const DHTML = 1 << 0;
        const IMAGE = 1 << 1;
        const LINK = 1 << 2;
        const SELECTION = 1 << 3;
    }
}

/// A drag the platform is asked to run once the drag gesture has been recognized.
#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
    pub source: NodeId,
    pub action: DragSourceAction,
    pub mouse_down_position: DocumentPoint,
    pub point: DocumentPoint,
}

/// A position in the text of the document.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct TextPosition {
    pub node: NodeId,
    pub offset: u32,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum TextGranularity {
    #[default]
    Character,
    Word,
    Line,
    Paragraph,
    Document,
}

/// A selection as the editing engine stores it. `base` is where the selection was
/// started, `extent` where it currently ends; either may come first in the document.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Selection {
    pub base: TextPosition,
    pub extent: TextPosition,
    pub granularity: TextGranularity,
}

impl Selection {
    pub fn caret(position: TextPosition) -> Self {
        Self {
            base: position,
            extent: position,
            granularity: TextGranularity::Character,
        }
    }

    pub fn range(base: TextPosition, extent: TextPosition, granularity: TextGranularity) -> Self {
        Self {
            base,
            extent,
            granularity,
        }
    }

    pub fn is_caret(&self) -> bool {
        self.base == self.extent
    }

    pub fn is_range(&self) -> bool {
        !self.is_caret()
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum FocusDirection {
    Forward,
    Backward,
    Up,
    Down,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ScrollAxis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ScrollGranularity {
    ByPixel,
    ByLine,
    ByPage,
    ByDocument,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum LogicalScrollDirection {
    BlockForward,
    BlockBackward,
}

pub trait HitTester {
    /// Brings style and layout up to date. Hit tests that decide a click target must
    /// see current geometry, so the handler calls this before them.
    fn update_layout(&mut self);

    fn hit_test(&mut self, point: DocumentPoint, request: HitTestRequest) -> HitTestResult;

    /// Every node whose box intersects the rectangle of half-size `radius` centered on
    /// `center`.
    fn hit_test_area(
        &mut self,
        center: DocumentPoint,
        radius: DocumentSize,
        request: HitTestRequest,
    ) -> Vec<TouchAdjustmentCandidate>;

    /// Moves `:hover` and `:active` to `element` and its ancestors, or clears them.
    fn update_hover_active_state(&mut self, request: HitTestRequest, element: Option<NodeId>);
}

pub trait EventSink {
    /// Dispatches `event` at `target` through the DOM and returns its default-action
    /// state afterwards. Listeners may mutate the document, move focus or remove
    /// nodes before this returns.
    fn dispatch_event(&mut self, target: NodeId, event: DomEvent) -> EventDefault;
}

pub trait NodeQueries {
    /// Whether the node still exists and is part of a document.
    fn is_connected(&self, node: NodeId) -> bool;
    /// The parent in the flat tree, crossing shadow boundaries to the host.
    fn parent(&self, node: NodeId) -> Option<NodeId>;
    fn document_of(&self, node: NodeId) -> Option<DocumentId>;
    fn is_text(&self, node: NodeId) -> bool;
    fn has_renderer(&self, node: NodeId) -> bool;
    fn is_mouse_focusable(&self, node: NodeId) -> bool;
    fn is_editable(&self, node: NodeId) -> bool;
    fn is_submit_image(&self, node: NodeId) -> bool {
        let _ = node;
        false
    }
    /// False for nodes with `user-select: none` or without a renderer.
    fn can_start_selection(&self, node: NodeId) -> bool;
    /// The root of the enclosing `user-select: all` region, if any.
    fn user_select_all_root(&self, node: NodeId) -> Option<NodeId> {
        let _ = node;
        None
    }
    /// The host element when the node lives in a user-agent shadow tree.
    fn shadow_host(&self, node: NodeId) -> Option<NodeId> {
        let _ = node;
        None
    }
    fn can_be_programmatically_scrolled(&self, node: NodeId) -> bool;
    /// The nearest inclusive ancestor whose box can scroll while a selection or drag
    /// is held near its edge.
    fn autoscroll_container(&self, node: NodeId) -> Option<NodeId>;
    /// The embedded frame an element hosts, if it hosts one.
    fn subframe_for_node(&self, node: NodeId) -> Option<FrameId> {
        let _ = node;
        None
    }
    fn has_touch_event_handlers(&self, document: DocumentId) -> bool;
    fn cursor_style(&self, node: NodeId) -> CursorStyle;
    fn bounding_rect(&self, node: NodeId) -> Option<DocumentRect>;
    fn element_by_access_key(&self, key: &str) -> Option<NodeId>;
    /// The node keyboard events go to when nothing is focused.
    fn root_element(&self) -> Option<NodeId>;
    fn page_zoom_factor(&self) -> f32 {
        1.
    }
}

pub trait FocusController {
    fn focused_element(&self) -> Option<NodeId>;
    /// The frame that currently receives keyboard input.
    fn focused_frame(&self) -> Option<FrameId>;
    /// Moves focus. Returns false when the change was vetoed.
    fn set_focused_element(&mut self, element: Option<NodeId>) -> bool;
    fn advance_focus(&mut self, direction: FocusDirection) -> bool;
    fn in_design_mode(&self) -> bool {
        false
    }
    /// Runs the activation behavior of an element matched by its access key.
    fn perform_access_key_action(&mut self, element: NodeId);
    fn caps_lock_state_may_have_changed(&mut self) {}
}

pub trait EditingHost {
    fn selection(&self) -> Option<Selection>;
    /// Replaces the selection. Returns false when the editing engine refused it.
    fn set_selection(&mut self, selection: Option<Selection>) -> bool;
    fn position_for_point(&mut self, node: NodeId, local_point: DocumentPoint)
    -> Option<TextPosition>;
    fn compare_positions(&self, a: &TextPosition, b: &TextPosition) -> Ordering;
    /// The number of characters between two positions.
    fn character_distance(&self, a: &TextPosition, b: &TextPosition) -> u32;
    fn word_range(
        &mut self,
        position: &TextPosition,
        include_trailing_whitespace: bool,
    ) -> Option<(TextPosition, TextPosition)>;
    fn paragraph_range(&mut self, position: &TextPosition) -> Option<(TextPosition, TextPosition)>;
    fn node_range(&mut self, node: NodeId) -> Option<(TextPosition, TextPosition)>;
    fn selection_contains_point(&self, point: DocumentPoint) -> bool;
    fn selection_contains_node(&self, node: NodeId) -> bool;
    fn selection_is_editable(&self) -> bool;
    fn selection_first_rect(&self) -> Option<DocumentRect> {
        None
    }
    fn is_in_password_field(&self) -> bool {
        false
    }
    fn caret_browsing_enabled(&self) -> bool {
        false
    }
    /// Pastes the platform's primary selection at `target`, for middle clicks.
    fn paste_global_selection(&mut self, target: NodeId) -> bool {
        let _ = target;
        false
    }
    /// Offers a key press to the input method before the DOM sees it. Returns true
    /// when the input method consumed it.
    fn handle_input_method_keydown(&mut self, key: &RawKeyDown) -> bool {
        let _ = key;
        false
    }
    /// Runs editing commands bound to a key, such as typing into an editable
    /// element. Returns true when a command ran.
    fn handle_editing_key(&mut self, target: NodeId, detail: &KeyboardEventDetail) -> bool;
}

pub trait ScrollHost {
    /// Scrolls the nearest scrollable inclusive ancestor of `start` that can move by
    /// `delta` along `axis`, never going past `*stop_node` when it is set, and leaves
    /// the node that scrolled in `*stop_node`.
    fn scroll_node(
        &mut self,
        start: NodeId,
        axis: ScrollAxis,
        delta: f32,
        granularity: ScrollGranularity,
        stop_node: &mut Option<NodeId>,
    ) -> bool;
    fn scroll_view(&mut self, delta: DocumentVector, granularity: ScrollGranularity) -> bool;
    fn logical_scroll(
        &mut self,
        direction: LogicalScrollDirection,
        granularity: ScrollGranularity,
    ) -> bool;
    /// Whether `point` is close enough to an edge of `container` to scroll it.
    fn is_near_autoscroll_edge(&self, container: NodeId, point: DocumentPoint) -> bool;
    /// One step of selection or drag autoscroll toward `point`.
    fn autoscroll(&mut self, container: NodeId, point: DocumentPoint);
    /// One step of pan scrolling, by the offset of `point` from `origin`.
    fn pan_scroll(&mut self, container: NodeId, origin: DocumentPoint, point: DocumentPoint);
    /// Cancels any scroll animation running on `container`.
    fn stop_autoscroll(&mut self, container: NodeId);
    fn cancel_scroll_animations(&mut self) {}
    /// Starts resizing `node` from its resize control. Returns false when the node
    /// cannot be resized.
    fn begin_resize(&mut self, node: NodeId, point: DocumentPoint) -> bool {
        let _ = (node, point);
        false
    }
    fn resize(&mut self, node: NodeId, point: DocumentPoint) {
        let _ = (node, point);
    }
    fn end_resize(&mut self, node: NodeId) {
        let _ = node;
    }
}

pub trait ScrollbarHost {
    fn scrollbar_enabled(&self, scrollbar: ScrollbarId) -> bool {
        let _ = scrollbar;
        true
    }
    fn scrollbar_mouse_down(&mut self, scrollbar: ScrollbarId, event: &PlatformMouseEvent) -> bool;
    fn scrollbar_mouse_moved(&mut self, scrollbar: ScrollbarId, event: &PlatformMouseEvent)
    -> bool;
    fn scrollbar_mouse_up(&mut self, scrollbar: ScrollbarId, event: &PlatformMouseEvent) -> bool;
    fn scrollbar_mouse_entered(&mut self, scrollbar: ScrollbarId) {
        let _ = scrollbar;
    }
    fn scrollbar_mouse_exited(&mut self, scrollbar: ScrollbarId) {
        let _ = scrollbar;
    }
    fn scrollbar_gesture_event(
        &mut self,
        scrollbar: ScrollbarId,
        event: &PlatformGestureEvent,
    ) -> bool {
        let _ = (scrollbar, event);
        false
    }
    /// The scrollbar of the view itself under `point`, if any.
    fn view_scrollbar_at(&self, point: DocumentPoint) -> Option<ScrollbarId> {
        let _ = point;
        None
    }
}

pub trait DragHost {
    /// The drag source kinds the embedder allows to start.
    fn allowed_drag_source_actions(&self) -> DragSourceAction;
    /// The element a drag starting over `node` would drag, with the drag kinds it
    /// supports.
    fn draggable_element(
        &mut self,
        node: Option<NodeId>,
        point: DocumentPoint,
    ) -> Option<(NodeId, DragSourceAction)>;
    /// Uses the source element's own rendering as the drag image. Returns false when
    /// the element no longer has a renderer.
    fn set_drag_image(&mut self, source: NodeId, offset: DocumentVector) -> bool;
    fn start_platform_drag(&mut self, session: &DragSession) -> bool;
}

/// Embedded frames and widgets that process their own input.
pub trait EmbeddedContent {
    fn pass_mouse_press(&mut self, frame: FrameId, event: &PlatformMouseEvent) -> bool {
        let _ = (frame, event);
        false
    }
    fn pass_mouse_move(&mut self, frame: FrameId, event: &PlatformMouseEvent) -> bool {
        let _ = (frame, event);
        false
    }
    fn pass_mouse_release(&mut self, frame: FrameId, event: &PlatformMouseEvent) -> bool {
        let _ = (frame, event);
        false
    }
    fn pass_wheel(&mut self, frame: FrameId, event: &PlatformWheelEvent) -> bool {
        let _ = (frame, event);
        false
    }
    fn pass_gesture(&mut self, frame: FrameId, event: &PlatformGestureEvent) -> bool {
        let _ = (frame, event);
        false
    }
    /// Whether the frame's own handler wants the drag that started in it.
    fn captures_dragging(&self, frame: FrameId) -> bool {
        let _ = frame;
        true
    }
    fn stop_autoscroll_in_frame(&mut self, frame: FrameId, renderer_is_being_destroyed: bool) {
        let _ = (frame, renderer_is_being_destroyed);
    }
}

pub trait HistoryHost {
    fn navigate_history(&mut self, forward: bool) -> bool {
        let _ = forward;
        false
    }
}

pub trait CursorHost {
    fn set_cursor(&mut self, cursor: Cursor);
}

/// Everything the event handler needs from the engine.
pub trait EventHandlerHost:
    HitTester
    + EventSink
    + NodeQueries
    + FocusController
    + EditingHost
    + ScrollHost
    + ScrollbarHost
    + DragHost
    + EmbeddedContent
    + HistoryHost
    + CursorHost
{
}

impl<T> EventHandlerHost for T where
    T: HitTester
        + EventSink
        + NodeQueries
        + FocusController
        + EditingHost
        + ScrollHost
        + ScrollbarHost
        + DragHost
        + EmbeddedContent
        + HistoryHost
        + CursorHost
{
}
