/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Duration;

use input_traits::{
    Cursor, DocumentPoint, DocumentRect, DomEvent, DomEventType, EventDetail, EventHandlerHost,
    FrameId, HitTestRequest, InputEvent, InputPreferences, MouseAction, MouseEventDetail,
    NodeId, PlatformMouseEvent, ScreenPoint, ScrollbarId,
};
use keyboard_types::Modifiers;
use log::{debug, trace};
use smallvec::SmallVec;

use crate::autoscroll::{AutoscrollController, AutoscrollMode};
use crate::click::ClickCounter;
use crate::drag::DragGestureTracker;
use crate::gesture::GestureToMouseAdapter;
use crate::selection::SelectionGestureTracker;
use crate::timer::Timer;
use crate::touch::TouchTracker;
use crate::wheel::WheelLatch;

/// An inclusive ancestor chain, innermost first.
type AncestorChain = SmallVec<[NodeId; 16]>;

/// Turns the raw input of one view into DOM events, selection changes, drags and
/// scrolls.
///
/// Every `handle_*` method returns true when the platform should treat the event as
/// consumed. The handler never holds on to engine objects: every node is a [`NodeId`]
/// that is checked with the host before use, since any dispatched event may run script
/// that removes nodes or moves focus.
pub struct EventHandler<H: EventHandlerHost> {
    pub(crate) host: H,
    pub(crate) prefs: InputPreferences,
    /// The timestamp of the event or timer being handled.
    pub(crate) now: Duration,

    pub(crate) mouse_pressed: bool,
    /// Whether moves with the button held belong to this handler rather than to the
    /// page or frame the press went to.
    pub(crate) captures_dragging: bool,
    pub(crate) mouse_down: Option<PlatformMouseEvent>,
    pub(crate) mouse_down_position: DocumentPoint,
    pub(crate) mouse_down_timestamp: Duration,
    pub(crate) mouse_press_node: Option<NodeId>,
    pub(crate) mouse_down_may_start_autoscroll: bool,
    pub(crate) mouse_down_was_in_subframe: bool,

    /// `None` until the first mouse event and after [`EventHandler::reset`].
    pub(crate) last_known_mouse_position: Option<DocumentPoint>,
    pub(crate) last_known_mouse_global_position: ScreenPoint,
    pub(crate) active_modifiers: Modifiers,

    pub(crate) click_count: u32,
    pub(crate) click_node: Option<NodeId>,
    pub(crate) click_counter: ClickCounter,

    pub(crate) capturing_node: Option<NodeId>,
    /// The capture was set by a press into a frame and ends with the release.
    pub(crate) reset_capturing_node_on_release: bool,

    pub(crate) node_under_mouse: Option<NodeId>,
    pub(crate) last_node_under_mouse: Option<NodeId>,
    pub(crate) last_subframe_under_mouse: Option<FrameId>,
    pub(crate) last_scrollbar_under_mouse: Option<ScrollbarId>,
    pub(crate) resizing_node: Option<NodeId>,
    pub(crate) current_cursor: Option<Cursor>,

    pub(crate) selection: SelectionGestureTracker,
    pub(crate) drag: DragGestureTracker,
    pub(crate) autoscroll: AutoscrollController,
    pub(crate) wheel: WheelLatch,
    pub(crate) touch: TouchTracker,
    pub(crate) gesture: GestureToMouseAdapter,

    pub(crate) fake_mouse_move_timer: Timer,
    pub(crate) cursor_update_timer: Timer,
    pub(crate) hover_timer: Timer,
    /// The longest time a mouse move took to handle, which slows down fake moves.
    pub(crate) max_mouse_moved_duration: Duration,
}

impl<H: EventHandlerHost> EventHandler<H> {
    pub fn new(host: H, prefs: InputPreferences) -> Self {
        Self {
            host,
            prefs,
            now: Duration::ZERO,
            mouse_pressed: false,
            captures_dragging: false,
            mouse_down: None,
            mouse_down_position: DocumentPoint::zero(),
            mouse_down_timestamp: Duration::ZERO,
            mouse_press_node: None,
            mouse_down_may_start_autoscroll: false,
            mouse_down_was_in_subframe: false,
            last_known_mouse_position: None,
            last_known_mouse_global_position: ScreenPoint::zero(),
            active_modifiers: Modifiers::empty(),
            click_count: 0,
            click_node: None,
            click_counter: ClickCounter::default(),
            capturing_node: None,
            reset_capturing_node_on_release: false,
            node_under_mouse: None,
            last_node_under_mouse: None,
            last_subframe_under_mouse: None,
            last_scrollbar_under_mouse: None,
            resizing_node: None,
            current_cursor: None,
            selection: SelectionGestureTracker::default(),
            drag: DragGestureTracker::default(),
            autoscroll: AutoscrollController::default(),
            wheel: WheelLatch::default(),
            touch: TouchTracker::default(),
            gesture: GestureToMouseAdapter::default(),
            fake_mouse_move_timer: Timer::default(),
            cursor_update_timer: Timer::default(),
            hover_timer: Timer::default(),
            max_mouse_moved_duration: Duration::ZERO,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn prefs(&self) -> &InputPreferences {
        &self.prefs
    }

    pub fn set_prefs(&mut self, prefs: InputPreferences) {
        self.prefs = prefs;
    }

    /// Routes a platform event to its handler.
    pub fn handle_input_event(&mut self, event: InputEvent) -> bool {
        self.active_modifiers = event.modifiers();
        match event {
            InputEvent::MouseButton(event) => match event.action {
                MouseAction::Pressed => self.handle_mouse_press_event(&event),
                MouseAction::Released => self.handle_mouse_release_event(&event),
                MouseAction::Moved => self.handle_mouse_move_event(&event),
            },
            InputEvent::MouseMove(event) => self.handle_mouse_move_event(&event),
            InputEvent::Wheel(event) => self.handle_wheel_event(&event),
            InputEvent::Keyboard(event) => self.handle_keyboard_event(&event),
            InputEvent::Touch(event) => self.handle_touch_event(&event),
            InputEvent::Gesture(event) => self.handle_gesture_event(&event),
        }
    }

    pub fn is_autoscroll_in_progress(&self) -> bool {
        self.autoscroll.is_autoscroll_in_progress()
    }

    pub fn is_pan_scroll_in_progress(&self) -> bool {
        self.autoscroll.is_pan_scroll_in_progress()
    }

    pub fn autoscroll_controller(&self) -> &AutoscrollController {
        &self.autoscroll
    }

    pub fn selection_gesture(&self) -> &SelectionGestureTracker {
        &self.selection
    }

    pub fn drag_gesture(&self) -> &DragGestureTracker {
        &self.drag
    }

    pub fn gesture_adapter(&self) -> &GestureToMouseAdapter {
        &self.gesture
    }

    pub fn last_known_mouse_position(&self) -> Option<DocumentPoint> {
        self.last_known_mouse_position
    }

    pub fn last_known_mouse_global_position(&self) -> ScreenPoint {
        self.last_known_mouse_global_position
    }

    pub fn mouse_pressed(&self) -> bool {
        self.mouse_pressed
    }

    pub fn mouse_press_node(&self) -> Option<NodeId> {
        self.mouse_press_node
    }

    pub fn click_count(&self) -> u32 {
        self.click_count
    }

    pub fn click_node(&self) -> Option<NodeId> {
        self.click_node
    }

    pub fn node_under_mouse(&self) -> Option<NodeId> {
        self.node_under_mouse
    }

    pub fn current_cursor(&self) -> Option<Cursor> {
        self.current_cursor
    }

    pub fn capturing_node(&self) -> Option<NodeId> {
        self.capturing_node
    }

    /// Sends every following mouse event to `node` until the capture is cleared.
    pub fn set_capturing_node(&mut self, node: Option<NodeId>) {
        self.capturing_node = node;
        self.reset_capturing_node_on_release = false;
    }

    pub fn invalidate_click(&mut self) {
        self.click_count = 0;
        self.click_node = None;
    }

    /// Forgets everything about the current document. Called on navigation and when
    /// the document is torn down.
    pub fn reset(&mut self) {
        debug!("Resetting event handler state");
        self.hover_timer.stop();
        self.cursor_update_timer.stop();
        self.fake_mouse_move_timer.stop();
        self.autoscroll.stop(&mut self.host, true);
        self.resizing_node = None;
        self.node_under_mouse = None;
        self.last_node_under_mouse = None;
        self.last_subframe_under_mouse = None;
        self.last_scrollbar_under_mouse = None;
        self.invalidate_click();
        self.click_counter.reset();
        self.last_known_mouse_position = None;
        self.last_known_mouse_global_position = ScreenPoint::zero();
        self.mouse_down = None;
        self.mouse_press_node = None;
        self.mouse_pressed = false;
        self.captures_dragging = false;
        self.mouse_down_may_start_autoscroll = false;
        self.mouse_down_was_in_subframe = false;
        self.capturing_node = None;
        self.reset_capturing_node_on_release = false;
        self.current_cursor = None;
        self.selection.reset();
        self.drag.reset();
        self.wheel.reset();
        self.touch.reset();
        self.gesture.reset();
        self.max_mouse_moved_duration = Duration::ZERO;
    }

    /// Drops every reference into the subtree rooted at `removed`, which the engine is
    /// about to remove from the document.
    pub fn node_will_be_removed(&mut self, removed: NodeId) {
        let inside = |handler: &Self, node: Option<NodeId>| {
            node.is_some_and(|node| handler.is_inclusive_ancestor(removed, node))
        };

        if inside(self, self.click_node) {
            self.click_node = None;
        }
        if inside(self, self.mouse_press_node) {
            self.mouse_press_node = None;
        }
        if inside(self, self.capturing_node) {
            self.capturing_node = None;
            self.reset_capturing_node_on_release = false;
        }
        if inside(self, self.node_under_mouse) {
            self.node_under_mouse = None;
        }
        if inside(self, self.last_node_under_mouse) {
            self.last_node_under_mouse = None;
        }
        if inside(self, self.resizing_node) {
            self.resizing_node = None;
        }
        if inside(self, self.drag.source) {
            self.drag.source = None;
            self.drag.may_start_drag = false;
        }
        if inside(self, self.drag.target) {
            self.drag.target = None;
            self.drag.should_only_fire_drag_over = false;
        }
        if inside(self, self.autoscroll.target()) {
            self.autoscroll.stop(&mut self.host, true);
        }

        let wheel_nodes = self.wheel.nodes();
        if wheel_nodes.into_iter().any(|node| inside(self, node)) {
            self.wheel.clear_nodes();
        }
        let gesture_nodes = self.gesture.nodes();
        if gesture_nodes.into_iter().any(|node| inside(self, node)) {
            self.gesture.clear_scroll_nodes();
        }

        // An active touch point keeps a target until it is released, so its events go
        // to the parent of the removed subtree instead.
        let replacement = self.host.parent(removed);
        let touch_targets: SmallVec<[NodeId; 4]> = self.touch.targets().collect();
        for target in touch_targets {
            if self.is_inclusive_ancestor(removed, target) {
                self.touch.retarget(target, replacement);
            }
        }
    }

    pub(crate) fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.host.parent(node);
        }
        false
    }

    fn ancestor_chain(&self, node: NodeId) -> AncestorChain {
        let mut chain = AncestorChain::new();
        let mut current = Some(node);
        while let Some(node) = current {
            chain.push(node);
            current = self.host.parent(node);
        }
        chain
    }

    /// Mouse events go to elements, never to text nodes.
    pub(crate) fn non_text_node(&self, node: Option<NodeId>) -> Option<NodeId> {
        let node = node?;
        if self.host.is_text(node) {
            self.host.parent(node)
        } else {
            Some(node)
        }
    }

    pub(crate) fn set_last_known_mouse_position(&mut self, event: &PlatformMouseEvent) {
        self.last_known_mouse_position = Some(event.point);
        self.last_known_mouse_global_position = event.screen_point;
    }

    /// Shows `cursor`, telling the embedder only when it changes.
    pub(crate) fn set_cursor(&mut self, cursor: Cursor) {
        if self.current_cursor == Some(cursor) {
            return;
        }
        self.current_cursor = Some(cursor);
        self.host.set_cursor(cursor);
    }

    /// Ends any autoscroll or pan, including one running in the frame the mouse was
    /// pressed in.
    pub(crate) fn stop_autoscroll(&mut self, renderer_is_being_destroyed: bool) {
        if self.mouse_down_was_in_subframe {
            if let Some(frame) = self
                .capturing_node
                .and_then(|node| self.host.subframe_for_node(node))
            {
                self.host
                    .stop_autoscroll_in_frame(frame, renderer_is_being_destroyed);
            }
        }

        let was_panning = self.autoscroll.is_pan_scroll_in_progress();
        if self
            .autoscroll
            .stop(&mut self.host, renderer_is_being_destroyed) &&
            was_panning
        {
            self.set_cursor(Cursor::Default);
        }
    }

    pub(crate) fn mouse_event_detail(
        &self,
        event: &PlatformMouseEvent,
        click_count: u32,
        related_target: Option<NodeId>,
    ) -> MouseEventDetail {
        MouseEventDetail {
            button: event.button,
            client_point: event.point,
            screen_point: event.screen_point,
            detail: click_count,
            modifiers: event.modifiers,
            related_target,
        }
    }

    pub(crate) fn dispatch_mouse_event_to(
        &mut self,
        event_type: DomEventType,
        target: NodeId,
        click_count: u32,
        event: &PlatformMouseEvent,
        related_target: Option<NodeId>,
    ) -> bool {
        if !self.host.is_connected(target) {
            return false;
        }
        let detail = self.mouse_event_detail(event, click_count, related_target);
        let dom_event = DomEvent::new(event_type, EventDetail::Mouse(detail));
        self.host.dispatch_event(target, dom_event).is_consumed()
    }

    /// Dispatches a mouse event at the node under the mouse, after moving that node to
    /// `target` (or to the capturing node). A `mousedown` that is not cancelled moves
    /// focus. Returns true if the default action may run.
    pub(crate) fn dispatch_mouse_event(
        &mut self,
        event_type: DomEventType,
        target: Option<NodeId>,
        click_count: u32,
        event: &PlatformMouseEvent,
        set_under: bool,
    ) -> bool {
        self.update_mouse_event_target_node(target, event, set_under);

        let mut swallow_event = false;
        if let Some(node) = self.node_under_mouse {
            swallow_event =
                self.dispatch_mouse_event_to(event_type, node, click_count, event, None);
        }

        if swallow_event || event_type != DomEventType::MouseDown {
            return !swallow_event;
        }

        // Pressing a scrollbar of the view leaves focus alone.
        if self.host.view_scrollbar_at(event.point).is_some() {
            return true;
        }

        // Focusability depends on layout.
        self.host.update_layout();

        let mut element = self.non_text_node(
            self.node_under_mouse
                .filter(|node| self.host.is_connected(*node)),
        );
        while let Some(current) = element {
            if self.host.is_mouse_focusable(current) {
                // Do not take focus from an element while pressing inside a range
                // selected in it, so the range can still be dragged.
                let keeps_focus = self
                    .host
                    .selection()
                    .is_some_and(|selection| selection.is_range()) &&
                    self.host.selection_contains_node(current) &&
                    self.host
                        .focused_element()
                        .is_some_and(|focused| self.is_inclusive_ancestor(focused, current));
                if keeps_focus {
                    return true;
                }
                break;
            }
            element = self.host.parent(current);
        }

        if element.is_none() {
            let result = self.host.hit_test(
                event.point,
                HitTestRequest::READ_ONLY | HitTestRequest::DISALLOW_SHADOW_CONTENT,
            );
            // Pressing a scrollbar only moves focus to something mouse-focusable.
            if result.scrollbar.is_some() {
                return false;
            }
        }

        // A vetoed focus change swallows the press. Never clear a swallow the page set.
        if !self.host.set_focused_element(element) {
            debug!("Focus change to {:?} was vetoed", element);
            swallow_event = true;
        }
        !swallow_event
    }

    /// Makes `target` (or the capturing node) the node under the mouse. With
    /// `fire_mouse_over_out`, a change of that node fires `mouseout` at the old node,
    /// `mouseleave` up to the common ancestor, `mouseover` at the new node and
    /// `mouseenter` down from the common ancestor, in that order.
    pub(crate) fn update_mouse_event_target_node(
        &mut self,
        target: Option<NodeId>,
        event: &PlatformMouseEvent,
        fire_mouse_over_out: bool,
    ) {
        self.node_under_mouse = match self
            .capturing_node
            .filter(|node| self.host.is_connected(*node))
        {
            Some(capturing_node) => Some(capturing_node),
            None => self.non_text_node(target),
        };

        if !fire_mouse_over_out {
            return;
        }

        if self
            .last_node_under_mouse
            .is_some_and(|node| !self.host.is_connected(node))
        {
            self.last_node_under_mouse = None;
            self.last_scrollbar_under_mouse = None;
        }

        let old_node = self.last_node_under_mouse;
        let new_node = self.node_under_mouse;
        if old_node != new_node {
            let old_chain = old_node
                .map(|node| self.ancestor_chain(node))
                .unwrap_or_default();
            let new_chain = new_node
                .map(|node| self.ancestor_chain(node))
                .unwrap_or_default();
            let common_ancestor = old_chain
                .iter()
                .find(|node| new_chain.contains(node))
                .copied();

            if let Some(old_node) = old_node {
                trace!("mouseout {:?} -> {:?}", old_node, new_node);
                self.dispatch_mouse_event_to(DomEventType::MouseOut, old_node, 0, event, new_node);
                for node in old_chain
                    .iter()
                    .take_while(|node| Some(**node) != common_ancestor)
                {
                    self.dispatch_mouse_event_to(
                        DomEventType::MouseLeave,
                        *node,
                        0,
                        event,
                        new_node,
                    );
                }
            }

            if let Some(new_node) = new_node {
                trace!("mouseover {:?} <- {:?}", new_node, old_node);
                self.dispatch_mouse_event_to(DomEventType::MouseOver, new_node, 0, event, old_node);
                let enter_chain: AncestorChain = new_chain
                    .iter()
                    .take_while(|node| Some(**node) != common_ancestor)
                    .copied()
                    .collect();
                for node in enter_chain.into_iter().rev() {
                    self.dispatch_mouse_event_to(
                        DomEventType::MouseEnter,
                        node,
                        0,
                        event,
                        old_node,
                    );
                }
            }
        }
        self.last_node_under_mouse = self.node_under_mouse;
    }

    /// The earliest time at which [`EventHandler::fire_timers`] has work to do.
    pub fn next_timer_deadline(&self) -> Option<Duration> {
        [
            self.hover_timer.scheduled_for(),
            self.cursor_update_timer.scheduled_for(),
            self.fake_mouse_move_timer.scheduled_for(),
            self.autoscroll.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Runs every timer that is due at `now`.
    pub fn fire_timers(&mut self, now: Duration) {
        self.now = now;
        if self.hover_timer.take_if_due(now) {
            self.hover_timer_fired();
        }
        if self.cursor_update_timer.take_if_due(now) {
            self.update_cursor();
        }
        if self.fake_mouse_move_timer.take_if_due(now) {
            self.fake_mouse_move_event_timer_fired(now);
        }

        let pointer = self.last_known_mouse_position.unwrap_or_default();
        let Some(tick) = self.autoscroll.fire_if_due(
            &mut self.host,
            now,
            pointer,
            self.mouse_pressed,
            &self.prefs,
        ) else {
            return;
        };
        if let Some(cursor) = tick.cursor {
            self.set_cursor(cursor);
        }
        if tick.scrolled && self.autoscroll.mode() == AutoscrollMode::Selection {
            // The content moved under the pointer.
            self.update_selection_for_mouse_drag();
        }
    }

    pub fn schedule_hover_state_update(&mut self) {
        if !self.hover_timer.is_active() {
            self.hover_timer.start_one_shot(self.now, Duration::ZERO);
        }
    }

    pub fn schedule_cursor_update(&mut self) {
        if !self.cursor_update_timer.is_active() {
            self.cursor_update_timer
                .start_one_shot(self.now, self.prefs.cursor_update_interval());
        }
    }

    /// Asks for a synthetic mouse move at the last known position, so hover state
    /// follows content that moves under a still pointer.
    pub fn dispatch_fake_mouse_move_event_soon(&mut self) {
        if self.mouse_pressed || self.last_known_mouse_position.is_none() {
            return;
        }
        if !self.prefs.device_supports_mouse {
            return;
        }

        // Content that handles moves slowly only gets them once scrolling settles.
        if self.max_mouse_moved_duration > self.prefs.fake_mouse_move_short_interval() {
            self.fake_mouse_move_timer
                .start_one_shot(self.now, self.prefs.fake_mouse_move_long_interval());
        } else if !self.fake_mouse_move_timer.is_active() {
            self.fake_mouse_move_timer
                .start_one_shot(self.now, self.prefs.fake_mouse_move_short_interval());
        }
    }

    /// Like [`EventHandler::dispatch_fake_mouse_move_event_soon`], but only if the
    /// pointer is inside `rect`.
    pub fn dispatch_fake_mouse_move_event_soon_in_rect(&mut self, rect: DocumentRect) {
        if self
            .last_known_mouse_position
            .is_some_and(|position| rect.contains(position))
        {
            self.dispatch_fake_mouse_move_event_soon();
        }
    }

    pub fn cancel_fake_mouse_move_event(&mut self) {
        self.fake_mouse_move_timer.stop();
    }

    fn fake_mouse_move_event_timer_fired(&mut self, now: Duration) {
        if self.mouse_pressed || !self.prefs.device_supports_mouse {
            return;
        }
        let Some(position) = self.last_known_mouse_position else {
            return;
        };
        let mut event = PlatformMouseEvent::new(MouseAction::Moved, None, position, now)
            .with_modifiers(self.active_modifiers);
        event.screen_point = self.last_known_mouse_global_position;
        self.handle_mouse_move_event(&event);
    }

    fn hover_timer_fired(&mut self) {
        let Some(position) = self.last_known_mouse_position else {
            return;
        };
        let request = HitTestRequest::MOVE | HitTestRequest::DISALLOW_SHADOW_CONTENT;
        let result = self.host.hit_test(position, request);
        let element = self.non_text_node(result.node);
        self.host.update_hover_active_state(request, element);
    }
}
