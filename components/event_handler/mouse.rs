/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Instant;

use input_traits::{
    Cursor, DocumentPoint, DomEventType, EventHandlerHost, FrameId, HitTestRequest,
    HitTestResult, MouseAction, MouseButton, NodeId, PlatformMouseEvent, PlatformTouchEvent,
    PlatformTouchPoint, ScrollbarId, TouchId, TouchPointState,
};
use log::debug;

use crate::EventHandler;
use crate::autoscroll::AutoscrollMode;
use crate::selection::{SelectionGestureTracker, SelectionInitiationState};

impl<H: EventHandlerHost> EventHandler<H> {
    /// Handles a button going down: counts clicks, dispatches `mousedown`, moves
    /// focus and starts whatever selection gesture the click count calls for.
    pub fn handle_mouse_press_event(&mut self, event: &PlatformMouseEvent) -> bool {
        debug!("{:?}: {:?} at {:?}", event.action, event.button, event.point);
        self.now = event.timestamp;
        if self.dispatch_synthetic_touch_event_if_enabled(event) {
            return true;
        }

        self.cancel_fake_mouse_move_event();
        self.mouse_pressed = true;
        self.captures_dragging = true;
        self.set_last_known_mouse_position(event);
        self.mouse_down_timestamp = event.timestamp;
        self.drag.may_start_drag = false;
        self.selection.begin_press(false);
        self.mouse_down_may_start_autoscroll = false;
        self.mouse_down_position = event.point;
        self.mouse_down_was_in_subframe = false;

        let result = self.host.hit_test(
            event.point,
            HitTestRequest::ACTIVE | HitTestRequest::DISALLOW_SHADOW_CONTENT,
        );
        let Some(target) = result.node else {
            self.invalidate_click();
            return false;
        };
        self.mouse_press_node = Some(target);

        if let Some(frame) = result.subframe {
            if self.pass_mouse_press_event_to_subframe(frame, event) {
                // Moves until the release belong to the frame.
                self.captures_dragging = self.host.captures_dragging(frame);
                if self.mouse_pressed && self.captures_dragging {
                    self.capturing_node = Some(target);
                    self.reset_capturing_node_on_release = true;
                }
                self.invalidate_click();
                return true;
            }
        }

        // Any press ends a pan scroll, and must not also click whatever is under it.
        let was_pan_scroll_in_progress = self.is_pan_scroll_in_progress();
        self.stop_autoscroll(false);
        if was_pan_scroll_in_progress {
            self.invalidate_click();
            return true;
        }

        let click_count = self
            .click_counter
            .click_count_for_press(event, &self.prefs);
        self.click_count = click_count;
        self.click_node = self.non_text_node(Some(target));

        if result.in_resize_control && self.host.begin_resize(target, event.point) {
            debug!("Resizing {:?}", target);
            self.resizing_node = Some(target);
            self.invalidate_click();
            return true;
        }

        let mut swallow_event = !self.dispatch_mouse_event(
            DomEventType::MouseDown,
            Some(target),
            click_count,
            event,
            true,
        );
        self.captures_dragging = !swallow_event || result.scrollbar.is_some();

        // The mousedown listeners may have destroyed the scrollbar.
        let mut result = result;
        if result.scrollbar.is_some() {
            let was_last_scrollbar = result.scrollbar == self.last_scrollbar_under_mouse;
            result = self.host.hit_test(
                event.point,
                HitTestRequest::READ_ONLY |
                    HitTestRequest::ACTIVE |
                    HitTestRequest::DISALLOW_SHADOW_CONTENT,
            );
            if was_last_scrollbar && result.scrollbar != self.last_scrollbar_under_mouse {
                self.last_scrollbar_under_mouse = None;
            }
        }

        if swallow_event {
            // Scrollbars get the press even when the page swallowed it.
            self.update_last_scrollbar_under_mouse(result.scrollbar, true);
            if let Some(scrollbar) = result.scrollbar {
                self.pass_mouse_press_event_to_scrollbar(scrollbar, event);
            }
        } else {
            let scrollbar = self
                .host
                .view_scrollbar_at(event.point)
                .or(result.scrollbar);
            self.update_last_scrollbar_under_mouse(scrollbar, true);
            swallow_event = match scrollbar {
                Some(scrollbar) if self.pass_mouse_press_event_to_scrollbar(scrollbar, event) => {
                    true
                },
                _ => self.handle_mouse_press(event, &result, click_count),
            };
        }

        if event.button == Some(MouseButton::Right) && self.prefs.context_menu_on_mouse_down {
            swallow_event |= self.send_context_menu_event(event);
        }
        swallow_event
    }

    /// The default action of a press that the page did not cancel.
    fn handle_mouse_press(
        &mut self,
        event: &PlatformMouseEvent,
        result: &HitTestResult,
        click_count: u32,
    ) -> bool {
        self.drag.source = None;
        self.cancel_fake_mouse_move_event();
        self.host.update_layout();

        if result.in_scrollbar_corner {
            return false;
        }

        let single_click = click_count <= 1;
        let may_start_select = result.node.is_some_and(|node| {
            SelectionGestureTracker::can_mouse_down_start_select(&self.host, node)
        }) && result.scrollbar.is_none();
        self.selection.begin_press(may_start_select);
        self.drag.may_start_drag = single_click;
        self.mouse_down = Some(*event);
        // The mousedown listeners may have removed the node.
        self.mouse_press_node = result.node.filter(|node| self.host.is_connected(*node));
        self.mouse_down_position = event.point;
        self.mouse_pressed = true;

        if event.button == Some(MouseButton::Middle) && self.start_pan_scrolling(result) {
            return true;
        }

        let swallow_event = match click_count {
            2 => self.selection.handle_mouse_press_double_click(
                &mut self.host,
                event,
                result,
                click_count,
                &self.prefs,
            ),
            count if count >= 3 => {
                self.selection
                    .handle_mouse_press_triple_click(&mut self.host, event, result)
            },
            _ => self.selection.handle_mouse_press_single_click(
                &mut self.host,
                event,
                result,
                &self.prefs,
            ),
        };

        self.mouse_down_may_start_autoscroll = self.selection.mouse_down_may_start_select() ||
            self.mouse_press_node
                .is_some_and(|node| self.host.can_be_programmatically_scrolled(node));
        swallow_event
    }

    /// Starts middle-button pan scrolling of the box under a press that is not on a
    /// link or editable content.
    fn start_pan_scrolling(&mut self, result: &HitTestResult) -> bool {
        if !self.prefs.supports_pan_scroll || result.is_over_link {
            return false;
        }
        let Some(node) = result.node.filter(|node| !self.host.is_editable(*node)) else {
            return false;
        };
        let Some(container) = self.host.autoscroll_container(node) else {
            return false;
        };
        let origin = self.last_known_mouse_position.unwrap_or(self.mouse_down_position);
        if !self
            .autoscroll
            .start_pan(container, origin, self.now, &self.prefs)
        {
            return false;
        }
        self.invalidate_click();
        self.set_cursor(Cursor::AllScroll);
        true
    }

    pub fn pass_mouse_press_event_to_scrollbar(
        &mut self,
        scrollbar: ScrollbarId,
        event: &PlatformMouseEvent,
    ) -> bool {
        if !self.host.scrollbar_enabled(scrollbar) {
            return false;
        }
        self.host.scrollbar_mouse_down(scrollbar, event)
    }

    fn pass_mouse_press_event_to_subframe(
        &mut self,
        frame: FrameId,
        event: &PlatformMouseEvent,
    ) -> bool {
        if !self.host.pass_mouse_press(frame, event) {
            return false;
        }
        self.mouse_down_was_in_subframe = true;
        true
    }

    /// Sends scrollbar hover notifications when the scrollbar under the pointer
    /// changes. With `set_last` false the scrollbar is only exited, never entered.
    pub(crate) fn update_last_scrollbar_under_mouse(
        &mut self,
        scrollbar: Option<ScrollbarId>,
        set_last: bool,
    ) {
        if self.last_scrollbar_under_mouse == scrollbar {
            return;
        }
        if let Some(last_scrollbar) = self.last_scrollbar_under_mouse {
            self.host.scrollbar_mouse_exited(last_scrollbar);
        }
        if let Some(scrollbar) = scrollbar.filter(|_| set_last) {
            self.host.scrollbar_mouse_entered(scrollbar);
        }
        self.last_scrollbar_under_mouse = if set_last { scrollbar } else { None };
    }

    /// Handles the pointer moving, with or without a button held.
    pub fn handle_mouse_move_event(&mut self, event: &PlatformMouseEvent) -> bool {
        let started = Instant::now();
        let swallow_event = self.handle_mouse_move(event);
        self.max_mouse_moved_duration = self.max_mouse_moved_duration.max(started.elapsed());
        swallow_event
    }

    fn handle_mouse_move(&mut self, event: &PlatformMouseEvent) -> bool {
        self.now = event.timestamp;
        if self.dispatch_synthetic_touch_event_if_enabled(event) {
            return true;
        }

        self.set_last_known_mouse_position(event);
        self.hover_timer.stop();
        self.cursor_update_timer.stop();
        self.cancel_fake_mouse_move_event();

        // Send events right to a scrollbar if the mouse is pressed.
        if self.mouse_pressed {
            if let Some(scrollbar) = self.last_scrollbar_under_mouse {
                return self.host.scrollbar_mouse_moved(scrollbar, event);
            }
        }

        let mut request = HitTestRequest::MOVE |
            HitTestRequest::DISALLOW_SHADOW_CONTENT |
            HitTestRequest::ALLOW_FRAME_SCROLLBARS;
        if self.mouse_pressed {
            request |= HitTestRequest::ACTIVE;
        }
        if self.touch.is_pressed() {
            request |= HitTestRequest::ACTIVE | HitTestRequest::READ_ONLY;
        }
        let result = self.host.hit_test(event.point, request);

        match self
            .resizing_node
            .filter(|node| self.host.is_connected(*node))
        {
            Some(node) => self.host.resize(node, event.point),
            None => {
                self.update_last_scrollbar_under_mouse(result.scrollbar, !self.mouse_pressed);
                if !self.mouse_pressed {
                    if let Some(scrollbar) = result.scrollbar {
                        self.host.scrollbar_mouse_moved(scrollbar, event);
                    }
                }
            },
        }

        let mut swallow_event = false;
        let new_subframe = match self.capturing_node {
            Some(capturing_node) => self.host.subframe_for_node(capturing_node),
            None => result.subframe,
        };

        // The frame the pointer left fires its mouseouts first.
        if let Some(last_subframe) = self.last_subframe_under_mouse {
            if Some(last_subframe) != new_subframe {
                self.host.pass_mouse_move(last_subframe, event);
            }
        }

        match new_subframe {
            Some(frame) => {
                self.update_mouse_event_target_node(result.node, event, true);
                swallow_event |= self.host.pass_mouse_move(frame, event);
            },
            None => {
                if let Some(cursor) = self.select_cursor(&result, event.shift_key()) {
                    self.set_cursor(cursor);
                }
            },
        }
        self.last_subframe_under_mouse = new_subframe;

        if swallow_event {
            return true;
        }

        swallow_event =
            !self.dispatch_mouse_event(DomEventType::MouseMove, result.node, 0, event, true);
        if !swallow_event {
            swallow_event = self.handle_mouse_dragged_event(event, &result);
        }
        swallow_event
    }

    /// A move with the button held: continues a drag or extends the selection.
    fn handle_mouse_dragged_event(
        &mut self,
        event: &PlatformMouseEvent,
        result: &HitTestResult,
    ) -> bool {
        if !self.mouse_pressed {
            return false;
        }
        if self.handle_drag(event, true) {
            return true;
        }

        let Some(target) = result.node else {
            return false;
        };
        if event.button != Some(MouseButton::Left) || !self.host.has_renderer(target) {
            return false;
        }

        self.drag.may_start_drag = false;

        if self.mouse_down_may_start_autoscroll && !self.is_pan_scroll_in_progress() {
            if let Some(container) = self.host.autoscroll_container(target) {
                self.autoscroll
                    .start_for_selection(container, self.now, &self.prefs);
            }
            self.mouse_down_may_start_autoscroll = false;
        }

        if self.selection.state() != SelectionInitiationState::Extended {
            let mouse_down_result = self.host.hit_test(
                self.mouse_down_position,
                HitTestRequest::READ_ONLY |
                    HitTestRequest::ACTIVE |
                    HitTestRequest::DISALLOW_SHADOW_CONTENT,
            );
            self.selection.update_selection_for_mouse_drag(
                &mut self.host,
                &mouse_down_result,
                self.mouse_press_node,
            );
        }
        self.selection
            .update_selection_for_mouse_drag(&mut self.host, result, self.mouse_press_node);
        true
    }

    /// Extends the selection to the pointer after an autoscroll tick moved the
    /// content under it.
    pub(crate) fn update_selection_for_mouse_drag(&mut self) {
        if !self.mouse_pressed {
            return;
        }
        let Some(position) = self.last_known_mouse_position else {
            return;
        };
        let result = self.host.hit_test(
            position,
            HitTestRequest::READ_ONLY |
                HitTestRequest::ACTIVE |
                HitTestRequest::MOVE |
                HitTestRequest::DISALLOW_SHADOW_CONTENT,
        );
        self.selection
            .update_selection_for_mouse_drag(&mut self.host, &result, self.mouse_press_node);
    }

    /// Handles a button going up: dispatches `mouseup`, then `click` if the release
    /// lands on the pressed element, then runs the release default action. Each
    /// stage runs whatever the earlier ones returned.
    pub fn handle_mouse_release_event(&mut self, event: &PlatformMouseEvent) -> bool {
        debug!("{:?}: {:?} at {:?}", event.action, event.button, event.point);
        self.now = event.timestamp;
        if self.dispatch_synthetic_touch_event_if_enabled(event) {
            return true;
        }

        let was_pan_scroll_in_progress = self.is_pan_scroll_in_progress();
        if was_pan_scroll_in_progress {
            let ends_pan = event.button == Some(MouseButton::Middle) ||
                self.autoscroll.mode() == AutoscrollMode::PanCanStop;
            if ends_pan && self.autoscroll.handle_pan_button_release(&mut self.host) {
                self.set_cursor(Cursor::Default);
            }
        }

        if self.is_autoscroll_in_progress() {
            self.stop_autoscroll(false);
        }

        // No drag may start before the next press.
        self.mouse_pressed = false;
        self.captures_dragging = false;
        self.drag.may_start_drag = false;
        self.mouse_down_may_start_autoscroll = false;
        self.set_last_known_mouse_position(event);

        if let Some(scrollbar) = self.last_scrollbar_under_mouse {
            self.invalidate_click();
            self.host.scrollbar_mouse_up(scrollbar, event);
            return !self.dispatch_mouse_event(
                DomEventType::MouseUp,
                self.last_node_under_mouse,
                self.click_count,
                event,
                false,
            );
        }

        let result = self.host.hit_test(
            event.point,
            HitTestRequest::RELEASE | HitTestRequest::DISALLOW_SHADOW_CONTENT,
        );
        let subframe = match self.capturing_node {
            Some(capturing_node) => self.host.subframe_for_node(capturing_node),
            None => result.subframe,
        };
        if self.reset_capturing_node_on_release {
            self.capturing_node = None;
            self.reset_capturing_node_on_release = false;
        }
        if let Some(frame) = subframe {
            if self.host.pass_mouse_release(frame, event) {
                return true;
            }
        }

        let click_count = self.click_count;
        let swallow_mouse_up_event = !self.dispatch_mouse_event(
            DomEventType::MouseUp,
            result.node,
            click_count,
            event,
            false,
        );

        let context_menu_event = event.button == Some(MouseButton::Right);
        let release_target = self.non_text_node(result.node);
        let swallow_click_event = click_count > 0 &&
            !context_menu_event &&
            self.mouse_is_released_on_pressed_element(release_target) &&
            self.dispatch_click(result.node, click_count, event);

        if let Some(node) = self.resizing_node.take() {
            if self.host.is_connected(node) {
                self.host.end_resize(node);
            }
        }

        let swallow_mouse_release_event =
            self.handle_mouse_release(event, &result, was_pan_scroll_in_progress);

        self.invalidate_click();
        swallow_mouse_up_event || swallow_click_event || swallow_mouse_release_event
    }

    /// Fires `click`, and `dblclick` after the second click of a sequence. Returns
    /// true if either was swallowed.
    fn dispatch_click(
        &mut self,
        target: Option<NodeId>,
        click_count: u32,
        event: &PlatformMouseEvent,
    ) -> bool {
        let mut swallow_event =
            !self.dispatch_mouse_event(DomEventType::Click, target, click_count, event, true);
        if click_count == 2 {
            if let Some(node) = self.node_under_mouse {
                swallow_event |= self.dispatch_mouse_event_to(
                    DomEventType::DblClick,
                    node,
                    click_count,
                    event,
                    None,
                );
            }
        }
        swallow_event
    }

    /// A release counts as a click on the pressed element if it hits the same
    /// element, or the same host when both hits are inside a user-agent shadow tree.
    fn mouse_is_released_on_pressed_element(&self, target: Option<NodeId>) -> bool {
        if target == self.click_node {
            return true;
        }
        let Some(target_host) = target.and_then(|target| self.host.shadow_host(target)) else {
            return false;
        };
        self.click_node
            .and_then(|click_node| self.host.shadow_host(click_node)) ==
            Some(target_host)
    }

    /// The default action of a release.
    fn handle_mouse_release(
        &mut self,
        event: &PlatformMouseEvent,
        result: &HitTestResult,
        was_pan_scroll_in_progress: bool,
    ) -> bool {
        self.mouse_down_was_in_subframe = false;

        let mut handled = self.selection.handle_mouse_release(
            &mut self.host,
            event,
            result,
            self.mouse_down_position,
        );

        if event.button == Some(MouseButton::Middle) && !was_pan_scroll_in_progress {
            // Pastes at the caret the press placed, even if something else handled it.
            handled = self.handle_paste_global_selection(result) || handled;
        }
        handled
    }

    fn handle_paste_global_selection(&mut self, result: &HitTestResult) -> bool {
        // Focus moved to another frame during the click.
        if self.host.focused_frame().is_some() {
            return false;
        }
        let Some(target) = self
            .host
            .focused_element()
            .or_else(|| self.non_text_node(result.node))
        else {
            return false;
        };
        self.host.paste_global_selection(target)
    }

    /// Fires `contextmenu` at the node under `event`, first selecting the word there
    /// when the platform selects on context clicks.
    pub fn send_context_menu_event(&mut self, event: &PlatformMouseEvent) -> bool {
        // No drag may start while the menu is up.
        self.mouse_pressed = false;
        self.now = event.timestamp;

        let result = self.host.hit_test(
            event.point,
            HitTestRequest::ACTIVE | HitTestRequest::DISALLOW_SHADOW_CONTENT,
        );
        if self.prefs.select_word_on_context_menu &&
            !self.host.selection_contains_point(event.point) &&
            result.scrollbar.is_none() &&
            (self.host.selection_is_editable() ||
                result.node.is_some_and(|node| self.host.is_text(node)))
        {
            self.selection.begin_press(true);
            self.selection
                .select_closest_word(&mut self.host, &result, false);
        }

        !self.dispatch_mouse_event(DomEventType::ContextMenu, result.node, 0, event, false)
    }

    /// Fires `contextmenu` for the context menu key, at the selection if there is
    /// one, else at the focused element, else at the top of the document.
    pub fn send_context_menu_event_for_key(&mut self) -> bool {
        self.mouse_pressed = false;

        let focused_element = self.host.focused_element();
        let has_selection = self.host.selection().is_some_and(|selection| {
            selection.is_range() || self.host.selection_is_editable()
        });
        let location = if has_selection {
            self.host
                .selection_first_rect()
                .map(|rect| DocumentPoint::new(rect.min_x(), (rect.max_y() - 1.).max(0.)))
                .unwrap_or_default()
        } else if let Some(element) = focused_element {
            let Some(rect) = self.host.bounding_rect(element) else {
                return false;
            };
            DocumentPoint::new(rect.min_x(), rect.max_y() - 1.)
        } else {
            DocumentPoint::new(1., 1.)
        };

        self.set_cursor(Cursor::Default);

        let Some(target) = focused_element.or_else(|| self.host.root_element()) else {
            return false;
        };
        self.host.update_hover_active_state(
            HitTestRequest::ACTIVE | HitTestRequest::DISALLOW_SHADOW_CONTENT,
            Some(target),
        );

        let event = PlatformMouseEvent::new(
            MouseAction::Pressed,
            Some(MouseButton::Right),
            location,
            self.now,
        )
        .with_click_count(1);
        !self.dispatch_mouse_event(DomEventType::ContextMenu, Some(target), 0, &event, false)
    }

    /// With touch emulation on, turns a mouse event into a single-point touch event.
    /// Returns true if the touch event was consumed, or if a move without a touch
    /// down must be dropped.
    fn dispatch_synthetic_touch_event_if_enabled(&mut self, event: &PlatformMouseEvent) -> bool {
        if !self.prefs.touch_event_emulation {
            return false;
        }
        let result = self.host.hit_test(
            event.point,
            HitTestRequest::ACTIVE | HitTestRequest::DISALLOW_SHADOW_CONTENT,
        );
        if result.scrollbar.is_some() || result.subframe.is_some() {
            return false;
        }
        if event.action == MouseAction::Moved && !self.touch.is_pressed() {
            return true;
        }

        let state = match event.action {
            MouseAction::Pressed => TouchPointState::Pressed,
            MouseAction::Moved => TouchPointState::Moved,
            MouseAction::Released => TouchPointState::Released,
        };
        let mut point = PlatformTouchPoint::new(TouchId(0), state, event.point);
        point.screen_point = event.screen_point;
        let mut touch_event = PlatformTouchEvent::new(vec![point], event.timestamp);
        touch_event.modifiers = event.modifiers;
        self.handle_touch_event(&touch_event)
    }
}
