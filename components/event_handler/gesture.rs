/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Recognized gestures. Taps, long presses and two-finger taps become synthesized
//! mouse events at a touch-adjusted point, so they go through the same press and
//! release logic as the mouse. Scroll gestures scroll the node they began on.

use input_traits::{
    DocumentPoint, DocumentRect, DocumentSize, DocumentVector, DomEvent, DomEventType,
    EventDetail, EventHandlerHost, FrameId, GestureEventDetail, GestureType, HitTestRequest,
    MouseAction, MouseButton, NodeId, PlatformGestureEvent, PlatformMouseEvent, ScrollAxis,
    ScrollGranularity, ScrollbarId, TouchAdjustmentCandidate,
};
use log::debug;

use crate::EventHandler;

/// What an in-progress gesture sequence has claimed.
#[derive(Debug, Default)]
pub struct GestureToMouseAdapter {
    /// The node a scroll gesture began on. Updates keep scrolling it until the end.
    scroll_gesture_handling_node: Option<NodeId>,
    /// The box the previous non-propagating update scrolled.
    previous_gesture_scrolled_node: Option<NodeId>,
    scrollbar_handling_scroll_gesture: Option<ScrollbarId>,
    /// The frame under the start of the scroll gesture, which gets its updates.
    scroll_gesture_subframe: Option<FrameId>,
    /// A long press already showed the context menu, so the long tap that ends it
    /// must not show another.
    did_long_press_invoke_context_menu: bool,
}

impl GestureToMouseAdapter {
    pub fn scroll_gesture_handling_node(&self) -> Option<NodeId> {
        self.scroll_gesture_handling_node
    }

    pub fn is_scrollbar_handling_gestures(&self) -> bool {
        self.scrollbar_handling_scroll_gesture.is_some()
    }

    pub(crate) fn nodes(&self) -> [Option<NodeId>; 2] {
        [
            self.scroll_gesture_handling_node,
            self.previous_gesture_scrolled_node,
        ]
    }

    pub(crate) fn clear_scroll_nodes(&mut self) {
        self.scroll_gesture_handling_node = None;
        self.previous_gesture_scrolled_node = None;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Picks the candidate a finger covering `touch_rect` most likely meant, and the point
/// inside it closest to `center`. Candidates the finger barely grazes lose to ones
/// close to the center or mostly covered by the finger.
pub(crate) fn best_touch_candidate<'a>(
    candidates: impl IntoIterator<Item = &'a TouchAdjustmentCandidate>,
    center: DocumentPoint,
    touch_rect: DocumentRect,
) -> Option<(&'a TouchAdjustmentCandidate, DocumentPoint)> {
    let radius_squared = (touch_rect.width() / 2.) * (touch_rect.height() / 2.);
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let overlap = candidate.rect.intersection(&touch_rect)?;
            let closest = DocumentPoint::new(
                center.x.clamp(overlap.min_x(), overlap.max_x()),
                center.y.clamp(overlap.min_y(), overlap.max_y()),
            );
            let distance = (closest - center).square_length() / radius_squared.max(1.);
            let coverage = match candidate.rect.size.area() {
                area if area > 0. => overlap.size.area() / area,
                _ => 0.,
            };
            Some((candidate, closest, distance - coverage))
        })
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(candidate, closest, _)| (candidate, closest))
}

fn touch_rect(center: DocumentPoint, radius: DocumentSize) -> DocumentRect {
    DocumentRect::new(center - radius.to_vector(), radius * 2.)
}

impl<H: EventHandlerHost> EventHandler<H> {
    pub fn handle_gesture_event(&mut self, event: &PlatformGestureEvent) -> bool {
        debug!("Gesture {:?} at {:?}", event.gesture_type, event.point);
        self.now = event.timestamp;

        let mut scrollbar = None;
        let mut target = None;
        if matches!(
            event.gesture_type,
            GestureType::ScrollEnd |
                GestureType::ScrollUpdate |
                GestureType::ScrollUpdateWithoutPropagation
        ) {
            scrollbar = self.gesture.scrollbar_handling_scroll_gesture;
            target = self
                .gesture
                .scroll_gesture_handling_node
                .filter(|node| self.host.is_connected(*node));
        }

        let mut adjusted_point = event.point;
        let mut request = HitTestRequest::TOUCH_EVENT;
        match event.gesture_type {
            GestureType::TapDown => {
                if let Some(point) = self.adjust_gesture_position(event) {
                    adjusted_point = point;
                }
                request |= HitTestRequest::ACTIVE;
            },
            // The synthesized mouseup clears `:active` again.
            GestureType::Tap => request |= HitTestRequest::READ_ONLY,
            _ => request |= HitTestRequest::ACTIVE | HitTestRequest::READ_ONLY,
        }
        if !self.prefs.gestures_trigger_active {
            request |= HitTestRequest::READ_ONLY;
        }

        if (scrollbar.is_none() && target.is_none()) || !request.contains(HitTestRequest::READ_ONLY)
        {
            let result = self
                .host
                .hit_test(adjusted_point, request | HitTestRequest::ALLOW_FRAME_SCROLLBARS);
            target = self.non_text_node(result.node);
            scrollbar = scrollbar.or(result.scrollbar);
        }

        if let Some(scrollbar) = scrollbar {
            let swallowed = self.host.scrollbar_gesture_event(scrollbar, event);
            if event.gesture_type == GestureType::ScrollBegin && swallowed {
                self.gesture.scrollbar_handling_scroll_gesture = Some(scrollbar);
            } else if event.gesture_type == GestureType::ScrollEnd || !swallowed {
                self.gesture.scrollbar_handling_scroll_gesture = None;
            }
            if swallowed {
                return true;
            }
        }

        if let Some(target) = target {
            if self.dispatch_gesture_event(target, event) {
                match event.gesture_type {
                    GestureType::ScrollBegin => {
                        self.gesture.scroll_gesture_handling_node = Some(target)
                    },
                    GestureType::ScrollEnd => self.gesture.clear_scroll_nodes(),
                    _ => {},
                }
                return true;
            }
        }

        match event.gesture_type {
            GestureType::ScrollBegin => self.handle_gesture_scroll_begin(event),
            GestureType::ScrollUpdate | GestureType::ScrollUpdateWithoutPropagation => {
                self.handle_gesture_scroll_update(event)
            },
            GestureType::ScrollEnd => {
                self.gesture.clear_scroll_nodes();
                self.gesture.scroll_gesture_subframe = None;
                true
            },
            GestureType::Tap => self.handle_gesture_tap(event),
            GestureType::TapDown => self.handle_gesture_tap_down(),
            GestureType::LongPress => self.handle_gesture_long_press(event),
            GestureType::LongTap => self.handle_gesture_long_tap(event),
            GestureType::TwoFingerTap => {
                self.handle_gesture_for_text_selection_or_context_menu(event)
            },
            GestureType::ShowPress |
            GestureType::PinchBegin |
            GestureType::PinchEnd |
            GestureType::PinchUpdate => false,
        }
    }

    /// Fires the DOM notification for a gesture, when the page asked for them.
    fn dispatch_gesture_event(&mut self, target: NodeId, event: &PlatformGestureEvent) -> bool {
        if !self.prefs.dispatch_gesture_events {
            return false;
        }
        let Some(event_type) = DomEventType::for_gesture(event.gesture_type) else {
            return false;
        };
        let detail = GestureEventDetail {
            point: event.point,
            screen_point: event.screen_point,
            delta: event.delta,
            modifiers: event.modifiers,
        };
        let dom_event = DomEvent::new(event_type, EventDetail::Gesture(detail));
        self.host.dispatch_event(target, dom_event).is_consumed()
    }

    fn synthesized_mouse_event(
        &self,
        action: MouseAction,
        button: Option<MouseButton>,
        point: DocumentPoint,
        event: &PlatformGestureEvent,
    ) -> PlatformMouseEvent {
        let mut mouse_event = PlatformMouseEvent::new(action, button, point, event.timestamp)
            .with_modifiers(event.modifiers);
        mouse_event.screen_point = event.screen_point;
        mouse_event
    }

    /// A finger that touches down stops any fling in progress.
    fn handle_gesture_tap_down(&mut self) -> bool {
        self.host.cancel_scroll_animations();
        false
    }

    /// A tap is a move to the tapped point, then a press and a release there.
    fn handle_gesture_tap(&mut self, event: &PlatformGestureEvent) -> bool {
        let point = self.adjust_gesture_position(event).unwrap_or(event.point);

        let fake_mouse_move = self.synthesized_mouse_event(MouseAction::Moved, None, point, event);
        self.handle_mouse_move_event(&fake_mouse_move);

        let tap_count = if event.delta.x > 0. {
            event.delta.x as u32
        } else {
            1
        };

        let fake_mouse_down = self
            .synthesized_mouse_event(MouseAction::Pressed, Some(MouseButton::Left), point, event)
            .with_click_count(tap_count);
        let mut default_prevented = self.handle_mouse_press_event(&fake_mouse_down);

        let fake_mouse_up = self
            .synthesized_mouse_event(MouseAction::Released, Some(MouseButton::Left), point, event)
            .with_click_count(tap_count);
        default_prevented |= self.handle_mouse_release_event(&fake_mouse_up);
        default_prevented
    }

    /// A long press starts a drag when touch drags are enabled and there is something
    /// to drag, and shows the context menu otherwise.
    fn handle_gesture_long_press(&mut self, event: &PlatformGestureEvent) -> bool {
        if self.prefs.touch_drag_drop_enabled {
            let point = self.adjust_gesture_position(event).unwrap_or(event.point);
            let mouse_down = self
                .synthesized_mouse_event(
                    MouseAction::Pressed,
                    Some(MouseButton::Left),
                    point,
                    event,
                )
                .with_click_count(1);
            self.handle_mouse_press_event(&mouse_down);

            let mouse_drag = self.synthesized_mouse_event(
                MouseAction::Moved,
                Some(MouseButton::Left),
                point,
                event,
            );
            let result = self.host.hit_test(
                point,
                HitTestRequest::READ_ONLY | HitTestRequest::DISALLOW_SHADOW_CONTENT,
            );
            self.drag.did_start_drag = false;
            if let Some(frame) = result.subframe {
                if !self.drag.may_start_drag && self.host.pass_gesture(frame, event) {
                    return true;
                }
            }
            self.handle_drag(&mouse_drag, false);
            if self.drag.did_start_drag {
                return true;
            }
        }
        self.handle_gesture_for_text_selection_or_context_menu(event)
    }

    fn handle_gesture_long_tap(&mut self, event: &PlatformGestureEvent) -> bool {
        if self.gesture.did_long_press_invoke_context_menu {
            return false;
        }
        self.send_context_menu_event_for_gesture(event)
    }

    fn handle_gesture_for_text_selection_or_context_menu(
        &mut self,
        event: &PlatformGestureEvent,
    ) -> bool {
        self.gesture.did_long_press_invoke_context_menu =
            event.gesture_type == GestureType::LongPress;
        self.send_context_menu_event_for_gesture(event)
    }

    /// Simulates a right click at the gesture: a right button press, then the
    /// `contextmenu`. No release follows, since the menu takes the pointer.
    pub fn send_context_menu_event_for_gesture(&mut self, event: &PlatformGestureEvent) -> bool {
        let point = self.adjust_gesture_position(event).unwrap_or(event.point);
        let mut mouse_event = PlatformMouseEvent::new(
            MouseAction::Pressed,
            Some(MouseButton::Right),
            point,
            event.timestamp,
        )
        .with_click_count(1);
        mouse_event.screen_point = event.screen_point;

        let pressed = self.handle_mouse_press_event(&mouse_event);
        if self.prefs.context_menu_on_mouse_down {
            // The press already showed it.
            return pressed;
        }
        self.send_context_menu_event(&mouse_event)
    }

    fn handle_gesture_scroll_begin(&mut self, event: &PlatformGestureEvent) -> bool {
        let result = self.host.hit_test(
            event.point,
            HitTestRequest::READ_ONLY | HitTestRequest::DISALLOW_SHADOW_CONTENT,
        );
        self.gesture.scroll_gesture_subframe = result.subframe;
        self.gesture.scroll_gesture_handling_node = result.node;
        self.gesture.previous_gesture_scrolled_node = None;

        let Some(node) = result.node else {
            return false;
        };
        self.pass_gesture_event_to_subframe_if_possible(event);
        self.host.has_renderer(node)
    }

    fn handle_gesture_scroll_update(&mut self, event: &PlatformGestureEvent) -> bool {
        if event.delta == DocumentVector::zero() {
            return false;
        }
        let delta = event.delta / self.host.page_zoom_factor();

        let Some(node) = self
            .gesture
            .scroll_gesture_handling_node
            .filter(|node| self.host.is_connected(*node))
        else {
            return self.send_scroll_event_to_view(delta);
        };
        if !self.host.has_renderer(node) {
            return false;
        }
        if self.pass_gesture_event_to_subframe_if_possible(event) {
            return true;
        }

        let should_not_propagate =
            event.gesture_type == GestureType::ScrollUpdateWithoutPropagation;
        let mut stop_node = if should_not_propagate {
            self.gesture.previous_gesture_scrolled_node
        } else {
            None
        };

        let mut scrolled = false;
        if delta.x != 0. {
            scrolled |= self.host.scroll_node(
                node,
                ScrollAxis::Horizontal,
                delta.x,
                ScrollGranularity::ByPixel,
                &mut stop_node,
            );
        }
        if delta.y != 0. {
            scrolled |= self.host.scroll_node(
                node,
                ScrollAxis::Vertical,
                delta.y,
                ScrollGranularity::ByPixel,
                &mut stop_node,
            );
        }
        if should_not_propagate {
            self.gesture.previous_gesture_scrolled_node = stop_node;
        }

        scrolled || self.send_scroll_event_to_view(delta)
    }

    fn send_scroll_event_to_view(&mut self, delta: DocumentVector) -> bool {
        self.host.scroll_view(delta, ScrollGranularity::ByPixel)
    }

    fn pass_gesture_event_to_subframe_if_possible(&mut self, event: &PlatformGestureEvent) -> bool {
        match self.gesture.scroll_gesture_subframe {
            Some(frame) => self.host.pass_gesture(frame, event),
            None => false,
        }
    }

    /// Where a tap-like gesture should land once snapped to the element the finger
    /// most likely meant, or `None` to use the reported point.
    fn adjust_gesture_position(&mut self, event: &PlatformGestureEvent) -> Option<DocumentPoint> {
        if !self.prefs.supports_touch_adjustment || event.area.is_empty() {
            return None;
        }
        let radius = event.area / 2.;
        match event.gesture_type {
            GestureType::Tap | GestureType::TapDown => self
                .best_clickable_node_for_touch_point(event.point, radius)
                .map(|(_, point)| point),
            GestureType::LongPress | GestureType::LongTap | GestureType::TwoFingerTap => self
                .best_context_menu_node_for_touch_point(event.point, radius)
                .map(|(_, point)| point),
            _ => None,
        }
    }

    /// The clickable node under a finger of size `radius` at `center`, and the point
    /// to click it at.
    pub fn best_clickable_node_for_touch_point(
        &mut self,
        center: DocumentPoint,
        radius: DocumentSize,
    ) -> Option<(NodeId, DocumentPoint)> {
        let candidates = self.host.hit_test_area(
            center,
            radius,
            HitTestRequest::READ_ONLY | HitTestRequest::ACTIVE,
        );
        let (candidate, point) = best_touch_candidate(
            candidates.iter().filter(|candidate| candidate.clickable),
            center,
            touch_rect(center, radius),
        )?;
        // Report the element a shadow tree belongs to, not the shadow node.
        let node = self
            .host
            .shadow_host(candidate.node)
            .unwrap_or(candidate.node);
        Some((node, point))
    }

    pub fn best_context_menu_node_for_touch_point(
        &mut self,
        center: DocumentPoint,
        radius: DocumentSize,
    ) -> Option<(NodeId, DocumentPoint)> {
        let candidates = self.host.hit_test_area(
            center,
            radius,
            HitTestRequest::READ_ONLY | HitTestRequest::ACTIVE,
        );
        best_touch_candidate(
            candidates
                .iter()
                .filter(|candidate| candidate.has_context_menu),
            center,
            touch_rect(center, radius),
        )
        .map(|(candidate, point)| (candidate.node, point))
    }

    /// The node to zoom to for a double tap, and its box.
    pub fn best_zoomable_area_for_touch_point(
        &mut self,
        center: DocumentPoint,
        radius: DocumentSize,
    ) -> Option<(NodeId, DocumentRect)> {
        let candidates = self.host.hit_test_area(
            center,
            radius,
            HitTestRequest::READ_ONLY |
                HitTestRequest::ACTIVE |
                HitTestRequest::DISALLOW_SHADOW_CONTENT,
        );
        best_touch_candidate(
            candidates.iter().filter(|candidate| candidate.zoomable),
            center,
            touch_rect(center, radius),
        )
        .map(|(candidate, _)| (candidate.node, candidate.rect))
    }
}
