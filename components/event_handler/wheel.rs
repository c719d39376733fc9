/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use input_traits::{
    DocumentVector, DomEvent, DomEventType, EventDetail, EventHandlerHost, FrameId,
    HitTestRequest, MouseEventDetail, NodeId, PlatformWheelEvent, ScrollAxis, ScrollGranularity,
    WheelEventDetail, WheelMode, WheelPhase,
};
use log::debug;

use crate::EventHandler;

/// The target of the wheel gesture in progress.
#[derive(Debug, Default)]
pub(crate) struct WheelLatch {
    /// The node that received the first event of the gesture.
    latched_node: Option<NodeId>,
    /// The frame under the first event of the gesture, which keeps the deltas.
    latched_subframe: Option<FrameId>,
    /// The box the previous event of the gesture scrolled. Later events may scroll it
    /// or its descendants but never its ancestors.
    previous_wheel_scrolled_node: Option<NodeId>,
}

impl WheelLatch {
    pub(crate) fn nodes(&self) -> [Option<NodeId>; 2] {
        [self.latched_node, self.previous_wheel_scrolled_node]
    }

    pub(crate) fn clear_nodes(&mut self) {
        self.latched_node = None;
        self.latched_subframe = None;
        self.previous_wheel_scrolled_node = None;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

pub(crate) fn scroll_granularity_for_wheel_mode(mode: WheelMode) -> ScrollGranularity {
    match mode {
        WheelMode::DeltaPixel => ScrollGranularity::ByPixel,
        WheelMode::DeltaLine => ScrollGranularity::ByLine,
        WheelMode::DeltaPage => ScrollGranularity::ByPage,
    }
}

impl<H: EventHandlerHost> EventHandler<H> {
    /// Dispatches a `wheel` event at the node under the pointer, or at the node that
    /// latched the gesture, and scrolls if the page did not cancel it.
    pub fn handle_wheel_event(&mut self, event: &PlatformWheelEvent) -> bool {
        debug!("Wheel {:?} ({:?}) at {:?}", event.delta, event.phase, event.point);
        self.now = event.timestamp;

        let result = self.host.hit_test(
            event.point,
            HitTestRequest::READ_ONLY | HitTestRequest::DISALLOW_SHADOW_CONTENT,
        );
        let mut node = self.non_text_node(result.node);

        let use_latched_node = self.prefs.wheel_latching && event.is_latchable();
        if event.phase == WheelPhase::Began {
            self.wheel.clear_nodes();
        }

        let subframe = if use_latched_node {
            match self
                .wheel
                .latched_node
                .filter(|node| self.host.is_connected(*node))
            {
                Some(latched_node) => node = Some(latched_node),
                None => {
                    debug!("Latching wheel gesture to {:?}", node);
                    self.wheel.latched_node = node;
                    self.wheel.latched_subframe = result.subframe;
                },
            }
            self.wheel.latched_subframe
        } else {
            self.wheel.clear_nodes();
            result.subframe
        };

        if let Some(node) = node {
            if let Some(frame) = subframe {
                if self.host.pass_wheel(frame, event) {
                    return true;
                }
            }

            let detail = WheelEventDetail {
                mouse: MouseEventDetail {
                    button: None,
                    client_point: event.point,
                    screen_point: event.screen_point,
                    detail: 0,
                    modifiers: event.modifiers,
                    related_target: None,
                },
                delta: DocumentVector::new(event.delta.x as f32, event.delta.y as f32),
                delta_z: event.delta.z,
                mode: event.delta.mode,
            };
            let dom_event = DomEvent::new(DomEventType::Wheel, EventDetail::Wheel(detail));
            if self.host.dispatch_event(node, dom_event).is_consumed() {
                return true;
            }
            if self.host.is_connected(node) &&
                self.default_wheel_event_handler(node, event, use_latched_node)
            {
                return true;
            }
        }

        // Whatever no box took scrolls the view.
        let delta = DocumentVector::new(event.delta.x as f32, event.delta.y as f32);
        if delta == DocumentVector::zero() {
            return false;
        }
        self.host
            .scroll_view(delta, scroll_granularity_for_wheel_mode(event.delta.mode))
    }

    /// Scrolls horizontally, then vertically, starting at `start`. Returns true if
    /// anything scrolled.
    fn default_wheel_event_handler(
        &mut self,
        start: NodeId,
        event: &PlatformWheelEvent,
        latched: bool,
    ) -> bool {
        let granularity = scroll_granularity_for_wheel_mode(event.delta.mode);
        let mut stop_node = self.wheel.previous_wheel_scrolled_node;
        let mut handled = false;

        if event.delta.x != 0. {
            handled |= self.host.scroll_node(
                start,
                ScrollAxis::Horizontal,
                event.delta.x as f32,
                granularity,
                &mut stop_node,
            );
        }
        if event.delta.y != 0. {
            handled |= self.host.scroll_node(
                start,
                ScrollAxis::Vertical,
                event.delta.y as f32,
                granularity,
                &mut stop_node,
            );
        }

        if latched {
            self.wheel.previous_wheel_scrolled_node = stop_node;
        }
        handled
    }
}
