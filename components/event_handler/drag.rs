/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use input_traits::{
    Cursor, DataTransferAccess, DocumentPoint, DomEvent, DomEventType, DragEventDetail,
    DragSession, DragSourceAction, EventDetail, EventHandlerHost, HitTestRequest,
    InputPreferences, MouseAction, MouseButton, NodeId, PlatformMouseEvent,
};
use log::debug;

use crate::EventHandler;

/// The source side of a drag: whether the current press may still turn into a drag,
/// what is being dragged, and where it is over.
#[derive(Debug, Default)]
pub struct DragGestureTracker {
    pub(crate) may_start_drag: bool,
    pub(crate) source: Option<NodeId>,
    /// Before the drag starts, every kind the source supports. Afterwards exactly one.
    pub(crate) action: DragSourceAction,
    /// Whether `dragstart`, `drag` and `dragend` go to the source. Only drags the
    /// embedder lets script drive dispatch them.
    pub(crate) should_dispatch_events: bool,
    pub(crate) data_transfer: Option<DataTransferAccess>,
    /// A drag over selected text that may still turn into a selection instead.
    pub(crate) drag_may_start_selection_instead: bool,
    pub(crate) did_start_drag: bool,
    /// The node the drag is currently over.
    pub(crate) target: Option<NodeId>,
    /// `dragenter` was just fired at `target`, so the next update fires only `dragover`.
    pub(crate) should_only_fire_drag_over: bool,
}

impl DragGestureTracker {
    pub fn mouse_down_may_start_drag(&self) -> bool {
        self.may_start_drag
    }

    pub fn source(&self) -> Option<NodeId> {
        self.source
    }

    pub fn action(&self) -> DragSourceAction {
        self.action
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn did_start_drag(&self) -> bool {
        self.did_start_drag
    }

    /// Collapses the supported kinds of a source into the one that is dragged. A
    /// script-driven draggable wins over a link, a link over an image, and anything
    /// over plain selected text.
    pub fn resolve_action(actions: DragSourceAction) -> DragSourceAction {
        [
            DragSourceAction::DHTML,
            DragSourceAction::LINK,
            DragSourceAction::IMAGE,
            DragSourceAction::SELECTION,
        ]
        .into_iter()
        .find(|action| actions.contains(*action))
        .unwrap_or_else(DragSourceAction::empty)
    }

    pub fn hysteresis_threshold(action: DragSourceAction, prefs: &InputPreferences) -> f32 {
        let threshold = if action == DragSourceAction::SELECTION {
            prefs.text_drag_hysteresis
        } else if action == DragSourceAction::IMAGE {
            prefs.image_drag_hysteresis
        } else if action == DragSourceAction::LINK {
            prefs.link_drag_hysteresis
        } else {
            prefs.general_drag_hysteresis
        };
        threshold as f32
    }

    /// Whether the pointer has moved far enough from the press, along either axis,
    /// for the current action to become a drag.
    pub fn hysteresis_exceeded(
        &self,
        mouse_down_position: DocumentPoint,
        point: DocumentPoint,
        prefs: &InputPreferences,
    ) -> bool {
        let threshold = Self::hysteresis_threshold(self.action, prefs);
        let delta = point - mouse_down_position;
        delta.x.abs() >= threshold || delta.y.abs() >= threshold
    }

    fn free_data_transfer(&mut self) {
        self.data_transfer = None;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

impl<H: EventHandlerHost> EventHandler<H> {
    /// Runs the drag part of a move with the button held. Returns true when the move
    /// belongs to a drag, started or not yet past its threshold, so no selection
    /// should happen.
    pub(crate) fn handle_drag(
        &mut self,
        event: &PlatformMouseEvent,
        check_hysteresis: bool,
    ) -> bool {
        if event.button != Some(MouseButton::Left) || event.action != MouseAction::Moved {
            // A drag handled elsewhere may have left the press flag behind.
            self.mouse_pressed = false;
            return false;
        }

        if self.drag.may_start_drag && self.drag.source.is_none() {
            let allowed = self.host.allowed_drag_source_actions();
            self.drag.should_dispatch_events = allowed.contains(DragSourceAction::DHTML);

            let result = self.host.hit_test(
                self.mouse_down_position,
                HitTestRequest::READ_ONLY | HitTestRequest::DISALLOW_SHADOW_CONTENT,
            );
            match self
                .host
                .draggable_element(result.node, self.mouse_down_position)
                .map(|(source, actions)| (source, actions & allowed))
                .filter(|(_, actions)| !actions.is_empty())
            {
                Some((source, actions)) => {
                    self.drag.source = Some(source);
                    self.drag.action = actions;
                    self.drag.drag_may_start_selection_instead =
                        actions.contains(DragSourceAction::SELECTION);
                },
                None => self.drag.may_start_drag = false,
            }
        }

        // A drag over selected text that starts too soon after the press selects instead.
        if self.drag.may_start_drag &&
            self.drag.drag_may_start_selection_instead &&
            self.drag.action.contains(DragSourceAction::SELECTION) &&
            event.timestamp.saturating_sub(self.mouse_down_timestamp) < self.prefs.text_drag_delay()
        {
            if self.drag.action.contains(DragSourceAction::IMAGE) {
                self.drag.action = DragSourceAction::IMAGE;
            } else if !self
                .drag
                .action
                .intersects(DragSourceAction::DHTML | DragSourceAction::LINK)
            {
                self.drag.may_start_drag = false;
                self.drag.source = None;
            } else {
                self.drag.drag_may_start_selection_instead = false;
            }
        }

        if !self.drag.may_start_drag {
            return !self.selection.mouse_down_may_start_select() &&
                !self.mouse_down_may_start_autoscroll;
        }
        let Some(source) = self.drag.source else {
            self.drag.may_start_drag = false;
            return false;
        };

        self.drag.action = DragGestureTracker::resolve_action(self.drag.action);
        self.set_cursor(Cursor::Default);

        if check_hysteresis &&
            !self
                .drag
                .hysteresis_exceeded(self.mouse_down_position, event.point, &self.prefs)
        {
            return true;
        }

        // Past the threshold this gesture is no longer a click.
        self.invalidate_click();
        self.drag.free_data_transfer();
        self.drag.data_transfer = Some(DataTransferAccess::Writable);
        debug!("Starting {:?} drag of {:?}", self.drag.action, source);

        if self.drag.should_dispatch_events {
            if self.drag.action == DragSourceAction::DHTML {
                let offset = self
                    .host
                    .bounding_rect(source)
                    .map(|rect| self.mouse_down_position - rect.origin);
                let has_drag_image = self.host.has_renderer(source) &&
                    offset.is_some_and(|offset| self.host.set_drag_image(source, offset));
                if !has_drag_image {
                    debug!("Drag source {:?} lost its renderer", source);
                    self.drag.may_start_drag = false;
                }
            }

            if self.drag.may_start_drag {
                let mouse_down = self.mouse_down.unwrap_or(*event);
                self.drag.may_start_drag =
                    self.dispatch_drag_source_event(DomEventType::DragStart, &mouse_down) &&
                        !self.host.is_in_password_field();
                if !self.host.is_connected(source) {
                    debug!("dragstart listener removed the drag source {:?}", source);
                    self.drag.may_start_drag = false;
                }
                self.drag.data_transfer = Some(DataTransferAccess::ImageWritable);
            }
        }

        if self.drag.may_start_drag {
            let session = DragSession {
                source,
                action: self.drag.action,
                mouse_down_position: self.mouse_down_position,
                point: event.point,
            };
            self.drag.did_start_drag = self.host.start_platform_drag(&session);
            if self.drag.did_start_drag {
                self.drag.may_start_drag = false;
                self.stop_autoscroll(false);
                return true;
            }
            if self.drag.should_dispatch_events && self.host.is_connected(source) {
                // The platform refused the drag; the source still gets its dragend.
                self.dispatch_drag_source_event(DomEventType::DragEnd, event);
            }
            self.drag.may_start_drag = false;
        }

        if !self.drag.may_start_drag {
            self.drag.free_data_transfer();
            self.drag.source = None;
        }
        true
    }

    fn drag_event(
        &self,
        event_type: DomEventType,
        event: &PlatformMouseEvent,
        data_transfer: DataTransferAccess,
    ) -> DomEvent {
        let mouse = self.mouse_event_detail(event, 0, None);
        DomEvent::new(
            event_type,
            EventDetail::Drag(DragEventDetail {
                mouse,
                data_transfer,
            }),
        )
    }

    /// Returns true if a listener prevented the default action.
    fn dispatch_drag_event(
        &mut self,
        event_type: DomEventType,
        target: NodeId,
        event: &PlatformMouseEvent,
        data_transfer: DataTransferAccess,
    ) -> bool {
        let drag_event = self.drag_event(event_type, event, data_transfer);
        self.host.dispatch_event(target, drag_event).is_consumed()
    }

    /// Fires a drag event at the drag source. Returns true if the default action may
    /// continue.
    fn dispatch_drag_source_event(
        &mut self,
        event_type: DomEventType,
        event: &PlatformMouseEvent,
    ) -> bool {
        let Some(source) = self.drag.source.filter(|source| self.host.is_connected(*source)) else {
            return true;
        };
        let data_transfer = self
            .drag
            .data_transfer
            .unwrap_or(DataTransferAccess::Protected);
        !self.dispatch_drag_event(event_type, source, event, data_transfer)
    }

    /// Follows a drag, from this document or elsewhere, over the document. Fires
    /// `dragenter` and `dragleave` when the node under the drag changes and `dragover`
    /// otherwise. Returns true if the node under the drag accepts a drop.
    pub fn update_drag_and_drop(&mut self, event: &PlatformMouseEvent) -> bool {
        self.now = event.timestamp;
        let result = self.host.hit_test(
            event.point,
            HitTestRequest::READ_ONLY | HitTestRequest::DISALLOW_SHADOW_CONTENT,
        );

        // Drag events never go to text nodes.
        let new_target = result.node.and_then(|node| {
            if self.host.is_text(node) {
                self.host.parent(node)
            } else {
                Some(node)
            }
        });

        let container = new_target.and_then(|target| self.host.autoscroll_container(target));
        self.autoscroll.update_drag_and_drop(
            &mut self.host,
            container,
            event.point,
            event.timestamp,
            &self.prefs,
        );

        let should_dispatch_source_events =
            self.drag.source.is_some() && self.drag.should_dispatch_events;
        let mut accept = false;
        if self.drag.target != new_target {
            if let Some(new_target) = new_target {
                // A drag event always precedes dragenter, dragover and dragleave.
                if should_dispatch_source_events {
                    self.dispatch_drag_source_event(DomEventType::Drag, event);
                }
                accept = self.dispatch_drag_event(
                    DomEventType::DragEnter,
                    new_target,
                    event,
                    DataTransferAccess::Protected,
                );
            }
            if let Some(old_target) = self.drag.target.filter(|node| self.host.is_connected(*node))
            {
                self.dispatch_drag_event(
                    DomEventType::DragLeave,
                    old_target,
                    event,
                    DataTransferAccess::Protected,
                );
            }
            self.drag.should_only_fire_drag_over = new_target.is_some();
        } else if let Some(new_target) = new_target {
            if !self.drag.should_only_fire_drag_over && should_dispatch_source_events {
                self.dispatch_drag_source_event(DomEventType::Drag, event);
            }
            accept = self.dispatch_drag_event(
                DomEventType::DragOver,
                new_target,
                event,
                DataTransferAccess::Protected,
            );
            self.drag.should_only_fire_drag_over = false;
        }
        self.drag.target = new_target;
        accept
    }

    pub fn cancel_drag_and_drop(&mut self, event: &PlatformMouseEvent) {
        if let Some(target) = self.drag.target.filter(|node| self.host.is_connected(*node)) {
            if self.drag.source.is_some() && self.drag.should_dispatch_events {
                self.dispatch_drag_source_event(DomEventType::Drag, event);
            }
            self.dispatch_drag_event(
                DomEventType::DragLeave,
                target,
                event,
                DataTransferAccess::Protected,
            );
        }
        self.clear_drag_state();
    }

    /// Fires `drop` at the node under the drag. Returns true if a listener prevented
    /// the default action.
    pub fn perform_drag_and_drop(&mut self, event: &PlatformMouseEvent) -> bool {
        let prevented = match self.drag.target.filter(|node| self.host.is_connected(*node)) {
            Some(target) => self.dispatch_drag_event(
                DomEventType::Drop,
                target,
                event,
                DataTransferAccess::ReadOnly,
            ),
            None => false,
        };
        self.clear_drag_state();
        prevented
    }

    /// Ends a drag this document was the source of.
    pub fn drag_source_ended_at(&mut self, event: &PlatformMouseEvent) {
        // Lets :hover and :active catch up with where the drag ended.
        self.host.hit_test(
            event.point,
            HitTestRequest::RELEASE | HitTestRequest::DISALLOW_SHADOW_CONTENT,
        );

        if self.drag.source.is_some() && self.drag.should_dispatch_events {
            self.dispatch_drag_source_event(DomEventType::DragEnd, event);
        }
        self.drag.free_data_transfer();
        self.drag.source = None;
        self.drag.did_start_drag = false;
        // A drag cancelled with Escape must not restart on the next move.
        self.drag.may_start_drag = false;
    }

    pub fn clear_drag_state(&mut self) {
        self.stop_autoscroll(false);
        self.drag.target = None;
        self.capturing_node = None;
        self.drag.should_only_fire_drag_over = false;
    }
}
