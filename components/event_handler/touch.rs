/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use indexmap::{IndexMap, IndexSet};
use input_traits::{
    DocumentId, DocumentPoint, DomEvent, DomEventType, EventDetail, EventHandlerHost,
    HitTestRequest, NodeId, PlatformTouchEvent, Touch, TouchEventDetail, TouchId, TouchList,
    TouchPointState,
};
use log::{debug, trace, warn};
use rustc_hash::FxHashMap;

use crate::EventHandler;

/// The targets of the touch points currently on the surface.
#[derive(Debug, Default)]
pub(crate) struct TouchTracker {
    /// Every active touch point, with the node its touchstart hit. A point whose
    /// document has no touch listeners is tracked without a target.
    targets: FxHashMap<TouchId, Option<NodeId>>,
    /// The document the first point of the current multi-touch sequence landed in.
    originating_document: Option<DocumentId>,
    /// Whether any point with a target is still down.
    pressed: bool,
}

impl TouchTracker {
    pub(crate) fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub(crate) fn targets(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.targets.values().flatten().copied()
    }

    /// Sends the remaining events of every point targeting `old` to `replacement`.
    pub(crate) fn retarget(&mut self, old: NodeId, replacement: Option<NodeId>) {
        for target in self.targets.values_mut() {
            if *target == Some(old) {
                *target = replacement;
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The points that changed to one state, and the targets they go to.
#[derive(Default)]
struct ChangedTouches {
    touches: TouchList,
    targets: IndexSet<NodeId>,
}

fn event_type_for_touch_state(state: TouchPointState) -> Option<DomEventType> {
    match state {
        TouchPointState::Pressed => Some(DomEventType::TouchStart),
        TouchPointState::Moved => Some(DomEventType::TouchMove),
        TouchPointState::Released => Some(DomEventType::TouchEnd),
        TouchPointState::Cancelled => Some(DomEventType::TouchCancel),
        TouchPointState::Stationary => None,
    }
}

fn hit_test_request_for_touch_state(state: TouchPointState) -> HitTestRequest {
    HitTestRequest::TOUCH_EVENT |
        match state {
            TouchPointState::Pressed => HitTestRequest::ACTIVE,
            TouchPointState::Moved => {
                HitTestRequest::ACTIVE | HitTestRequest::MOVE | HitTestRequest::READ_ONLY
            },
            TouchPointState::Released | TouchPointState::Cancelled => HitTestRequest::RELEASE,
            TouchPointState::Stationary => HitTestRequest::ACTIVE | HitTestRequest::READ_ONLY,
        }
}

impl<H: EventHandlerHost> EventHandler<H> {
    /// Dispatches one touch event per changed state and target. A point keeps the
    /// target its touchstart hit until it is released, and every event lists all the
    /// points still down, the ones on its target, and the ones that changed.
    pub fn handle_touch_event(&mut self, event: &PlatformTouchEvent) -> bool {
        self.now = event.timestamp;

        let mut fresh_touch_sequence = event
            .points
            .iter()
            .all(|point| point.state == TouchPointState::Pressed);
        let all_touches_released = event.points.iter().all(|point| {
            matches!(
                point.state,
                TouchPointState::Released | TouchPointState::Cancelled
            )
        });

        let mut touches = TouchList::new();
        let mut touches_by_target: IndexMap<NodeId, TouchList> = IndexMap::new();
        let mut changed_touches: IndexMap<TouchPointState, ChangedTouches> = IndexMap::new();

        for point in &event.points {
            let mut request = hit_test_request_for_touch_state(point.state);
            if self.prefs.gestures_trigger_active {
                request |= HitTestRequest::READ_ONLY;
            }

            let target = match point.state {
                TouchPointState::Pressed => {
                    let result = self.host.hit_test(point.point, request);
                    let Some(node) = self.non_text_node(result.node) else {
                        continue;
                    };
                    let document = self.host.document_of(node);
                    if fresh_touch_sequence {
                        // Recorded even when the document has no touch listeners.
                        self.touch.originating_document = document;
                        fresh_touch_sequence = false;
                    } else if self.touch.originating_document.is_none() ||
                        document != self.touch.originating_document
                    {
                        debug!("Ignoring touch {:?} outside the originating document", point.id);
                        continue;
                    }

                    if self.touch.targets.contains_key(&point.id) {
                        warn!("Touch {:?} pressed while already active", point.id);
                    }
                    let target = document
                        .filter(|document| self.host.has_touch_event_handlers(*document))
                        .map(|_| node);
                    self.touch.targets.insert(point.id, target);
                    target
                },
                TouchPointState::Released | TouchPointState::Cancelled => {
                    if !self.prefs.gestures_trigger_active && all_touches_released {
                        self.host.update_hover_active_state(request, None);
                    }
                    match self.touch.targets.remove(&point.id) {
                        Some(target) => target,
                        None => {
                            warn!("Touch {:?} ended but was never pressed", point.id);
                            continue;
                        },
                    }
                },
                TouchPointState::Moved | TouchPointState::Stationary => {
                    match self.touch.targets.get(&point.id) {
                        Some(target) => *target,
                        None => {
                            warn!("Touch {:?} moved but was never pressed", point.id);
                            continue;
                        },
                    }
                },
            };

            let Some(target) = target.filter(|target| self.host.is_connected(*target)) else {
                continue;
            };
            if !self
                .host
                .document_of(target)
                .is_some_and(|document| self.host.has_touch_event_handlers(document))
            {
                continue;
            }

            let zoom = self.host.page_zoom_factor();
            let touch = Touch {
                identifier: point.id,
                target,
                page_point: DocumentPoint::new(
                    (point.point.x / zoom).round(),
                    (point.point.y / zoom).round(),
                ),
                screen_point: point.screen_point,
                radius: point.radius,
                rotation_angle: point.rotation_angle,
                force: point.force,
            };
            trace!("Touch {:?} {:?} -> {:?}", point.id, point.state, target);

            // Every target gets a list, even one left empty by released points.
            let target_touches = touches_by_target.entry(target).or_default();
            if !matches!(
                point.state,
                TouchPointState::Released | TouchPointState::Cancelled
            ) {
                touches.push(touch.clone());
                target_touches.push(touch.clone());
            }

            // Stationary points never count as changed.
            if point.state != TouchPointState::Stationary {
                let changed = changed_touches.entry(point.state).or_default();
                changed.touches.push(touch);
                changed.targets.insert(target);
            }
        }

        self.touch.pressed = !touches.is_empty();
        if all_touches_released {
            self.touch.originating_document = None;
            if !self.touch.targets.is_empty() {
                warn!("{} touches left active after a full release", self.touch.targets.len());
                self.touch.targets.clear();
            }
        }

        changed_touches.sort_keys();
        let mut swallowed = false;
        for (state, changed) in changed_touches {
            let Some(event_type) = event_type_for_touch_state(state) else {
                continue;
            };
            // A touchcancel always has empty touches and targetTouches.
            let is_cancel = state == TouchPointState::Cancelled;
            for target in changed.targets {
                let detail = TouchEventDetail {
                    touches: if is_cancel {
                        TouchList::new()
                    } else {
                        touches.clone()
                    },
                    target_touches: if is_cancel {
                        TouchList::new()
                    } else {
                        touches_by_target
                            .get(&target)
                            .cloned()
                            .unwrap_or_default()
                    },
                    changed_touches: changed.touches.clone(),
                    modifiers: event.modifiers,
                };
                let dom_event = DomEvent::new(event_type, EventDetail::Touch(detail));
                swallowed |= self.host.dispatch_event(target, dom_event).is_consumed();
            }
        }
        swallowed
    }
}
