/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Duration;

use input_traits::{Cursor, DocumentPoint, InputPreferences, NodeId, NodeQueries, ScrollHost};
use log::{debug, trace, warn};

use crate::timer::Timer;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum AutoscrollMode {
    #[default]
    None,
    /// A selection is being dragged past the edge of a scrollable box.
    Selection,
    /// A drag-and-drop is hovering near the edge of a scrollable box.
    DragAndDrop,
    /// Middle-button pan scrolling while the button that started it may still be held.
    Pan,
    /// Pan scrolling that the next press or release ends.
    PanCanStop,
}

/// What one autoscroll timer tick did.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct AutoscrollTick {
    /// The target was asked to scroll.
    pub(crate) scrolled: bool,
    /// The cursor a pan scroll wants shown.
    pub(crate) cursor: Option<Cursor>,
}

/// Owns the repeating timer that drives selection, drag-and-drop and pan scrolling.
/// At most one session runs at a time.
#[derive(Debug, Default)]
pub struct AutoscrollController {
    mode: AutoscrollMode,
    /// The box being scrolled. Re-read and re-validated on every tick.
    target: Option<NodeId>,
    /// Where pan scrolling started.
    pan_origin: DocumentPoint,
    /// The pointer left the pan origin while the pan button was still down, so
    /// releasing the button ends the pan.
    spring_loaded_pan: bool,
    /// Where drag-and-drop autoscroll scrolls toward.
    drag_and_drop_reference_position: DocumentPoint,
    session_start: Duration,
    timer: Timer,
}

impl AutoscrollController {
    pub fn mode(&self) -> AutoscrollMode {
        self.mode
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn is_autoscroll_in_progress(&self) -> bool {
        self.mode == AutoscrollMode::Selection
    }

    pub fn is_pan_scroll_in_progress(&self) -> bool {
        matches!(self.mode, AutoscrollMode::Pan | AutoscrollMode::PanCanStop)
    }

    pub fn pan_origin(&self) -> DocumentPoint {
        self.pan_origin
    }

    pub fn is_timer_active(&self) -> bool {
        self.timer.is_active()
    }

    pub(crate) fn next_deadline(&self) -> Option<Duration> {
        self.timer.scheduled_for()
    }

    pub fn start_for_selection(
        &mut self,
        container: NodeId,
        now: Duration,
        prefs: &InputPreferences,
    ) -> bool {
        if self.timer.is_active() {
            return false;
        }
        debug!("Starting selection autoscroll of {:?}", container);
        self.mode = AutoscrollMode::Selection;
        self.target = Some(container);
        self.session_start = now;
        self.timer.start_repeating(now, prefs.autoscroll_interval());
        true
    }

    pub fn start_for_drag_and_drop(
        &mut self,
        container: NodeId,
        reference_position: DocumentPoint,
        now: Duration,
        prefs: &InputPreferences,
    ) -> bool {
        if self.timer.is_active() {
            return false;
        }
        debug!("Starting drag-and-drop autoscroll of {:?}", container);
        self.mode = AutoscrollMode::DragAndDrop;
        self.target = Some(container);
        self.drag_and_drop_reference_position = reference_position;
        self.session_start = now;
        self.timer.start_repeating(now, prefs.autoscroll_interval());
        true
    }

    pub fn start_pan(
        &mut self,
        container: NodeId,
        origin: DocumentPoint,
        now: Duration,
        prefs: &InputPreferences,
    ) -> bool {
        if self.timer.is_active() {
            return false;
        }
        debug!("Starting pan scroll of {:?} from {:?}", container, origin);
        self.mode = AutoscrollMode::Pan;
        self.target = Some(container);
        self.pan_origin = origin;
        self.spring_loaded_pan = false;
        self.session_start = now;
        self.timer.start_repeating(now, prefs.autoscroll_interval());
        true
    }

    /// Follows a drag-and-drop hovering over `container`. Scrolling starts only once
    /// the pointer is near one of its edges, and switching containers restarts the
    /// delay before scrolling.
    pub fn update_drag_and_drop<H: ScrollHost + NodeQueries>(
        &mut self,
        host: &mut H,
        container: Option<NodeId>,
        point: DocumentPoint,
        now: Duration,
        prefs: &InputPreferences,
    ) {
        let Some(container) = container.filter(|container| host.is_connected(*container)) else {
            self.stop(host, false);
            return;
        };
        if !host.is_near_autoscroll_edge(container, point) {
            self.stop(host, false);
            return;
        }

        match self.mode {
            AutoscrollMode::None => {
                self.start_for_drag_and_drop(container, point, now, prefs);
            },
            AutoscrollMode::DragAndDrop => {
                self.drag_and_drop_reference_position = point;
                if self.target != Some(container) {
                    self.target = Some(container);
                    self.session_start = now;
                }
            },
            _ => {},
        }
    }

    /// Halts the session. Unless the scrolled box is itself being destroyed, it is
    /// told to stop any scroll animation. Returns false when nothing was running.
    pub fn stop<H: ScrollHost + NodeQueries>(
        &mut self,
        host: &mut H,
        renderer_is_being_destroyed: bool,
    ) -> bool {
        if self.mode == AutoscrollMode::None && !self.timer.is_active() {
            return false;
        }

        debug!("Stopping {:?} autoscroll", self.mode);
        if let Some(target) = self.target.take() {
            if !renderer_is_being_destroyed && host.is_connected(target) {
                host.stop_autoscroll(target);
            }
        }
        self.timer.stop();
        self.mode = AutoscrollMode::None;
        self.spring_loaded_pan = false;
        true
    }

    /// Advances a pan scroll on release of the pan button. Returns true if the pan
    /// ended.
    pub fn handle_pan_button_release<H: ScrollHost + NodeQueries>(&mut self, host: &mut H) -> bool {
        match self.mode {
            AutoscrollMode::Pan if self.spring_loaded_pan => self.stop(host, false),
            AutoscrollMode::Pan => {
                self.mode = AutoscrollMode::PanCanStop;
                false
            },
            AutoscrollMode::PanCanStop => self.stop(host, false),
            _ => false,
        }
    }

    /// Runs one tick if the timer is due. Returns `None` when it was not.
    pub(crate) fn fire_if_due<H: ScrollHost + NodeQueries>(
        &mut self,
        host: &mut H,
        now: Duration,
        pointer: DocumentPoint,
        mouse_pressed: bool,
        prefs: &InputPreferences,
    ) -> Option<AutoscrollTick> {
        if !self.timer.take_if_due(now) {
            return None;
        }
        Some(self.autoscroll_timer_fired(host, now, pointer, mouse_pressed, prefs))
    }

    fn autoscroll_timer_fired<H: ScrollHost + NodeQueries>(
        &mut self,
        host: &mut H,
        now: Duration,
        pointer: DocumentPoint,
        mouse_pressed: bool,
        prefs: &InputPreferences,
    ) -> AutoscrollTick {
        let Some(target) = self.target.filter(|target| host.is_connected(*target)) else {
            warn!("Autoscroll target went away");
            self.stop(host, true);
            return AutoscrollTick::default();
        };

        trace!("Autoscroll tick for {:?} in {:?} mode", target, self.mode);
        match self.mode {
            AutoscrollMode::None => {
                self.stop(host, false);
                AutoscrollTick::default()
            },
            AutoscrollMode::Selection => {
                if !mouse_pressed {
                    self.stop(host, false);
                    return AutoscrollTick::default();
                }
                host.autoscroll(target, pointer);
                AutoscrollTick {
                    scrolled: true,
                    cursor: None,
                }
            },
            AutoscrollMode::DragAndDrop => {
                let waited = now.saturating_sub(self.session_start);
                let scrolled = waited >= prefs.drag_and_drop_autoscroll_delay();
                if scrolled {
                    host.autoscroll(target, self.drag_and_drop_reference_position);
                }
                AutoscrollTick {
                    scrolled,
                    cursor: None,
                }
            },
            AutoscrollMode::Pan | AutoscrollMode::PanCanStop => {
                let cursor = self.update_pan_scroll_state(pointer, prefs);
                host.pan_scroll(target, self.pan_origin, pointer);
                AutoscrollTick {
                    scrolled: true,
                    cursor: Some(cursor),
                }
            },
        }
    }

    fn update_pan_scroll_state(
        &mut self,
        pointer: DocumentPoint,
        prefs: &InputPreferences,
    ) -> Cursor {
        let radius = prefs.no_pan_scroll_radius;
        let east = self.pan_origin.x < pointer.x - radius;
        let west = self.pan_origin.x > pointer.x + radius;
        let north = self.pan_origin.y > pointer.y + radius;
        let south = self.pan_origin.y < pointer.y - radius;

        if (east || west || north || south) && self.mode == AutoscrollMode::Pan {
            self.spring_loaded_pan = true;
        }

        match (north, south, east, west) {
            (true, _, true, _) => Cursor::NeResize,
            (true, _, _, true) => Cursor::NwResize,
            (true, ..) => Cursor::NResize,
            (_, true, true, _) => Cursor::SeResize,
            (_, true, _, true) => Cursor::SwResize,
            (_, true, ..) => Cursor::SResize,
            (_, _, true, _) => Cursor::EResize,
            (_, _, _, true) => Cursor::WResize,
            _ => Cursor::AllScroll,
        }
    }
}
