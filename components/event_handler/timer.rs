/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Duration;

/// A timer owned by the event handler. Times are offsets from the embedder's input
/// clock, the same clock that stamps input events. Nothing fires on its own: the
/// embedder asks for [`crate::EventHandler::next_timer_deadline`] and calls
/// [`crate::EventHandler::fire_timers`] once it has passed, so stopping a timer takes
/// effect immediately.
#[derive(Clone, Debug, Default)]
pub(crate) struct Timer {
    scheduled_for: Option<Duration>,
    repeat_interval: Option<Duration>,
}

impl Timer {
    pub(crate) fn start_one_shot(&mut self, now: Duration, delay: Duration) {
        self.scheduled_for = Some(now + delay);
        self.repeat_interval = None;
    }

    pub(crate) fn start_repeating(&mut self, now: Duration, interval: Duration) {
        self.scheduled_for = Some(now + interval);
        self.repeat_interval = Some(interval);
    }

    pub(crate) fn stop(&mut self) {
        self.scheduled_for = None;
        self.repeat_interval = None;
    }

    pub(crate) fn is_active(&self) -> bool {
        self.scheduled_for.is_some()
    }

    pub(crate) fn scheduled_for(&self) -> Option<Duration> {
        self.scheduled_for
    }

    /// Returns true if the timer was due at `now`. A one-shot timer becomes inactive;
    /// a repeating timer is rescheduled one interval after `now`.
    pub(crate) fn take_if_due(&mut self, now: Duration) -> bool {
        match self.scheduled_for {
            Some(scheduled_for) if scheduled_for <= now => {
                self.scheduled_for = self.repeat_interval.map(|interval| now + interval);
                true
            },
            _ => false,
        }
    }
}
