/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::time::Duration;

use input_traits::{DocumentPoint, InputPreferences, MouseButton, PlatformMouseEvent};
use log::debug;

/// Derives click counts for platforms that do not supply one: a press continues the
/// current click sequence if it uses the same button and lands close enough to the
/// previous press, soon enough after it.
///
/// <https://w3c.github.io/uievents/#event-type-dblclick>
#[derive(Debug, Default)]
pub(crate) struct ClickCounter {
    last_click: Option<LastClick>,
}

#[derive(Clone, Copy, Debug)]
struct LastClick {
    timestamp: Duration,
    point: DocumentPoint,
    button: Option<MouseButton>,
    count: u32,
}

impl ClickCounter {
    pub(crate) fn click_count_for_press(
        &mut self,
        event: &PlatformMouseEvent,
        prefs: &InputPreferences,
    ) -> u32 {
        if let Some(click_count) = event.click_count {
            self.last_click = Some(LastClick {
                timestamp: event.timestamp,
                point: event.point,
                button: event.button,
                count: click_count,
            });
            return click_count;
        }

        let count = match self.last_click {
            Some(last_click) if Self::continues(&last_click, event, prefs) => last_click.count + 1,
            _ => 1,
        };
        debug!("Click count for press at {:?} is {}", event.point, count);
        self.last_click = Some(LastClick {
            timestamp: event.timestamp,
            point: event.point,
            button: event.button,
            count,
        });
        count
    }

    fn continues(
        last_click: &LastClick,
        event: &PlatformMouseEvent,
        prefs: &InputPreferences,
    ) -> bool {
        if last_click.button != event.button {
            return false;
        }
        let Some(elapsed) = event.timestamp.checked_sub(last_click.timestamp) else {
            return false;
        };
        if elapsed >= prefs.dblclick_timeout() {
            return false;
        }
        let distance = (event.point - last_click.point).length() as f64;
        distance <= prefs.dom_document_dblclick_dist as f64
    }

    pub(crate) fn reset(&mut self) {
        self.last_click = None;
    }
}
