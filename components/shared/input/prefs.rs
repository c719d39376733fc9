/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use keyboard_types::Modifiers;
use log::debug;
use serde::{Deserialize, Serialize};

/// Platform conventions for editing that change how selections are extended.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum EditingBehavior {
    Mac,
    Windows,
    Unix,
}

impl EditingBehavior {
    /// Whether an existing selection remembers which end it was extended from. When it
    /// does not, shift-click extends from whichever end is farther from the click.
    pub fn considers_selection_as_directional(self) -> bool {
        self == EditingBehavior::Mac
    }
}

/// When a link inside editable content acts like a link.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum EditableLinkBehavior {
    AlwaysLive,
    NeverLive,
    OnlyLiveWithShiftKey,
}

/// Tunables and platform capabilities of the event handler.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct InputPreferences {
    /// Two presses further apart than this are separate clicks.
    pub dom_document_dblclick_timeout_ms: u64,
    /// Two presses further apart than this many pixels are separate clicks.
    pub dom_document_dblclick_dist: u64,
    pub link_drag_hysteresis: u32,
    pub image_drag_hysteresis: u32,
    pub text_drag_hysteresis: u32,
    pub general_drag_hysteresis: u32,
    /// A drag over selected text that starts sooner than this after the press extends
    /// the selection instead.
    pub text_drag_delay_ms: u64,
    pub autoscroll_interval_ms: u64,
    /// Drag-and-drop autoscroll waits this long after the drag reaches a container.
    pub drag_and_drop_autoscroll_delay_ms: u64,
    pub fake_mouse_move_short_interval_ms: u64,
    pub fake_mouse_move_long_interval_ms: u64,
    pub cursor_update_interval_ms: u64,
    /// Custom cursor images larger than this in either dimension are ignored.
    pub maximum_cursor_size: u32,
    /// Radius around the pan origin inside which pan scrolling does not move.
    pub no_pan_scroll_radius: f32,
    pub supports_pan_scroll: bool,
    pub supports_touch_adjustment: bool,
    /// Turn mouse input into single-point touch events.
    pub touch_event_emulation: bool,
    pub device_supports_mouse: bool,
    /// Gestures, not touch events, drive `:active`.
    pub gestures_trigger_active: bool,
    /// A long press starts a drag instead of opening a context menu.
    pub touch_drag_drop_enabled: bool,
    pub select_trailing_whitespace_on_double_click: bool,
    pub select_word_on_context_menu: bool,
    pub tab_key_cycles_through_elements: bool,
    pub backspace_navigates_back: bool,
    pub spatial_navigation: bool,
    /// Fire `contextmenu` when the right button goes down rather than leaving it to
    /// the platform.
    pub context_menu_on_mouse_down: bool,
    pub dispatch_gesture_events: bool,
    pub wheel_latching: bool,
    pub editing_behavior: EditingBehavior,
    pub editable_link_behavior: EditableLinkBehavior,
    /// The modifiers that, together with a character key, trigger an access key.
    pub access_key_modifiers: Modifiers,
}

impl Default for InputPreferences {
    fn default() -> Self {
        Self {
            dom_document_dblclick_timeout_ms: 300,
            dom_document_dblclick_dist: 1,
            link_drag_hysteresis: 40,
            image_drag_hysteresis: 5,
            text_drag_hysteresis: 3,
            general_drag_hysteresis: 3,
            text_drag_delay_ms: 0,
            autoscroll_interval_ms: 50,
            drag_and_drop_autoscroll_delay_ms: 200,
            fake_mouse_move_short_interval_ms: 100,
            fake_mouse_move_long_interval_ms: 250,
            cursor_update_interval_ms: 20,
            maximum_cursor_size: 128,
            no_pan_scroll_radius: 15.,
            supports_pan_scroll: false,
            supports_touch_adjustment: false,
            touch_event_emulation: false,
            device_supports_mouse: true,
            gestures_trigger_active: false,
            touch_drag_drop_enabled: false,
            select_trailing_whitespace_on_double_click: false,
            select_word_on_context_menu: false,
            tab_key_cycles_through_elements: true,
            backspace_navigates_back: false,
            spatial_navigation: false,
            context_menu_on_mouse_down: false,
            dispatch_gesture_events: false,
            wheel_latching: true,
            editing_behavior: EditingBehavior::Unix,
            editable_link_behavior: EditableLinkBehavior::NeverLive,
            access_key_modifiers: Modifiers::ALT,
        }
    }
}

impl InputPreferences {
    pub fn from_json_str(json: &str) -> Result<Self, PrefsError> {
        let prefs = serde_json::from_str(json).map_err(PrefsError::Parse)?;
        debug!("Read input preferences: {:?}", prefs);
        Ok(prefs)
    }

    pub fn read_from_file(path: &Path) -> Result<Self, PrefsError> {
        let mut file = File::open(path).map_err(PrefsError::Io)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(PrefsError::Io)?;
        Self::from_json_str(&contents)
    }

    pub fn dblclick_timeout(&self) -> Duration {
        Duration::from_millis(self.dom_document_dblclick_timeout_ms)
    }

    pub fn text_drag_delay(&self) -> Duration {
        Duration::from_millis(self.text_drag_delay_ms)
    }

    pub fn autoscroll_interval(&self) -> Duration {
        Duration::from_millis(self.autoscroll_interval_ms)
    }

    pub fn drag_and_drop_autoscroll_delay(&self) -> Duration {
        Duration::from_millis(self.drag_and_drop_autoscroll_delay_ms)
    }

    pub fn fake_mouse_move_short_interval(&self) -> Duration {
        Duration::from_millis(self.fake_mouse_move_short_interval_ms)
    }

    pub fn fake_mouse_move_long_interval(&self) -> Duration {
        Duration::from_millis(self.fake_mouse_move_long_interval_ms)
    }

    pub fn cursor_update_interval(&self) -> Duration {
        Duration::from_millis(self.cursor_update_interval_ms)
    }
}

#[derive(Debug)]
pub enum PrefsError {
    Io(io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for PrefsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrefsError::Io(error) => write!(f, "Could not read preferences: {}", error),
            PrefsError::Parse(error) => write!(f, "Could not parse preferences: {}", error),
        }
    }
}

impl std::error::Error for PrefsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrefsError::Io(error) => Some(error),
            PrefsError::Parse(error) => Some(error),
        }
    }
}
