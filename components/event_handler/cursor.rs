/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use input_traits::{
    Cursor, CursorImage, CustomCursor, EditableLinkBehavior, EventHandlerHost, HitTestRequest,
    HitTestResult, NodeId,
};
use keyboard_types::Modifiers;

use crate::EventHandler;

/// The first custom cursor image that loaded and fits within `maximum_size` pixels
/// in both dimensions.
pub(crate) fn cursor_from_images(images: &[CursorImage], maximum_size: u32) -> Option<Cursor> {
    images
        .iter()
        .find(|image| {
            !image.has_error && image.width <= maximum_size && image.height <= maximum_size
        })
        .map(|image| {
            Cursor::Custom(CustomCursor {
                image: image.image,
                hot_spot: image.hot_spot,
            })
        })
}

impl<H: EventHandlerHost> EventHandler<H> {
    /// Whether hovering `node` shows the link cursor. Links inside editable content
    /// only do so when the editable link behavior lets them act as links.
    pub(crate) fn use_hand_cursor(
        &self,
        node: NodeId,
        is_over_link: bool,
        shift_key: bool,
    ) -> bool {
        let editable = self.host.is_editable(node);
        let editable_link_enabled = match self.prefs.editable_link_behavior {
            EditableLinkBehavior::AlwaysLive => true,
            EditableLinkBehavior::NeverLive => false,
            EditableLinkBehavior::OnlyLiveWithShiftKey => shift_key,
        };
        (is_over_link || self.host.is_submit_image(node)) && (!editable || editable_link_enabled)
    }

    /// The cursor to show over `result`, or `None` to leave the current cursor as is.
    pub(crate) fn select_cursor(&self, result: &HitTestResult, shift_key: bool) -> Option<Cursor> {
        if self.resizing_node.is_some() || self.is_pan_scroll_in_progress() {
            return None;
        }
        let node = result.node?;

        // A press that is selecting text keeps the text cursor wherever it goes.
        if self.mouse_pressed &&
            self.selection.mouse_down_may_start_select() &&
            !self.drag.may_start_drag &&
            self.host.selection().is_some() &&
            self.capturing_node.is_none()
        {
            return Some(Cursor::Text);
        }

        let style = self.host.cursor_style(node);
        if let Some(cursor) = style.renderer_override {
            return Some(cursor);
        }
        if let Some(cursor) = cursor_from_images(&style.images, self.prefs.maximum_cursor_size) {
            return Some(cursor);
        }

        Some(match style.cursor {
            Some(cursor) => cursor,
            None => {
                let editable = self.host.is_editable(node);
                if self.use_hand_cursor(node, result.is_over_link, shift_key) {
                    Cursor::Pointer
                } else if (editable ||
                    (self.host.is_text(node) && self.host.can_start_selection(node))) &&
                    !result.in_resize_control &&
                    result.scrollbar.is_none()
                {
                    Cursor::Text
                } else {
                    Cursor::Default
                }
            },
        })
    }

    /// Re-resolves the cursor at the last known pointer position, for content that
    /// changed under a still pointer.
    pub(crate) fn update_cursor(&mut self) {
        let Some(position) = self.last_known_mouse_position else {
            return;
        };
        self.host.update_layout();
        let result = self.host.hit_test(position, HitTestRequest::READ_ONLY);
        let shift_key = self.active_modifiers.contains(Modifiers::SHIFT);
        if let Some(cursor) = self.select_cursor(&result, shift_key) {
            self.set_cursor(cursor);
        }
    }
}
