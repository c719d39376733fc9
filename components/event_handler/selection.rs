/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::cmp::Ordering;

use input_traits::{
    DocumentPoint, DomEvent, DomEventType, EditingHost, EventDetail, EventSink, HitTestResult,
    InputPreferences, MouseButton, NodeId, NodeQueries, PlatformMouseEvent, Selection,
    TextGranularity, TextPosition,
};
use log::debug;

/// How far the current press has gone toward changing the selection.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SelectionInitiationState {
    #[default]
    NotStarted,
    PlacedCaret,
    Extended,
}

/// Tracks whether a press and the drag that follows it place a caret, extend a
/// selection or leave the selection alone.
#[derive(Debug, Default)]
pub struct SelectionGestureTracker {
    state: SelectionInitiationState,
    mouse_down_may_start_select: bool,
    mouse_down_was_single_click_in_selection: bool,
}

impl SelectionGestureTracker {
    pub fn state(&self) -> SelectionInitiationState {
        self.state
    }

    pub fn mouse_down_may_start_select(&self) -> bool {
        self.mouse_down_may_start_select
    }

    pub fn mouse_down_was_single_click_in_selection(&self) -> bool {
        self.mouse_down_was_single_click_in_selection
    }

    pub(crate) fn begin_press(&mut self, may_start_select: bool) {
        self.state = SelectionInitiationState::NotStarted;
        self.mouse_down_may_start_select = may_start_select;
        self.mouse_down_was_single_click_in_selection = false;
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether a press on `node` may start a selection.
    pub(crate) fn can_mouse_down_start_select<H: NodeQueries>(host: &H, node: NodeId) -> bool {
        if !host.has_renderer(node) {
            return true;
        }
        host.can_start_selection(node) || host.user_select_all_root(node) == Some(node)
    }

    fn dispatch_select_start<H: EventSink + NodeQueries>(host: &mut H, node: NodeId) -> bool {
        if !host.has_renderer(node) {
            return true;
        }
        let event = DomEvent::new(DomEventType::SelectStart, EventDetail::None);
        !host.dispatch_event(node, event).is_consumed()
    }

    fn expand_to_respect_user_select_all<H: NodeQueries + EditingHost>(
        host: &mut H,
        node: NodeId,
        selection: Selection,
    ) -> Selection {
        let Some(root) = host.user_select_all_root(node) else {
            return selection;
        };
        match host.node_range(root) {
            Some((start, end)) => Selection::range(start, end, selection.granularity),
            None => selection,
        }
    }

    fn set_selection_if_needed<H: EditingHost>(host: &mut H, selection: Option<Selection>) {
        if host.selection() != selection {
            host.set_selection(selection);
        }
    }

    fn update_selection_for_mouse_down_dispatching_select_start<H>(
        &mut self,
        host: &mut H,
        node: NodeId,
        mut selection: Selection,
    ) -> bool
    where
        H: EventSink + NodeQueries + EditingHost,
    {
        if host.has_renderer(node) && !host.can_start_selection(node) {
            return false;
        }
        if !Self::dispatch_select_start(host, node) {
            debug!("selectstart on {:?} was cancelled", node);
            return false;
        }

        if selection.is_range() {
            self.state = SelectionInitiationState::Extended;
        } else {
            selection.granularity = TextGranularity::Character;
            self.state = SelectionInitiationState::PlacedCaret;
        }
        Self::set_selection_if_needed(host, Some(selection));
        true
    }

    pub(crate) fn select_closest_word<H>(
        &mut self,
        host: &mut H,
        result: &HitTestResult,
        append_trailing_whitespace: bool,
    ) -> bool
    where
        H: EventSink + NodeQueries + EditingHost,
    {
        let Some(node) = result.node.filter(|node| host.has_renderer(*node)) else {
            return false;
        };
        let Some(position) = host.position_for_point(node, result.local_point) else {
            return false;
        };
        let Some((start, end)) = host.word_range(&position, append_trailing_whitespace) else {
            return false;
        };
        let selection = Self::expand_to_respect_user_select_all(
            host,
            node,
            Selection::range(start, end, TextGranularity::Word),
        );
        self.update_selection_for_mouse_down_dispatching_select_start(host, node, selection)
    }

    pub(crate) fn handle_mouse_press_double_click<H>(
        &mut self,
        host: &mut H,
        event: &PlatformMouseEvent,
        result: &HitTestResult,
        click_count: u32,
        prefs: &InputPreferences,
    ) -> bool
    where
        H: EventSink + NodeQueries + EditingHost,
    {
        if event.button != Some(MouseButton::Left) {
            return false;
        }

        // Keep an existing range, but mark it extended so the release does not collapse it.
        if host.selection().is_some_and(|selection| selection.is_range()) {
            self.state = SelectionInitiationState::Extended;
        } else if self.mouse_down_may_start_select {
            let append_trailing_whitespace =
                click_count == 2 && prefs.select_trailing_whitespace_on_double_click;
            self.select_closest_word(host, result, append_trailing_whitespace);
        }
        true
    }

    pub(crate) fn handle_mouse_press_triple_click<H>(
        &mut self,
        host: &mut H,
        event: &PlatformMouseEvent,
        result: &HitTestResult,
    ) -> bool
    where
        H: EventSink + NodeQueries + EditingHost,
    {
        if event.button != Some(MouseButton::Left) {
            return false;
        }
        let Some(node) = result.node else {
            return false;
        };
        if !host.has_renderer(node) || !self.mouse_down_may_start_select {
            return false;
        }

        let Some(position) = host.position_for_point(node, result.local_point) else {
            return false;
        };
        let Some((start, end)) = host.paragraph_range(&position) else {
            return false;
        };
        let selection = Self::expand_to_respect_user_select_all(
            host,
            node,
            Selection::range(start, end, TextGranularity::Paragraph),
        );
        self.update_selection_for_mouse_down_dispatching_select_start(host, node, selection)
    }

    pub(crate) fn handle_mouse_press_single_click<H>(
        &mut self,
        host: &mut H,
        event: &PlatformMouseEvent,
        result: &HitTestResult,
        prefs: &InputPreferences,
    ) -> bool
    where
        H: EventSink + NodeQueries + EditingHost,
    {
        let Some(node) = result.node else {
            return false;
        };
        if !host.has_renderer(node) || !self.mouse_down_may_start_select {
            return false;
        }

        let extend_selection = event.shift_key() && !result.is_over_link;

        // Leave an existing selection alone so that it can be dragged.
        if !extend_selection && host.selection_contains_point(event.point) {
            self.mouse_down_was_single_click_in_selection = true;
            return false;
        }

        let Some(mut position) = host
            .position_for_point(node, result.local_point)
            .or_else(|| host.node_range(node).map(|(start, _)| start))
        else {
            return false;
        };

        let current = host.selection();
        let selection = match current {
            Some(current) if extend_selection => {
                let (start, end) = Self::ordered(host, current.base, current.extent);
                let in_user_select_all = Self::expand_to_respect_user_select_all(
                    host,
                    node,
                    Selection::caret(position),
                );
                if in_user_select_all.is_range() {
                    let (all_start, all_end) =
                        Self::ordered(host, in_user_select_all.base, in_user_select_all.extent);
                    if host.compare_positions(&all_start, &start) == Ordering::Less {
                        position = all_start;
                    } else if host.compare_positions(&end, &all_end) == Ordering::Less {
                        position = all_end;
                    }
                }

                let mut selection = if prefs.editing_behavior.considers_selection_as_directional()
                {
                    Selection::range(current.base, position, current.granularity)
                } else {
                    // Extend from the end farther from the click, so a shift-click never
                    // collapses a selection made right to left.
                    let distance_to_start = host.character_distance(&start, &position);
                    let distance_to_end = host.character_distance(&position, &end);
                    if distance_to_start <= distance_to_end {
                        Selection::range(end, position, current.granularity)
                    } else {
                        Selection::range(start, position, current.granularity)
                    }
                };
                if selection.is_caret() {
                    selection.granularity = TextGranularity::Character;
                }
                selection
            },
            _ => Self::expand_to_respect_user_select_all(host, node, Selection::caret(position)),
        };

        self.update_selection_for_mouse_down_dispatching_select_start(host, node, selection)
    }

    fn ordered<H: EditingHost>(
        host: &H,
        a: TextPosition,
        b: TextPosition,
    ) -> (TextPosition, TextPosition) {
        match host.compare_positions(&a, &b) {
            Ordering::Greater => (b, a),
            _ => (a, b),
        }
    }

    /// Extends the selection to the point under a drag. The first drag of a press that
    /// did not already extend the selection restarts it at that point.
    pub(crate) fn update_selection_for_mouse_drag<H>(
        &mut self,
        host: &mut H,
        result: &HitTestResult,
        mouse_press_node: Option<NodeId>,
    ) where
        H: EventSink + NodeQueries + EditingHost,
    {
        if !self.mouse_down_may_start_select {
            return;
        }
        let Some(node) = result.node else {
            return;
        };
        if !host.has_renderer(node) {
            return;
        }
        let Some(mut position) = host.position_for_point(node, result.local_point) else {
            return;
        };

        if self.state == SelectionInitiationState::NotStarted &&
            !Self::dispatch_select_start(host, node)
        {
            return;
        }

        let mut selection = match host.selection() {
            Some(selection) if self.state == SelectionInitiationState::Extended => selection,
            _ => {
                self.state = SelectionInitiationState::Extended;
                Selection::caret(position)
            },
        };

        let press_root = mouse_press_node.and_then(|node| host.user_select_all_root(node));
        let target_root = host.user_select_all_root(node);
        if press_root.is_some() && press_root == target_root {
            if let Some((start, end)) = press_root.and_then(|root| host.node_range(root)) {
                selection.base = start;
                position = end;
            }
        } else if let Some((start, end)) = target_root.and_then(|root| host.node_range(root)) {
            position = match host.compare_positions(&position, &selection.base) {
                Ordering::Less => start,
                _ => end,
            };
        }

        selection.extent = position;
        Self::set_selection_if_needed(host, Some(selection));
    }

    /// The caret placement that happens when a click lands in a range selection without
    /// the mouse moving in between. Returns true if the selection was replaced.
    pub(crate) fn handle_mouse_release<H>(
        &mut self,
        host: &mut H,
        event: &PlatformMouseEvent,
        result: &HitTestResult,
        mouse_down_position: DocumentPoint,
    ) -> bool
    where
        H: NodeQueries + EditingHost,
    {
        self.mouse_down_may_start_select = false;
        if !self.mouse_down_was_single_click_in_selection ||
            self.state == SelectionInitiationState::Extended ||
            mouse_down_position != event.point ||
            !host.selection().is_some_and(|selection| selection.is_range()) ||
            event.button == Some(MouseButton::Right)
        {
            return false;
        }

        let caret_browsing = host.caret_browsing_enabled();
        let new_selection = result
            .node
            .filter(|node| (caret_browsing || host.is_editable(*node)) && host.has_renderer(*node))
            .and_then(|node| host.position_for_point(node, result.local_point))
            .map(Selection::caret);
        debug!("Click in selection replaces it with {:?}", new_selection);
        Self::set_selection_if_needed(host, new_selection);
        true
    }
}
