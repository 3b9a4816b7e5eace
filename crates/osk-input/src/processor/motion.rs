//! Directional and line/page-boundary key handling.

use osk_core::editor::MoveDirection;
use osk_core::event::{code, InputKeyEvent};

use super::TextProcessor;

impl TextProcessor {
    /// Map a motion key to a platform directional event. The select modifier
    /// is held when SHIFT is physically down or manual-selection mode is
    /// active; `jump` marks line/page-boundary motions.
    pub(super) fn handle_motion(
        &mut self,
        direction: MoveDirection,
        jump: bool,
        event: &InputKeyEvent,
    ) {
        let selection = self.editor.selection();
        let snap = self.state.snapshot();

        // Entering an extension without an active selection decides which
        // edge the motion anchors: left/up extend the start, right/down the
        // end.
        if !selection.is_selection_mode() && snap.is_manual_selection_mode {
            let anchors_start = matches!(direction, MoveDirection::Left | MoveDirection::Up);
            self.state.batch_edit(|s| {
                s.is_manual_selection_mode_start = anchors_start;
                s.is_manual_selection_mode_end = !anchors_start;
            });
        }

        let select = snap.is_manual_selection_mode || self.tracker.is_pressed(code::SHIFT);
        self.editor
            .move_cursor(direction, select, jump, event.count.max(1));
        self.glide_post_effect = false;
    }
}
