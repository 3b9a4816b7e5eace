//! Shift/caps state machine and auto-capitalization.
//!
//! States: unshifted, shift-once, shift-locked (caps). A shift down that is
//! consecutive with the previous shift down locks caps immediately; a lone
//! tap computes its target at down-time and commits it at up-time, so a held
//! key whose up never arrives leaves state unchanged. Cancel always returns
//! to unshifted.

use osk_core::editor::CursorContext;
use osk_core::event::{code, InputKeyEvent};

use super::TextProcessor;

impl TextProcessor {
    pub(super) fn handle_shift_down(&mut self, event: &InputKeyEvent) {
        let consecutive = self
            .tracker
            .last_down()
            .is_some_and(|prev| event.is_consecutive_of(&prev, self.prefs.long_press_delay()));
        if consecutive {
            // Double-tap: lock directly, nothing left to commit at up.
            self.pending_shift_lock = None;
            self.state.batch_edit(|s| s.set_caps_lock(true));
        } else {
            let snap = self.state.snapshot();
            self.pending_shift_lock = Some(!(snap.shift_lock || snap.caps_lock));
        }
    }

    pub(super) fn handle_shift_up(&mut self) {
        if let Some(target) = self.pending_shift_lock.take() {
            self.state.batch_edit(|s| {
                s.caps_lock = false;
                s.shift_lock = target;
            });
        }
    }

    pub(super) fn handle_shift_cancel(&mut self) {
        self.pending_shift_lock = None;
        self.state.batch_edit(|s| {
            s.caps_lock = false;
            s.shift_lock = false;
        });
    }

    /// The dedicated lock key only means caps as a chord following a shift
    /// down; anywhere else it is ignored.
    pub(super) fn handle_caps_lock_chord(&mut self) {
        if self.prev_event_was_shift_down {
            // The chord consumes the shift press; its up must not commit.
            self.pending_shift_lock = None;
            self.state.batch_edit(|s| s.set_caps_lock(true));
        } else {
            tracing::debug!("caps-lock key outside shift chord ignored");
        }
    }

    /// Recompute shift-lock from the cursor's sentence position. Skipped
    /// while caps-lock is engaged or SHIFT is physically held; a manually
    /// kept shift survives when `remember_caps_lock_state` is set.
    pub(super) fn update_caps_state(&mut self) {
        let snap = self.state.snapshot();
        if snap.caps_lock || self.tracker.is_pressed(code::SHIFT) {
            return;
        }
        if self.prefs.correction.remember_caps_lock_state && snap.shift_lock {
            return;
        }
        let target = self.prefs.correction.auto_capitalization
            && self.editor.cursor_context() == CursorContext::SentenceStart;
        if target != snap.shift_lock {
            self.state.batch_edit(|s| s.shift_lock = target);
        }
    }
}
