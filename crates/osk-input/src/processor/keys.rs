//! Per-key handlers for every named control action except shift (see caps.rs)
//! and cursor motion (see motion.rs).

use osk_core::event::{code, InputKeyEvent, KeyAction};
use osk_core::prefs::UtilityKeyAction;
use osk_core::state::KeyboardMode;

use super::TextProcessor;

impl TextProcessor {
    pub(super) fn handle_action(&mut self, action: KeyAction, event: &InputKeyEvent) {
        match action {
            // Handled in the down/cancel phases (caps.rs).
            KeyAction::Shift | KeyAction::CapsLock => {}

            KeyAction::Delete => self.handle_delete(),
            KeyAction::DeleteWord => self.handle_delete_word(),
            KeyAction::ForwardDelete => {
                self.glide_post_effect = false;
                self.editor.delete_forwards();
            }
            KeyAction::Enter => self.handle_enter(),
            KeyAction::Space => self.handle_space(event),

            KeyAction::Arrow(direction) => self.handle_motion(direction, false, event),
            KeyAction::MoveStartOfLine => {
                self.handle_motion(osk_core::editor::MoveDirection::Left, true, event)
            }
            KeyAction::MoveEndOfLine => {
                self.handle_motion(osk_core::editor::MoveDirection::Right, true, event)
            }
            KeyAction::MoveStartOfPage => {
                self.handle_motion(osk_core::editor::MoveDirection::Up, true, event)
            }
            KeyAction::MoveEndOfPage => {
                self.handle_motion(osk_core::editor::MoveDirection::Down, true, event)
            }

            KeyAction::KanaHira => self.set_kana_width(false, false),
            KeyAction::KanaKataFull => self.set_kana_width(true, false),
            KeyAction::KanaKataHalf => self.set_kana_width(true, true),
            // Width-only keys still write the flag pair inside one batch.
            KeyAction::CharWidthFull => self.state.batch_edit(|s| {
                s.is_char_half_width = false;
            }),
            KeyAction::CharWidthHalf => self.state.batch_edit(|s| {
                s.is_char_half_width = true;
            }),
            KeyAction::CharWidthSwitch => self.state.batch_edit(|s| {
                s.is_char_half_width = !s.is_char_half_width;
            }),

            KeyAction::ToggleSelection => self.handle_toggle_selection(),
            KeyAction::ClipboardCut => self.editor.clipboard_cut(),
            KeyAction::ClipboardCopy => self.editor.clipboard_copy(),
            KeyAction::ClipboardPaste => self.editor.clipboard_paste(),
            KeyAction::ClipboardSelectAll => self.editor.clipboard_select_all(),
            KeyAction::Undo => self.editor.perform_undo(),
            KeyAction::Redo => self.editor.perform_redo(),

            KeyAction::SwitchView(mode) => {
                self.state.batch_edit(|s| s.keyboard_mode = mode);
                self.sink.keyboard_mode_changed(mode);
            }
            KeyAction::LanguageSwitch => self.subtypes.switch_to_next(),
            KeyAction::QuickActions => {
                let mut visible = false;
                self.state.batch_edit(|s| {
                    s.is_quick_actions_visible = !s.is_quick_actions_visible;
                    visible = s.is_quick_actions_visible;
                });
                self.sink.quick_actions_changed(visible);
            }
            KeyAction::Utility => match self.prefs.keyboard.utility_key_action {
                UtilityKeyAction::SwitchLanguage => self.subtypes.switch_to_next(),
                // Emoji panel is a presentation concern; nothing to do here.
                UtilityKeyAction::ToggleEmojis => {
                    tracing::debug!("utility key: emoji panel toggle left to presentation")
                }
                UtilityKeyAction::Disabled => {}
            },
        }
    }

    /// Ordinary delete, except the first delete after a gesture completion
    /// removes the whole gestured word so the user is not left tapping once
    /// per character of an autocompleted word.
    fn handle_delete(&mut self) {
        self.clear_manual_selection();
        if self.glide_post_effect {
            self.glide_post_effect = false;
            self.editor.delete_word_backwards();
        } else {
            self.editor.delete_backwards();
        }
    }

    fn handle_delete_word(&mut self) {
        self.clear_manual_selection();
        self.glide_post_effect = false;
        self.editor.delete_word_backwards();
    }

    fn clear_manual_selection(&mut self) {
        self.state.batch_edit(|s| {
            s.is_manual_selection_mode = false;
            s.is_manual_selection_mode_start = false;
            s.is_manual_selection_mode_end = false;
        });
    }

    fn handle_enter(&mut self) {
        self.glide_post_effect = false;
        let attrs = self.editor.attributes();
        if attrs.no_enter_action {
            self.editor.perform_enter();
            return;
        }
        match attrs.enter_action {
            Some(action) => self.editor.perform_enter_action(action),
            // Unrecognized/absent action falls back to a literal enter.
            None => self.editor.perform_enter(),
        }
    }

    fn handle_space(&mut self, event: &InputKeyEvent) {
        if self.prefs.keyboard.space_switches_to_characters {
            let snap = self.state.snapshot();
            if snap.keyboard_mode != KeyboardMode::Characters {
                self.state
                    .batch_edit(|s| s.keyboard_mode = KeyboardMode::Characters);
                self.sink.keyboard_mode_changed(KeyboardMode::Characters);
            }
        }

        self.glide_post_effect = false;

        if self.prefs.correction.double_space_period {
            let consecutive = self.tracker.last_up().is_some_and(|prev| {
                prev.data.code == code::SPACE
                    && event.is_consecutive_of(&prev, self.prefs.long_press_delay())
            });
            if consecutive {
                let before = self.editor.text_before_cursor(2);
                if wants_period(&before) {
                    // Swap the trailing space for ". ".
                    self.editor.delete_backwards();
                    self.editor.commit_text(". ");
                    return;
                }
            }
        }

        self.editor.commit_text(" ");
    }

    /// With an existing selection, the select key collapses it to the last
    /// anchored edge and leaves manual mode; with a bare cursor it toggles
    /// manual mode without touching the selection.
    fn handle_toggle_selection(&mut self) {
        let selection = self.editor.selection();
        let snap = self.state.snapshot();
        if selection.is_selection_mode() {
            let pos = if snap.is_manual_selection_mode_start {
                selection.start
            } else {
                selection.end
            };
            self.editor.update_selection(pos, pos);
            self.clear_manual_selection();
        } else {
            self.state.batch_edit(|s| {
                s.is_manual_selection_mode = !s.is_manual_selection_mode;
                if !s.is_manual_selection_mode {
                    s.is_manual_selection_mode_start = false;
                    s.is_manual_selection_mode_end = false;
                }
            });
        }
    }

    fn set_kana_width(&mut self, kata: bool, half_width: bool) {
        // Both flags in one batch; a concurrent reader never sees the pair
        // half-switched.
        self.state.batch_edit(|s| {
            s.is_kana_kata = kata;
            s.is_char_half_width = half_width;
        });
    }
}

/// Double-space re-punctuation wants a `[word-char][space]` pair before the
/// cursor. A pair already led by punctuation or whitespace is left alone, so
/// "ab. " plus a quick double space never becomes "ab.. ".
fn wants_period(before: &str) -> bool {
    let mut chars = before.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(first), Some(second), None) => second.is_whitespace() && first.is_alphanumeric(),
        _ => false,
    }
}
