//! The input key-event receiver: a set of small state machines sharing one
//! `SharedKeyboardState`, one per concern (shift/caps, delete, enter, space,
//! cursor motion, kana/width, selection, literal commit).
//!
//! All handlers run on the event-delivery thread; the dispatcher serializes
//! invocation. No handler returns an error — every event completes or is
//! logged and dropped, so one bad key can never stall delivery for the next.

mod caps;
mod keys;
mod motion;

use std::sync::Arc;

use tracing::debug_span;

use osk_core::editor::{EditorInstance, WordChange};
use osk_core::event::{code, InputKeyEvent, KeyAction};
use osk_core::prefs::Preferences;
use osk_core::state::{fix_case, SharedKeyboardState};
use osk_core::subtype::SubtypeProvider;
use osk_core::suggest::SuggestionProvider;

use crate::dispatcher::{InputKeyEventReceiver, PressTracker};
use crate::suggest_worker::SuggestHandle;
use crate::PresentationSink;

pub struct TextProcessor {
    editor: Box<dyn EditorInstance>,
    state: SharedKeyboardState,
    prefs: Arc<Preferences>,
    subtypes: Arc<dyn SubtypeProvider>,
    suggester: Arc<dyn SuggestionProvider>,
    suggest: SuggestHandle,
    sink: Arc<dyn PresentationSink>,
    tracker: Arc<PressTracker>,

    /// Low-memory restriction decided at construction; disables composing
    /// on each input start.
    restricted: bool,

    /// Most recent commit came from gesture typing; alters the next
    /// delete/space/literal-commit.
    glide_post_effect: bool,
    /// Shift target computed at down-time, committed at up-time. A held key
    /// that never sees its up leaves state untouched.
    pending_shift_lock: Option<bool>,
    /// Whether the immediately preceding dispatched event was a SHIFT down;
    /// gates the caps-lock chord key.
    prev_event_was_shift_down: bool,
}

#[allow(clippy::too_many_arguments)]
impl TextProcessor {
    pub fn new(
        editor: Box<dyn EditorInstance>,
        state: SharedKeyboardState,
        prefs: Arc<Preferences>,
        subtypes: Arc<dyn SubtypeProvider>,
        suggester: Arc<dyn SuggestionProvider>,
        suggest: SuggestHandle,
        sink: Arc<dyn PresentationSink>,
        tracker: Arc<PressTracker>,
        restricted: bool,
    ) -> Self {
        Self {
            editor,
            state,
            prefs,
            subtypes,
            suggester,
            suggest,
            sink,
            tracker,
            restricted,
            glide_post_effect: false,
            pending_shift_lock: None,
            prev_event_was_shift_down: false,
        }
    }

    /// Per-field session start: reset shared state field-by-field, derive
    /// private mode, and kick off dictionary preparation in the background.
    pub fn start_input(&mut self) {
        let attrs = self.editor.attributes();
        self.glide_post_effect = false;
        self.pending_shift_lock = None;
        self.state
            .start_input_session(&attrs, &self.prefs, self.restricted);

        self.suggest.prepare(self.subtypes.active_subtype());
        if self.state.snapshot().is_private_mode {
            self.suggest.unload_user_dicts();
        } else {
            self.suggest.load_user_dicts();
        }
        self.update_caps_state();
    }

    /// Commit a gesture-typed word: case-fixed per the lock flags, and the
    /// glide post-effect armed for the follow-up delete/space/commit rules.
    pub fn commit_gesture_word(&mut self, word: &str) {
        let cased = fix_case(&self.state.snapshot(), word);
        self.editor.commit_text(&cased);
        self.glide_post_effect = true;
    }

    /// Selection-position change from the platform; recomputes auto-caps.
    pub fn on_selection_changed(&mut self) {
        self.update_caps_state();
    }

    pub fn glide_post_effect(&self) -> bool {
        self.glide_post_effect
    }

    pub(crate) fn poll_word_change(&mut self) -> Option<WordChange> {
        self.editor.poll_word_change()
    }

    /// Literal character/numeric commit for keys with no named action.
    fn handle_literal(&mut self, event: &InputKeyEvent) {
        use osk_core::event::KeyType;
        match event.data.kind {
            KeyType::Character | KeyType::Numeric => {
                let text = event.data.text();
                if text.is_empty() {
                    tracing::error!(code = event.data.code, "key with empty rendering dropped");
                    return;
                }
                // Gesture-typed input auto-separates from the next explicitly
                // typed token when that token stands on its own.
                if self.glide_post_effect
                    && (text.chars().all(char::is_numeric)
                        || self
                            .suggester
                            .is_word(&self.subtypes.active_subtype(), &text))
                {
                    self.editor.commit_text(" ");
                }
                self.editor.commit_text(&text);
            }
            _ => {
                tracing::error!(
                    code = event.data.code,
                    kind = ?event.data.kind,
                    "unrecognized key event dropped"
                );
            }
        }
    }

    /// Cross-cutting rules applied after a key-up: auto-caps recompute for
    /// non-shift keys, and glide flag clearing for codes above SPACE.
    fn after_key_up(&mut self, event: &InputKeyEvent, action: Option<KeyAction>) {
        if action != Some(KeyAction::Shift) {
            self.update_caps_state();
        }
        if event.data.code > code::SPACE {
            self.glide_post_effect = false;
        }
    }
}

impl InputKeyEventReceiver for TextProcessor {
    fn on_input_key_down(&mut self, event: &InputKeyEvent) {
        let _span = debug_span!("key_down", code = event.data.code).entered();
        let action = KeyAction::from_code(event.data.code);
        match action {
            Some(KeyAction::Shift) => self.handle_shift_down(event),
            Some(KeyAction::CapsLock) => self.handle_caps_lock_chord(),
            _ => {}
        }
        self.prev_event_was_shift_down = action == Some(KeyAction::Shift);
    }

    fn on_input_key_up(&mut self, event: &InputKeyEvent) {
        let _span = debug_span!("key_up", code = event.data.code).entered();
        let action = KeyAction::from_code(event.data.code);
        match action {
            Some(KeyAction::Shift) => self.handle_shift_up(),
            Some(other) => self.handle_action(other, event),
            None => self.handle_literal(event),
        }
        self.after_key_up(event, action);
        self.prev_event_was_shift_down = false;
    }

    fn on_input_key_repeat(&mut self, event: &InputKeyEvent) {
        let _span = debug_span!("key_repeat", code = event.data.code, count = event.count)
            .entered();
        match KeyAction::from_code(event.data.code) {
            // Shift does not repeat; its pending target stays untouched.
            Some(KeyAction::Shift) => {}
            Some(other) => self.handle_action(other, event),
            None => self.handle_literal(event),
        }
        if event.data.code > code::SPACE {
            self.glide_post_effect = false;
        }
        self.prev_event_was_shift_down = false;
    }

    fn on_input_key_cancel(&mut self, event: &InputKeyEvent) {
        let _span = debug_span!("key_cancel", code = event.data.code).entered();
        if KeyAction::from_code(event.data.code) == Some(KeyAction::Shift) {
            self.handle_shift_cancel();
        }
        self.prev_event_was_shift_down = false;
    }
}
