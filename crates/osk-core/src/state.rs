//! Shared keyboard-wide state with transactional batch updates.
//!
//! One `SharedKeyboardState` exists per input session. All multi-field
//! transitions go through [`SharedKeyboardState::batch_edit`]; a concurrent
//! reader taking a [`snapshot`](SharedKeyboardState::snapshot) can never
//! observe a partially applied batch.

use std::sync::{Arc, RwLock};

use crate::editor::FieldAttributes;
use crate::prefs::Preferences;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardMode {
    Characters,
    Numeric,
    NumericAdvanced,
    Phone,
    Phone2,
    Symbols,
    Symbols2,
    Editing,
}

/// Variation requested by the active input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyVariation {
    Normal,
    EmailAddress,
    Password,
    Uri,
}

/// Keyboard-wide flags. Invariant: `caps_lock` implies `shift_lock`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardState {
    pub keyboard_mode: KeyboardMode,
    pub key_variation: KeyVariation,
    pub is_composing_enabled: bool,
    pub caps_lock: bool,
    pub shift_lock: bool,
    pub is_manual_selection_mode: bool,
    pub is_manual_selection_mode_start: bool,
    pub is_manual_selection_mode_end: bool,
    pub is_kana_kata: bool,
    pub is_char_half_width: bool,
    pub is_quick_actions_visible: bool,
    pub is_private_mode: bool,
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self {
            keyboard_mode: KeyboardMode::Characters,
            key_variation: KeyVariation::Normal,
            is_composing_enabled: true,
            caps_lock: false,
            shift_lock: false,
            is_manual_selection_mode: false,
            is_manual_selection_mode_start: false,
            is_manual_selection_mode_end: false,
            is_kana_kata: false,
            is_char_half_width: false,
            is_quick_actions_visible: false,
            is_private_mode: false,
        }
    }
}

impl KeyboardState {
    /// Engaging caps-lock also raises shift-lock; releasing it leaves
    /// shift-lock to the caller.
    pub fn set_caps_lock(&mut self, on: bool) {
        self.caps_lock = on;
        if on {
            self.shift_lock = true;
        }
    }
}

/// Cheap-clone handle to the single shared state of an input session.
#[derive(Clone)]
pub struct SharedKeyboardState {
    inner: Arc<RwLock<KeyboardState>>,
}

impl Default for SharedKeyboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedKeyboardState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(KeyboardState::default())),
        }
    }

    /// Full copy of the current state. Never sees a half-applied batch.
    pub fn snapshot(&self) -> KeyboardState {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Apply a multi-field transition atomically with respect to readers.
    pub fn batch_edit(&self, edit: impl FnOnce(&mut KeyboardState)) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        edit(&mut guard);
        debug_assert!(!guard.caps_lock || guard.shift_lock);
    }

    /// Reset for a new input view. Fields are reassigned one-by-one inside a
    /// single batch; the allocation (and every outstanding handle) survives.
    pub fn start_input_session(
        &self,
        attrs: &FieldAttributes,
        prefs: &Preferences,
        low_memory: bool,
    ) {
        self.batch_edit(|s| {
            s.keyboard_mode = KeyboardMode::Characters;
            s.key_variation = attrs.variation;
            s.is_composing_enabled =
                attrs.variation != KeyVariation::Password && !low_memory;
            s.caps_lock = false;
            s.shift_lock = false;
            s.is_manual_selection_mode = false;
            s.is_manual_selection_mode_start = false;
            s.is_manual_selection_mode_end = false;
            s.is_kana_kata = false;
            s.is_char_half_width = false;
            s.is_quick_actions_visible = false;
            s.is_private_mode =
                prefs.advanced.force_private_mode || attrs.no_personalized_learning;
        });
        let snap = self.snapshot();
        tracing::debug!(
            variation = ?snap.key_variation,
            composing = snap.is_composing_enabled,
            private = snap.is_private_mode,
            "input session state reset"
        );
    }
}

/// Case fixup for committed gesture words: caps-lock uppercases the whole
/// word, shift-lock alone titlecases the first character.
pub fn fix_case(state: &KeyboardState, word: &str) -> String {
    if state.caps_lock {
        word.to_uppercase()
    } else if state.shift_lock {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    } else {
        word.to_string()
    }
}
