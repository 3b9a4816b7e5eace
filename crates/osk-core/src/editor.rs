//! Boundary contract to the text buffer the keyboard edits.
//!
//! The state machine only ever calls these methods; rendering, IME framework
//! plumbing, and the buffer itself live behind the implementation. Word
//! changes arrive through a pollable inbox drained on the owning thread,
//! never through re-entrant callbacks.

use crate::state::KeyVariation;

/// Semantic enter actions a field can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnterAction {
    Done,
    Go,
    Next,
    Previous,
    Search,
    Send,
}

/// Attributes of the active input field, captured at input-view start.
#[derive(Debug, Clone)]
pub struct FieldAttributes {
    /// Declared semantic action for the enter key, if any.
    pub enter_action: Option<EnterAction>,
    /// Field asked for a literal newline regardless of `enter_action`.
    pub no_enter_action: bool,
    /// Field opted out of personalized learning; forces private mode.
    pub no_personalized_learning: bool,
    pub variation: KeyVariation,
}

impl Default for FieldAttributes {
    fn default() -> Self {
        Self {
            enter_action: None,
            no_enter_action: false,
            no_personalized_learning: false,
            variation: KeyVariation::Normal,
        }
    }
}

/// Current selection; `start == end` is a bare cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn is_selection_mode(&self) -> bool {
        self.start != self.end
    }
}

/// Sentence-position classification of the cursor, used for auto-caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorContext {
    None,
    WordStart,
    SentenceStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Left,
    Right,
    Up,
    Down,
}

/// Word-boundary change around the cursor, delivered via `poll_word_change`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordChange {
    pub current_word: Option<String>,
    pub preceding_words: Vec<String>,
}

/// Gateway to the actual text buffer. Calls return immediately; the core
/// never assumes completion beyond the call itself, and suggestion refresh
/// is driven from the word-change inbox rather than from commits.
pub trait EditorInstance: Send {
    fn attributes(&self) -> FieldAttributes;

    fn commit_text(&mut self, text: &str) -> bool;
    fn delete_backwards(&mut self) -> bool;
    fn delete_word_backwards(&mut self) -> bool;
    fn delete_forwards(&mut self) -> bool;

    fn perform_enter(&mut self);
    fn perform_enter_action(&mut self, action: EnterAction);
    fn perform_undo(&mut self);
    fn perform_redo(&mut self);

    fn clipboard_cut(&mut self);
    fn clipboard_copy(&mut self);
    fn clipboard_paste(&mut self);
    fn clipboard_select_all(&mut self);

    /// Up to `n` characters immediately preceding the cursor.
    fn text_before_cursor(&self, n: usize) -> String;
    fn cursor_context(&self) -> CursorContext;

    fn selection(&self) -> Selection;
    /// Atomically set the selection and notify the platform.
    fn update_selection(&mut self, start: usize, end: usize);

    /// Send a directional key with optional select (shift) and jump
    /// (line/page boundary) modifiers, `count` times.
    fn move_cursor(&mut self, direction: MoveDirection, select: bool, jump: bool, count: u32);

    /// Single-threaded inbox of word-boundary changes; drained by the engine
    /// on the event-delivery thread.
    fn poll_word_change(&mut self) -> Option<WordChange>;
}
