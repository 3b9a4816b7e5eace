//! Core types for the soft-keyboard input engine.
//!
//! This crate holds the leaf data model (key events, keyboard state) and the
//! boundary contracts the input state machine talks through: the editor
//! gateway, the dictionary/suggestion gateway, the subtype provider, and the
//! preference model. It contains no event-handling logic of its own.

pub mod editor;
pub mod error;
pub mod event;
pub mod prefs;
pub mod state;
pub mod subtype;
pub mod suggest;

pub use editor::{
    CursorContext, EditorInstance, EnterAction, FieldAttributes, MoveDirection, Selection,
    WordChange,
};
pub use error::InitError;
pub use event::{code, InputAction, InputKeyEvent, KeyAction, KeyData, KeyType};
pub use prefs::{Preferences, PrefsError, UtilityKeyAction};
pub use state::{fix_case, KeyVariation, KeyboardMode, KeyboardState, SharedKeyboardState};
pub use subtype::{Subtype, SubtypeProvider};
pub use suggest::{SuggestRequest, SuggestionProvider};
