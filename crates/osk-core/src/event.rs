//! Key-event model: immutable key descriptions and the normalized events the
//! dispatcher delivers to the receiver.
//!
//! Positive codes are Unicode scalar values; named control actions use the
//! reserved negative range in [`code`]. `KeyAction` is the closed enumeration
//! the state machine matches on, so a new control key is a compile-checked
//! addition rather than a fallthrough.

use std::time::{Duration, Instant};

use crate::editor::MoveDirection;
use crate::state::KeyboardMode;

/// Named control-action codes (reserved negative range) plus `SPACE`.
pub mod code {
    pub const SPACE: i32 = 32;

    pub const DELETE: i32 = -7;
    pub const DELETE_WORD: i32 = -8;
    pub const FORWARD_DELETE: i32 = -9;
    pub const ENTER: i32 = -10;
    pub const SHIFT: i32 = -11;
    pub const CAPS_LOCK: i32 = -13;

    pub const ARROW_LEFT: i32 = -21;
    pub const ARROW_RIGHT: i32 = -22;
    pub const ARROW_UP: i32 = -23;
    pub const ARROW_DOWN: i32 = -24;
    pub const MOVE_START_OF_LINE: i32 = -25;
    pub const MOVE_END_OF_LINE: i32 = -26;
    pub const MOVE_START_OF_PAGE: i32 = -27;
    pub const MOVE_END_OF_PAGE: i32 = -28;

    pub const KANA_HIRA: i32 = -31;
    pub const KANA_KATA_FULL: i32 = -32;
    pub const KANA_KATA_HALF: i32 = -33;
    pub const CHAR_WIDTH_FULL: i32 = -34;
    pub const CHAR_WIDTH_HALF: i32 = -35;
    pub const CHAR_WIDTH_SWITCH: i32 = -36;

    pub const TOGGLE_SELECTION: i32 = -41;
    pub const CLIPBOARD_CUT: i32 = -42;
    pub const CLIPBOARD_COPY: i32 = -43;
    pub const CLIPBOARD_PASTE: i32 = -44;
    pub const CLIPBOARD_SELECT_ALL: i32 = -45;
    pub const UNDO: i32 = -46;
    pub const REDO: i32 = -47;

    pub const VIEW_CHARACTERS: i32 = -51;
    pub const VIEW_NUMERIC: i32 = -52;
    pub const VIEW_NUMERIC_ADVANCED: i32 = -53;
    pub const VIEW_PHONE: i32 = -54;
    pub const VIEW_PHONE2: i32 = -55;
    pub const VIEW_SYMBOLS: i32 = -56;
    pub const VIEW_SYMBOLS2: i32 = -57;
    pub const VIEW_EDITING: i32 = -58;

    pub const LANGUAGE_SWITCH: i32 = -61;
    pub const QUICK_ACTIONS: i32 = -62;
    pub const UTILITY: i32 = -63;
}

/// Declared type of a key, as provided by the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    Character,
    Numeric,
    Control,
    Modifier,
    Function,
    Unspecified,
}

/// Immutable description of one logical key. Created once per key by the
/// layout layer, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyData {
    pub code: i32,
    pub kind: KeyType,
    pub label: Option<String>,
}

impl KeyData {
    pub fn character(ch: char) -> Self {
        Self {
            code: ch as i32,
            kind: KeyType::Character,
            label: None,
        }
    }

    pub fn numeric(ch: char) -> Self {
        Self {
            code: ch as i32,
            kind: KeyType::Numeric,
            label: None,
        }
    }

    pub fn control(code: i32) -> Self {
        Self {
            code,
            kind: KeyType::Control,
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Textual rendering committed to the editor for character/numeric keys.
    /// The label wins over the raw code so shifted/popup variants render as
    /// the layout declared them.
    pub fn text(&self) -> String {
        if let Some(ref label) = self.label {
            return label.clone();
        }
        u32::try_from(self.code)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    }
}

/// Phase of a key activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Down,
    Up,
    DownUp,
    Repeat,
    Cancel,
}

/// One normalized key activation. Constructed by the dispatcher (or a test),
/// immutable thereafter.
#[derive(Debug, Clone)]
pub struct InputKeyEvent {
    pub data: KeyData,
    pub action: InputAction,
    /// Repeat count, >= 1. Repeat events carry the running count.
    pub count: u32,
    pub time: Instant,
}

impl InputKeyEvent {
    pub fn new(data: KeyData, action: InputAction, count: u32, time: Instant) -> Self {
        debug_assert!(count >= 1);
        Self {
            data,
            action,
            count,
            time,
        }
    }

    pub fn down(data: KeyData) -> Self {
        Self::new(data, InputAction::Down, 1, Instant::now())
    }

    pub fn up(data: KeyData) -> Self {
        Self::new(data, InputAction::Up, 1, Instant::now())
    }

    pub fn down_up(data: KeyData) -> Self {
        Self::new(data, InputAction::DownUp, 1, Instant::now())
    }

    pub fn repeat(data: KeyData, count: u32) -> Self {
        Self::new(data, InputAction::Repeat, count, Instant::now())
    }

    pub fn cancel(data: KeyData) -> Self {
        Self::new(data, InputAction::Cancel, 1, Instant::now())
    }

    /// Whether this event is a consecutive occurrence of `other`: same code,
    /// and within `delay` of it. Underlies double-tap detection (shift lock,
    /// double-space period).
    pub fn is_consecutive_of(&self, other: &InputKeyEvent, delay: Duration) -> bool {
        self.data.code == other.data.code
            && self.time.saturating_duration_since(other.time) < delay
    }
}

/// Closed enumeration of control-key actions the state machine handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Shift,
    CapsLock,
    Delete,
    DeleteWord,
    ForwardDelete,
    Enter,
    Space,
    Arrow(MoveDirection),
    MoveStartOfLine,
    MoveEndOfLine,
    MoveStartOfPage,
    MoveEndOfPage,
    KanaHira,
    KanaKataFull,
    KanaKataHalf,
    CharWidthFull,
    CharWidthHalf,
    CharWidthSwitch,
    ToggleSelection,
    ClipboardCut,
    ClipboardCopy,
    ClipboardPaste,
    ClipboardSelectAll,
    Undo,
    Redo,
    SwitchView(KeyboardMode),
    LanguageSwitch,
    QuickActions,
    Utility,
}

impl KeyAction {
    /// Map a key code to its action. `None` means the code carries no named
    /// action and falls through to literal character/numeric handling.
    pub fn from_code(key_code: i32) -> Option<KeyAction> {
        Some(match key_code {
            code::SPACE => KeyAction::Space,
            code::DELETE => KeyAction::Delete,
            code::DELETE_WORD => KeyAction::DeleteWord,
            code::FORWARD_DELETE => KeyAction::ForwardDelete,
            code::ENTER => KeyAction::Enter,
            code::SHIFT => KeyAction::Shift,
            code::CAPS_LOCK => KeyAction::CapsLock,
            code::ARROW_LEFT => KeyAction::Arrow(MoveDirection::Left),
            code::ARROW_RIGHT => KeyAction::Arrow(MoveDirection::Right),
            code::ARROW_UP => KeyAction::Arrow(MoveDirection::Up),
            code::ARROW_DOWN => KeyAction::Arrow(MoveDirection::Down),
            code::MOVE_START_OF_LINE => KeyAction::MoveStartOfLine,
            code::MOVE_END_OF_LINE => KeyAction::MoveEndOfLine,
            code::MOVE_START_OF_PAGE => KeyAction::MoveStartOfPage,
            code::MOVE_END_OF_PAGE => KeyAction::MoveEndOfPage,
            code::KANA_HIRA => KeyAction::KanaHira,
            code::KANA_KATA_FULL => KeyAction::KanaKataFull,
            code::KANA_KATA_HALF => KeyAction::KanaKataHalf,
            code::CHAR_WIDTH_FULL => KeyAction::CharWidthFull,
            code::CHAR_WIDTH_HALF => KeyAction::CharWidthHalf,
            code::CHAR_WIDTH_SWITCH => KeyAction::CharWidthSwitch,
            code::TOGGLE_SELECTION => KeyAction::ToggleSelection,
            code::CLIPBOARD_CUT => KeyAction::ClipboardCut,
            code::CLIPBOARD_COPY => KeyAction::ClipboardCopy,
            code::CLIPBOARD_PASTE => KeyAction::ClipboardPaste,
            code::CLIPBOARD_SELECT_ALL => KeyAction::ClipboardSelectAll,
            code::UNDO => KeyAction::Undo,
            code::REDO => KeyAction::Redo,
            code::VIEW_CHARACTERS => KeyAction::SwitchView(KeyboardMode::Characters),
            code::VIEW_NUMERIC => KeyAction::SwitchView(KeyboardMode::Numeric),
            code::VIEW_NUMERIC_ADVANCED => KeyAction::SwitchView(KeyboardMode::NumericAdvanced),
            code::VIEW_PHONE => KeyAction::SwitchView(KeyboardMode::Phone),
            code::VIEW_PHONE2 => KeyAction::SwitchView(KeyboardMode::Phone2),
            code::VIEW_SYMBOLS => KeyAction::SwitchView(KeyboardMode::Symbols),
            code::VIEW_SYMBOLS2 => KeyAction::SwitchView(KeyboardMode::Symbols2),
            code::VIEW_EDITING => KeyAction::SwitchView(KeyboardMode::Editing),
            code::LANGUAGE_SWITCH => KeyAction::LanguageSwitch,
            code::QUICK_ACTIONS => KeyAction::QuickActions,
            code::UTILITY => KeyAction::Utility,
            _ => return None,
        })
    }
}
