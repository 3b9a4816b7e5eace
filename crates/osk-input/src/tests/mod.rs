mod engine;

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use osk_core::editor::{
    CursorContext, EditorInstance, EnterAction, FieldAttributes, MoveDirection, Selection,
    WordChange,
};
use osk_core::event::{InputKeyEvent, KeyData};
use osk_core::state::KeyboardMode;
use osk_core::subtype::{Subtype, SubtypeProvider};
use osk_core::suggest::{SuggestRequest, SuggestionProvider};

use crate::{EngineConfig, InputEngine, PresentationSink};

// ---------------------------------------------------------------------------
// Fake editor: an in-memory buffer with a cursor pinned to the end, plus an
// operation log so tests can assert exactly what the state machine asked for.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Op {
    Commit(String),
    DeleteBack,
    DeleteWordBack,
    DeleteForward,
    Enter,
    EnterAction(EnterAction),
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    SelectAll,
    Move {
        direction: MoveDirection,
        select: bool,
        jump: bool,
        count: u32,
    },
    SetSelection(usize, usize),
}

#[derive(Debug)]
struct Buf {
    text: String,
    selection: Selection,
    attrs: FieldAttributes,
    context: CursorContext,
    ops: Vec<Op>,
    word_changes: VecDeque<WordChange>,
}

impl Default for Buf {
    fn default() -> Self {
        Self {
            text: String::new(),
            selection: Selection { start: 0, end: 0 },
            attrs: FieldAttributes::default(),
            context: CursorContext::None,
            ops: Vec::new(),
            word_changes: VecDeque::new(),
        }
    }
}

#[derive(Clone, Default)]
pub(super) struct FakeEditor(Arc<Mutex<Buf>>);

impl FakeEditor {
    pub fn text(&self) -> String {
        self.0.lock().unwrap().text.clone()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.0.lock().unwrap().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.0.lock().unwrap().ops.clear();
    }

    pub fn set_attrs(&self, attrs: FieldAttributes) {
        self.0.lock().unwrap().attrs = attrs;
    }

    pub fn set_context(&self, context: CursorContext) {
        self.0.lock().unwrap().context = context;
    }

    pub fn set_selection_raw(&self, start: usize, end: usize) {
        self.0.lock().unwrap().selection = Selection { start, end };
    }

    pub fn selection_raw(&self) -> Selection {
        self.0.lock().unwrap().selection
    }

    pub fn push_word_change(&self, word: &str) {
        self.0.lock().unwrap().word_changes.push_back(WordChange {
            current_word: Some(word.to_string()),
            preceding_words: Vec::new(),
        });
    }
}

impl EditorInstance for FakeEditor {
    fn attributes(&self) -> FieldAttributes {
        self.0.lock().unwrap().attrs.clone()
    }

    fn commit_text(&mut self, text: &str) -> bool {
        let mut buf = self.0.lock().unwrap();
        buf.ops.push(Op::Commit(text.to_string()));
        buf.text.push_str(text);
        let end = buf.text.chars().count();
        buf.selection = Selection { start: end, end };
        true
    }

    fn delete_backwards(&mut self) -> bool {
        let mut buf = self.0.lock().unwrap();
        buf.ops.push(Op::DeleteBack);
        buf.text.pop().is_some()
    }

    fn delete_word_backwards(&mut self) -> bool {
        let mut buf = self.0.lock().unwrap();
        buf.ops.push(Op::DeleteWordBack);
        while buf.text.ends_with(char::is_whitespace) {
            buf.text.pop();
        }
        let mut removed = false;
        while buf
            .text
            .chars()
            .next_back()
            .is_some_and(|c| !c.is_whitespace())
        {
            buf.text.pop();
            removed = true;
        }
        removed
    }

    fn delete_forwards(&mut self) -> bool {
        self.0.lock().unwrap().ops.push(Op::DeleteForward);
        true
    }

    fn perform_enter(&mut self) {
        let mut buf = self.0.lock().unwrap();
        buf.ops.push(Op::Enter);
        buf.text.push('\n');
    }

    fn perform_enter_action(&mut self, action: EnterAction) {
        self.0.lock().unwrap().ops.push(Op::EnterAction(action));
    }

    fn perform_undo(&mut self) {
        self.0.lock().unwrap().ops.push(Op::Undo);
    }

    fn perform_redo(&mut self) {
        self.0.lock().unwrap().ops.push(Op::Redo);
    }

    fn clipboard_cut(&mut self) {
        self.0.lock().unwrap().ops.push(Op::Cut);
    }

    fn clipboard_copy(&mut self) {
        self.0.lock().unwrap().ops.push(Op::Copy);
    }

    fn clipboard_paste(&mut self) {
        self.0.lock().unwrap().ops.push(Op::Paste);
    }

    fn clipboard_select_all(&mut self) {
        self.0.lock().unwrap().ops.push(Op::SelectAll);
    }

    fn text_before_cursor(&self, n: usize) -> String {
        let buf = self.0.lock().unwrap();
        let chars: Vec<char> = buf.text.chars().collect();
        let start = chars.len().saturating_sub(n);
        chars[start..].iter().collect()
    }

    fn cursor_context(&self) -> CursorContext {
        self.0.lock().unwrap().context
    }

    fn selection(&self) -> Selection {
        self.0.lock().unwrap().selection
    }

    fn update_selection(&mut self, start: usize, end: usize) {
        let mut buf = self.0.lock().unwrap();
        buf.ops.push(Op::SetSelection(start, end));
        buf.selection = Selection { start, end };
    }

    fn move_cursor(&mut self, direction: MoveDirection, select: bool, jump: bool, count: u32) {
        self.0.lock().unwrap().ops.push(Op::Move {
            direction,
            select,
            jump,
            count,
        });
    }

    fn poll_word_change(&mut self) -> Option<WordChange> {
        self.0.lock().unwrap().word_changes.pop_front()
    }
}

// ---------------------------------------------------------------------------
// Fake suggester / subtype provider / presentation sink
// ---------------------------------------------------------------------------

#[derive(Default)]
pub(super) struct FakeSuggester {
    words: Mutex<HashSet<String>>,
    delay: Mutex<Duration>,
    pub requests: Mutex<Vec<SuggestRequest>>,
    pub prepared: Mutex<Vec<Subtype>>,
    pub loads: AtomicUsize,
    pub unloads: AtomicUsize,
}

impl FakeSuggester {
    pub fn add_word(&self, word: &str) {
        self.words.lock().unwrap().insert(word.to_string());
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }
}

impl SuggestionProvider for FakeSuggester {
    fn suggest(&self, request: &SuggestRequest) -> Vec<String> {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        self.requests.lock().unwrap().push(request.clone());
        vec![
            format!("{}-1", request.current_word),
            format!("{}-2", request.current_word),
        ]
    }

    fn is_word(&self, _subtype: &Subtype, word: &str) -> bool {
        self.words.lock().unwrap().contains(word)
    }

    fn prepare_dictionaries(&self, subtype: &Subtype) {
        self.prepared.lock().unwrap().push(subtype.clone());
    }

    fn load_user_dictionaries(&self) {
        self.loads.fetch_add(1, Ordering::SeqCst);
    }

    fn unload_user_dictionaries(&self) {
        self.unloads.fetch_add(1, Ordering::SeqCst);
    }
}

pub(super) struct FakeSubtypes {
    active: Mutex<Subtype>,
    pub switches: AtomicUsize,
    subscribers: Mutex<Vec<mpsc::Sender<Subtype>>>,
}

impl Default for FakeSubtypes {
    fn default() -> Self {
        Self {
            active: Mutex::new(Subtype::new(1, "en_US")),
            switches: AtomicUsize::new(0),
            subscribers: Mutex::new(Vec::new()),
        }
    }
}

impl FakeSubtypes {
    pub fn set_active(&self, subtype: Subtype) {
        *self.active.lock().unwrap() = subtype.clone();
        for tx in self.subscribers.lock().unwrap().iter() {
            let _ = tx.send(subtype.clone());
        }
    }
}

impl SubtypeProvider for FakeSubtypes {
    fn active_subtype(&self) -> Subtype {
        self.active.lock().unwrap().clone()
    }

    fn switch_to_next(&self) {
        self.switches.fetch_add(1, Ordering::SeqCst);
    }

    fn subscribe(&self) -> mpsc::Receiver<Subtype> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum SinkEvent {
    Suggestions(Vec<String>),
    Mode(KeyboardMode),
    QuickActions(bool),
}

#[derive(Default)]
pub(super) struct StubSink {
    pub events: Mutex<Vec<SinkEvent>>,
}

impl StubSink {
    pub fn suggestion_events(&self) -> Vec<Vec<String>> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Suggestions(s) => Some(s.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn mode_events(&self) -> Vec<KeyboardMode> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                SinkEvent::Mode(m) => Some(*m),
                _ => None,
            })
            .collect()
    }
}

impl PresentationSink for StubSink {
    fn show_suggestions(&self, suggestions: Vec<String>) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Suggestions(suggestions));
    }

    fn keyboard_mode_changed(&self, mode: KeyboardMode) {
        self.events.lock().unwrap().push(SinkEvent::Mode(mode));
    }

    fn quick_actions_changed(&self, visible: bool) {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::QuickActions(visible));
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub(super) struct Harness {
    pub engine: InputEngine,
    pub editor: FakeEditor,
    pub suggester: Arc<FakeSuggester>,
    pub subtypes: Arc<FakeSubtypes>,
    pub sink: Arc<StubSink>,
}

pub(super) fn make_engine() -> Harness {
    make_engine_with(EngineConfig::default())
}

pub(super) fn make_engine_with(config: EngineConfig) -> Harness {
    let editor = FakeEditor::default();
    let suggester = Arc::new(FakeSuggester::default());
    let subtypes = Arc::new(FakeSubtypes::default());
    let sink = Arc::new(StubSink::default());
    let engine = InputEngine::new(
        Box::new(editor.clone()),
        suggester.clone(),
        subtypes.clone(),
        sink.clone(),
        config,
    )
    .unwrap();
    engine.start_input();
    Harness {
        engine,
        editor,
        suggester,
        subtypes,
        sink,
    }
}

pub(super) fn tap(h: &Harness, data: KeyData) {
    h.engine.send_key(InputKeyEvent::down_up(data));
}

pub(super) fn tap_char(h: &Harness, ch: char) {
    tap(h, KeyData::character(ch));
}

pub(super) fn control_tap(h: &Harness, code: i32) {
    tap(h, KeyData::control(code));
}

pub(super) fn type_string(h: &Harness, s: &str) {
    for ch in s.chars() {
        tap_char(h, ch);
    }
}

/// Pump the engine until `pred` holds or the timeout elapses.
pub(super) fn pump_until(h: &Harness, timeout: Duration, pred: impl Fn() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    loop {
        h.engine.pump();
        if pred() {
            return true;
        }
        if std::time::Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}
