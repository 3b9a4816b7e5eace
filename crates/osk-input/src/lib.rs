//! Input-handling core of a soft keyboard: event dispatch, the key-event
//! state machine, and asynchronous suggestion lookups.
//!
//! [`InputEngine`] wires the pieces together with explicit ownership — the
//! caller constructs it, holds it, and drops it; there is no process-wide
//! instance. Key activations go in through the dispatcher; editor operations
//! come out through the [`EditorInstance`](osk_core::EditorInstance)
//! gateway; suggestions flow back through [`PresentationSink`] when the
//! owner pumps the engine on the event-delivery thread.

pub mod dispatcher;
pub mod processor;
mod suggest_worker;

#[cfg(test)]
mod tests;

use std::sync::{mpsc, Arc, Mutex};

use osk_core::editor::EditorInstance;
use osk_core::error::InitError;
use osk_core::prefs::Preferences;
use osk_core::state::{KeyboardMode, SharedKeyboardState};
use osk_core::subtype::{Subtype, SubtypeProvider};
use osk_core::suggest::{SuggestRequest, SuggestionProvider};

pub use dispatcher::{DispatcherConfig, InputEventDispatcher, InputKeyEventReceiver, PressTracker};
pub use processor::TextProcessor;
pub use suggest_worker::SuggestHandle;

use osk_core::event::InputKeyEvent;
use suggest_worker::SuggestWorker;

/// Sinks into the presentation layer. Implementations must tolerate being
/// called from the event-delivery thread only.
pub trait PresentationSink: Send + Sync {
    fn show_suggestions(&self, suggestions: Vec<String>);
    fn keyboard_mode_changed(&self, mode: KeyboardMode);
    fn quick_actions_changed(&self, visible: bool);
}

/// Construction-time knobs that are not user preferences.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Preferences TOML; `None` uses the built-in defaults. A parse failure
    /// is fatal to construction.
    pub prefs_toml: Option<String>,
    /// Available memory hint. Below the preference threshold, composing and
    /// suggestions are disabled proactively instead of attempted and failed.
    pub available_memory_mb: Option<u64>,
}

/// One explicitly owned input session: dispatcher + state machine + worker.
pub struct InputEngine {
    dispatcher: InputEventDispatcher,
    processor: Arc<Mutex<TextProcessor>>,
    worker: SuggestWorker,
    state: SharedKeyboardState,
    prefs: Arc<Preferences>,
    subtypes: Arc<dyn SubtypeProvider>,
    subtype_rx: mpsc::Receiver<Subtype>,
    sink: Arc<dyn PresentationSink>,
    restricted: bool,
    closed: bool,
}

impl InputEngine {
    pub fn new(
        editor: Box<dyn EditorInstance>,
        suggester: Arc<dyn SuggestionProvider>,
        subtypes: Arc<dyn SubtypeProvider>,
        sink: Arc<dyn PresentationSink>,
        config: EngineConfig,
    ) -> Result<Self, InitError> {
        let prefs = Arc::new(match config.prefs_toml {
            Some(ref toml_str) => Preferences::from_toml(toml_str)?,
            None => Preferences::default(),
        });
        let restricted = config
            .available_memory_mb
            .is_some_and(|mb| mb < prefs.advanced.min_free_memory_mb);

        let dispatcher = InputEventDispatcher::new(DispatcherConfig::from_prefs(&prefs));
        let worker = SuggestWorker::spawn(Arc::clone(&suggester));
        let state = SharedKeyboardState::new();

        let processor = Arc::new(Mutex::new(TextProcessor::new(
            editor,
            state.clone(),
            Arc::clone(&prefs),
            Arc::clone(&subtypes),
            suggester,
            worker.handle(),
            Arc::clone(&sink),
            dispatcher.tracker(),
            restricted,
        )));
        let receiver: Arc<Mutex<dyn InputKeyEventReceiver>> = processor.clone();
        dispatcher.set_receiver(Some(receiver));

        let subtype_rx = subtypes.subscribe();

        Ok(Self {
            dispatcher,
            processor,
            worker,
            state,
            prefs,
            subtypes,
            subtype_rx,
            sink,
            restricted,
            closed: false,
        })
    }

    pub fn dispatcher(&self) -> &InputEventDispatcher {
        &self.dispatcher
    }

    /// Handle to the session's shared keyboard state (for the presentation
    /// layer to snapshot).
    pub fn keyboard_state(&self) -> SharedKeyboardState {
        self.state.clone()
    }

    pub fn send_key(&self, event: InputKeyEvent) {
        self.dispatcher.send(event);
    }

    /// New input view started: reset state and prepare dictionaries.
    pub fn start_input(&self) {
        self.worker.invalidate();
        self.lock_processor().start_input();
    }

    pub fn commit_gesture_word(&self, word: &str) {
        self.lock_processor().commit_gesture_word(word);
    }

    pub fn on_selection_changed(&self) {
        self.lock_processor().on_selection_changed();
    }

    /// Drain all inboxes on the owning thread: subtype changes, editor
    /// word-boundary changes (each becoming a background lookup), and
    /// finished lookups (each handed to the sink). Late results from a
    /// superseded or closed session never reach the sink.
    pub fn pump(&self) {
        if self.closed {
            return;
        }

        while let Ok(subtype) = self.subtype_rx.try_recv() {
            self.worker.handle().prepare(subtype);
        }

        loop {
            let change = match self.lock_processor().poll_word_change() {
                Some(change) => change,
                None => break,
            };
            let snapshot = self.state.snapshot();
            if !self.prefs.suggestion.enabled || snapshot.is_private_mode || self.restricted {
                continue;
            }
            self.worker.submit_suggest(SuggestRequest {
                current_word: change.current_word.unwrap_or_default(),
                preceding_words: change.preceding_words,
                subtype: self.subtypes.active_subtype(),
                allow_possibly_offensive: !self.prefs.suggestion.block_possibly_offensive,
                max_count: self.prefs.suggestion.max_count,
            });
        }

        while let Some(result) = self.worker.try_recv() {
            self.sink.show_suggestions(result.suggestions);
        }
    }

    /// Tear the session down: cancel repeat timers and outstanding lookups.
    /// Idempotent; further `send_key`/`pump` calls are no-ops.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.worker.invalidate();
        self.worker.handle().unload_user_dicts();
        self.dispatcher.close();
    }

    fn lock_processor(&self) -> std::sync::MutexGuard<'_, TextProcessor> {
        self.processor.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for InputEngine {
    fn drop(&mut self) {
        self.close();
    }
}
