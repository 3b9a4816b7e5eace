//! Concurrency-safe event funnel between the platform key source and the
//! single registered receiver.
//!
//! The dispatcher classifies down/up/repeat/cancel, tracks the pressed set
//! and the last down/up events for consecutive-tap detection, and runs the
//! key-repeat timer for repeatable codes. Delivery is serialized through the
//! receiver mutex, so the state machine never sees concurrent invocation.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::debug_span;

use osk_core::event::{code, InputAction, InputKeyEvent};
use osk_core::prefs::Preferences;

/// The single receiver the dispatcher forwards normalized events to.
pub trait InputKeyEventReceiver: Send {
    fn on_input_key_down(&mut self, event: &InputKeyEvent);
    fn on_input_key_up(&mut self, event: &InputKeyEvent);
    fn on_input_key_repeat(&mut self, event: &InputKeyEvent);
    fn on_input_key_cancel(&mut self, event: &InputKeyEvent);
}

type ReceiverSlot = Arc<Mutex<Option<Arc<Mutex<dyn InputKeyEventReceiver>>>>>;

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub repeatable_codes: HashSet<i32>,
    /// Initial hold time before the first repeat fires.
    pub long_press_delay: Duration,
    pub repeat_interval: Duration,
}

impl DispatcherConfig {
    pub fn from_prefs(prefs: &Preferences) -> Self {
        Self {
            repeatable_codes: Self::default_repeatable_codes(),
            long_press_delay: prefs.long_press_delay(),
            repeat_interval: prefs.key_repeat_interval(),
        }
    }

    pub fn default_repeatable_codes() -> HashSet<i32> {
        HashSet::from([
            code::ARROW_LEFT,
            code::ARROW_RIGHT,
            code::ARROW_UP,
            code::ARROW_DOWN,
            code::MOVE_START_OF_LINE,
            code::MOVE_END_OF_LINE,
            code::MOVE_START_OF_PAGE,
            code::MOVE_END_OF_PAGE,
            code::DELETE,
            code::FORWARD_DELETE,
        ])
    }
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            repeatable_codes: Self::default_repeatable_codes(),
            long_press_delay: Duration::from_millis(300),
            repeat_interval: Duration::from_millis(50),
        }
    }
}

#[derive(Default)]
struct TrackerInner {
    pressed: HashSet<i32>,
    last_down: Option<InputKeyEvent>,
    last_up: Option<InputKeyEvent>,
}

/// Dispatcher tracking state shared with the state machine: pressed codes
/// plus the last down/up event per stream. Mutated only by the dispatcher.
#[derive(Default)]
pub struct PressTracker {
    inner: Mutex<TrackerInner>,
}

impl PressTracker {
    /// Reflects the most recently processed down/up, not an event in flight.
    pub fn is_pressed(&self, key_code: i32) -> bool {
        self.lock().pressed.contains(&key_code)
    }

    pub fn last_down(&self) -> Option<InputKeyEvent> {
        self.lock().last_down.clone()
    }

    pub fn last_up(&self) -> Option<InputKeyEvent> {
        self.lock().last_up.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

enum RepeatCmd {
    Start {
        event: InputKeyEvent,
        generation: u64,
    },
    Shutdown,
}

pub struct InputEventDispatcher {
    config: DispatcherConfig,
    tracker: Arc<PressTracker>,
    receiver: ReceiverSlot,
    closed: Arc<AtomicBool>,
    repeat_generation: Arc<AtomicU64>,
    repeat_tx: mpsc::Sender<RepeatCmd>,
}

impl InputEventDispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        let tracker = Arc::new(PressTracker::default());
        let receiver: ReceiverSlot = Arc::new(Mutex::new(None));
        let closed = Arc::new(AtomicBool::new(false));
        let repeat_generation = Arc::new(AtomicU64::new(0));

        let (repeat_tx, repeat_rx) = mpsc::channel::<RepeatCmd>();
        {
            let tracker = Arc::clone(&tracker);
            let receiver = Arc::clone(&receiver);
            let closed = Arc::clone(&closed);
            let generation = Arc::clone(&repeat_generation);
            let config = config.clone();
            thread::Builder::new()
                .name("osk-repeat".into())
                .spawn(move || {
                    repeat_worker(repeat_rx, tracker, receiver, closed, generation, config);
                })
                .expect("failed to spawn repeat worker");
        }

        Self {
            config,
            tracker,
            receiver,
            closed,
            repeat_generation,
            repeat_tx,
        }
    }

    /// Register (or clear) the receiver. Events sent with no receiver are
    /// dropped, not queued.
    pub fn set_receiver(&self, receiver: Option<Arc<Mutex<dyn InputKeyEventReceiver>>>) {
        *self.receiver.lock().unwrap_or_else(|e| e.into_inner()) = receiver;
    }

    pub fn tracker(&self) -> Arc<PressTracker> {
        Arc::clone(&self.tracker)
    }

    /// Synchronous pressed-set query.
    pub fn is_pressed(&self, key_code: i32) -> bool {
        self.tracker.is_pressed(key_code)
    }

    /// Accept one logical key activation. A no-op after `close` — the
    /// dispatcher favors liveness over crash on misuse.
    pub fn send(&self, event: InputKeyEvent) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        let _span = debug_span!("send", code = event.data.code, action = ?event.action).entered();

        match event.action {
            InputAction::Down => {
                self.process_down(&event);
            }
            InputAction::Up => {
                self.process_up(&event);
            }
            InputAction::DownUp => {
                self.process_down(&event);
                self.process_up(&event);
            }
            InputAction::Repeat => {
                deliver(&self.receiver, Phase::Repeat, &event);
            }
            InputAction::Cancel => {
                self.invalidate_repeat();
                self.tracker.lock().pressed.remove(&event.data.code);
                deliver(&self.receiver, Phase::Cancel, &event);
            }
        }
    }

    /// Cancel timers, clear the pressed set, and stop delivering. Idempotent.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.invalidate_repeat();
        let _ = self.repeat_tx.send(RepeatCmd::Shutdown);
        self.tracker.lock().pressed.clear();
    }

    fn process_down(&self, event: &InputKeyEvent) {
        // Pressed set updates before delivery; last_down is recorded after,
        // so the receiver still sees the previous down during delivery
        // (consecutive-tap detection relies on this).
        self.tracker.lock().pressed.insert(event.data.code);
        if self.config.repeatable_codes.contains(&event.data.code)
            && event.action == InputAction::Down
        {
            let generation = self.repeat_generation.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = self.repeat_tx.send(RepeatCmd::Start {
                event: event.clone(),
                generation,
            });
        }
        deliver(&self.receiver, Phase::Down, event);
        self.tracker.lock().last_down = Some(event.clone());
    }

    fn process_up(&self, event: &InputKeyEvent) {
        self.invalidate_repeat();
        self.tracker.lock().pressed.remove(&event.data.code);
        deliver(&self.receiver, Phase::Up, event);
        self.tracker.lock().last_up = Some(event.clone());
    }

    fn invalidate_repeat(&self) {
        self.repeat_generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for InputEventDispatcher {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Clone, Copy)]
enum Phase {
    Down,
    Up,
    Repeat,
    Cancel,
}

fn deliver(slot: &ReceiverSlot, phase: Phase, event: &InputKeyEvent) {
    let receiver = {
        let guard = slot.lock().unwrap_or_else(|e| e.into_inner());
        match *guard {
            Some(ref r) => Arc::clone(r),
            None => return,
        }
    };
    let mut receiver = receiver.lock().unwrap_or_else(|e| e.into_inner());
    match phase {
        Phase::Down => receiver.on_input_key_down(event),
        Phase::Up => receiver.on_input_key_up(event),
        Phase::Repeat => receiver.on_input_key_repeat(event),
        Phase::Cancel => receiver.on_input_key_cancel(event),
    }
}

fn repeat_worker(
    rx: mpsc::Receiver<RepeatCmd>,
    tracker: Arc<PressTracker>,
    receiver: ReceiverSlot,
    closed: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    config: DispatcherConfig,
) {
    while let Ok(cmd) = rx.recv() {
        let RepeatCmd::Start {
            event,
            generation: my_generation,
        } = cmd
        else {
            break;
        };

        thread::sleep(config.long_press_delay);
        let mut count = event.count;
        loop {
            if closed.load(Ordering::SeqCst)
                || my_generation != generation.load(Ordering::SeqCst)
                || !tracker.is_pressed(event.data.code)
            {
                break;
            }
            count += 1;
            let repeat_event = InputKeyEvent::repeat(event.data.clone(), count);
            deliver(&receiver, Phase::Repeat, &repeat_event);
            thread::sleep(config.repeat_interval);
        }
    }
}
