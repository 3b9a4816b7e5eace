//! Background worker for dictionary work: suggestion lookups, dictionary
//! preparation, and user-dictionary load/unload.
//!
//! One named thread, mpsc work/result channels, and an atomic generation
//! counter for staleness. Suggest work drains to the latest queued request;
//! a result whose generation has been superseded (or invalidated by session
//! teardown) is discarded, never applied.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use osk_core::subtype::Subtype;
use osk_core::suggest::{SuggestRequest, SuggestionProvider};

pub(crate) enum SuggestWork {
    Suggest {
        request: SuggestRequest,
        generation: u64,
    },
    Prepare(Subtype),
    LoadUserDicts,
    UnloadUserDicts,
}

pub(crate) struct SuggestResultMsg {
    pub generation: u64,
    pub suggestions: Vec<String>,
}

/// Submit-side handle held by the processor for dictionary maintenance
/// requests raised from event handling (e.g. input-view start).
#[derive(Clone)]
pub struct SuggestHandle {
    tx: mpsc::Sender<SuggestWork>,
}

impl SuggestHandle {
    pub fn prepare(&self, subtype: Subtype) {
        let _ = self.tx.send(SuggestWork::Prepare(subtype));
    }

    pub fn load_user_dicts(&self) {
        let _ = self.tx.send(SuggestWork::LoadUserDicts);
    }

    pub fn unload_user_dicts(&self) {
        let _ = self.tx.send(SuggestWork::UnloadUserDicts);
    }
}

pub(crate) struct SuggestWorker {
    tx: mpsc::Sender<SuggestWork>,
    rx: Mutex<mpsc::Receiver<SuggestResultMsg>>,
    generation: Arc<AtomicU64>,
}

impl SuggestWorker {
    pub fn spawn(provider: Arc<dyn SuggestionProvider>) -> Self {
        let generation = Arc::new(AtomicU64::new(0));
        let (work_tx, work_rx) = mpsc::channel::<SuggestWork>();
        let (result_tx, result_rx) = mpsc::channel::<SuggestResultMsg>();
        {
            let generation = Arc::clone(&generation);
            thread::Builder::new()
                .name("osk-suggest".into())
                .spawn(move || {
                    suggest_worker(work_rx, result_tx, generation, provider);
                })
                .expect("failed to spawn suggestion worker");
        }
        Self {
            tx: work_tx,
            rx: Mutex::new(result_rx),
            generation,
        }
    }

    pub fn handle(&self) -> SuggestHandle {
        SuggestHandle {
            tx: self.tx.clone(),
        }
    }

    /// Queue a lookup, superseding any outstanding one.
    pub fn submit_suggest(&self, request: SuggestRequest) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.tx.send(SuggestWork::Suggest {
            request,
            generation,
        });
    }

    /// Mark all outstanding lookups stale (session teardown, input restart).
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Next fresh result, if any. Stale results are drained and dropped.
    pub fn try_recv(&self) -> Option<SuggestResultMsg> {
        let rx = self.rx.lock().unwrap_or_else(|e| e.into_inner());
        while let Ok(msg) = rx.try_recv() {
            if msg.generation == self.generation.load(Ordering::SeqCst) {
                return Some(msg);
            }
        }
        None
    }
}

fn suggest_worker(
    rx: mpsc::Receiver<SuggestWork>,
    tx: mpsc::Sender<SuggestResultMsg>,
    generation: Arc<AtomicU64>,
    provider: Arc<dyn SuggestionProvider>,
) {
    while let Ok(work) = rx.recv() {
        match work {
            SuggestWork::Prepare(subtype) => provider.prepare_dictionaries(&subtype),
            SuggestWork::LoadUserDicts => provider.load_user_dictionaries(),
            SuggestWork::UnloadUserDicts => provider.unload_user_dictionaries(),
            SuggestWork::Suggest {
                mut request,
                generation: mut my_generation,
            } => {
                // Drain: skip to the latest queued lookup, servicing
                // maintenance work encountered along the way in order.
                while let Ok(newer) = rx.try_recv() {
                    match newer {
                        SuggestWork::Suggest {
                            request: r,
                            generation: g,
                        } => {
                            request = r;
                            my_generation = g;
                        }
                        SuggestWork::Prepare(subtype) => provider.prepare_dictionaries(&subtype),
                        SuggestWork::LoadUserDicts => provider.load_user_dictionaries(),
                        SuggestWork::UnloadUserDicts => provider.unload_user_dictionaries(),
                    }
                }

                // Staleness check before and after the (possibly slow) lookup.
                if my_generation != generation.load(Ordering::SeqCst) {
                    continue;
                }
                let suggestions = provider.suggest(&request);
                if my_generation != generation.load(Ordering::SeqCst) {
                    continue;
                }
                let _ = tx.send(SuggestResultMsg {
                    generation: my_generation,
                    suggestions,
                });
            }
        }
    }
}
