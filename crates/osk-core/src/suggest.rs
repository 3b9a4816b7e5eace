//! Boundary contract to the dictionary/suggestion subsystem.
//!
//! Every method must be callable from a background thread; the engine's
//! worker invokes them off the event-delivery thread.

use crate::subtype::Subtype;

/// One suggestion lookup. Built by the engine from a word-boundary change
/// plus the active preferences and subtype.
#[derive(Debug, Clone)]
pub struct SuggestRequest {
    pub current_word: String,
    pub preceding_words: Vec<String>,
    pub subtype: Subtype,
    pub allow_possibly_offensive: bool,
    pub max_count: usize,
}

pub trait SuggestionProvider: Send + Sync {
    /// Ordered suggestions, best first. May block; runs on the worker thread.
    fn suggest(&self, request: &SuggestRequest) -> Vec<String>;

    /// Whether `word` is a dictionary word for the subtype's locale. Called
    /// synchronously from the event thread, so this must be cheap.
    fn is_word(&self, subtype: &Subtype, word: &str) -> bool;

    fn prepare_dictionaries(&self, subtype: &Subtype);
    fn load_user_dictionaries(&self);
    fn unload_user_dictionaries(&self);
}
