//! Language/layout subtype provider contract.

use std::sync::mpsc;

/// Current language/layout descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtype {
    pub id: i64,
    pub primary_locale: String,
}

impl Subtype {
    pub fn new(id: i64, primary_locale: impl Into<String>) -> Self {
        Self {
            id,
            primary_locale: primary_locale.into(),
        }
    }
}

/// Provider of the active subtype. Change notifications are a channel the
/// engine drains on its own thread rather than a callback, so a subtype
/// switch can never re-enter the state machine.
pub trait SubtypeProvider: Send + Sync {
    fn active_subtype(&self) -> Subtype;
    fn switch_to_next(&self);
    fn subscribe(&self) -> mpsc::Receiver<Subtype>;
}
