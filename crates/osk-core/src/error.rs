//! Initialization error taxonomy. Event handlers never return errors; they
//! complete or log. Only session construction can fail.

use crate::prefs::PrefsError;

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("preference load failed: {0}")]
    Prefs(#[from] PrefsError),
    #[error("required resource missing: {name}")]
    MissingResource { name: String },
}
