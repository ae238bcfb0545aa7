//! Global application state.
//!
//! Handed to every handler; holds nothing that changes between requests.

use super::database::Database;
use axum::extract::FromRef;

/// Global application state.
#[derive(Clone, Debug, FromRef)]
pub struct AppState {
    db: Database,
}

impl AppState {
    /// Constructs a new [`AppState`].
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}
