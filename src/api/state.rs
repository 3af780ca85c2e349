//! Application state for the API server.

use crate::db::{FailoverProxy, Models};

/// Shared application state.
///
/// Both handles are cheap to clone: the relational proxy shares its bound
/// delegate and the document models share one connection and one in-memory
/// store.
#[derive(Debug, Clone)]
pub struct AppState {
    relational: FailoverProxy,
    models: Models,
}

impl AppState {
    pub fn new(relational: FailoverProxy, models: Models) -> Self {
        Self { relational, models }
    }

    /// Get a reference to the relational proxy.
    pub fn relational(&self) -> &FailoverProxy {
        &self.relational
    }

    /// Get a reference to the document models.
    pub fn models(&self) -> &Models {
        &self.models
    }
}
