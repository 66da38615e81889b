//! Application state shared across request handlers.

use std::sync::Arc;

use scrumpilot_core::LlmGateway;
use scrumpilot_storage::DocumentStore;

pub(crate) struct AppState {
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) gateway: Arc<dyn LlmGateway>,
    /// Optional API key for authentication. None = no auth required.
    pub(crate) api_key: Option<String>,
}

pub(crate) type SharedState = Arc<AppState>;
