//! Shared application state handed to every axum handler.

use std::sync::Arc;

use intake_core::Orchestrator;

/// Everything a request handler needs: the orchestrator (itself a thin `Arc` bundle of the
/// LLM client, tool endpoints, personas, and session store) plus the process start time used
/// by `/health`.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            started_at: chrono::Utc::now(),
        }
    }
}
