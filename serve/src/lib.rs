//! HTTP transport for the loan-intake conversation and assessment engine (axum).
//!
//! Listens on `127.0.0.1:8080` by default, exposing `GET /health`, `POST /api/chat`, and the
//! session admin endpoints (`GET /api/sessions`, `GET /api/sessions/{id}`,
//! `DELETE /api/sessions/{id}`, `POST /api/sessions/cleanup`).
//!
//! **Public API**: [`run_serve`], [`run_serve_on_listener`], [`build_orchestrator_from_env`].

mod cleanup;
mod error;
mod handlers;
mod router;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use intake_config::{PersonaSet, ToolEndpoints};
use intake_core::{ChatOpenAI, LlmClient, Orchestrator, SessionStore};

pub use state::AppState;

const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Builds the `Orchestrator` from process environment: `APP_PERSONA_DIR` (default
/// `./personas`) for persona text, `MCP_*_URL` / an optional `APP_TOOLS_CONFIG` TOML file for
/// tool endpoints, and `AZURE_AI_PROJECT_ENDPOINT` / `AZURE_AI_MODEL_DEPLOYMENT_NAME` (falling
/// back to plain `OPENAI_API_KEY` + a default model) for the language-model client.
pub fn build_orchestrator_from_env() -> Result<Orchestrator, Box<dyn std::error::Error + Send + Sync>> {
    let persona_dir = std::env::var("APP_PERSONA_DIR").unwrap_or_else(|_| "./personas".to_string());
    let personas = Arc::new(PersonaSet::load(&PathBuf::from(persona_dir))?);

    let tools_config = std::env::var("APP_TOOLS_CONFIG").ok().map(PathBuf::from);
    let endpoints = Arc::new(ToolEndpoints::load(tools_config.as_deref())?);

    let llm: Arc<dyn LlmClient> = Arc::new(build_llm_client());
    let store = Arc::new(SessionStore::new());

    Ok(Orchestrator::new(llm, endpoints, personas, store)?)
}

fn build_llm_client() -> ChatOpenAI {
    use async_openai::config::OpenAIConfig;

    let model = std::env::var("AZURE_AI_MODEL_DEPLOYMENT_NAME").unwrap_or_else(|_| "gpt-4o".to_string());
    match std::env::var("AZURE_AI_PROJECT_ENDPOINT") {
        Ok(endpoint) => {
            let config = OpenAIConfig::new().with_api_base(endpoint);
            ChatOpenAI::with_config(config, model)
        }
        Err(_) => ChatOpenAI::new(model),
    }
}

/// Runs the server on an already-bound listener, with a pre-built orchestrator. Used directly
/// by tests (bind to `127.0.0.1:0`, build an `Orchestrator` over a `MockLlm`).
pub async fn run_serve_on_listener(
    listener: TcpListener,
    orchestrator: Orchestrator,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = listener.local_addr()?;
    info!("HTTP server listening on http://{}", addr);

    let state = AppState::new(orchestrator);
    cleanup::spawn(state.orchestrator.clone());

    let cors_origins = std::env::var("APP_CORS_ORIGINS").unwrap_or_default();
    let app = router::router(state, router::cors_layer(&cors_origins));

    axum::serve(listener, app).await?;
    Ok(())
}

/// Runs the server, building the orchestrator from the process environment and binding
/// `addr` (default `127.0.0.1:8080`).
pub async fn run_serve(addr: Option<&str>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = addr.unwrap_or(DEFAULT_ADDR);
    let listener = TcpListener::bind(addr).await?;
    let orchestrator = build_orchestrator_from_env()?;
    run_serve_on_listener(listener, orchestrator).await
}

/// Builds the router directly, without binding a socket or spawning the eviction task. Used
/// by the `tests/e2e` suite to drive requests in-process with `tower::ServiceExt::oneshot`.
pub fn test_router(state: AppState) -> axum::Router {
    router::router(state, router::cors_layer(""))
}
