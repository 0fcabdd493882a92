//! Drives one conversational turn end to end: resolves the session, runs the coordinator,
//! persists the result, and — the moment a turn completes collection — launches the
//! assessment pipeline in the background, streaming its events back to the caller.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use intake_config::{PersonaSet, ToolEndpoints};

use crate::agents::CoordinatorAgent;
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::model::{mask_email, CoordinatorAction, CoordinatorReply, PipelineEvent, SessionStatus};
use crate::pipeline::Pipeline;
use crate::session::SessionStore;

/// What one call to `handle_turn` hands back: the coordinator's reply, plus a receiver for
/// the assessment pipeline's events when that reply advanced the session to
/// `ready_for_processing` — `None` otherwise (still collecting, needs clarification, or the
/// coordinator itself failed).
pub struct TurnOutcome {
    pub session_id: String,
    pub reply: CoordinatorReply,
    pub pipeline_events: Option<mpsc::Receiver<PipelineEvent>>,
}

/// Owns the long-lived, shared dependencies every turn needs: the LLM client, tool
/// endpoints, loaded personas, and the session registry. Cheap to clone (everything inside
/// is an `Arc` or, for `SessionStore`, already `Send + Sync` behind internal sharding).
#[derive(Clone)]
pub struct Orchestrator {
    llm: Arc<dyn LlmClient>,
    endpoints: Arc<ToolEndpoints>,
    personas: Arc<PersonaSet>,
    store: Arc<SessionStore>,
}

impl Orchestrator {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        endpoints: Arc<ToolEndpoints>,
        personas: Arc<PersonaSet>,
        store: Arc<SessionStore>,
    ) -> Result<Self, AgentError> {
        Ok(Self {
            llm,
            endpoints,
            personas,
            store,
        })
    }

    /// Runs the 8-step turn algorithm (spec §4.5.2): resolve/create the session, serialize
    /// on its per-session lock, run the coordinator, persist the merged result, and — when
    /// the coordinator just reported `ready_for_processing` — flip the session to
    /// `processing` and hand the caller a receiver for the pipeline run this same call
    /// launches in the background (spec §4.5.3's "the same turn may continue directly into
    /// the pipeline").
    pub async fn handle_turn(
        &self,
        session_id: Option<&str>,
        user_message: &str,
    ) -> Result<TurnOutcome, AgentError> {
        let entry = self.store.get_or_create(session_id);
        let mut guard = entry.lock().await;

        let coordinator = CoordinatorAgent::new(
            self.personas
                .get("coordinator")
                .map_err(|e| AgentError::MissingPersona(e.to_string()))?
                .to_string(),
        );

        let outcome = coordinator
            .run(
                self.llm.as_ref(),
                &mut guard.thread,
                user_message,
                &guard.session.collected_data,
            )
            .await;

        let reply = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    session_id = %guard.session.session_id,
                    error = %e,
                    "coordinator turn failed"
                );
                guard.session.mark_error(e.to_string());
                let error_reply =
                    CoordinatorReply::error(e.to_string(), guard.session.collected_data.clone());
                return Ok(TurnOutcome {
                    session_id: guard.session.session_id.clone(),
                    reply: error_reply,
                    pipeline_events: None,
                });
            }
        };

        guard.session.collected_data = reply.collected_data.clone();
        guard.session.completion_percentage = reply.completion_percentage;
        guard.session.touch();

        if reply.action != CoordinatorAction::ReadyForProcessing {
            let session_id = guard.session.session_id.clone();
            return Ok(TurnOutcome {
                session_id,
                reply,
                pipeline_events: None,
            });
        }

        guard.session.status = SessionStatus::Processing;
        let session_id = guard.session.session_id.clone();
        let application = reply.collected_data.clone().into_complete()?;

        let pipeline = Pipeline::new(self.llm.clone(), self.endpoints.clone(), &self.personas)?;
        let (tx, rx) = mpsc::channel(8);
        let entry_for_run = entry.clone();

        tokio::spawn(async move {
            let mut thread = {
                let guard = entry_for_run.lock().await;
                guard.thread.clone()
            };
            let result = pipeline.run(&mut thread, application, tx).await;
            let mut guard = entry_for_run.lock().await;
            guard.thread = thread;
            match result {
                Ok(risk) => {
                    guard.session.status = SessionStatus::Completed;
                    guard.session.completion_percentage = 100;
                    info!(
                        session_id = %guard.session.session_id,
                        applicant_email = %guard.session.collected_data.email.as_deref().map(mask_email).unwrap_or_default(),
                        recommendation = ?risk.recommendation,
                        "assessment pipeline completed"
                    );
                }
                Err(e) => {
                    warn!(
                        session_id = %guard.session.session_id,
                        error = %e,
                        "assessment pipeline failed"
                    );
                    guard.session.mark_error(e.to_string());
                }
            }
            guard.session.touch();
        });

        Ok(TurnOutcome {
            session_id,
            reply,
            pipeline_events: Some(rx),
        })
    }

    /// Read-only lookup for `GET /api/sessions/{id}` — returns `None` for an unknown id
    /// rather than creating one (unlike `handle_turn`, which always creates on miss).
    pub async fn inspect_session(
        &self,
        session_id: &str,
    ) -> Option<crate::model::ConversationSession> {
        let entry = self.store.get(session_id)?;
        Some(entry.lock().await.session.clone())
    }

    pub async fn list_sessions(&self) -> Vec<crate::model::ConversationSession> {
        self.store.list().await
    }

    pub fn delete_session(&self, session_id: &str) -> bool {
        self.store.delete(session_id)
    }

    pub async fn cleanup_sessions(&self, cutoff_hours: i64) -> usize {
        self.store.cleanup(cutoff_hours).await
    }
}
