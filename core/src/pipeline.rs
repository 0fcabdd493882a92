//! Sequential specialist pipeline (spec §4.5.3): runs intake → credit → income → risk in a
//! fixed order, threading a `SharedState` through them and emitting one `PipelineEvent` per
//! stage boundary through a bounded channel. Tool connections are scoped to a single stage's
//! `run` and closed the moment that stage returns, success or failure, by dropping the
//! `ToolInvocationAdapter` at the end of each stage's scope.

use std::sync::Arc;

use tokio::sync::mpsc;

use intake_config::{PersonaSet, ToolEndpoints};

use crate::agents::{CreditAgent, IncomeAgent, IntakeAgent, RiskAgent};
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::ConversationThread;
use crate::model::{
    CreditAssessment, IncomeAssessment, IntakeAssessment, LoanApplication, Phase, PipelineEvent,
    RiskAssessment, SpecialistAssessment,
};
use crate::tool_source::ToolInvocationAdapter;

/// Per-pipeline-invocation record: the complete application plus whichever stage assessments
/// have completed so far. Writes are append-only within one run; reads must tolerate a
/// missing stage (a fresh pipeline has none yet). Does not outlive the run.
#[derive(Clone)]
pub struct SharedState {
    pub application: LoanApplication,
    pub intake: Option<IntakeAssessment>,
    pub credit: Option<CreditAssessment>,
    pub income: Option<IncomeAssessment>,
    pub risk: Option<RiskAssessment>,
    pub current_phase: Phase,
}

impl SharedState {
    pub fn new(application: LoanApplication) -> Self {
        Self {
            application,
            intake: None,
            credit: None,
            income: None,
            risk: None,
            current_phase: Phase::Validating,
        }
    }
}

/// Owns the four specialist agents for one pipeline run. Built fresh per invocation (spec
/// §4.5.3 step 2: "build a fresh ordered list of four specialist agents"). Holds its
/// dependencies by `Arc` rather than by reference so a run can be handed to `tokio::spawn`
/// and stream events back to the orchestrator while the HTTP handler moves on.
pub struct Pipeline {
    llm: Arc<dyn LlmClient>,
    endpoints: Arc<ToolEndpoints>,
    intake_agent: IntakeAgent,
    credit_agent: CreditAgent,
    income_agent: IncomeAgent,
    risk_agent: RiskAgent,
}

impl Pipeline {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        endpoints: Arc<ToolEndpoints>,
        personas: &PersonaSet,
    ) -> Result<Self, AgentError> {
        let persona_of = |key: &str| -> Result<String, AgentError> {
            personas
                .get(key)
                .map(str::to_string)
                .map_err(|e| AgentError::MissingPersona(e.to_string()))
        };
        Ok(Self {
            llm,
            endpoints,
            intake_agent: IntakeAgent::new(persona_of("intake")?),
            credit_agent: CreditAgent::new(persona_of("credit")?),
            income_agent: IncomeAgent::new(persona_of("income")?),
            risk_agent: RiskAgent::new(persona_of("risk")?),
        })
    }

    /// Opens a fresh tool adapter scoped to one stage's tool set. The adapter (and every
    /// connection it holds) is dropped at the end of the caller's scope — in particular,
    /// before the next stage opens its own.
    async fn open_tools(&self, tool_names: &[&str]) -> Result<ToolInvocationAdapter, AgentError> {
        ToolInvocationAdapter::open(tool_names, &self.endpoints).await
    }

    /// Runs all four stages in order, sending one `PipelineEvent` per stage boundary to `tx`.
    /// Stops at the first error (tool-open failure, tool-call failure, or schema failure),
    /// sending an `error`-phase event naming the failed stage/tool. Also stops, without
    /// sending a final event, the moment `tx` is closed (the caller cancelled) — checked via
    /// the `Result` returned by `send`, at the next stage boundary only.
    pub async fn run(
        &self,
        thread: &mut ConversationThread,
        application: LoanApplication,
        tx: mpsc::Sender<PipelineEvent>,
    ) -> Result<RiskAssessment, AgentError> {
        let mut state = SharedState::new(application);

        let intake = match self.run_intake(thread, &state).await {
            Ok(a) => a,
            Err(e) => return self.fail(tx, "intake", 0, e).await,
        };
        if tx
            .send(PipelineEvent::stage(
                "intake",
                "intake validation complete",
                Phase::Validating,
                SpecialistAssessment::Intake(intake.clone()),
            ))
            .await
            .is_err()
        {
            return Err(AgentError::Cancelled);
        }
        state.intake = Some(intake);
        state.current_phase = Phase::Credit;

        let credit = match self.run_credit(thread, &state).await {
            Ok(a) => a,
            Err(e) => return self.fail(tx, "credit", 25, e).await,
        };
        if tx
            .send(PipelineEvent::stage(
                "credit",
                "credit estimation complete",
                Phase::Credit,
                SpecialistAssessment::Credit(credit.clone()),
            ))
            .await
            .is_err()
        {
            return Err(AgentError::Cancelled);
        }
        state.credit = Some(credit);
        state.current_phase = Phase::Income;

        let income = match self.run_income(thread, &state).await {
            Ok(a) => a,
            Err(e) => return self.fail(tx, "income", 50, e).await,
        };
        if tx
            .send(PipelineEvent::stage(
                "income",
                "income assessment complete",
                Phase::Income,
                SpecialistAssessment::Income(income.clone()),
            ))
            .await
            .is_err()
        {
            return Err(AgentError::Cancelled);
        }
        state.income = Some(income);
        state.current_phase = Phase::Deciding;

        let risk = match self.run_risk(thread, &state).await {
            Ok(a) => a,
            Err(e) => return self.fail(tx, "risk", 75, e).await,
        };
        state.current_phase = Phase::Complete;

        let _ = tx
            .send(PipelineEvent::complete(
                format!("{:?}", risk.recommendation),
                SpecialistAssessment::Risk(risk.clone()),
            ))
            .await;

        Ok(risk)
    }

    async fn fail(
        &self,
        tx: mpsc::Sender<PipelineEvent>,
        stage: &str,
        completion_percentage: u8,
        error: AgentError,
    ) -> Result<RiskAssessment, AgentError> {
        let subject = error.subject().unwrap_or(stage).to_string();
        let _ = tx
            .send(PipelineEvent::error(
                stage,
                error.to_string(),
                completion_percentage,
                subject,
            ))
            .await;
        Err(error)
    }

    async fn run_intake(
        &self,
        thread: &mut ConversationThread,
        state: &SharedState,
    ) -> Result<IntakeAssessment, AgentError> {
        let adapter = self.open_tools(&["application_verification"]).await?;
        let assessment = self
            .intake_agent
            .run(self.llm.as_ref(), Some(&adapter), thread, &state.application)
            .await?;
        Ok(assessment.as_intake().expect("intake agent returns an intake assessment").clone())
    }

    async fn run_credit(
        &self,
        thread: &mut ConversationThread,
        state: &SharedState,
    ) -> Result<CreditAssessment, AgentError> {
        let adapter = self.open_tools(&["financial_calculations"]).await?;
        let assessment = self
            .credit_agent
            .run(self.llm.as_ref(), Some(&adapter), thread, &state.application)
            .await?;
        Ok(assessment.as_credit().expect("credit agent returns a credit assessment").clone())
    }

    async fn run_income(
        &self,
        thread: &mut ConversationThread,
        state: &SharedState,
    ) -> Result<IncomeAssessment, AgentError> {
        let adapter = self.open_tools(&["financial_calculations"]).await?;
        let assessment = self
            .income_agent
            .run(self.llm.as_ref(), Some(&adapter), thread, &state.application)
            .await?;
        Ok(assessment.as_income().expect("income agent returns an income assessment").clone())
    }

    async fn run_risk(
        &self,
        thread: &mut ConversationThread,
        state: &SharedState,
    ) -> Result<RiskAssessment, AgentError> {
        let adapter = self.open_tools(&["financial_calculations"]).await?;
        let credit = state.credit.as_ref().expect("credit stage already ran");
        let income = state.income.as_ref().expect("income stage already ran");
        let assessment = self
            .risk_agent
            .run(self.llm.as_ref(), Some(&adapter), thread, &state.application, credit, income)
            .await?;
        Ok(assessment.as_risk().expect("risk agent returns a risk assessment").clone())
    }
}
