//! `PipelineEvent`: what the orchestrator emits during assessment.

use serde::{Deserialize, Serialize};

use super::assessment::SpecialistAssessment;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Validating,
    Credit,
    Income,
    Deciding,
    Complete,
    Error,
}

impl Phase {
    /// Fixed completion fraction for each phase. `Error` carries
    /// whatever fraction had been reached before the failing stage, so it has no fixed value
    /// here — callers pass it explicitly.
    pub fn default_completion_percentage(&self) -> Option<u8> {
        match self {
            Phase::Validating => Some(25),
            Phase::Credit => Some(50),
            Phase::Income => Some(75),
            Phase::Deciding | Phase::Complete => Some(100),
            Phase::Error => None,
        }
    }

    /// The phase order a successful pipeline run emits: validating, credit,
    /// income, deciding, complete.
    pub fn sequence() -> [Phase; 5] {
        [
            Phase::Validating,
            Phase::Credit,
            Phase::Income,
            Phase::Deciding,
            Phase::Complete,
        ]
    }
}

/// One stage-boundary event streamed to the caller during pipeline execution.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub agent_name: String,
    pub message: String,
    pub phase: Phase,
    pub completion_percentage: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment: Option<SpecialistAssessment>,
    /// Free-form signal accompanying the event (e.g. a recommendation label on `complete`,
    /// or the failed tool/stage name on `error`). Modeled as a string rather than a closed
    /// enum since its values are open-ended across stages; see DESIGN.md.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl PipelineEvent {
    pub fn stage(
        agent_name: impl Into<String>,
        message: impl Into<String>,
        phase: Phase,
        assessment: SpecialistAssessment,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            message: message.into(),
            phase,
            completion_percentage: phase.default_completion_percentage().unwrap_or(100),
            assessment: Some(assessment),
            action: None,
        }
    }

    pub fn complete(recommendation_label: impl Into<String>, final_assessment: SpecialistAssessment) -> Self {
        Self {
            agent_name: "risk".to_string(),
            message: "assessment pipeline complete".to_string(),
            phase: Phase::Complete,
            completion_percentage: 100,
            assessment: Some(final_assessment),
            action: Some(recommendation_label.into()),
        }
    }

    pub fn error(
        agent_name: impl Into<String>,
        message: impl Into<String>,
        completion_percentage: u8,
        failed_subject: impl Into<String>,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            message: message.into(),
            phase: Phase::Error,
            completion_percentage,
            assessment: None,
            action: Some(failed_subject.into()),
        }
    }
}
