//! `CoordinatorReply`: what the coordinator agent emits per turn.

use serde::{Deserialize, Serialize};

use super::loan_application::PartialLoanApplication;
use crate::error::AgentError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorAction {
    CollectInfo,
    ReadyForProcessing,
    NeedClarification,
    /// Wire-level-only variants: a turn that both completes collection and runs
    /// the pipeline to exhaustion reports `completed`; an agent/tool failure reports `error`.
    /// The coordinator agent itself only ever produces the three variants above — these two
    /// are assigned by the orchestrator after the coordinator has returned.
    Completed,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl QuickReply {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// What the coordinator agent emits for one turn.
///
/// Construction enforces the invariant `ready_for_processing ⇔ completion == 100 &&
/// collected_data.is_complete()`. There is no way to build an inconsistent `CoordinatorReply`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorReply {
    pub agent_name: String,
    pub message: String,
    pub action: CoordinatorAction,
    pub collected_data: PartialLoanApplication,
    pub completion_percentage: u8,
    #[serde(default)]
    pub quick_replies: Vec<QuickReply>,
    pub next_step: String,
}

/// Fixed persona label every `CoordinatorReply` carries.
pub const COORDINATOR_AGENT_NAME: &str = "coordinator";

impl CoordinatorReply {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        message: impl Into<String>,
        action: CoordinatorAction,
        collected_data: PartialLoanApplication,
        next_step: impl Into<String>,
        quick_replies: Vec<QuickReply>,
    ) -> Result<Self, AgentError> {
        let completion_percentage = collected_data.completion_percentage();
        match action {
            CoordinatorAction::ReadyForProcessing => {
                if completion_percentage != 100 || !collected_data.is_complete() {
                    return Err(AgentError::Validation(
                        "ready_for_processing requires a complete application at 100%".into(),
                    ));
                }
            }
            CoordinatorAction::CollectInfo | CoordinatorAction::NeedClarification => {
                if completion_percentage == 100 {
                    return Err(AgentError::Validation(
                        "collect_info/need_clarification must not report 100% completion"
                            .into(),
                    ));
                }
            }
            CoordinatorAction::Completed | CoordinatorAction::Error => {
                return Err(AgentError::Validation(
                    "completed/error are orchestrator-assigned, not agent-constructed".into(),
                ));
            }
        }
        Ok(Self {
            agent_name: COORDINATOR_AGENT_NAME.to_string(),
            message: message.into(),
            action,
            collected_data,
            completion_percentage,
            quick_replies,
            next_step: next_step.into(),
        })
    }

    /// Re-tags a reply as the wire-level `completed` action once the pipeline that followed
    /// it has finished successfully.
    pub fn into_completed(mut self) -> Self {
        self.action = CoordinatorAction::Completed;
        self
    }

    /// Re-tags a reply as the wire-level `error` action.
    pub fn error(detail: impl Into<String>, collected_data: PartialLoanApplication) -> Self {
        let completion_percentage = collected_data.completion_percentage();
        Self {
            agent_name: COORDINATOR_AGENT_NAME.to_string(),
            message: detail.into(),
            action: CoordinatorAction::Error,
            collected_data,
            completion_percentage,
            quick_replies: vec![],
            next_step: String::new(),
        }
    }
}
