//! Coordinator agent: drives the four-step intake script (spec §4.4.1).
//!
//! Which field is being collected, how much a valid answer advances completion, and which
//! quick-replies accompany the next question are all deterministic Rust keyed off the
//! already-collected `PartialLoanApplication` — not model output. This is what makes the
//! `ready_for_processing ⇔ complete` invariant hold no matter what the model says. The model's
//! only job is composing the user-facing message in the coordinator's voice; it never decides
//! completion, quick-replies, or the next-step hint.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{run_structured_agent, AgentSpec, COORDINATOR_TIMEOUT};
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::ConversationThread;
use crate::model::{CoordinatorAction, CoordinatorReply, PartialLoanApplication, QuickReply};

/// Which of the four intake steps the next user message is expected to answer, determined
/// entirely by which fields are already present in the collected data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    LoanAmount,
    DownPaymentPercent,
    AnnualIncome,
    Identity,
}

fn current_step(collected: &PartialLoanApplication) -> Step {
    if collected.annual_income.is_some() {
        Step::Identity
    } else if collected.down_payment.is_some() {
        Step::AnnualIncome
    } else if collected.loan_amount.is_some() {
        Step::DownPaymentPercent
    } else {
        Step::LoanAmount
    }
}

struct StepPrompt {
    expected_shape: &'static str,
    next_step_hint: &'static str,
    quick_replies: Vec<QuickReply>,
}

fn step_prompt(step: Step) -> StepPrompt {
    match step {
        Step::LoanAmount => StepPrompt {
            expected_shape: "a loan amount in US dollars",
            next_step_hint: "collect requested loan amount",
            quick_replies: vec![
                QuickReply::new("$200,000", "200000"),
                QuickReply::new("$300,000", "300000"),
                QuickReply::new("$400,000", "400000"),
                QuickReply::new("$500,000", "500000"),
                QuickReply::new("$750,000", "750000"),
            ],
        },
        Step::DownPaymentPercent => StepPrompt {
            expected_shape: "a down payment percentage between 5 and 25",
            next_step_hint: "collect down payment percent",
            quick_replies: vec![
                QuickReply::new("5%", "5"),
                QuickReply::new("10%", "10"),
                QuickReply::new("15%", "15"),
                QuickReply::new("20%", "20"),
                QuickReply::new("25%", "25"),
            ],
        },
        Step::AnnualIncome => StepPrompt {
            expected_shape: "annual income in US dollars",
            next_step_hint: "collect annual income",
            quick_replies: vec![
                QuickReply::new("$75,000", "75000"),
                QuickReply::new("$125,000", "125000"),
                QuickReply::new("$175,000", "175000"),
                QuickReply::new("$250,000+", "250000"),
            ],
        },
        Step::Identity => StepPrompt {
            expected_shape: "a JSON object {name, email, idLast4}, submitted via the inline form",
            next_step_hint: "collect name, email, and last 4 digits of government id",
            quick_replies: vec![],
        },
    }
}

#[derive(Deserialize)]
struct IdentitySubmission {
    name: String,
    email: String,
    #[serde(rename = "idLast4")]
    id_last_4: String,
}

/// Strips a leading `$` and any thousands separators, then parses as a `Decimal`.
fn parse_money(input: &str) -> Option<Decimal> {
    let cleaned: String = input
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    cleaned.parse().ok()
}

/// Strips a trailing `%` then parses as a `Decimal`.
fn parse_percent(input: &str) -> Option<Decimal> {
    input.trim().trim_end_matches('%').parse().ok()
}

/// Attempts to apply the user's message as a valid answer to `step`, mutating a clone of
/// `collected`. Returns `None` (leaving `collected` untouched) on anything that does not
/// parse or validate — malformed numbers, wrong-length ids, off-topic text.
fn try_advance(step: Step, user_message: &str, collected: &PartialLoanApplication) -> Option<PartialLoanApplication> {
    let mut next = collected.clone();
    match step {
        Step::LoanAmount => {
            let amount = parse_money(user_message)?;
            next.set_loan_amount(amount).ok()?;
        }
        Step::DownPaymentPercent => {
            let percent = parse_percent(user_message)?;
            next.set_down_payment_percent(percent).ok()?;
        }
        Step::AnnualIncome => {
            let income = parse_money(user_message)?;
            next.set_annual_income(income).ok()?;
        }
        Step::Identity => {
            let submission: IdentitySubmission = serde_json::from_str(user_message).ok()?;
            next.set_identity(submission.name, submission.email, submission.id_last_4)
                .ok()?;
        }
    }
    Some(next)
}

#[derive(Deserialize)]
struct CoordinatorTurn {
    message: String,
}

/// Drives the intake script. Owns no state between turns — every call is given the session's
/// current `collected_data` and returns the merged result; the orchestrator is responsible
/// for persisting it.
pub struct CoordinatorAgent {
    spec: AgentSpec,
}

impl CoordinatorAgent {
    pub fn new(persona: impl Into<Arc<str>>) -> Self {
        Self {
            spec: AgentSpec::new("coordinator", persona, 0.3, 300, COORDINATOR_TIMEOUT, &[]),
        }
    }

    pub async fn run(
        &self,
        llm: &dyn LlmClient,
        thread: &mut ConversationThread,
        user_message: &str,
        collected: &PartialLoanApplication,
    ) -> Result<CoordinatorReply, AgentError> {
        let step = current_step(collected);
        let advanced = try_advance(step, user_message, collected);
        let prompt = self.build_prompt(step, user_message, advanced.is_some());

        let turn: CoordinatorTurn =
            run_structured_agent(&self.spec, llm, None, thread, prompt).await?;

        let Some(updated) = advanced else {
            let prompt_for_step = step_prompt(step);
            return CoordinatorReply::new(
                turn.message,
                CoordinatorAction::NeedClarification,
                collected.clone(),
                prompt_for_step.next_step_hint,
                vec![],
            );
        };

        if updated.is_complete() {
            CoordinatorReply::new(
                turn.message,
                CoordinatorAction::ReadyForProcessing,
                updated,
                "run the assessment pipeline",
                vec![],
            )
        } else {
            let next_step = current_step(&updated);
            let prompt_for_step = step_prompt(next_step);
            CoordinatorReply::new(
                turn.message,
                CoordinatorAction::CollectInfo,
                updated,
                prompt_for_step.next_step_hint,
                prompt_for_step.quick_replies,
            )
        }
    }

    fn build_prompt(&self, step: Step, user_message: &str, advanced: bool) -> String {
        let shape = step_prompt(step).expected_shape;
        format!(
            "Current step expects {shape}. The user said: {user_message:?}. \
             This message {} parse as a valid answer for the current step. \
             Respond ONLY with JSON of the form {{\"message\": \"<your reply to the user>\"}}, \
             written in your persona's voice.",
            if advanced { "DID" } else { "did NOT" }
        )
    }
}
