//! Intake validator: the pipeline's first specialist. Confirms the completed application is
//! sound and assigns the routing tier the rest of the pipeline (and the final recommendation)
//! is framed against.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use super::{run_structured_agent, AgentSpec, INTAKE_TIMEOUT};
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::ConversationThread;
use crate::model::{AssessmentCommon, IntakeAssessment, LoanApplication, RoutingTier, SpecialistAssessment, ValidationStatus};
use crate::tool_source::ToolInvocationAdapter;

/// Income above this routes fast-track; at or below it but at/above the standard floor
/// routes standard; anything lower routes enhanced review.
const FAST_TRACK_FLOOR: &str = "150000";
const STANDARD_FLOOR: &str = "75000";

fn routing_tier(annual_income: Decimal) -> RoutingTier {
    let fast_track_floor: Decimal = FAST_TRACK_FLOOR.parse().unwrap();
    let standard_floor: Decimal = STANDARD_FLOOR.parse().unwrap();
    if annual_income > fast_track_floor {
        RoutingTier::FastTrack
    } else if annual_income >= standard_floor {
        RoutingTier::Standard
    } else {
        RoutingTier::Enhanced
    }
}

#[derive(Deserialize)]
struct IntakeJudgment {
    confidence: f64,
    reasoning: String,
    #[serde(default)]
    positive_factors: Vec<String>,
    #[serde(default)]
    negative_factors: Vec<String>,
}

/// Validates the completed application and assigns its routing tier. `application_verification`
/// is the only tool this agent is allowed to reach, and calling it is optional — a model that
/// is confident in the stated identity fields may skip it.
pub struct IntakeAgent {
    spec: AgentSpec,
}

impl IntakeAgent {
    pub fn new(persona: impl Into<Arc<str>>) -> Self {
        Self {
            spec: AgentSpec::new(
                "intake",
                persona,
                0.2,
                400,
                INTAKE_TIMEOUT,
                &["application_verification"],
            ),
        }
    }

    pub async fn run(
        &self,
        llm: &dyn LlmClient,
        tools: Option<&ToolInvocationAdapter>,
        thread: &mut ConversationThread,
        application: &LoanApplication,
    ) -> Result<SpecialistAssessment, AgentError> {
        let tier = routing_tier(application.annual_income);

        let prompt = format!(
            "Review this completed loan application for soundness and plausibility: {}. \
             You may call application_verification to cross-check the applicant's stated identity, \
             but it is optional. Respond ONLY with JSON of the form \
             {{\"confidence\": <0..1>, \"reasoning\": \"...\", \"positive_factors\": [...], \"negative_factors\": [...]}}.",
            json!({
                "name": application.name,
                "email": application.email,
                "id_last_4": application.id_last_4,
                "loan_amount": application.loan_amount,
                "down_payment": application.down_payment,
                "annual_income": application.annual_income,
                "loan_purpose": application.loan_purpose,
                "loan_term_months": application.loan_term_months,
            })
        );

        let judgment: IntakeJudgment =
            run_structured_agent(&self.spec, llm, tools, thread, prompt).await?;

        let common = AssessmentCommon {
            confidence: judgment.confidence,
            reasoning: judgment.reasoning,
            positive_factors: judgment.positive_factors,
            negative_factors: judgment.negative_factors,
        };
        common.validate()?;

        Ok(SpecialistAssessment::Intake(IntakeAssessment {
            common,
            validation_status: ValidationStatus::Complete,
            routing_tier: tier,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::model::LoanPurpose;
    use chrono::Utc;

    fn sample_application(annual_income: &str) -> LoanApplication {
        LoanApplication {
            application_id: "app-1".into(),
            applicant_id: "applicant-1".into(),
            created_at: Utc::now(),
            name: "Tony Stark".into(),
            email: "tony@stark.com".into(),
            id_last_4: "1234".into(),
            loan_amount: "500000".parse().unwrap(),
            down_payment: "100000".parse().unwrap(),
            annual_income: annual_income.parse().unwrap(),
            loan_purpose: LoanPurpose::HomePurchase,
            loan_term_months: 360,
        }
    }

    fn judgment_json() -> String {
        r#"{"confidence":0.9,"reasoning":"looks clean","positive_factors":["income verified"],"negative_factors":[]}"#.to_string()
    }

    #[tokio::test]
    async fn high_income_routes_fast_track() {
        let agent = IntakeAgent::new("you are the intake validator");
        let llm = MockLlm::with_content(judgment_json());
        let mut thread = ConversationThread::new();
        let application = sample_application("200000");

        let assessment = agent
            .run(&llm, None, &mut thread, &application)
            .await
            .unwrap();

        let intake = assessment.as_intake().unwrap();
        assert_eq!(intake.routing_tier, RoutingTier::FastTrack);
        assert_eq!(intake.validation_status, ValidationStatus::Complete);
    }

    #[tokio::test]
    async fn mid_income_routes_standard() {
        let agent = IntakeAgent::new("you are the intake validator");
        let llm = MockLlm::with_content(judgment_json());
        let mut thread = ConversationThread::new();
        let application = sample_application("100000");

        let assessment = agent
            .run(&llm, None, &mut thread, &application)
            .await
            .unwrap();

        assert_eq!(assessment.as_intake().unwrap().routing_tier, RoutingTier::Standard);
    }

    #[tokio::test]
    async fn low_income_routes_enhanced() {
        let agent = IntakeAgent::new("you are the intake validator");
        let llm = MockLlm::with_content(judgment_json());
        let mut thread = ConversationThread::new();
        let application = sample_application("50000");

        let assessment = agent
            .run(&llm, None, &mut thread, &application)
            .await
            .unwrap();

        assert_eq!(assessment.as_intake().unwrap().routing_tier, RoutingTier::Enhanced);
    }
}
