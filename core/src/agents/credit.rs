//! Credit estimator: the pipeline's second specialist. Since no bureau pull is available
//! (stated-income only, spec non-goal), the credit band is estimated from the ratio between
//! annual income and loan amount, and from the down payment percentage — never an LLM guess.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{run_structured_agent, AgentSpec, CREDIT_TIMEOUT};
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::ConversationThread;
use crate::model::{AssessmentCommon, CreditAssessment, CreditBand, LoanApplication, SpecialistAssessment};
use crate::tool_source::ToolInvocationAdapter;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// `income_to_loan_ratio` and `down_payment_percent` must both clear a band's thresholds to
/// earn it; the first band both clear, scanning best to worst, wins. Ratio thresholds are the
/// literal income/loan-amount multiples from the spec table (4x/3x/2x), not a rescaled
/// fraction — this is a rough indicative band, not a real underwriting ratio.
fn classify_credit_band(income_to_loan_ratio: Decimal, down_payment_percent: Decimal) -> CreditBand {
    if income_to_loan_ratio >= dec("4") && down_payment_percent >= dec("25") {
        CreditBand::VeryGood
    } else if income_to_loan_ratio >= dec("3") && down_payment_percent >= dec("20") {
        CreditBand::Good
    } else if income_to_loan_ratio >= dec("2") && down_payment_percent >= dec("15") {
        CreditBand::Fair
    } else {
        CreditBand::BelowAverage
    }
}

#[derive(Deserialize)]
struct CreditJudgment {
    confidence: f64,
    reasoning: String,
    #[serde(default)]
    positive_factors: Vec<String>,
    #[serde(default)]
    negative_factors: Vec<String>,
}

/// Estimates a credit band from income-to-loan ratio and down payment percent. May call
/// `financial_calculations` to double check the derived ratios, but the band assignment
/// itself is always the deterministic table above.
pub struct CreditAgent {
    spec: AgentSpec,
}

impl CreditAgent {
    pub fn new(persona: impl Into<Arc<str>>) -> Self {
        Self {
            spec: AgentSpec::new(
                "credit",
                persona,
                0.2,
                400,
                CREDIT_TIMEOUT,
                &["financial_calculations"],
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
        let ratio = application.income_to_loan_ratio();
        let down_payment_percent = application.down_payment_percent();
        let band = classify_credit_band(ratio, down_payment_percent);
        let (low, high) = band.score_range();

        let prompt = format!(
            "Estimate creditworthiness for this applicant, no bureau pull available \
             (stated income only). Income-to-loan ratio: {ratio}. Down payment percent: \
             {down_payment_percent}. Assigned band: {band:?} (score range {low}-{high}). \
             You may call financial_calculations to verify the derived ratios. Respond ONLY \
             with JSON of the form {{\"confidence\": <0..1>, \"reasoning\": \"...\", \
             \"positive_factors\": [...], \"negative_factors\": [...]}} explaining why this \
             band fits.",
        );

        let judgment: CreditJudgment =
            run_structured_agent(&self.spec, llm, tools, thread, prompt).await?;

        let common = AssessmentCommon {
            confidence: judgment.confidence,
            reasoning: judgment.reasoning,
            positive_factors: judgment.positive_factors,
            negative_factors: judgment.negative_factors,
        };
        common.validate()?;

        Ok(SpecialistAssessment::Credit(CreditAssessment {
            common,
            band,
            estimated_score_low: low,
            estimated_score_high: high,
            estimation_method: "derived from income-to-loan ratio and down payment percent; no bureau pull".into(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::model::LoanPurpose;
    use chrono::Utc;

    fn application(loan_amount: &str, down_payment: &str, annual_income: &str) -> LoanApplication {
        LoanApplication {
            application_id: "app-1".into(),
            applicant_id: "applicant-1".into(),
            created_at: Utc::now(),
            name: "Tony Stark".into(),
            email: "tony@stark.com".into(),
            id_last_4: "1234".into(),
            loan_amount: loan_amount.parse().unwrap(),
            down_payment: down_payment.parse().unwrap(),
            annual_income: annual_income.parse().unwrap(),
            loan_purpose: LoanPurpose::HomePurchase,
            loan_term_months: 360,
        }
    }

    fn judgment_json() -> String {
        r#"{"confidence":0.85,"reasoning":"strong ratios","positive_factors":["high income-to-loan ratio"],"negative_factors":[]}"#.to_string()
    }

    #[tokio::test]
    async fn strong_ratio_and_down_payment_yields_very_good() {
        let agent = CreditAgent::new("you are the credit estimator");
        let llm = MockLlm::with_content(judgment_json());
        let mut thread = ConversationThread::new();
        // 400k income / 100k loan = 4x ratio, 25% down.
        let application = application("100000", "25000", "400000");

        let assessment = agent.run(&llm, None, &mut thread, &application).await.unwrap();
        let credit = assessment.as_credit().unwrap();
        assert_eq!(credit.band, CreditBand::VeryGood);
        assert_eq!(credit.estimated_score_low, 740);
    }

    #[tokio::test]
    async fn weak_ratio_and_low_down_payment_yields_below_average() {
        let agent = CreditAgent::new("you are the credit estimator");
        let llm = MockLlm::with_content(judgment_json());
        let mut thread = ConversationThread::new();
        // 60k income / 600k loan = 0.1 ratio, 5% down.
        let application = application("600000", "30000", "60000");

        let assessment = agent.run(&llm, None, &mut thread, &application).await.unwrap();
        assert_eq!(assessment.as_credit().unwrap().band, CreditBand::BelowAverage);
    }
}
