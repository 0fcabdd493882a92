//! Risk decider: the pipeline's final specialist. Folds the completed application plus the
//! income assessment's derived numbers into a terminal recommendation. The recommendation
//! itself is a deterministic table lookup (`classify_recommendation`, mirroring the literal
//! income/annual-payment, down-payment%, DTI table); the LLM supplies narrative reasoning and
//! conditions text, never the decision.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{run_structured_agent, AgentSpec, RISK_TIMEOUT};
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::ConversationThread;
use crate::model::{
    AssessmentCommon, CreditAssessment, IncomeAssessment, LoanApplication, RiskAssessment,
    RiskRecommendation, SpecialistAssessment,
};
use crate::tool_source::ToolInvocationAdapter;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Above this amount every application is routed to manual review regardless of the income
/// and payment picture — the pipeline's numbers are estimates, not a substitute for a human
/// underwriter on a loan this large. Checked first; overrides every other row.
const MANUAL_REVIEW_FLOOR: &str = "1000000";

/// Deterministic recommendation table keyed off income/annual-payment ratio, down-payment
/// percent, and estimated DTI. A combination that clears none of the three named rows falls
/// to manual review rather than being extrapolated toward approve or deny.
fn classify_recommendation(
    loan_amount: Decimal,
    income_to_annual_payment_ratio: Decimal,
    down_payment_percent: Decimal,
    dti_percent: Decimal,
) -> RiskRecommendation {
    if loan_amount > dec(MANUAL_REVIEW_FLOOR) {
        return RiskRecommendation::ManualReview;
    }

    let approve = income_to_annual_payment_ratio >= dec("3")
        && down_payment_percent >= dec("20")
        && dti_percent <= dec("40");
    if approve {
        return RiskRecommendation::Approve;
    }

    let conditional = (dec("2")..=dec("3")).contains(&income_to_annual_payment_ratio)
        && (dec("10")..=dec("20")).contains(&down_payment_percent)
        && (dec("40")..=dec("45")).contains(&dti_percent);
    if conditional {
        return RiskRecommendation::ConditionalApproval;
    }

    let deny = income_to_annual_payment_ratio < dec("2")
        && down_payment_percent < dec("10")
        && dti_percent > dec("50");
    if deny {
        return RiskRecommendation::Deny;
    }

    RiskRecommendation::ManualReview
}

/// Indicative rate offered at approval/conditional-approval time, keyed off credit band —
/// the risk table itself doesn't set a rate, so this borrows the credit estimator's band.
fn recommended_rate(credit_band: crate::model::CreditBand) -> Decimal {
    use crate::model::CreditBand;
    match credit_band {
        CreditBand::VeryGood => dec("6.5"),
        CreditBand::Good => dec("7.0"),
        CreditBand::Fair => dec("7.75"),
        CreditBand::BelowAverage => dec("8.5"),
    }
}

#[derive(Deserialize)]
struct RiskJudgment {
    confidence: f64,
    reasoning: String,
    #[serde(default)]
    positive_factors: Vec<String>,
    #[serde(default)]
    negative_factors: Vec<String>,
    #[serde(default)]
    conditions: Vec<String>,
}

/// Final specialist in the pipeline. Never penalizes a field the applicant wasn't required to
/// supply, and always attaches a data-limitations note since every upstream number is an
/// estimate from stated income, not verified records.
pub struct RiskAgent {
    spec: AgentSpec,
}

impl RiskAgent {
    pub fn new(persona: impl Into<Arc<str>>) -> Self {
        Self {
            spec: AgentSpec::new("risk", persona, 0.2, 500, RISK_TIMEOUT, &["financial_calculations"]),
        }
    }

    pub async fn run(
        &self,
        llm: &dyn LlmClient,
        tools: Option<&ToolInvocationAdapter>,
        thread: &mut ConversationThread,
        application: &LoanApplication,
        credit: &CreditAssessment,
        income: &IncomeAssessment,
    ) -> Result<SpecialistAssessment, AgentError> {
        let down_payment_percent = application.down_payment_percent();
        let annual_payment = income.monthly_obligations.total * Decimal::new(12, 0);
        let income_to_annual_payment_ratio = if annual_payment.is_zero() {
            Decimal::ZERO
        } else {
            application.annual_income / annual_payment
        };

        let recommendation = classify_recommendation(
            application.loan_amount,
            income_to_annual_payment_ratio,
            down_payment_percent,
            income.estimated_dti_percent,
        );

        let (approved_amount, recommended_rate_percent, recommended_term_months) =
            match recommendation {
                RiskRecommendation::Approve | RiskRecommendation::ConditionalApproval => (
                    Some(application.loan_amount),
                    Some(recommended_rate(credit.band)),
                    Some(application.loan_term_months),
                ),
                RiskRecommendation::Deny | RiskRecommendation::ManualReview => (None, None, None),
            };

        let prompt = format!(
            "Final recommendation for this application: {recommendation:?}. Income to \
             annual-payment ratio: {income_to_annual_payment_ratio}. Down payment: \
             {down_payment_percent}%. Estimated DTI: {}%. Loan amount: {}. Credit band: {:?}. \
             You may call financial_calculations to double check any ratio. Respond ONLY with \
             JSON of the form {{\"confidence\": <0..1>, \"reasoning\": \"...\", \
             \"positive_factors\": [...], \"negative_factors\": [...], \"conditions\": [...]}}. \
             Leave conditions empty unless the recommendation is conditional_approval. Never cite \
             missing address or full government id as negative factors — only the six required \
             fields are ever required.",
            income.estimated_dti_percent,
            application.loan_amount,
            credit.band,
        );

        let judgment: RiskJudgment =
            run_structured_agent(&self.spec, llm, tools, thread, prompt).await?;

        let common = AssessmentCommon {
            confidence: judgment.confidence,
            reasoning: judgment.reasoning,
            positive_factors: judgment.positive_factors,
            negative_factors: judgment.negative_factors,
        };
        common.validate()?;

        let conditions = match recommendation {
            RiskRecommendation::ConditionalApproval => judgment.conditions,
            _ => Vec::new(),
        };

        Ok(SpecialistAssessment::Risk(RiskAssessment {
            common,
            recommendation,
            approved_amount,
            recommended_rate_percent,
            recommended_term_months,
            conditions,
            data_limitations: "based on applicant-stated income; no bureau pull or document verification was performed".into(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::model::{CreditBand, DtiCategory, LoanPurpose, MonthlyObligations};
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

    fn common() -> AssessmentCommon {
        AssessmentCommon {
            confidence: 0.5,
            reasoning: "x".into(),
            positive_factors: vec![],
            negative_factors: vec![],
        }
    }

    fn credit(band: CreditBand) -> CreditAssessment {
        let (low, high) = band.score_range();
        CreditAssessment {
            common: common(),
            band,
            estimated_score_low: low,
            estimated_score_high: high,
            estimation_method: "test".into(),
        }
    }

    fn income(dti_category: DtiCategory, dti_percent: &str, total_monthly_obligation: &str) -> IncomeAssessment {
        IncomeAssessment {
            common: common(),
            estimated_dti_percent: dti_percent.parse().unwrap(),
            dti_category,
            monthly_obligations: MonthlyObligations {
                estimated_mortgage_payment: Decimal::ZERO,
                other_debts: Decimal::ZERO,
                property_costs: Decimal::ZERO,
                total: total_monthly_obligation.parse().unwrap(),
            },
            stated_income_note: "test".into(),
        }
    }

    fn judgment_json() -> String {
        r#"{"confidence":0.8,"reasoning":"solid","positive_factors":[],"negative_factors":[],"conditions":[]}"#.to_string()
    }

    #[tokio::test]
    async fn loan_over_one_million_is_always_manual_review() {
        let agent = RiskAgent::new("you are the risk decider");
        let llm = MockLlm::with_content(judgment_json());
        let mut thread = ConversationThread::new();
        let application = application("1500000", "300000", "200000");

        let assessment = agent
            .run(
                &llm,
                None,
                &mut thread,
                &application,
                &credit(CreditBand::VeryGood),
                &income(DtiCategory::Low, "20", "2000"),
            )
            .await
            .unwrap();

        assert_eq!(
            assessment.as_risk().unwrap().recommendation,
            RiskRecommendation::ManualReview
        );
        assert!(assessment.as_risk().unwrap().approved_amount.is_none());
    }

    #[tokio::test]
    async fn strong_ratio_down_payment_and_low_dti_approves() {
        let agent = RiskAgent::new("you are the risk decider");
        let llm = MockLlm::with_content(judgment_json());
        let mut thread = ConversationThread::new();
        // income 200000 / (12 * 5000) annual payment = 3.33x ratio.
        let application = application("400000", "100000", "200000");

        let assessment = agent
            .run(
                &llm,
                None,
                &mut thread,
                &application,
                &credit(CreditBand::VeryGood),
                &income(DtiCategory::Low, "30", "5000"),
            )
            .await
            .unwrap();

        let risk = assessment.as_risk().unwrap();
        assert_eq!(risk.recommendation, RiskRecommendation::Approve);
        assert_eq!(risk.approved_amount, Some("400000".parse().unwrap()));
    }

    #[tokio::test]
    async fn weak_ratio_thin_down_payment_and_high_dti_denies() {
        let agent = RiskAgent::new("you are the risk decider");
        let llm = MockLlm::with_content(judgment_json());
        let mut thread = ConversationThread::new();
        // income 60000 / (12 * 6000) annual payment = 0.83x ratio.
        let application = application("400000", "20000", "60000");

        let assessment = agent
            .run(
                &llm,
                None,
                &mut thread,
                &application,
                &credit(CreditBand::BelowAverage),
                &income(DtiCategory::High, "60", "6000"),
            )
            .await
            .unwrap();

        assert_eq!(
            assessment.as_risk().unwrap().recommendation,
            RiskRecommendation::Deny
        );
    }

    #[tokio::test]
    async fn mid_range_ratio_down_payment_and_dti_yields_conditional_approval() {
        let agent = RiskAgent::new("you are the risk decider");
        let llm = MockLlm::with_content(
            r#"{"confidence":0.6,"reasoning":"borderline","positive_factors":[],"negative_factors":[],"conditions":["verify income with pay stubs"]}"#,
        );
        let mut thread = ConversationThread::new();
        // income 175000 / (12 * 6139.01) annual payment ~= 2.37x ratio.
        let application = application("500000", "100000", "175000");

        let assessment = agent
            .run(
                &llm,
                None,
                &mut thread,
                &application,
                &credit(CreditBand::Good),
                &income(DtiCategory::Higher, "42.10", "6139.01"),
            )
            .await
            .unwrap();

        let risk = assessment.as_risk().unwrap();
        assert_eq!(risk.recommendation, RiskRecommendation::ConditionalApproval);
        assert_eq!(risk.conditions, vec!["verify income with pay stubs".to_string()]);
    }
}
