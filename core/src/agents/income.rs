//! Income assessor: the pipeline's third specialist. Computes a debt-to-income estimate from
//! the application's numbers; the LLM only narrates why that estimate is or isn't comfortable.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::{run_structured_agent, AgentSpec, INCOME_TIMEOUT};
use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::message::ConversationThread;
use crate::model::{
    estimated_monthly_payment, AssessmentCommon, DtiCategory, IncomeAssessment, LoanApplication,
    MonthlyObligations, SpecialistAssessment,
};
use crate::tool_source::ToolInvocationAdapter;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

/// Indicative rate used for the estimated monthly payment — the pipeline never asks the
/// applicant for a quoted rate, so every estimate uses this flat figure.
const ASSUMED_ANNUAL_RATE_PERCENT: &str = "7";
/// Other recurring debts are assumed to be this fraction of gross monthly income, absent any
/// stated figure.
const ASSUMED_OTHER_DEBT_FRACTION: &str = "0.15";
/// Monthly property costs (tax/insurance) are assumed to be this fraction of the loan amount.
const ASSUMED_PROPERTY_COST_FRACTION: &str = "0.00125";

fn monthly_obligations(application: &LoanApplication) -> MonthlyObligations {
    let estimated_mortgage_payment = estimated_monthly_payment(
        application.loan_amount,
        dec(ASSUMED_ANNUAL_RATE_PERCENT),
        application.loan_term_months,
    );
    let monthly_income = application.annual_income / Decimal::new(12, 0);
    let other_debts = (monthly_income * dec(ASSUMED_OTHER_DEBT_FRACTION)).round_dp(2);
    let property_costs = (application.loan_amount * dec(ASSUMED_PROPERTY_COST_FRACTION)).round_dp(2);
    let total = estimated_mortgage_payment + other_debts + property_costs;
    MonthlyObligations {
        estimated_mortgage_payment,
        other_debts,
        property_costs,
        total,
    }
}

fn classify_dti(dti_percent: Decimal) -> DtiCategory {
    if dti_percent <= dec("30") {
        DtiCategory::Low
    } else if dti_percent <= dec("40") {
        DtiCategory::Moderate
    } else if dti_percent <= dec("50") {
        DtiCategory::Higher
    } else {
        DtiCategory::High
    }
}

#[derive(Deserialize)]
struct IncomeJudgment {
    confidence: f64,
    reasoning: String,
    #[serde(default)]
    positive_factors: Vec<String>,
    #[serde(default)]
    negative_factors: Vec<String>,
}

/// Computes estimated monthly obligations and a debt-to-income category from the application
/// alone; the LLM narrates the reasoning and surfaces factors, never the numbers.
pub struct IncomeAgent {
    spec: AgentSpec,
}

impl IncomeAgent {
    pub fn new(persona: impl Into<Arc<str>>) -> Self {
        Self {
            spec: AgentSpec::new(
                "income",
                persona,
                0.2,
                400,
                INCOME_TIMEOUT,
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
        let obligations = monthly_obligations(application);
        let monthly_income = application.annual_income / Decimal::new(12, 0);
        let dti_percent = if monthly_income.is_zero() {
            Decimal::ZERO
        } else {
            (obligations.total / monthly_income * Decimal::new(100, 0)).round_dp(2)
        };
        let category = classify_dti(dti_percent);

        let prompt = format!(
            "Estimated monthly mortgage payment: {}. Other debts (assumed 15% of gross monthly \
             income): {}. Property costs (assumed 0.125% of loan amount per month): {}. Total \
             monthly obligations: {}. Gross monthly income: {monthly_income}. Estimated DTI: \
             {dti_percent}% ({category:?}). You may call financial_calculations to verify these \
             figures. Respond ONLY with JSON of the form {{\"confidence\": <0..1>, \"reasoning\": \
             \"...\", \"positive_factors\": [...], \"negative_factors\": [...]}} explaining what \
             this DTI means for the applicant.",
            obligations.estimated_mortgage_payment,
            obligations.other_debts,
            obligations.property_costs,
            obligations.total,
        );

        let judgment: IncomeJudgment =
            run_structured_agent(&self.spec, llm, tools, thread, prompt).await?;

        let common = AssessmentCommon {
            confidence: judgment.confidence,
            reasoning: judgment.reasoning,
            positive_factors: judgment.positive_factors,
            negative_factors: judgment.negative_factors,
        };
        common.validate()?;

        Ok(SpecialistAssessment::Income(IncomeAssessment {
            common,
            estimated_dti_percent: dti_percent,
            dti_category: category,
            monthly_obligations: obligations,
            stated_income_note: "annual income is applicant-stated and not independently verified".into(),
        }))
    }
}
