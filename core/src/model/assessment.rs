//! `SpecialistAssessment`: one structured result per pipeline stage, with
//! fields shared across all four stages plus each stage's specific extension.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fields every specialist assessment carries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssessmentCommon {
    /// Risk/confidence score in `[0, 1]`.
    pub confidence: f64,
    pub reasoning: String,
    #[serde(default)]
    pub positive_factors: Vec<String>,
    #[serde(default)]
    pub negative_factors: Vec<String>,
}

impl AssessmentCommon {
    pub fn validate(&self) -> Result<(), crate::error::AgentError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(crate::error::AgentError::Validation(format!(
                "confidence must be in [0,1], got {}",
                self.confidence
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Complete,
    Incomplete,
    Invalid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingTier {
    FastTrack,
    Standard,
    Enhanced,
}

/// Intake validator output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntakeAssessment {
    #[serde(flatten)]
    pub common: AssessmentCommon,
    pub validation_status: ValidationStatus,
    pub routing_tier: RoutingTier,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditBand {
    VeryGood,
    Good,
    Fair,
    BelowAverage,
}

impl CreditBand {
    /// Indicative score range for this band.
    pub fn score_range(&self) -> (u32, u32) {
        match self {
            CreditBand::VeryGood => (740, 780),
            CreditBand::Good => (680, 740),
            CreditBand::Fair => (620, 680),
            CreditBand::BelowAverage => (580, 620),
        }
    }
}

/// Credit estimator output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreditAssessment {
    #[serde(flatten)]
    pub common: AssessmentCommon,
    pub band: CreditBand,
    pub estimated_score_low: u32,
    pub estimated_score_high: u32,
    /// Explicit estimation-method note — this is
    /// an estimate from income-to-loan ratio and down-payment percent, not a bureau pull.
    pub estimation_method: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DtiCategory {
    Low,
    Moderate,
    Higher,
    High,
}

/// Monthly obligation breakdown computed by the income assessor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlyObligations {
    pub estimated_mortgage_payment: Decimal,
    pub other_debts: Decimal,
    pub property_costs: Decimal,
    pub total: Decimal,
}

/// Income assessor output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncomeAssessment {
    #[serde(flatten)]
    pub common: AssessmentCommon,
    pub estimated_dti_percent: Decimal,
    pub dti_category: DtiCategory,
    pub monthly_obligations: MonthlyObligations,
    /// An explicit note that income is stated and unverified.
    pub stated_income_note: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskRecommendation {
    Approve,
    ConditionalApproval,
    Deny,
    ManualReview,
}

/// Risk decider output — the terminal recommendation of the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(flatten)]
    pub common: AssessmentCommon,
    pub recommendation: RiskRecommendation,
    pub approved_amount: Option<Decimal>,
    pub recommended_rate_percent: Option<Decimal>,
    pub recommended_term_months: Option<u32>,
    #[serde(default)]
    pub conditions: Vec<String>,
    /// A data-limitations note stating the assessment is stated-income-only.
    pub data_limitations: String,
}

/// One specialist's assessment, tagged by stage so `SharedState` and `PipelineEvent` can
/// carry any of the four without a separate field per stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum SpecialistAssessment {
    Intake(IntakeAssessment),
    Credit(CreditAssessment),
    Income(IncomeAssessment),
    Risk(RiskAssessment),
}

impl SpecialistAssessment {
    pub fn common(&self) -> &AssessmentCommon {
        match self {
            SpecialistAssessment::Intake(a) => &a.common,
            SpecialistAssessment::Credit(a) => &a.common,
            SpecialistAssessment::Income(a) => &a.common,
            SpecialistAssessment::Risk(a) => &a.common,
        }
    }

    pub fn as_risk(&self) -> Option<&RiskAssessment> {
        match self {
            SpecialistAssessment::Risk(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_income(&self) -> Option<&IncomeAssessment> {
        match self {
            SpecialistAssessment::Income(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_credit(&self) -> Option<&CreditAssessment> {
        match self {
            SpecialistAssessment::Credit(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_intake(&self) -> Option<&IntakeAssessment> {
        match self {
            SpecialistAssessment::Intake(a) => Some(a),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assessment_common_rejects_out_of_range_confidence() {
        let common = AssessmentCommon {
            confidence: 1.5,
            reasoning: "x".into(),
            positive_factors: vec![],
            negative_factors: vec![],
        };
        assert!(common.validate().is_err());
    }

    #[test]
    fn specialist_assessment_round_trips_with_stage_tag() {
        let a = SpecialistAssessment::Risk(RiskAssessment {
            common: AssessmentCommon {
                confidence: 0.8,
                reasoning: "strong ratios".into(),
                positive_factors: vec!["low DTI".into()],
                negative_factors: vec![],
            },
            recommendation: RiskRecommendation::Approve,
            approved_amount: Some("500000".parse().unwrap()),
            recommended_rate_percent: Some("7".parse().unwrap()),
            recommended_term_months: Some(360),
            conditions: vec![],
            data_limitations: "stated income only".into(),
        });
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["stage"], "risk");
        let back: SpecialistAssessment = serde_json::from_value(json).unwrap();
        assert_eq!(a, back);
    }

    #[test]
    fn credit_band_score_ranges_match_indicative_table() {
        assert_eq!(CreditBand::VeryGood.score_range(), (740, 780));
        assert_eq!(CreditBand::BelowAverage.score_range(), (580, 620));
    }
}
