//! Domain model types shared across the agents, session store, pipeline, and HTTP layer.

pub mod assessment;
pub mod coordinator;
pub mod loan_application;
pub mod pii;
pub mod pipeline_event;
pub mod session;

pub use assessment::{
    AssessmentCommon, CreditAssessment, CreditBand, DtiCategory, IncomeAssessment,
    IntakeAssessment, MonthlyObligations, RiskAssessment, RiskRecommendation, RoutingTier,
    SpecialistAssessment, ValidationStatus,
};
pub use coordinator::{CoordinatorAction, CoordinatorReply, QuickReply, COORDINATOR_AGENT_NAME};
pub use loan_application::{
    estimated_monthly_payment, validate_email, validate_id_last_4, LoanApplication, LoanPurpose,
    PartialLoanApplication, DEFAULT_LOAN_TERM_MONTHS,
};
pub use pii::{mask_email, mask_id_last_4, mask_name};
pub use pipeline_event::{Phase, PipelineEvent};
pub use session::{ConversationSession, SessionStatus};
