//! `LoanApplication` / `PartialLoanApplication`: the canonical structured
//! shape the coordinator fills in over four turns, plus the validated, complete form the
//! pipeline consumes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AgentError;

/// Closed set of loan purposes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanPurpose {
    #[default]
    HomePurchase,
    Refinance,
    Investment,
}

pub const DEFAULT_LOAN_TERM_MONTHS: u32 = 360;

fn default_term_months() -> u32 {
    DEFAULT_LOAN_TERM_MONTHS
}

/// The in-progress, partially-collected application the coordinator builds up across the
/// four-step intake script. Every present field has already been validated by
/// the setter that placed it there — there is no separate re-validation pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialLoanApplication {
    pub name: Option<String>,
    pub email: Option<String>,
    pub id_last_4: Option<String>,
    pub loan_amount: Option<Decimal>,
    pub down_payment: Option<Decimal>,
    pub annual_income: Option<Decimal>,
    #[serde(default)]
    pub loan_purpose: LoanPurpose,
    #[serde(default = "default_term_months")]
    pub loan_term_months: u32,
}

impl PartialLoanApplication {
    pub fn new() -> Self {
        Self {
            loan_term_months: DEFAULT_LOAN_TERM_MONTHS,
            ..Default::default()
        }
    }

    /// Step 1: validated loan amount (positive USD).
    pub fn set_loan_amount(&mut self, amount: Decimal) -> Result<(), AgentError> {
        if amount <= Decimal::ZERO {
            return Err(AgentError::Validation(
                "loan amount must be positive".into(),
            ));
        }
        self.loan_amount = Some(amount);
        Ok(())
    }

    /// Step 2: down payment expressed as a percent of the already-collected loan amount
    ///. Requires `loan_amount` to
    /// already be present.
    pub fn set_down_payment_percent(&mut self, percent: Decimal) -> Result<(), AgentError> {
        let loan_amount = self.loan_amount.ok_or_else(|| {
            AgentError::Validation("loan amount must be collected before down payment".into())
        })?;
        if !(Decimal::new(5, 0)..=Decimal::new(25, 0)).contains(&percent) {
            return Err(AgentError::Validation(
                "down payment percent must be between 5 and 25".into(),
            ));
        }
        let down_payment = loan_amount * percent / Decimal::new(100, 0);
        self.set_down_payment(down_payment, loan_amount)
    }

    /// Sets an already-computed down payment amount, validating it against `loan_amount`.
    pub fn set_down_payment(
        &mut self,
        down_payment: Decimal,
        loan_amount: Decimal,
    ) -> Result<(), AgentError> {
        if down_payment < Decimal::ZERO {
            return Err(AgentError::Validation(
                "down payment cannot be negative".into(),
            ));
        }
        if down_payment >= loan_amount {
            return Err(AgentError::Validation(
                "down payment must be less than the loan amount".into(),
            ));
        }
        self.down_payment = Some(down_payment);
        Ok(())
    }

    /// Step 3: validated annual income (positive USD).
    pub fn set_annual_income(&mut self, income: Decimal) -> Result<(), AgentError> {
        if income <= Decimal::ZERO {
            return Err(AgentError::Validation("annual income must be positive".into()));
        }
        self.annual_income = Some(income);
        Ok(())
    }

    /// Step 4: validated identity submission (`{name, email, idLast4}`).
    pub fn set_identity(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        id_last_4: impl Into<String>,
    ) -> Result<(), AgentError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AgentError::Validation("name must not be empty".into()));
        }
        let email = email.into();
        validate_email(&email)?;
        let id_last_4 = id_last_4.into();
        validate_id_last_4(&id_last_4)?;
        self.name = Some(name);
        self.email = Some(email);
        self.id_last_4 = Some(id_last_4);
        Ok(())
    }

    /// Shallow-merges `other` into `self`: a present field in `other` replaces `self`'s value;
    /// an absent field in `other` never overwrites a present value in `self`.
    pub fn merge(&mut self, other: &PartialLoanApplication) {
        if other.name.is_some() {
            self.name = other.name.clone();
        }
        if other.email.is_some() {
            self.email = other.email.clone();
        }
        if other.id_last_4.is_some() {
            self.id_last_4 = other.id_last_4.clone();
        }
        if other.loan_amount.is_some() {
            self.loan_amount = other.loan_amount;
        }
        if other.down_payment.is_some() {
            self.down_payment = other.down_payment;
        }
        if other.annual_income.is_some() {
            self.annual_income = other.annual_income;
        }
        self.loan_purpose = other.loan_purpose;
        if other.loan_term_months != 0 {
            self.loan_term_months = other.loan_term_months;
        }
    }

    /// True iff all six required fields are present.
    pub fn is_complete(&self) -> bool {
        self.name.is_some()
            && self.email.is_some()
            && self.id_last_4.is_some()
            && self.loan_amount.is_some()
            && self.down_payment.is_some()
            && self.annual_income.is_some()
    }

    /// Completion fraction for the current set of collected fields, per the step schedule
    /// (25/50/75/100 after loan_amount/down_payment/annual_income/identity).
    pub fn completion_percentage(&self) -> u8 {
        if self.is_complete() {
            100
        } else if self.annual_income.is_some() {
            75
        } else if self.down_payment.is_some() {
            50
        } else if self.loan_amount.is_some() {
            25
        } else {
            0
        }
    }

    /// Converts to a complete, server-stamped `LoanApplication`. Fails if any required field
    /// is still absent.
    pub fn into_complete(self) -> Result<LoanApplication, AgentError> {
        if !self.is_complete() {
            return Err(AgentError::Validation(
                "application is not complete".into(),
            ));
        }
        Ok(LoanApplication {
            application_id: Uuid::new_v4().to_string(),
            applicant_id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            name: self.name.unwrap(),
            email: self.email.unwrap(),
            id_last_4: self.id_last_4.unwrap(),
            loan_amount: self.loan_amount.unwrap(),
            down_payment: self.down_payment.unwrap(),
            annual_income: self.annual_income.unwrap(),
            loan_purpose: self.loan_purpose,
            loan_term_months: self.loan_term_months,
        })
    }
}

/// A complete, validated loan application. Application id and applicant id are
/// opaque server-generated identifiers; the full government identifier is never stored, only
/// its last four digits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub application_id: String,
    pub applicant_id: String,
    pub created_at: DateTime<Utc>,
    pub name: String,
    pub email: String,
    pub id_last_4: String,
    pub loan_amount: Decimal,
    pub down_payment: Decimal,
    pub annual_income: Decimal,
    pub loan_purpose: LoanPurpose,
    pub loan_term_months: u32,
}

impl LoanApplication {
    /// Down payment expressed as a percentage of the loan amount.
    pub fn down_payment_percent(&self) -> Decimal {
        if self.loan_amount.is_zero() {
            return Decimal::ZERO;
        }
        (self.down_payment / self.loan_amount) * Decimal::new(100, 0)
    }

    /// Annual income divided by the requested loan amount (used by the credit-band and risk
    /// tables, which key off "income / loan amount").
    pub fn income_to_loan_ratio(&self) -> Decimal {
        if self.loan_amount.is_zero() {
            return Decimal::ZERO;
        }
        self.annual_income / self.loan_amount
    }

    /// Requested loan amount divided by annual income — a derived, non-stored quantity.
    pub fn loan_to_income_ratio(&self) -> Decimal {
        if self.annual_income.is_zero() {
            return Decimal::ZERO;
        }
        self.loan_amount / self.annual_income
    }

    /// Estimated monthly principal+interest payment under standard amortization at
    /// `annual_rate_percent` over this application's loan term. Not required to be exact to the cent — agents reason in whole dollars.
    pub fn estimated_monthly_payment(&self, annual_rate_percent: Decimal) -> Decimal {
        estimated_monthly_payment(self.loan_amount, annual_rate_percent, self.loan_term_months)
    }
}

/// Standard fixed-rate amortization formula: `M = P * r(1+r)^n / ((1+r)^n - 1)`.
/// Uses `f64` internally (cent-level internal precision is not required; agents reason in
/// whole dollars) and rounds the result to two decimal places.
pub fn estimated_monthly_payment(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_months: u32,
) -> Decimal {
    use rust_decimal::prelude::ToPrimitive;

    let p = principal.to_f64().unwrap_or(0.0);
    let n = term_months as f64;
    if n <= 0.0 {
        return Decimal::ZERO;
    }
    let r = (annual_rate_percent.to_f64().unwrap_or(0.0) / 100.0) / 12.0;
    let payment = if r.abs() < f64::EPSILON {
        p / n
    } else {
        let growth = (1.0 + r).powf(n);
        p * r * growth / (growth - 1.0)
    };
    Decimal::from_f64_retain(payment)
        .unwrap_or(Decimal::ZERO)
        .round_dp(2)
}

/// `local@domain` with a dot in the domain.
pub fn validate_email(email: &str) -> Result<(), AgentError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AgentError::Validation(format!(
            "invalid email address: {email}"
        )));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') || domain.contains('@') {
        return Err(AgentError::Validation(format!(
            "invalid email address: {email}"
        )));
    }
    Ok(())
}

/// Exactly four ASCII decimal digits.
pub fn validate_id_last_4(id_last_4: &str) -> Result<(), AgentError> {
    if id_last_4.len() == 4 && id_last_4.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AgentError::Validation(format!(
            "id last 4 digits must be exactly 4 ASCII digits, got '{id_last_4}'"
        )))
    }
}
