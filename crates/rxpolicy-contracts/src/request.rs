//! Evaluation requests.
//!
//! The evaluator assumes well-typed input.  `validate()` is the shape check
//! the request layer runs before handing a request over.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{RxPolicyError, RxPolicyResult};

/// Input to the trial-eligibility evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRequest {
    pub drug_name: String,
    pub diagnosis: String,
    pub patient_age: u32,
    #[serde(default)]
    pub prior_treatments: Vec<String>,
}

/// Input to the reimbursement evaluator.
///
/// `insurance_type` stays a raw string so that unknown schemes reach the
/// evaluator and come back as an `INSURANCE_TYPE_UNKNOWN` business outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementRequest {
    pub drug_name: String,
    pub diagnosis: String,
    pub insurance_type: String,
    pub claim_amount: Decimal,
}

/// Input to the combined report generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub drug_name: String,
    pub diagnosis: String,
    pub patient_age: u32,
    pub insurance_type: String,
    pub claim_amount: Decimal,
    #[serde(default)]
    pub prior_treatments: Vec<String>,
}

impl ReportRequest {
    /// The trial half of this report request.
    pub fn trial(&self) -> TrialRequest {
        TrialRequest {
            drug_name: self.drug_name.clone(),
            diagnosis: self.diagnosis.clone(),
            patient_age: self.patient_age,
            prior_treatments: self.prior_treatments.clone(),
        }
    }

    /// The reimbursement half of this report request.
    pub fn reimbursement(&self) -> ReimbursementRequest {
        ReimbursementRequest {
            drug_name: self.drug_name.clone(),
            diagnosis: self.diagnosis.clone(),
            insurance_type: self.insurance_type.clone(),
            claim_amount: self.claim_amount,
        }
    }

    pub fn validate(&self) -> RxPolicyResult<()> {
        require_non_empty("drug_name", &self.drug_name)?;
        require_non_empty("diagnosis", &self.diagnosis)?;
        require_non_negative("claim_amount", self.claim_amount)
    }
}

impl TrialRequest {
    pub fn validate(&self) -> RxPolicyResult<()> {
        require_non_empty("drug_name", &self.drug_name)?;
        require_non_empty("diagnosis", &self.diagnosis)
    }
}

impl ReimbursementRequest {
    pub fn validate(&self) -> RxPolicyResult<()> {
        require_non_empty("drug_name", &self.drug_name)?;
        require_non_empty("diagnosis", &self.diagnosis)?;
        require_non_negative("claim_amount", self.claim_amount)
    }
}

fn require_non_empty(field: &str, value: &str) -> RxPolicyResult<()> {
    if value.trim().is_empty() {
        return Err(RxPolicyError::InvalidRequest {
            reason: format!("field '{}' must not be empty", field),
        });
    }
    Ok(())
}

fn require_non_negative(field: &str, value: Decimal) -> RxPolicyResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(RxPolicyError::InvalidRequest {
            reason: format!("field '{}' must be non-negative, got {}", field, value),
        });
    }
    Ok(())
}
