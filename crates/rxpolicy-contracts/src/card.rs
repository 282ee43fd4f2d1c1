//! Outcome cards and the transport envelope.
//!
//! The evaluator produces a [`PolicyOutcome`]: either an evaluated card or a
//! terminal [`NoPolicyFound`].  The request layer turns either into a
//! [`CardEnvelope`], which serializes as `{"card_type": …, "card": {…}}`.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::reason::ReasonCode;

/// Business status of one evaluation.
///
/// Trial evaluation only ever yields `Approved` or `NotApproved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationStatus {
    Approved,
    Conditional,
    NotApproved,
}

impl EvaluationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationStatus::Approved => "APPROVED",
            EvaluationStatus::Conditional => "CONDITIONAL",
            EvaluationStatus::NotApproved => "NOT_APPROVED",
        }
    }
}

impl fmt::Display for EvaluationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a trial-eligibility evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialEnablementCard {
    pub drug_name: String,
    pub status: EvaluationStatus,
    pub reason_codes: Vec<ReasonCode>,
    pub required_documents: Vec<String>,
    #[serde(default)]
    pub exclusion_flags: Vec<String>,
}

/// Result of a reimbursement evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementStatusCard {
    pub drug_name: String,
    pub status: EvaluationStatus,
    pub coverage_percent: Decimal,
    /// Never exceeds the scheme's `max_amount`.
    pub approved_amount: Decimal,
    pub reason_codes: Vec<ReasonCode>,
}

/// Trial and reimbursement results for one drug, side by side.
///
/// The two halves are evaluated independently; nothing in one influences
/// the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyReportCard {
    pub trial_eligibility: TrialEnablementCard,
    pub reimbursement: ReimbursementStatusCard,
    pub generated_at: DateTime<Utc>,
    pub summary: String,
}

/// Which rule table a no-policy outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyScope {
    Trial,
    Reimbursement,
    /// Neither table has the drug.
    Any,
}

/// Terminal outcome for a drug absent from the relevant rule table.
///
/// Distinct from `NOT_APPROVED`: no rule ran at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoPolicyFound {
    pub drug_name: String,
    pub scope: PolicyScope,
}

impl NoPolicyFound {
    pub fn new(drug_name: impl Into<String>, scope: PolicyScope) -> Self {
        Self { drug_name: drug_name.into(), scope }
    }

    /// Caller-facing explanation, echoing the drug name.
    pub fn reason(&self) -> String {
        match self.scope {
            PolicyScope::Trial => format!("No trial policy found for '{}'.", self.drug_name),
            PolicyScope::Reimbursement => {
                format!("No reimbursement policy found for '{}'.", self.drug_name)
            }
            PolicyScope::Any => format!("No policies found for '{}'.", self.drug_name),
        }
    }
}

/// What the evaluator hands back for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyOutcome<T> {
    /// Rules ran to completion; the card carries the business status.
    Evaluated(T),
    /// No rule exists for the drug.
    NoPolicy(NoPolicyFound),
}

impl<T> PolicyOutcome<T> {
    /// The evaluated card, or `None` for a no-policy outcome.
    pub fn evaluated(self) -> Option<T> {
        match self {
            PolicyOutcome::Evaluated(card) => Some(card),
            PolicyOutcome::NoPolicy(_) => None,
        }
    }

    pub fn is_no_policy(&self) -> bool {
        matches!(self, PolicyOutcome::NoPolicy(_))
    }
}

/// Refusal returned in place of a card when a request cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefusalCard {
    pub blocked: bool,
    pub reason: String,
    pub violation_type: String,
}

impl From<NoPolicyFound> for RefusalCard {
    fn from(missing: NoPolicyFound) -> Self {
        RefusalCard {
            blocked: true,
            reason: missing.reason(),
            violation_type: "no_policy".to_string(),
        }
    }
}

/// Transport envelope around every card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "card_type", content = "card", rename_all = "snake_case")]
pub enum CardEnvelope {
    TrialEnablementCard(TrialEnablementCard),
    ReimbursementStatusCard(ReimbursementStatusCard),
    PolicyReportCard(PolicyReportCard),
    RefusalCard(RefusalCard),
}

impl CardEnvelope {
    /// The `card_type` tag this envelope serializes with.
    pub fn card_type(&self) -> &'static str {
        match self {
            CardEnvelope::TrialEnablementCard(_) => "trial_enablement_card",
            CardEnvelope::ReimbursementStatusCard(_) => "reimbursement_status_card",
            CardEnvelope::PolicyReportCard(_) => "policy_report_card",
            CardEnvelope::RefusalCard(_) => "refusal_card",
        }
    }
}

impl From<PolicyOutcome<TrialEnablementCard>> for CardEnvelope {
    fn from(outcome: PolicyOutcome<TrialEnablementCard>) -> Self {
        match outcome {
            PolicyOutcome::Evaluated(card) => CardEnvelope::TrialEnablementCard(card),
            PolicyOutcome::NoPolicy(missing) => CardEnvelope::RefusalCard(missing.into()),
        }
    }
}

impl From<PolicyOutcome<ReimbursementStatusCard>> for CardEnvelope {
    fn from(outcome: PolicyOutcome<ReimbursementStatusCard>) -> Self {
        match outcome {
            PolicyOutcome::Evaluated(card) => CardEnvelope::ReimbursementStatusCard(card),
            PolicyOutcome::NoPolicy(missing) => CardEnvelope::RefusalCard(missing.into()),
        }
    }
}

impl From<PolicyOutcome<PolicyReportCard>> for CardEnvelope {
    fn from(outcome: PolicyOutcome<PolicyReportCard>) -> Self {
        match outcome {
            PolicyOutcome::Evaluated(card) => CardEnvelope::PolicyReportCard(card),
            PolicyOutcome::NoPolicy(missing) => CardEnvelope::RefusalCard(missing.into()),
        }
    }
}
