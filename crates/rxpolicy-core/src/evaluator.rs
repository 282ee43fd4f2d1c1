//! The policy evaluator: trial eligibility, reimbursement, combined report.
//!
//! Every evaluation is a pure function of one policy record and one request.
//! The order in which reason codes are appended is part of the contract.
//!
//! Trial algorithm:
//!
//! 1. `patient_age < min_age` → `AGE_BELOW_MIN:<min_age>`
//! 2. `patient_age > max_age` → `AGE_ABOVE_MAX:<max_age>`
//! 3. diagnosis not eligible (exact match) → `DIAGNOSIS_NOT_ELIGIBLE:<diagnosis>`
//! 4. required prior treatments missing → `MISSING_PRIOR_TREATMENT:<sorted,joined>`
//! 5. each exclusion criterion found (case-insensitive substring) in the
//!    diagnosis or any prior treatment → flag + `EXCLUSION_CRITERIA:<entry>`
//! 6. any reason code → `NOT_APPROVED`, else `APPROVED`
//!
//! Reimbursement algorithm:
//!
//! 1. diagnosis not covered (exact match) → `DIAGNOSIS_NOT_COVERED:<diagnosis>`
//! 2. unknown insurance type → `INSURANCE_TYPE_UNKNOWN:<type>`, 0% / max 0
//! 3. `approved = min(claim × (pct / 100), max)`
//! 4. `pct == 0` → `NO_COVERAGE`
//! 5. `claim > max` with `max > 0` → `CLAIM_EXCEEDS_MAX:<max>`
//! 6. zero coverage or uncovered diagnosis → `NOT_APPROVED`; other reason
//!    codes → `CONDITIONAL`; none → `APPROVED`

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use rxpolicy_contracts::{
    card::{
        EvaluationStatus, NoPolicyFound, PolicyOutcome, PolicyReportCard, PolicyScope,
        ReimbursementStatusCard, TrialEnablementCard,
    },
    policy::{InsuranceType, ReimbursementPolicy, TrialPolicy},
    reason::ReasonCode,
    request::{ReimbursementRequest, ReportRequest, TrialRequest},
};

use crate::traits::RuleStore;

/// Evaluates requests against the records held by a [`RuleStore`].
///
/// Holds no state of its own besides the store.  Two calls with the same
/// request against the same store produce identical cards.
#[derive(Debug, Clone)]
pub struct PolicyEvaluator<S> {
    store: S,
}

impl<S: RuleStore> PolicyEvaluator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Evaluate trial eligibility for `req.drug_name`.
    ///
    /// Returns `PolicyOutcome::NoPolicy` when the trial table has no record
    /// for the drug.
    pub fn evaluate_trial(&self, req: &TrialRequest) -> PolicyOutcome<TrialEnablementCard> {
        debug!(drug = %req.drug_name, diagnosis = %req.diagnosis, "evaluating trial eligibility");

        match self.store.trial_policy(&req.drug_name) {
            Some(policy) => PolicyOutcome::Evaluated(evaluate_trial_policy(policy, req)),
            None => {
                warn!(drug = %req.drug_name, "no trial policy for drug");
                PolicyOutcome::NoPolicy(NoPolicyFound::new(&req.drug_name, PolicyScope::Trial))
            }
        }
    }

    /// Evaluate reimbursement for `req.drug_name`.
    ///
    /// Returns `PolicyOutcome::NoPolicy` when the reimbursement table has no
    /// record for the drug.
    pub fn evaluate_reimbursement(
        &self,
        req: &ReimbursementRequest,
    ) -> PolicyOutcome<ReimbursementStatusCard> {
        debug!(
            drug = %req.drug_name,
            diagnosis = %req.diagnosis,
            insurance_type = %req.insurance_type,
            "evaluating reimbursement"
        );

        match self.store.reimbursement_policy(&req.drug_name) {
            Some(policy) => PolicyOutcome::Evaluated(evaluate_reimbursement_policy(policy, req)),
            None => {
                warn!(drug = %req.drug_name, "no reimbursement policy for drug");
                PolicyOutcome::NoPolicy(NoPolicyFound::new(
                    &req.drug_name,
                    PolicyScope::Reimbursement,
                ))
            }
        }
    }

    /// Produce a combined trial + reimbursement report.
    ///
    /// Short-circuits with `NoPolicy` (scope `Any`) when the drug is in
    /// neither table.  A drug present in only one table gets a `NO_POLICY`
    /// placeholder for the other half.  `generated_at` is stamped by the
    /// caller so the evaluation itself stays clock-free.
    pub fn generate_report(
        &self,
        req: &ReportRequest,
        generated_at: DateTime<Utc>,
    ) -> PolicyOutcome<PolicyReportCard> {
        let trial_policy = self.store.trial_policy(&req.drug_name);
        let reimbursement_policy = self.store.reimbursement_policy(&req.drug_name);

        if trial_policy.is_none() && reimbursement_policy.is_none() {
            warn!(drug = %req.drug_name, "no policies of any kind for drug");
            return PolicyOutcome::NoPolicy(NoPolicyFound::new(&req.drug_name, PolicyScope::Any));
        }

        debug!(drug = %req.drug_name, "generating combined policy report");

        let trial_eligibility = match trial_policy {
            Some(policy) => evaluate_trial_policy(policy, &req.trial()),
            None => TrialEnablementCard {
                drug_name: req.drug_name.clone(),
                status: EvaluationStatus::NotApproved,
                reason_codes: vec![ReasonCode::NoPolicy],
                required_documents: Vec::new(),
                exclusion_flags: Vec::new(),
            },
        };

        let reimbursement = match reimbursement_policy {
            Some(policy) => evaluate_reimbursement_policy(policy, &req.reimbursement()),
            None => ReimbursementStatusCard {
                drug_name: req.drug_name.clone(),
                status: EvaluationStatus::NotApproved,
                coverage_percent: Decimal::ZERO,
                approved_amount: Decimal::ZERO,
                reason_codes: vec![ReasonCode::NoPolicy],
            },
        };

        let summary = report_summary(&req.drug_name, trial_eligibility.status, reimbursement.status);

        PolicyOutcome::Evaluated(PolicyReportCard {
            trial_eligibility,
            reimbursement,
            generated_at,
            summary,
        })
    }
}

/// Apply one trial record to one request.
pub fn evaluate_trial_policy(policy: &TrialPolicy, req: &TrialRequest) -> TrialEnablementCard {
    let mut reason_codes = Vec::new();
    let mut exclusion_flags = Vec::new();

    if req.patient_age < policy.min_age {
        reason_codes.push(ReasonCode::AgeBelowMin(policy.min_age));
    }
    if req.patient_age > policy.max_age {
        reason_codes.push(ReasonCode::AgeAboveMax(policy.max_age));
    }

    if !policy.eligible_diagnoses.contains(&req.diagnosis) {
        reason_codes.push(ReasonCode::DiagnosisNotEligible(req.diagnosis.clone()));
    }

    let provided: BTreeSet<&str> = req.prior_treatments.iter().map(String::as_str).collect();
    let missing: BTreeSet<&str> = policy
        .required_prior_treatments
        .iter()
        .map(String::as_str)
        .filter(|t| !provided.contains(t))
        .collect();
    if !missing.is_empty() {
        reason_codes.push(ReasonCode::MissingPriorTreatment(
            missing.into_iter().map(str::to_string).collect(),
        ));
    }

    let diagnosis = req.diagnosis.to_lowercase();
    let treatments: Vec<String> = req.prior_treatments.iter().map(|t| t.to_lowercase()).collect();
    for criterion in &policy.exclusion_criteria {
        let needle = criterion.to_lowercase();
        let hit = diagnosis.contains(&needle) || treatments.iter().any(|t| t.contains(&needle));
        if hit {
            exclusion_flags.push(criterion.clone());
            reason_codes.push(ReasonCode::ExclusionCriteria(criterion.clone()));
        }
    }

    let status = if reason_codes.is_empty() {
        EvaluationStatus::Approved
    } else {
        EvaluationStatus::NotApproved
    };

    TrialEnablementCard {
        drug_name: req.drug_name.clone(),
        status,
        reason_codes,
        required_documents: policy.required_documents.clone(),
        exclusion_flags,
    }
}

/// Apply one reimbursement record to one request.
pub fn evaluate_reimbursement_policy(
    policy: &ReimbursementPolicy,
    req: &ReimbursementRequest,
) -> ReimbursementStatusCard {
    let mut reason_codes = Vec::new();

    let diagnosis_covered = policy.eligible_diagnoses.contains(&req.diagnosis);
    if !diagnosis_covered {
        reason_codes.push(ReasonCode::DiagnosisNotCovered(req.diagnosis.clone()));
    }

    let terms = req
        .insurance_type
        .parse::<InsuranceType>()
        .ok()
        .and_then(|scheme| policy.coverage_for(scheme));
    let (coverage_percent, max_amount) = match terms {
        Some(terms) => (terms.coverage_percent, terms.max_amount),
        None => {
            reason_codes.push(ReasonCode::InsuranceTypeUnknown(req.insurance_type.clone()));
            (Decimal::ZERO, Decimal::ZERO)
        }
    };

    // rate is within [0, 1]; a product that does not fit is above any cap.
    let rate = coverage_percent / Decimal::ONE_HUNDRED;
    let covered_amount = req.claim_amount.checked_mul(rate).unwrap_or(Decimal::MAX);
    let approved_amount = covered_amount.min(max_amount);

    if coverage_percent.is_zero() {
        reason_codes.push(ReasonCode::NoCoverage);
    }

    if req.claim_amount > max_amount && max_amount > Decimal::ZERO {
        reason_codes.push(ReasonCode::ClaimExceedsMax(max_amount));
    }

    let status = if coverage_percent.is_zero() || !diagnosis_covered {
        EvaluationStatus::NotApproved
    } else if !reason_codes.is_empty() {
        EvaluationStatus::Conditional
    } else {
        EvaluationStatus::Approved
    };

    ReimbursementStatusCard {
        drug_name: req.drug_name.clone(),
        status,
        coverage_percent,
        approved_amount,
        reason_codes,
    }
}

/// Fixed-format, pipe-joined summary line for a report.
pub fn report_summary(
    drug_name: &str,
    trial: EvaluationStatus,
    reimbursement: EvaluationStatus,
) -> String {
    [
        format!("Drug: {}", drug_name),
        format!("Trial eligibility: {}", trial),
        format!("Reimbursement: {}", reimbursement),
    ]
    .join(" | ")
}
