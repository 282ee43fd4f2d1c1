//! Trait seams around the evaluator.
//!
//! - `RuleStore`: trusted, read-only source of policy records
//! - `AuditSink`: fire-and-forget record of handled requests
//!
//! The evaluator only ever reads from a `RuleStore`.  It never touches an
//! `AuditSink`; auditing belongs to the request layer.

use std::sync::Arc;

use rxpolicy_contracts::{
    audit::AuditEntry,
    error::RxPolicyResult,
    policy::{ReimbursementPolicy, TrialPolicy},
};

/// Read-only lookup of per-drug policy records.
///
/// Implementations must be immutable once constructed so that a single
/// instance can be shared across threads without locking.  Lookups are
/// exact, case-sensitive matches on the drug name.
pub trait RuleStore: Send + Sync {
    /// The trial policy for `drug_name`, if one exists.
    fn trial_policy(&self, drug_name: &str) -> Option<&TrialPolicy>;

    /// The reimbursement policy for `drug_name`, if one exists.
    fn reimbursement_policy(&self, drug_name: &str) -> Option<&ReimbursementPolicy>;
}

impl<S: RuleStore + ?Sized> RuleStore for Arc<S> {
    fn trial_policy(&self, drug_name: &str) -> Option<&TrialPolicy> {
        (**self).trial_policy(drug_name)
    }

    fn reimbursement_policy(&self, drug_name: &str) -> Option<&ReimbursementPolicy> {
        (**self).reimbursement_policy(drug_name)
    }
}

/// Destination for audit entries.
///
/// Callers treat a failed `record` as non-fatal: the error is logged and the
/// response goes out unchanged.
pub trait AuditSink: Send + Sync {
    /// Append one entry.  Entries are never modified once recorded.
    fn record(&self, entry: &AuditEntry) -> RxPolicyResult<()>;
}
