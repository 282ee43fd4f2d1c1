//! Request handlers for the policy engine.
//!
//! Each handler follows the same pipeline:
//!
//!   validate → snapshot rules → evaluate → wrap in `CardEnvelope` → audit
//!
//! Business outcomes, including "no policy", always come back as `Ok` with a
//! card.  `Err` means the request was malformed or the rule file could not
//! be loaded.  Audit failures are logged and dropped; they never change the
//! response.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info_span, warn};
use uuid::Uuid;

use rxpolicy_contracts::{
    audit::AuditEntry,
    card::CardEnvelope,
    error::RxPolicyResult,
    request::{ReimbursementRequest, ReportRequest, TrialRequest},
};
use rxpolicy_core::{traits::AuditSink, PolicyEvaluator};
use rxpolicy_store::{CachedRuleStore, PolicyTable};

use crate::{
    coverage::{coverage_display, CoverageDisplay},
    health::{HealthReport, ENGINE_NAME},
};

pub const TRIAL_ENDPOINT: &str = "/policy/trial-evaluation";
pub const REIMBURSEMENT_ENDPOINT: &str = "/policy/reimbursement-evaluation";
pub const REPORT_ENDPOINT: &str = "/policy/report/generate";

/// The request layer in front of the evaluator.
pub struct PolicyService {
    rules: Arc<CachedRuleStore>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl PolicyService {
    /// Create a service with no audit sink.
    pub fn new(rules: Arc<CachedRuleStore>) -> Self {
        Self { rules, audit: None }
    }

    /// Attach an audit sink.  Every handled request is recorded to it.
    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(sink);
        self
    }

    pub fn rules(&self) -> &CachedRuleStore {
        &self.rules
    }

    fn evaluator(&self) -> RxPolicyResult<PolicyEvaluator<Arc<PolicyTable>>> {
        Ok(PolicyEvaluator::new(self.rules.snapshot()?))
    }

    /// Evaluate trial eligibility.
    pub fn trial_evaluation(&self, req: &TrialRequest) -> RxPolicyResult<CardEnvelope> {
        req.validate()?;
        let request_id = Uuid::new_v4();
        let _span = info_span!("request", %request_id, endpoint = TRIAL_ENDPOINT).entered();

        let envelope = CardEnvelope::from(self.evaluator()?.evaluate_trial(req));

        self.record(
            request_id,
            TRIAL_ENDPOINT,
            format!("{}|{}|age={}", req.drug_name, req.diagnosis, req.patient_age),
            &envelope,
        );
        Ok(envelope)
    }

    /// Evaluate reimbursement.
    pub fn reimbursement_evaluation(
        &self,
        req: &ReimbursementRequest,
    ) -> RxPolicyResult<CardEnvelope> {
        req.validate()?;
        let request_id = Uuid::new_v4();
        let _span = info_span!("request", %request_id, endpoint = REIMBURSEMENT_ENDPOINT).entered();

        let envelope = CardEnvelope::from(self.evaluator()?.evaluate_reimbursement(req));

        self.record(
            request_id,
            REIMBURSEMENT_ENDPOINT,
            format!(
                "{}|{}|{}|{}",
                req.drug_name,
                req.diagnosis,
                req.insurance_type,
                req.claim_amount.normalize()
            ),
            &envelope,
        );
        Ok(envelope)
    }

    /// Generate a combined trial + reimbursement report stamped with the
    /// current time.
    pub fn report_generate(&self, req: &ReportRequest) -> RxPolicyResult<CardEnvelope> {
        req.validate()?;
        let request_id = Uuid::new_v4();
        let _span = info_span!("request", %request_id, endpoint = REPORT_ENDPOINT).entered();

        let envelope = CardEnvelope::from(self.evaluator()?.generate_report(req, Utc::now()));

        self.record(
            request_id,
            REPORT_ENDPOINT,
            format!("{}|{}|age={}", req.drug_name, req.diagnosis, req.patient_age),
            &envelope,
        );
        Ok(envelope)
    }

    /// Evaluate reimbursement and map the result into a coverage display.
    ///
    /// Returns `None` for a no-policy outcome or an unknown insurance type.
    /// Not audited: this is a presentation helper over the evaluator.
    pub fn coverage(&self, req: &ReimbursementRequest) -> RxPolicyResult<Option<CoverageDisplay>> {
        req.validate()?;
        let outcome = self.evaluator()?.evaluate_reimbursement(req);
        Ok(outcome
            .evaluated()
            .and_then(|card| coverage_display(&card, &req.insurance_type)))
    }

    /// Report whether the rule table can be loaded.
    pub fn health(&self) -> HealthReport {
        match self.rules.snapshot() {
            Ok(table) => HealthReport::healthy(table.trial_count(), table.reimbursement_count()),
            Err(e) => {
                warn!(error = %e, "rule table unavailable");
                HealthReport::unhealthy()
            }
        }
    }

    fn record(&self, request_id: Uuid, endpoint: &str, input_summary: String, envelope: &CardEnvelope) {
        let Some(sink) = self.audit.as_ref() else {
            return;
        };

        let entry = AuditEntry {
            request_id,
            timestamp: Utc::now(),
            engine: ENGINE_NAME.to_string(),
            endpoint: endpoint.to_string(),
            input_summary,
            output_type: envelope.card_type().to_string(),
            source_ids: Vec::new(),
        };

        if let Err(e) = sink.record(&entry) {
            warn!(error = %e, endpoint, "audit write failed; response unaffected");
        }
    }
}
