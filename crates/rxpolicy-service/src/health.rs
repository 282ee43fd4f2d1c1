//! Liveness report for the policy engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Engine name used in health reports and audit entries.
pub const ENGINE_NAME: &str = "policy_reimbursement";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    /// `"healthy"` when the rule table is loaded, `"unhealthy"` otherwise.
    pub status: String,
    /// Per-engine state: `"active"` or `"unavailable"`.
    pub engines: BTreeMap<String, String>,
    pub trial_policies: usize,
    pub reimbursement_policies: usize,
}

impl HealthReport {
    pub fn healthy(trial_policies: usize, reimbursement_policies: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            engines: BTreeMap::from([(ENGINE_NAME.to_string(), "active".to_string())]),
            trial_policies,
            reimbursement_policies,
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            status: "unhealthy".to_string(),
            engines: BTreeMap::from([(ENGINE_NAME.to_string(), "unavailable".to_string())]),
            trial_policies: 0,
            reimbursement_policies: 0,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
