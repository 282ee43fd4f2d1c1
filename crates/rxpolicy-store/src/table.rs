//! The persisted rule document and its in-memory table.
//!
//! A rule file has two top-level collections, each keyed by drug name:
//!
//! ```json
//! {
//!   "trial_policies": {
//!     "Ciplar": { "min_age": 18, "max_age": 65, "eligible_diagnoses": ["hypertension"], … }
//!   },
//!   "reimbursement_policies": {
//!     "Ciplar": {
//!       "eligible_diagnoses": ["hypertension"],
//!       "insurance_coverage": { "corporate": { "coverage_percent": 85, "max_amount": 10000 } }
//!     }
//!   }
//! }
//! ```
//!
//! The same shape is accepted as TOML (`[trial_policies.Ciplar]` tables).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use rxpolicy_contracts::{
    error::{RxPolicyError, RxPolicyResult},
    policy::{ReimbursementPolicy, TrialPolicy},
};
use rxpolicy_core::traits::RuleStore;

/// The top-level structure deserialized from a rule file.
///
/// A missing collection is treated as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default)]
    pub trial_policies: BTreeMap<String, TrialPolicy>,
    #[serde(default)]
    pub reimbursement_policies: BTreeMap<String, ReimbursementPolicy>,
}

/// An immutable, validated rule table.
///
/// Construct via `from_json_str`, `from_toml_str`, or `from_file`.  Once
/// built, the table is never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyTable {
    document: PolicyDocument,
}

impl PolicyTable {
    /// Validate `document` and wrap it.
    ///
    /// Returns `RxPolicyError::ConfigError` naming the offending drug if any
    /// record is internally inconsistent.
    pub fn from_document(document: PolicyDocument) -> RxPolicyResult<Self> {
        for (drug, policy) in &document.trial_policies {
            policy.validate().map_err(|reason| RxPolicyError::ConfigError {
                reason: format!("trial policy for '{}': {}", drug, reason),
            })?;
        }
        for (drug, policy) in &document.reimbursement_policies {
            policy.validate().map_err(|reason| RxPolicyError::ConfigError {
                reason: format!("reimbursement policy for '{}': {}", drug, reason),
            })?;
        }
        Ok(Self { document })
    }

    /// Parse `s` as a JSON rule document.
    pub fn from_json_str(s: &str) -> RxPolicyResult<Self> {
        let document: PolicyDocument =
            serde_json::from_str(s).map_err(|e| RxPolicyError::ConfigError {
                reason: format!("failed to parse policy JSON: {}", e),
            })?;
        Self::from_document(document)
    }

    /// Parse `s` as a TOML rule document.
    pub fn from_toml_str(s: &str) -> RxPolicyResult<Self> {
        let document: PolicyDocument = toml::from_str(s).map_err(|e| RxPolicyError::ConfigError {
            reason: format!("failed to parse policy TOML: {}", e),
        })?;
        Self::from_document(document)
    }

    /// Read the file at `path` and parse it.
    ///
    /// Files ending in `.toml` are parsed as TOML; anything else as JSON.
    pub fn from_file(path: &Path) -> RxPolicyResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| RxPolicyError::ConfigError {
            reason: format!("failed to read policy file '{}': {}", path.display(), e),
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let table = if is_toml {
            Self::from_toml_str(&contents)?
        } else {
            Self::from_json_str(&contents)?
        };

        info!(
            path = %path.display(),
            trial_policies = table.trial_count(),
            reimbursement_policies = table.reimbursement_count(),
            "policy table loaded"
        );
        Ok(table)
    }

    pub fn document(&self) -> &PolicyDocument {
        &self.document
    }

    pub fn trial_count(&self) -> usize {
        self.document.trial_policies.len()
    }

    pub fn reimbursement_count(&self) -> usize {
        self.document.reimbursement_policies.len()
    }

    /// Every drug named in either collection, sorted and deduplicated.
    pub fn drug_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .document
            .trial_policies
            .keys()
            .chain(self.document.reimbursement_policies.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

impl RuleStore for PolicyTable {
    fn trial_policy(&self, drug_name: &str) -> Option<&TrialPolicy> {
        self.document.trial_policies.get(drug_name)
    }

    fn reimbursement_policy(&self, drug_name: &str) -> Option<&ReimbursementPolicy> {
        self.document.reimbursement_policies.get(drug_name)
    }
}
