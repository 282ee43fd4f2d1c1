//! Per-drug policy records as they live in the rule store.
//!
//! Records are deserialized once from the persisted rule file and never
//! mutated afterwards.  Field names match the on-disk schema.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The closed set of insurance schemes a reimbursement policy can cover.
///
/// Rule files keyed by any other string fail to load.  Requests may still
/// name an arbitrary string; the evaluator reports it as unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum InsuranceType {
    Government,
    Corporate,
    Private,
}

impl InsuranceType {
    /// All variants in declaration order.
    pub const ALL: [InsuranceType; 3] = [
        InsuranceType::Government,
        InsuranceType::Corporate,
        InsuranceType::Private,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsuranceType::Government => "government",
            InsuranceType::Corporate => "corporate",
            InsuranceType::Private => "private",
        }
    }
}

impl fmt::Display for InsuranceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known [`InsuranceType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownInsuranceType(pub String);

impl fmt::Display for UnknownInsuranceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown insurance type '{}' (expected government, corporate, or private)",
            self.0
        )
    }
}

impl std::error::Error for UnknownInsuranceType {}

impl FromStr for InsuranceType {
    type Err = UnknownInsuranceType;

    /// Exact, case-sensitive match on the lowercase scheme key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "government" => Ok(InsuranceType::Government),
            "corporate" => Ok(InsuranceType::Corporate),
            "private" => Ok(InsuranceType::Private),
            other => Err(UnknownInsuranceType(other.to_string())),
        }
    }
}

impl TryFrom<String> for InsuranceType {
    type Error = UnknownInsuranceType;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Coverage granted under one insurance scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageTerms {
    /// Share of the claim that is reimbursable, 0–100.
    pub coverage_percent: Decimal,
    /// Upper bound on the approved amount.
    pub max_amount: Decimal,
}

/// Trial-enablement rules for a single drug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialPolicy {
    /// Inclusive lower age bound.
    pub min_age: u32,
    /// Inclusive upper age bound.
    pub max_age: u32,
    /// Exact, case-sensitive diagnosis keys.
    pub eligible_diagnoses: Vec<String>,
    /// Every entry must appear in the request's prior treatments.
    #[serde(default)]
    pub required_prior_treatments: Vec<String>,
    /// Case-insensitive substrings matched against the diagnosis and each
    /// prior treatment.  Evaluated in declaration order.
    #[serde(default)]
    pub exclusion_criteria: Vec<String>,
    /// Paperwork echoed back on every trial card.
    #[serde(default)]
    pub required_documents: Vec<String>,
}

impl TrialPolicy {
    /// Check internal consistency of the record.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_age > self.max_age {
            return Err(format!(
                "min_age {} is greater than max_age {}",
                self.min_age, self.max_age
            ));
        }
        if let Some(bad) = self
            .required_prior_treatments
            .iter()
            .find(|t| t.is_empty() || t.contains(','))
        {
            return Err(format!(
                "required prior treatment '{}' must be non-empty and must not contain ','",
                bad
            ));
        }
        Ok(())
    }
}

/// Reimbursement rules for a single drug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementPolicy {
    /// Exact, case-sensitive diagnosis keys.
    pub eligible_diagnoses: Vec<String>,
    /// Coverage terms per insurance scheme.
    #[serde(default)]
    pub insurance_coverage: BTreeMap<InsuranceType, CoverageTerms>,
}

impl ReimbursementPolicy {
    /// Check that every coverage entry is within range.
    pub fn validate(&self) -> Result<(), String> {
        for (scheme, terms) in &self.insurance_coverage {
            if terms.coverage_percent < Decimal::ZERO
                || terms.coverage_percent > Decimal::ONE_HUNDRED
            {
                return Err(format!(
                    "coverage_percent {} for '{}' is outside 0-100",
                    terms.coverage_percent, scheme
                ));
            }
            if terms.max_amount < Decimal::ZERO {
                return Err(format!(
                    "max_amount {} for '{}' is negative",
                    terms.max_amount, scheme
                ));
            }
        }
        Ok(())
    }

    /// Coverage terms for `scheme`, if the policy grants any.
    pub fn coverage_for(&self, scheme: InsuranceType) -> Option<&CoverageTerms> {
        self.insurance_coverage.get(&scheme)
    }
}
