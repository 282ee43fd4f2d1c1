//! Machine-readable reason codes attached to evaluation cards.
//!
//! Each code renders as `TAG` or `TAG:value`, e.g. `AGE_BELOW_MIN:18`.  The
//! string form is what travels on the wire; [`ReasonCode`] keeps the tag
//! typed inside the process so status resolution never string-matches.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Why an evaluation did not come back clean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReasonCode {
    /// Patient is younger than the policy's `min_age` (carried value).
    AgeBelowMin(u32),
    /// Patient is older than the policy's `max_age` (carried value).
    AgeAboveMax(u32),
    /// Trial diagnosis is not in the eligible set.
    DiagnosisNotEligible(String),
    /// Required prior treatments the request did not list, sorted.
    ///
    /// Rendered comma-joined, so the string form only parses back to the
    /// same list when no id is empty or contains a comma.  Policy loading
    /// rejects such ids.
    MissingPriorTreatment(Vec<String>),
    /// An exclusion criterion matched.
    ExclusionCriteria(String),
    /// Reimbursement diagnosis is not in the covered set.
    DiagnosisNotCovered(String),
    /// The request named an insurance type the policy does not cover.
    InsuranceTypeUnknown(String),
    /// Coverage resolved to zero percent.
    NoCoverage,
    /// The claim is larger than the scheme's maximum amount (carried value).
    ///
    /// Rendered normalized: a cap of `7500.0` shows as `CLAIM_EXCEEDS_MAX:7500`.
    ClaimExceedsMax(Decimal),
    /// The drug has no record in the table backing one half of a report.
    NoPolicy,
}

impl ReasonCode {
    /// The tag portion of the code, without its value.
    pub fn tag(&self) -> &'static str {
        match self {
            ReasonCode::AgeBelowMin(_) => "AGE_BELOW_MIN",
            ReasonCode::AgeAboveMax(_) => "AGE_ABOVE_MAX",
            ReasonCode::DiagnosisNotEligible(_) => "DIAGNOSIS_NOT_ELIGIBLE",
            ReasonCode::MissingPriorTreatment(_) => "MISSING_PRIOR_TREATMENT",
            ReasonCode::ExclusionCriteria(_) => "EXCLUSION_CRITERIA",
            ReasonCode::DiagnosisNotCovered(_) => "DIAGNOSIS_NOT_COVERED",
            ReasonCode::InsuranceTypeUnknown(_) => "INSURANCE_TYPE_UNKNOWN",
            ReasonCode::NoCoverage => "NO_COVERAGE",
            ReasonCode::ClaimExceedsMax(_) => "CLAIM_EXCEEDS_MAX",
            ReasonCode::NoPolicy => "NO_POLICY",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.tag();
        match self {
            ReasonCode::AgeBelowMin(age) | ReasonCode::AgeAboveMax(age) => {
                write!(f, "{tag}:{age}")
            }
            ReasonCode::DiagnosisNotEligible(value)
            | ReasonCode::ExclusionCriteria(value)
            | ReasonCode::DiagnosisNotCovered(value)
            | ReasonCode::InsuranceTypeUnknown(value) => write!(f, "{tag}:{value}"),
            ReasonCode::MissingPriorTreatment(missing) => {
                write!(f, "{tag}:{}", missing.join(","))
            }
            // 1000.00 and 1000 must render identically.
            ReasonCode::ClaimExceedsMax(max) => write!(f, "{tag}:{}", max.normalize()),
            ReasonCode::NoCoverage | ReasonCode::NoPolicy => f.write_str(tag),
        }
    }
}

/// Returned when a string is not a well-formed reason code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidReasonCode(pub String);

impl fmt::Display for InvalidReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid reason code '{}'", self.0)
    }
}

impl std::error::Error for InvalidReasonCode {}

impl FromStr for ReasonCode {
    type Err = InvalidReasonCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidReasonCode(s.to_string());
        let (tag, value) = match s.split_once(':') {
            Some((tag, value)) => (tag, Some(value)),
            None => (s, None),
        };

        let code = match (tag, value) {
            ("NO_COVERAGE", None) => ReasonCode::NoCoverage,
            ("NO_POLICY", None) => ReasonCode::NoPolicy,
            ("AGE_BELOW_MIN", Some(v)) => ReasonCode::AgeBelowMin(v.parse().map_err(|_| invalid())?),
            ("AGE_ABOVE_MAX", Some(v)) => ReasonCode::AgeAboveMax(v.parse().map_err(|_| invalid())?),
            ("DIAGNOSIS_NOT_ELIGIBLE", Some(v)) => ReasonCode::DiagnosisNotEligible(v.to_string()),
            ("MISSING_PRIOR_TREATMENT", Some(v)) => {
                ReasonCode::MissingPriorTreatment(v.split(',').map(str::to_string).collect())
            }
            ("EXCLUSION_CRITERIA", Some(v)) => ReasonCode::ExclusionCriteria(v.to_string()),
            ("DIAGNOSIS_NOT_COVERED", Some(v)) => ReasonCode::DiagnosisNotCovered(v.to_string()),
            ("INSURANCE_TYPE_UNKNOWN", Some(v)) => ReasonCode::InsuranceTypeUnknown(v.to_string()),
            ("CLAIM_EXCEEDS_MAX", Some(v)) => {
                ReasonCode::ClaimExceedsMax(v.parse().map_err(|_| invalid())?)
            }
            _ => return Err(invalid()),
        };
        Ok(code)
    }
}

impl TryFrom<String> for ReasonCode {
    type Error = InvalidReasonCode;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReasonCode> for String {
    fn from(code: ReasonCode) -> Self {
        code.to_string()
    }
}
