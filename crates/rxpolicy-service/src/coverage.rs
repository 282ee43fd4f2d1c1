//! Display mapping from a reimbursement card to per-scheme coverage slots.
//!
//! The mapping is fixed:
//!
//! | insurance type | scheme            |
//! |----------------|-------------------|
//! | government     | Ayushman Bharat   |
//! | corporate      | CGHS              |
//! | private        | Private Insurance |
//!
//! and status colors are APPROVED → green, CONDITIONAL → yellow,
//! NOT_APPROVED → red.

use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use rxpolicy_contracts::{
    card::{EvaluationStatus, ReimbursementStatusCard},
    policy::InsuranceType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayColor {
    Green,
    Yellow,
    Red,
}

impl From<EvaluationStatus> for DisplayColor {
    fn from(status: EvaluationStatus) -> Self {
        match status {
            EvaluationStatus::Approved => DisplayColor::Green,
            EvaluationStatus::Conditional => DisplayColor::Yellow,
            EvaluationStatus::NotApproved => DisplayColor::Red,
        }
    }
}

/// Public-facing name of the scheme behind an insurance type.
pub fn scheme_name(insurance: InsuranceType) -> &'static str {
    match insurance {
        InsuranceType::Government => "Ayushman Bharat",
        InsuranceType::Corporate => "CGHS",
        InsuranceType::Private => "Private Insurance",
    }
}

/// One scheme's coverage, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageScheme {
    pub scheme_name: String,
    pub status: EvaluationStatus,
    pub color: DisplayColor,
    /// e.g. `"85% Coverage"`.
    pub label: String,
}

/// Coverage slots keyed by insurance type.  Only the requested slot is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageDisplay {
    pub government: Option<CoverageScheme>,
    pub corporate: Option<CoverageScheme>,
    pub private: Option<CoverageScheme>,
}

impl CoverageDisplay {
    /// The populated slot, if any.
    pub fn scheme(&self, insurance: InsuranceType) -> Option<&CoverageScheme> {
        match insurance {
            InsuranceType::Government => self.government.as_ref(),
            InsuranceType::Corporate => self.corporate.as_ref(),
            InsuranceType::Private => self.private.as_ref(),
        }
    }
}

/// Map `card` into the slot for `insurance_type`.
///
/// Returns `None` when `insurance_type` is not a known scheme.
pub fn coverage_display(
    card: &ReimbursementStatusCard,
    insurance_type: &str,
) -> Option<CoverageDisplay> {
    let insurance: InsuranceType = insurance_type.parse().ok()?;

    let percent = card
        .coverage_percent
        .round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let scheme = CoverageScheme {
        scheme_name: scheme_name(insurance).to_string(),
        status: card.status,
        color: card.status.into(),
        label: format!("{}% Coverage", percent.normalize()),
    };

    let mut display = CoverageDisplay::default();
    match insurance {
        InsuranceType::Government => display.government = Some(scheme),
        InsuranceType::Corporate => display.corporate = Some(scheme),
        InsuranceType::Private => display.private = Some(scheme),
    }
    Some(display)
}
