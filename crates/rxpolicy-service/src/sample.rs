//! Bundled sample rule table.
//!
//! A small, fictional set of trial and reimbursement records.  Used when no
//! rule file is configured and as the fixture for tests.

use rxpolicy_store::RuleSource;

/// The bundled rule document, as JSON.
pub const SAMPLE_POLICIES: &str = include_str!("../data/policies.json");

/// A [`RuleSource`] that reads the bundled document.
pub fn sample_source() -> RuleSource {
    RuleSource::Json(SAMPLE_POLICIES.into())
}
