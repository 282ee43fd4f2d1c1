//! # rxpolicy-service
//!
//! The request layer in front of the rxpolicy evaluator.
//!
//! - [`PolicyService`] validates requests, runs the evaluator against the
//!   cached rule table, wraps outcomes in card envelopes, and records one
//!   audit entry per request.
//! - [`coverage`] maps reimbursement cards to per-scheme display slots.
//! - [`sample`] bundles a small, fictional rule table.

pub mod coverage;
pub mod handlers;
pub mod health;
pub mod sample;

pub use coverage::{coverage_display, CoverageDisplay, CoverageScheme, DisplayColor};
pub use handlers::PolicyService;
pub use health::HealthReport;

// ── Tests ─────────────────────────────────────────────────────────────────────
