//! # rxpolicy-core
//!
//! The deterministic policy evaluator and the trait seams around it.
//!
//! This crate provides:
//! - `RuleStore` and `AuditSink` traits
//! - `PolicyEvaluator`, which answers trial-eligibility, reimbursement, and
//!   combined-report requests against a `RuleStore`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rxpolicy_core::PolicyEvaluator;
//!
//! let evaluator = PolicyEvaluator::new(table);
//! let outcome = evaluator.evaluate_reimbursement(&request);
//! ```

pub mod evaluator;
pub mod traits;

pub use evaluator::PolicyEvaluator;
pub use traits::{AuditSink, RuleStore};

// ── Tests ─────────────────────────────────────────────────────────────────────
