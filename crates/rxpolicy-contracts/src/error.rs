//! Fault types for the rxpolicy evaluation stack.
//!
//! Business outcomes (no policy, not approved, conditional) are never errors.
//! Only broken configuration, malformed requests, and audit failures end up
//! here.

use thiserror::Error;

/// The unified error type for the rxpolicy crates.
#[derive(Debug, Error)]
pub enum RxPolicyError {
    /// The rule file is missing, unreadable, or does not match the schema.
    ///
    /// Raised at load time only. A service that cannot load its rules cannot
    /// start.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A request failed shape validation before reaching the evaluator.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The audit sink could not record an entry.
    ///
    /// Callers of the evaluator swallow this; it never changes a response.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },
}

/// Convenience alias used throughout the rxpolicy crates.
pub type RxPolicyResult<T> = Result<T, RxPolicyError>;
