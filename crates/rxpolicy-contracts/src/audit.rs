//! Audit entry written once per handled request.
//!
//! Every entry has the same fixed set of keys regardless of engine or
//! outcome.  Entries are produced by the request layer, never by the
//! evaluator itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One handled request, as recorded by the audit sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Identifier assigned by the request layer; also attached to the
    /// request's tracing span.
    pub request_id: Uuid,
    /// Wall-clock time the request was handled (UTC).
    pub timestamp: DateTime<Utc>,
    /// Engine that served the request, e.g. `"policy_reimbursement"`.
    pub engine: String,
    /// Logical endpoint, e.g. `"/policy/report/generate"`.
    pub endpoint: String,
    /// Pipe-joined digest of the request inputs.
    pub input_summary: String,
    /// The `card_type` of the envelope returned to the caller.
    pub output_type: String,
    /// Source documents the response drew on.  Empty for rule evaluation.
    #[serde(default)]
    pub source_ids: Vec<String>,
}
