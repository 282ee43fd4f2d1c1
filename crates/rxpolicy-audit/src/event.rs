//! Audit event and exported log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rxpolicy_contracts::audit::AuditEntry;

/// One link in the audit hash chain.
///
/// Changing any field of `entry` invalidates `this_hash` and every later
/// `prev_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    /// The recorded request.
    pub entry: AuditEntry,

    /// Hash of the previous event, or `GENESIS_HASH` for the first event.
    pub prev_hash: String,

    /// Hash of this event, as computed by `hash_entry()`.
    pub this_hash: String,
}

impl AuditEvent {
    /// The `prev_hash` of the first event in every chain.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// Point-in-time export of an audit chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// All events in chain order.
    pub events: Vec<AuditEvent>,

    /// When the export was taken (UTC).
    pub exported_at: DateTime<Utc>,

    /// `this_hash` of the last event.  Empty string if the log is empty.
    pub terminal_hash: String,
}
