//! # rxpolicy-audit
//!
//! Append-only, SHA-256 hash-chained audit sink for rxpolicy requests.
//!
//! Every handled request becomes an `AuditEvent` linked to its predecessor by
//! hash.  Editing any recorded entry breaks the chain, which
//! `verify_chain` detects.
//!
//! ```rust,ignore
//! use rxpolicy_audit::InMemoryAuditLog;
//! use rxpolicy_core::traits::AuditSink;
//!
//! let log = InMemoryAuditLog::new();
//! log.record(&entry)?;
//! assert!(log.verify_integrity());
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_entry, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use memory::InMemoryAuditLog;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use rxpolicy_contracts::audit::AuditEntry;
    use rxpolicy_core::traits::AuditSink;

    use super::{AuditEvent, InMemoryAuditLog};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn make_entry(summary: &str) -> AuditEntry {
        AuditEntry {
            request_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine: "policy_reimbursement".to_string(),
            endpoint: "/policy/reimbursement-evaluation".to_string(),
            input_summary: summary.to_string(),
            output_type: "reimbursement_status_card".to_string(),
            source_ids: vec![],
        }
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_hash_chain_integrity() {
        let log = InMemoryAuditLog::new();
        log.record(&make_entry("Ciplar|hypertension|corporate|5000")).unwrap();
        log.record(&make_entry("Ciplar|hypertension|none|100000")).unwrap();
        log.record(&make_entry("UnknownDrug|xyz|corporate|1000")).unwrap();

        assert_eq!(log.len(), 3);
        assert!(log.verify_integrity(), "chain must be valid after sequential writes");
    }

    #[test]
    fn test_tamper_detection() {
        let log = InMemoryAuditLog::new();
        log.record(&make_entry("a")).unwrap();
        log.record(&make_entry("b")).unwrap();

        {
            let mut state = log.state.lock().unwrap();
            state.events[0].entry.output_type = "refusal_card".to_string();
        }

        assert!(!log.verify_integrity(), "chain must detect an edited entry");
    }

    #[test]
    fn test_genesis_and_sequence() {
        let log = InMemoryAuditLog::new();
        for summary in ["a", "b", "c"] {
            log.record(&make_entry(summary)).unwrap();
        }

        let exported = log.export_log();
        assert_eq!(exported.events[0].prev_hash, AuditEvent::GENESIS_HASH);
        for (idx, event) in exported.events.iter().enumerate() {
            assert_eq!(event.sequence, idx as u64);
        }
        assert_eq!(exported.terminal_hash, exported.events[2].this_hash);
        assert!(super::verify_chain(&exported.events));
    }

    #[test]
    fn test_entries_keep_fixed_keys() {
        let log = InMemoryAuditLog::new();
        log.record(&make_entry("Ciplar|hypertension|age=55")).unwrap();

        let value = serde_json::to_value(log.last_entry().unwrap()).unwrap();
        for key in [
            "request_id",
            "timestamp",
            "engine",
            "endpoint",
            "input_summary",
            "output_type",
            "source_ids",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }

    #[test]
    fn test_clear_restarts_chain() {
        let log = InMemoryAuditLog::new();
        log.record(&make_entry("a")).unwrap();
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.export_log().terminal_hash, "");

        log.record(&make_entry("b")).unwrap();
        let exported = log.export_log();
        assert_eq!(exported.events[0].sequence, 0);
        assert_eq!(exported.events[0].prev_hash, AuditEvent::GENESIS_HASH);
    }

    #[test]
    fn test_verify_empty() {
        assert!(InMemoryAuditLog::new().verify_integrity());
        assert!(super::verify_chain(&[]));
    }
}
