//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. sequence as 8-byte little-endian
//!   2. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   3. compact JSON of the entry

use sha2::{Digest, Sha256};

use rxpolicy_contracts::audit::AuditEntry;

use crate::event::AuditEvent;

/// Compute the SHA-256 hash for one audit event.
///
/// Returns a lowercase 64-character hex string.
///
/// # Panics
///
/// Panics if `entry` cannot be serialized to JSON, which cannot happen for
/// the plain-data `AuditEntry` type.
pub fn hash_entry(sequence: u64, entry: &AuditEntry, prev_hash: &str) -> String {
    let entry_json =
        serde_json::to_vec(entry).expect("AuditEntry must always be serializable to JSON");

    let mut hasher = Sha256::new();
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&entry_json);

    hex::encode(hasher.finalize())
}

/// Verify the integrity of a hash chain.
///
/// Every event's `prev_hash` must equal the previous event's `this_hash`
/// (or `GENESIS_HASH` for the first), and every `this_hash` must match the
/// value recomputed from the event.  An empty chain is valid.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let mut expected_prev = AuditEvent::GENESIS_HASH.to_string();

    for event in events {
        if event.prev_hash != expected_prev {
            return false;
        }

        let recomputed = hash_entry(event.sequence, &event.entry, &event.prev_hash);
        if event.this_hash != recomputed {
            return false;
        }

        expected_prev = event.this_hash.clone();
    }

    true
}
