//! In-memory implementation of `AuditSink`.
//!
//! `InMemoryAuditLog` keeps every event in a `Vec` behind a `Mutex`, so a
//! single log can be shared by all request handlers in the process.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{debug, info};

use rxpolicy_contracts::{
    audit::AuditEntry,
    error::{RxPolicyError, RxPolicyResult},
};
use rxpolicy_core::traits::AuditSink;

use crate::{
    chain::{hash_entry, verify_chain},
    event::{AuditEvent, AuditLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct InMemoryState {
    /// All events written so far, in append order.
    pub(crate) events: Vec<AuditEvent>,

    /// The next sequence number to assign.
    pub(crate) sequence: u64,

    /// `this_hash` of the last event, or `GENESIS_HASH` when empty.
    pub(crate) last_hash: String,
}

impl InMemoryState {
    fn empty() -> Self {
        Self {
            events: Vec::new(),
            sequence: 0,
            last_hash: AuditEvent::GENESIS_HASH.to_string(),
        }
    }
}

// ── Public log ────────────────────────────────────────────────────────────────

/// An in-memory, append-only audit log backed by a SHA-256 hash chain.
///
/// Cloning yields another handle to the same log.
#[derive(Clone)]
pub struct InMemoryAuditLog {
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl Default for InMemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(InMemoryState::empty())),
        }
    }

    /// Export every event written so far.
    pub fn export_log(&self) -> AuditLog {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        AuditLog {
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        }
    }

    /// The recorded entries, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.events.iter().map(|e| e.entry.clone()).collect()
    }

    /// The most recent entry, if any.
    pub fn last_entry(&self) -> Option<AuditEntry> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.events.last().map(|e| e.entry.clone())
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that the in-memory chain has not been tampered with.
    pub fn verify_integrity(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        verify_chain(&state.events)
    }

    /// Discard all events and restart the chain from genesis.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let dropped = state.events.len();
        *state = InMemoryState::empty();
        info!(dropped_events = dropped, "audit log cleared");
    }
}

// ── AuditSink impl ────────────────────────────────────────────────────────────

impl AuditSink for InMemoryAuditLog {
    /// Append `entry` to the chain.
    ///
    /// Returns `Err(AuditWriteFailed)` only if the internal mutex is
    /// poisoned.
    fn record(&self, entry: &AuditEntry) -> RxPolicyResult<()> {
        let mut state = self.state.lock().map_err(|e| RxPolicyError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })?;

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;
        let this_hash = hash_entry(sequence, entry, &prev_hash);

        state.events.push(AuditEvent {
            sequence,
            entry: entry.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        debug!(
            sequence,
            endpoint = %entry.endpoint,
            output_type = %entry.output_type,
            "audit entry recorded"
        );
        Ok(())
    }
}
