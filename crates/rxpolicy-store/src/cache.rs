//! Lazily loaded, process-lifetime cache around a [`PolicyTable`].
//!
//! The first call to `snapshot()` reads and validates the rule source; every
//! later call hands out a clone of the same `Arc`.  Loading happens under a
//! write lock, so concurrent first callers trigger exactly one read.
//!
//! `invalidate()` drops the cached reference.  Snapshots already handed out
//! stay valid and unchanged; the next `snapshot()` loads a fresh table.

use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use rxpolicy_contracts::error::{RxPolicyError, RxPolicyResult};

use crate::table::PolicyTable;

/// Environment variable naming the rule file to load.
pub const POLICY_PATH_ENV: &str = "RXPOLICY_POLICIES";

/// Where a [`CachedRuleStore`] reads its rules from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// A JSON or TOML file on disk.
    File(PathBuf),
    /// An in-memory JSON document, typically from `include_str!`.
    Json(Cow<'static, str>),
}

impl RuleSource {
    /// `RXPOLICY_POLICIES` if set and non-empty, otherwise `fallback`.
    pub fn from_env_or(fallback: RuleSource) -> RuleSource {
        match std::env::var(POLICY_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => RuleSource::File(PathBuf::from(path)),
            _ => fallback,
        }
    }

    fn load(&self) -> RxPolicyResult<PolicyTable> {
        match self {
            RuleSource::File(path) => PolicyTable::from_file(path),
            RuleSource::Json(json) => PolicyTable::from_json_str(json),
        }
    }

    /// Short human-readable description for logs.
    pub fn describe(&self) -> String {
        match self {
            RuleSource::File(path) => path.display().to_string(),
            RuleSource::Json(_) => "<inline json>".to_string(),
        }
    }
}

/// Read-mostly cache of the rule table.
#[derive(Debug)]
pub struct CachedRuleStore {
    source: RuleSource,
    current: RwLock<Option<Arc<PolicyTable>>>,
}

impl CachedRuleStore {
    /// Create an empty cache.  Nothing is read until the first `snapshot()`.
    pub fn new(source: RuleSource) -> Self {
        Self {
            source,
            current: RwLock::new(None),
        }
    }

    /// Create a cache that is already populated with `table`.
    pub fn preloaded(source: RuleSource, table: PolicyTable) -> Self {
        Self {
            source,
            current: RwLock::new(Some(Arc::new(table))),
        }
    }

    pub fn source(&self) -> &RuleSource {
        &self.source
    }

    /// The current table, loading it on first use.
    ///
    /// Returns `RxPolicyError::ConfigError` if the source cannot be read or
    /// parsed.  A failed load leaves the cache empty, so the next call tries
    /// again.
    pub fn snapshot(&self) -> RxPolicyResult<Arc<PolicyTable>> {
        {
            let guard = self.current.read().map_err(|e| RxPolicyError::ConfigError {
                reason: format!("rule cache lock poisoned: {}", e),
            })?;
            if let Some(table) = guard.as_ref() {
                return Ok(Arc::clone(table));
            }
        }

        let mut guard = self.current.write().map_err(|e| RxPolicyError::ConfigError {
            reason: format!("rule cache lock poisoned: {}", e),
        })?;

        // Another caller may have loaded while we waited for the write lock.
        if let Some(table) = guard.as_ref() {
            debug!("rule table loaded by a concurrent caller");
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(self.source.load()?);
        info!(
            source = %self.source.describe(),
            trial_policies = table.trial_count(),
            reimbursement_policies = table.reimbursement_count(),
            "rule cache populated"
        );
        *guard = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Whether a table is currently cached.
    pub fn is_loaded(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Drop the cached table so the next `snapshot()` reloads from source.
    ///
    /// Intended for tests that rewrite the rule file between cases.
    pub fn invalidate(&self) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if guard.take().is_some() {
            info!(source = %self.source.describe(), "rule cache invalidated");
        }
    }
}
