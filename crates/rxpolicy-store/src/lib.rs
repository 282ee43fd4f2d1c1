//! # rxpolicy-store
//!
//! The static rule store backing the rxpolicy evaluator.
//!
//! ## Overview
//!
//! [`PolicyTable`] holds the per-drug trial and reimbursement records parsed
//! from a JSON or TOML rule file and implements
//! [`RuleStore`](rxpolicy_core::traits::RuleStore).  [`CachedRuleStore`]
//! loads a table lazily on first use and keeps it for the life of the
//! process.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use rxpolicy_store::{CachedRuleStore, RuleSource};
//! use rxpolicy_core::PolicyEvaluator;
//!
//! let cache = CachedRuleStore::new(RuleSource::File("data/policies.json".into()));
//! let evaluator = PolicyEvaluator::new(cache.snapshot()?);
//! ```

pub mod cache;
pub mod table;

pub use cache::{CachedRuleStore, RuleSource, POLICY_PATH_ENV};
pub use table::{PolicyDocument, PolicyTable};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use rust_decimal_macros::dec;

    use rxpolicy_contracts::{error::RxPolicyError, policy::InsuranceType};
    use rxpolicy_core::traits::RuleStore;

    use crate::{CachedRuleStore, PolicyTable, RuleSource};

    // ── Helpers ───────────────────────────────────────────────────────────────

    const JSON_RULES: &str = r#"{
        "trial_policies": {
            "Ciplar": {
                "min_age": 18,
                "max_age": 65,
                "eligible_diagnoses": ["hypertension"],
                "required_prior_treatments": [],
                "exclusion_criteria": ["pregnancy"],
                "required_documents": ["prescription"]
            }
        },
        "reimbursement_policies": {
            "Ciplar": {
                "eligible_diagnoses": ["hypertension"],
                "insurance_coverage": {
                    "corporate": { "coverage_percent": 85, "max_amount": 10000 },
                    "government": { "coverage_percent": 100, "max_amount": 2500.50 }
                }
            },
            "Ciplactin": {
                "eligible_diagnoses": ["allergic_rhinitis"],
                "insurance_coverage": {}
            }
        }
    }"#;

    /// Write `contents` to a per-test file under the system temp dir.
    fn temp_rules(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("rxpolicy-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    // ── 1. JSON parsing ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_json_rules() {
        let table = PolicyTable::from_json_str(JSON_RULES).unwrap();

        assert_eq!(table.trial_count(), 1);
        assert_eq!(table.reimbursement_count(), 2);
        assert_eq!(table.drug_names(), vec!["Ciplactin", "Ciplar"]);

        let trial = table.trial_policy("Ciplar").unwrap();
        assert_eq!((trial.min_age, trial.max_age), (18, 65));

        let reimb = table.reimbursement_policy("Ciplar").unwrap();
        let gov = reimb.coverage_for(InsuranceType::Government).unwrap();
        assert_eq!(gov.max_amount, dec!(2500.50));
        assert!(reimb.coverage_for(InsuranceType::Private).is_none());
    }

    /// Drug lookup is exact: no trimming, no case folding.
    #[test]
    fn test_lookup_is_exact() {
        let table = PolicyTable::from_json_str(JSON_RULES).unwrap();
        assert!(table.trial_policy("ciplar").is_none());
        assert!(table.trial_policy("Ciplar ").is_none());
        assert!(table.trial_policy("Ciplactin").is_none());
    }

    #[test]
    fn test_missing_collections_default_to_empty() {
        let table = PolicyTable::from_json_str("{}").unwrap();
        assert_eq!(table.trial_count(), 0);
        assert_eq!(table.reimbursement_count(), 0);
    }

    // ── 2. TOML parsing ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_toml_rules() {
        let toml = r#"
            [trial_policies.Ciplar]
            min_age = 18
            max_age = 65
            eligible_diagnoses = ["hypertension"]
            required_documents = ["prescription"]

            [reimbursement_policies.Ciplar]
            eligible_diagnoses = ["hypertension"]

            [reimbursement_policies.Ciplar.insurance_coverage.private]
            coverage_percent = 60
            max_amount = 7500.0
        "#;

        let table = PolicyTable::from_toml_str(toml).unwrap();
        let reimb = table.reimbursement_policy("Ciplar").unwrap();
        let private = reimb.coverage_for(InsuranceType::Private).unwrap();
        assert_eq!(private.coverage_percent, dec!(60));
        assert_eq!(private.max_amount, dec!(7500));
    }

    // ── 3. configuration errors ───────────────────────────────────────────────

    #[test]
    fn test_malformed_json_is_config_error() {
        match PolicyTable::from_json_str("{ not json") {
            Err(RxPolicyError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse policy JSON"), "got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_insurance_key_is_config_error() {
        let json = r#"{ "reimbursement_policies": { "Ciplar": {
            "eligible_diagnoses": [],
            "insurance_coverage": { "goverment": { "coverage_percent": 50, "max_amount": 1 } }
        } } }"#;
        match PolicyTable::from_json_str(json) {
            Err(RxPolicyError::ConfigError { reason }) => {
                assert!(reason.contains("goverment"), "got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_inconsistent_record_names_the_drug() {
        let json = r#"{ "trial_policies": { "Ciplar": {
            "min_age": 80, "max_age": 18, "eligible_diagnoses": []
        } } }"#;
        match PolicyTable::from_json_str(json) {
            Err(RxPolicyError::ConfigError { reason }) => {
                assert!(reason.contains("Ciplar"), "got: {reason}");
                assert!(reason.contains("min_age"), "got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let path = PathBuf::from("/definitely/not/here/policies.json");
        match PolicyTable::from_file(&path) {
            Err(RxPolicyError::ConfigError { reason }) => {
                assert!(reason.contains("failed to read policy file"), "got: {reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_from_file_dispatches_on_extension() {
        let toml_path = temp_rules(
            "dispatch.toml",
            "[trial_policies.Ciplar]\nmin_age = 1\nmax_age = 2\neligible_diagnoses = []\n",
        );
        let table = PolicyTable::from_file(&toml_path).unwrap();
        assert_eq!(table.trial_count(), 1);

        let json_path = temp_rules("dispatch.json", JSON_RULES);
        let table = PolicyTable::from_file(&json_path).unwrap();
        assert_eq!(table.reimbursement_count(), 2);

        let _ = std::fs::remove_file(toml_path);
        let _ = std::fs::remove_file(json_path);
    }

    // ── 4. cache ──────────────────────────────────────────────────────────────

    #[test]
    fn test_cache_loads_once_and_shares_snapshot() {
        let cache = CachedRuleStore::new(RuleSource::Json(JSON_RULES.into()));
        assert!(!cache.is_loaded());

        let first = cache.snapshot().unwrap();
        let second = cache.snapshot().unwrap();
        assert!(cache.is_loaded());
        assert!(Arc::ptr_eq(&first, &second), "snapshots must share one table");
    }

    #[test]
    fn test_cache_invalidate_reloads_from_source() {
        let path = temp_rules("reload.json", JSON_RULES);
        let cache = CachedRuleStore::new(RuleSource::File(path.clone()));

        let before = cache.snapshot().unwrap();
        assert_eq!(before.reimbursement_count(), 2);

        std::fs::write(&path, r#"{ "trial_policies": {} }"#).unwrap();

        // Without invalidation the old table is still served.
        assert_eq!(cache.snapshot().unwrap().reimbursement_count(), 2);

        cache.invalidate();
        let after = cache.snapshot().unwrap();
        assert_eq!(after.reimbursement_count(), 0);

        // The snapshot taken before the reload is untouched.
        assert_eq!(before.reimbursement_count(), 2);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_cache_failed_load_is_retried() {
        let path = temp_rules("retry.json", "{ broken");
        let cache = CachedRuleStore::new(RuleSource::File(path.clone()));

        assert!(cache.snapshot().is_err());
        assert!(!cache.is_loaded());

        std::fs::write(&path, JSON_RULES).unwrap();
        assert_eq!(cache.snapshot().unwrap().trial_count(), 1);

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_cache_shared_across_threads() {
        let cache = Arc::new(CachedRuleStore::new(RuleSource::Json(JSON_RULES.into())));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.snapshot().unwrap())
            })
            .collect();
        let tables: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for table in &tables[1..] {
            assert!(Arc::ptr_eq(&tables[0], table));
        }
    }
}
