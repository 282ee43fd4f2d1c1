//! rxpolicy: trial and reimbursement policy evaluator CLI
//!
//! Evaluates one request against a rule file and prints the resulting card
//! envelope as JSON.
//!
//! Usage:
//!   cargo run -p rxpolicy-cli -- reimbursement --drug Ciplar --diagnosis hypertension \
//!       --insurance corporate --claim 5000
//!   cargo run -p rxpolicy-cli -- trial --drug Ciplar --diagnosis hypertension --age 70
//!   cargo run -p rxpolicy-cli -- --policies crates/rxpolicy-service/data/policies.json check

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use rxpolicy_audit::InMemoryAuditLog;
use rxpolicy_contracts::request::{ReimbursementRequest, ReportRequest, TrialRequest};
use rxpolicy_core::traits::RuleStore;
use rxpolicy_service::{sample::sample_source, PolicyService};
use rxpolicy_store::{CachedRuleStore, RuleSource};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Rule-based trial eligibility and reimbursement evaluation.
#[derive(Parser)]
#[command(
    name = "rxpolicy",
    about = "Evaluate trial eligibility and reimbursement against a static rule table",
    long_about = "Evaluates trial-eligibility and reimbursement requests against a per-drug\n\
                  rule table and prints the resulting card envelope as JSON."
)]
struct Cli {
    /// Rule file (JSON, or TOML by extension).  Defaults to $RXPOLICY_POLICIES,
    /// then the bundled sample table.
    #[arg(long, global = true)]
    policies: Option<PathBuf>,

    /// Print the audit log and its integrity after the command.
    #[arg(long, global = true)]
    show_audit: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct DrugArgs {
    /// Drug name, matched exactly.
    #[arg(long)]
    drug: String,
    /// Diagnosis key, matched exactly.
    #[arg(long)]
    diagnosis: String,
}

#[derive(Args)]
struct ClaimArgs {
    /// Insurance type: government, corporate, or private.
    #[arg(long)]
    insurance: String,
    /// Claim amount.
    #[arg(long)]
    claim: Decimal,
}

#[derive(Args)]
struct PatientArgs {
    /// Patient age in years.
    #[arg(long)]
    age: u32,
    /// Prior treatments, comma-separated.
    #[arg(long = "prior", value_delimiter = ',')]
    prior_treatments: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate trial eligibility.
    Trial {
        #[command(flatten)]
        drug: DrugArgs,
        #[command(flatten)]
        patient: PatientArgs,
    },
    /// Evaluate reimbursement.
    Reimbursement {
        #[command(flatten)]
        drug: DrugArgs,
        #[command(flatten)]
        claim: ClaimArgs,
    },
    /// Generate a combined trial + reimbursement report.
    Report {
        #[command(flatten)]
        drug: DrugArgs,
        #[command(flatten)]
        patient: PatientArgs,
        #[command(flatten)]
        claim: ClaimArgs,
    },
    /// Show the coverage display slot for a reimbursement request.
    Coverage {
        #[command(flatten)]
        drug: DrugArgs,
        #[command(flatten)]
        claim: ClaimArgs,
    },
    /// Load the rule table and list the drugs it covers.
    Check,
    /// Print the engine health report.
    Health,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for per-evaluation logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("rxpolicy error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let source = match cli.policies {
        Some(path) => RuleSource::File(path),
        None => RuleSource::from_env_or(sample_source()),
    };

    let audit = InMemoryAuditLog::new();
    let service = PolicyService::new(Arc::new(CachedRuleStore::new(source)))
        .with_audit(Arc::new(audit.clone()));

    match cli.command {
        Command::Trial { drug, patient } => {
            let req = TrialRequest {
                drug_name: drug.drug,
                diagnosis: drug.diagnosis,
                patient_age: patient.age,
                prior_treatments: patient.prior_treatments,
            };
            print_json(&service.trial_evaluation(&req)?)?;
        }
        Command::Reimbursement { drug, claim } => {
            print_json(&service.reimbursement_evaluation(&reimbursement_request(drug, claim))?)?;
        }
        Command::Report { drug, patient, claim } => {
            let req = ReportRequest {
                drug_name: drug.drug,
                diagnosis: drug.diagnosis,
                patient_age: patient.age,
                insurance_type: claim.insurance,
                claim_amount: claim.claim,
                prior_treatments: patient.prior_treatments,
            };
            print_json(&service.report_generate(&req)?)?;
        }
        Command::Coverage { drug, claim } => {
            let display = service.coverage(&reimbursement_request(drug, claim))?;
            print_json(&display)?;
        }
        Command::Check => check(&service)?,
        Command::Health => print_json(&service.health())?,
    }

    if cli.show_audit {
        println!();
        let integrity = if audit.verify_integrity() { "ok" } else { "BROKEN" };
        println!("Audit log ({} entries, integrity {}):", audit.len(), integrity);
        print_json(&audit.export_log())?;
    }

    Ok(())
}

fn reimbursement_request(drug: DrugArgs, claim: ClaimArgs) -> ReimbursementRequest {
    ReimbursementRequest {
        drug_name: drug.drug,
        diagnosis: drug.diagnosis,
        insurance_type: claim.insurance,
        claim_amount: claim.claim,
    }
}

fn check(service: &PolicyService) -> Result<(), Box<dyn Error>> {
    let table = service.rules().snapshot()?;
    println!("Rule source: {}", service.rules().source().describe());
    println!(
        "{} trial policies, {} reimbursement policies",
        table.trial_count(),
        table.reimbursement_count()
    );
    println!();
    for drug in table.drug_names() {
        let trial = if table.trial_policy(drug).is_some() { "trial" } else { "-" };
        let reimbursement = match table.reimbursement_policy(drug) {
            Some(policy) => policy
                .insurance_coverage
                .keys()
                .map(|scheme| scheme.as_str())
                .collect::<Vec<_>>()
                .join(","),
            None => "-".to_string(),
        };
        println!("  {:<20} {:<6} {}", drug, trial, reimbursement);
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
