//! `qekit claims`: expected member/plan split per claim.

use std::path::PathBuf;

use qekit_rules::{adjudicate_claims, outcomes_table, ClaimColumns, ClaimOutcome, RulesError};

use crate::demo;
use crate::drift::read_table;
use crate::exit_codes::{merge_exit_code, rules_exit_code, EXIT_ERROR};
use crate::CliError;

#[derive(clap::Args)]
#[command(after_help = "\
Amounts are in currency units. With no file, adjudicates three sample claims.

Examples:
  qekit claims
  qekit claims claims.csv --billed-default 500
  qekit claims claims.csv --json")]
pub struct ClaimsArgs {
    /// Claims CSV with ClaimID, BilledAmount, PlanDeductible, PlanCopay, PlanOOPMax
    file: Option<PathBuf>,

    /// Billed amount used where BilledAmount is empty
    #[arg(long, value_name = "AMOUNT")]
    billed_default: Option<f64>,

    /// Output outcomes as JSON (amounts in cents)
    #[arg(long)]
    json: bool,
}

pub fn cmd_claims(args: ClaimsArgs) -> Result<(), CliError> {
    let table = match &args.file {
        Some(path) => read_table("claims", path)?,
        None => demo::sample_claims()
            .map_err(|e| CliError { code: merge_exit_code(&e), message: e.to_string(), hint: None })?,
    };

    let columns = ClaimColumns {
        billed_default: args.billed_default,
        ..ClaimColumns::default()
    };
    let outcomes = adjudicate_claims(&table, &columns).map_err(rules_err)?;

    if args.json {
        let json_str = serde_json::to_string_pretty(&outcomes)
            .map_err(|e| CliError { code: EXIT_ERROR, message: format!("JSON serialization error: {e}"), hint: None })?;
        println!("{json_str}");
    } else {
        print!("{}", outcomes_table(&outcomes).map_err(rules_err)?);
    }

    let (member, plan) = totals(&outcomes).map_err(rules_err)?;
    eprintln!(
        "{} claim(s): member pays {:.2}, plan pays {:.2}",
        outcomes.len(),
        member as f64 / 100.0,
        plan as f64 / 100.0
    );
    Ok(())
}

fn totals(outcomes: &[ClaimOutcome]) -> Result<(i64, i64), RulesError> {
    outcomes.iter().try_fold((0i64, 0i64), |(m, p), o| {
        let member = m.checked_add(o.adjudication.member_pays_cents);
        let plan = p.checked_add(o.adjudication.plan_pays_cents);
        member.zip(plan).ok_or_else(|| RulesError::AmountOutOfRange {
            row: None,
            detail: "claim totals".into(),
        })
    })
}

fn rules_err(err: RulesError) -> CliError {
    let hint = match &err {
        RulesError::NotNumeric { column, .. } if column == &ClaimColumns::default().billed => {
            Some("use --billed-default to fill empty billed amounts".to_string())
        }
        _ => None,
    };
    CliError { code: rules_exit_code(&err), message: err.to_string(), hint }
}
