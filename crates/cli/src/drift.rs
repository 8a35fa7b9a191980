//! `qekit drift`: legacy vs new rule text similarity.

use std::path::{Path, PathBuf};

use qekit_merge::io::load_csv_table;
use qekit_merge::Table;
use qekit_rules::{detect_drift, DriftOptions, DriftReport, DriftStatus};

use crate::demo;
use crate::exit_codes::{merge_exit_code, rules_exit_code, EXIT_ERROR, EXIT_IO};
use crate::util::{bar, column_width, pad_right};
use crate::CliError;

const BAR_WIDTH: usize = 40;

#[derive(clap::Args)]
#[command(after_help = "\
With no files, compares the built-in sample formulary rules.

Examples:
  qekit drift
  qekit drift legacy.csv new.csv --threshold 0.95
  qekit drift legacy.csv new.csv --key NDC --text Rule --json")]
pub struct DriftArgs {
    /// Legacy rules CSV
    #[arg(requires = "new")]
    legacy: Option<PathBuf>,

    /// New rules CSV
    new: Option<PathBuf>,

    /// Similarity below which a rule is reported as changed
    #[arg(long, env = "QEKIT_DRIFT_THRESHOLD", default_value_t = qekit_rules::drift::DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Column identifying a rule
    #[arg(long, default_value = "Drug")]
    key: String,

    /// Column holding the rule text
    #[arg(long, default_value = "RuleText")]
    text: String,

    /// Output the report as JSON
    #[arg(long)]
    json: bool,
}

pub fn cmd_drift(args: DriftArgs) -> Result<(), CliError> {
    let (legacy, new) = match (&args.legacy, &args.new) {
        (Some(l), Some(n)) => (read_table("legacy", l)?, read_table("new", n)?),
        _ => {
            let sample = demo::legacy_rules().and_then(|l| Ok((l, demo::new_rules()?)));
            sample.map_err(|e| CliError { code: merge_exit_code(&e), message: e.to_string(), hint: None })?
        }
    };

    let options = DriftOptions {
        key_column: args.key.clone(),
        text_column: args.text.clone(),
        threshold: args.threshold,
    };
    let report = detect_drift(&legacy, &new, &options).map_err(rules_err)?;

    if args.json {
        let json_str = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError { code: EXIT_ERROR, message: format!("JSON serialization error: {e}"), hint: None })?;
        println!("{json_str}");
    } else {
        let table = report.to_table(&args.key).map_err(rules_err)?;
        print!("{table}");
    }

    eprint!("{}", render_chart(&report));
    let s = &report.summary;
    eprintln!(
        "{} rule(s) at threshold {}: {} same, {} changed, {} removed, {} added",
        s.total, report.threshold, s.same, s.changed, s.removed, s.added,
    );
    Ok(())
}

pub(crate) fn read_table(name: &str, path: &Path) -> Result<Table, CliError> {
    let data = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_IO,
        message: format!("cannot read {}: {e}", path.display()),
        hint: None,
    })?;
    load_csv_table(name, &data).map_err(|e| CliError { code: merge_exit_code(&e), message: e.to_string(), hint: None })
}

fn rules_err(err: qekit_rules::RulesError) -> CliError {
    let hint = match &err {
        qekit_rules::RulesError::MissingColumn { .. } => Some("set the column names with --key and --text".to_string()),
        _ => None,
    };
    CliError { code: rules_exit_code(&err), message: err.to_string(), hint }
}

/// One bar per rule, scaled to similarity. Rules present on one side only
/// get a label instead of a bar.
fn render_chart(report: &DriftReport) -> String {
    let labels: Vec<String> = report.rows.iter().map(|r| r.key.to_string()).collect();
    let width = column_width(labels.iter().map(String::as_str), 4);

    let mut out = String::new();
    for (label, row) in labels.iter().zip(&report.rows) {
        let line = match row.similarity {
            Some(sim) => format!(
                "{}  {} {:.2} {}",
                pad_right(label, width),
                pad_right(&bar(sim, BAR_WIDTH), BAR_WIDTH),
                sim,
                row.status
            ),
            None => {
                let note = match row.status {
                    DriftStatus::Removed => "(only in legacy)",
                    _ => "(only in new)",
                };
                format!("{}  {} {}", pad_right(label, width), pad_right(note, BAR_WIDTH), row.status)
            }
        };
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
