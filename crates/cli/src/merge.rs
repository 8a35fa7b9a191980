//! `qekit merge`: config-driven N-way keyed table merges.

use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};
use qekit_merge::config::MergeConfig;
use qekit_merge::io::{load_csv_table, write_csv};
use qekit_merge::{merge_pair, merge_tables, CollisionPolicy, JoinKey, JoinPolicy, MergeInput, MergePlan, Table};

use crate::demo;
use crate::exit_codes::{merge_exit_code, EXIT_ERROR, EXIT_IO};
use crate::CliError;

#[derive(Subcommand)]
pub enum MergeCommands {
    /// Merge the tables listed in a TOML config file
    #[command(after_help = "\
Examples:
  qekit merge run staff.merge.toml
  qekit merge run staff.merge.toml --json
  qekit merge run staff.merge.toml --output result.json")]
    Run {
        /// Path to the .merge.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of the merged table
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a merge config without running
    #[command(after_help = "\
Examples:
  qekit merge validate staff.merge.toml")]
    Validate {
        /// Path to the .merge.toml config file
        config: PathBuf,
    },

    /// Merge the built-in staff tables
    #[command(after_help = "\
Examples:
  qekit merge demo
  qekit merge demo --strategy mixed
  qekit merge demo --strategy multi-key --json")]
    Demo {
        /// How to combine the sample tables
        #[arg(long, value_enum, default_value = "reduce")]
        strategy: Strategy,

        /// Output the merged table as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Strategy {
    /// Chained pairwise outer merges
    Sequential,
    /// One outer fold over all six tables
    Reduce,
    /// Fold with inner, left, outer, inner, left
    Mixed,
    /// Two-column key
    MultiKey,
}

pub fn cmd_merge(cmd: MergeCommands) -> Result<(), CliError> {
    match cmd {
        MergeCommands::Run { config, json, output } => cmd_merge_run(config, json, output),
        MergeCommands::Validate { config } => cmd_merge_validate(config),
        MergeCommands::Demo { strategy, json } => cmd_merge_demo(strategy, json),
    }
}

fn merge_err(err: qekit_merge::MergeError) -> CliError {
    CliError { code: merge_exit_code(&err), message: err.to_string(), hint: None }
}

fn io_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_IO, message: msg.into(), hint: None }
}

fn load_config(config_path: &Path) -> Result<MergeConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| io_err(format!("cannot read config: {e}")))?;
    MergeConfig::from_toml(&config_str).map_err(merge_err)
}

fn cmd_merge_run(config_path: PathBuf, json_output: bool, output_file: Option<PathBuf>) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    // Resolve file paths relative to the config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let mut tables = Vec::with_capacity(config.tables.len());
    for spec in &config.tables {
        let csv_path = base_dir.join(&spec.file);
        let csv_data = std::fs::read_to_string(&csv_path)
            .map_err(|e| io_err(format!("cannot read {}: {e}", csv_path.display())))?;
        let table = load_csv_table(&spec.name, &csv_data).map_err(merge_err)?;
        log::debug!("loaded '{}': {} row(s)", spec.name, table.row_count());
        tables.push((spec.name.clone(), table));
    }

    let input = MergeInput { tables };
    let result = qekit_merge::run(&config, &input).map_err(merge_err)?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError { code: EXIT_ERROR, message: format!("JSON serialization error: {e}"), hint: None })?;

    // --output wins over the config's [output] json path
    let json_path = output_file.or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    if let Some(ref path) = json_path {
        std::fs::write(path, &json_str).map_err(|e| io_err(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }
    if let Some(ref csv_file) = config.output.csv {
        let path = base_dir.join(csv_file);
        let csv = write_csv(&result.table).map_err(merge_err)?;
        std::fs::write(&path, csv).map_err(|e| io_err(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    } else {
        print!("{}", result.table);
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{}: {} table(s), {} input row(s) -> {} row(s) x {} column(s), {} renamed",
        result.meta.config_name, s.input_tables, s.input_rows, s.output_rows, s.output_columns, s.renamed_columns,
    );
    for step in &result.steps {
        let st = &step.stats;
        eprintln!(
            "  step {} {:<5} {}: {} matched, {} left-only, {} right-only key(s) -> {} row(s)",
            st.step, st.policy.to_string(), step.table, st.matched_keys, st.left_only_keys, st.right_only_keys, st.output_rows,
        );
    }

    Ok(())
}

fn cmd_merge_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let plan = config.plan().map_err(merge_err)?;
    let steps = config.tables.len().saturating_sub(1);
    let policies: Vec<String> = (0..steps)
        .filter_map(|i| plan.policy_for(i))
        .map(|p| p.to_string())
        .collect();

    eprintln!("config OK: {}", config.name);
    eprintln!("  key: {}", config.key.join(", "));
    eprintln!(
        "  tables: {}",
        config.tables.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(" -> ")
    );
    if !policies.is_empty() {
        eprintln!("  policies: {}", policies.join(", "));
    }
    Ok(())
}

fn cmd_merge_demo(strategy: Strategy, json_output: bool) -> Result<(), CliError> {
    let (title, table) = demo_merge(strategy).map_err(merge_err)?;

    if json_output {
        let json_str = serde_json::to_string_pretty(&table)
            .map_err(|e| CliError { code: EXIT_ERROR, message: format!("JSON serialization error: {e}"), hint: None })?;
        println!("{json_str}");
    } else {
        println!("{title}:");
        print!("{table}");
    }
    Ok(())
}

pub(crate) fn demo_merge(strategy: Strategy) -> Result<(&'static str, Table), qekit_merge::MergeError> {
    let id = JoinKey::single("id");
    let suffix = CollisionPolicy::default();

    match strategy {
        Strategy::Sequential => {
            let tables = demo::staff_tables()?;
            let mut acc = tables[0].clone();
            for table in &tables[1..] {
                acc = merge_pair(&acc, table, &id, JoinPolicy::Outer, &suffix)?;
            }
            Ok(("Sequential merge result", acc))
        }
        Strategy::Reduce => {
            let table = merge_tables(&demo::staff_tables()?, &id, &JoinPolicy::Outer.into(), &suffix)?;
            Ok(("Reduce merge result", table))
        }
        Strategy::Mixed => {
            use JoinPolicy::{Inner, Left, Outer};
            let plan = MergePlan::Steps(vec![Inner, Left, Outer, Inner, Left]);
            let table = merge_tables(&demo::staff_tables()?, &id, &plan, &suffix)?;
            Ok(("Mixed join result", table))
        }
        Strategy::MultiKey => {
            let key = JoinKey::new(["region", "quarter"])?;
            let table = merge_tables(&demo::regional_tables()?, &key, &JoinPolicy::Outer.into(), &suffix)?;
            Ok(("Multi-key merge result", table))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qekit_merge::Value;

    #[test]
    fn sequential_and_reduce_agree() {
        let (_, seq) = demo_merge(Strategy::Sequential).unwrap();
        let (_, red) = demo_merge(Strategy::Reduce).unwrap();
        assert_eq!(seq, red);
        assert_eq!(red.row_count(), 6);
        assert_eq!(red.column_count(), 7);
    }

    #[test]
    fn mixed_keeps_three_ids() {
        let (_, t) = demo_merge(Strategy::Mixed).unwrap();
        let ids: Vec<Value> = t.column("id").unwrap().cloned().collect();
        assert_eq!(ids, vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    }

    #[test]
    fn multi_key_outer() {
        let (_, t) = demo_merge(Strategy::MultiKey).unwrap();
        assert_eq!(t.columns(), &["region", "quarter", "revenue", "target"]);
        // Sorted by region then quarter; west/Q2 exists only in targets.
        assert_eq!(t.row_count(), 4);
        assert_eq!(t.get(2, "target"), Some(&Value::Null));
        assert_eq!(t.get(3, "region"), Some(&Value::from("west")));
        assert_eq!(t.get(3, "revenue"), Some(&Value::Null));
    }
}
