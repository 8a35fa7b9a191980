use std::path::PathBuf;

use qekit_merge::config::MergeConfig;
use qekit_merge::engine::run;
use qekit_merge::io::{load_csv_table, write_csv};
use qekit_merge::model::{MergeInput, MergeResult};
use qekit_merge::{JoinPolicy, MergeError, Value};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_input(config: &MergeConfig) -> MergeInput {
    let dir = fixtures_dir();
    let mut tables = Vec::new();
    for spec in &config.tables {
        let csv_path = dir.join(&spec.file);
        let csv_data = std::fs::read_to_string(&csv_path)
            .unwrap_or_else(|e| panic!("cannot read {}: {e}", csv_path.display()));
        tables.push((spec.name.clone(), load_csv_table(&spec.name, &csv_data).unwrap()));
    }
    MergeInput { tables }
}

fn load_and_run(config_toml: &str) -> MergeResult {
    let config = MergeConfig::from_toml(config_toml).unwrap();
    let input = load_input(&config);
    run(&config, &input).unwrap()
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_dir().join(name)).unwrap()
}

fn row(values: &[Value]) -> Vec<Value> {
    values.to_vec()
}

// -------------------------------------------------------------------------
// Six-table folds
// -------------------------------------------------------------------------

#[test]
fn outer_fold_keeps_every_id() {
    let result = load_and_run(&fixture("staff-outer.merge.toml"));
    let t = &result.table;

    assert_eq!(
        t.columns(),
        &["id", "dept", "salary", "bonus", "location", "grade", "manager"]
    );
    let ids: Vec<Value> = t.column("id").unwrap().cloned().collect();
    assert_eq!(ids, (1..=6).map(Value::Int).collect::<Vec<_>>());

    use Value::Null;
    assert_eq!(
        t.rows()[3],
        row(&[Value::Int(4), Null, Value::Int(80), Value::Int(9), Null, Null, Null])
    );
    assert_eq!(
        t.rows()[5],
        row(&[Value::Int(6), Null, Null, Null, Null, "D".into(), "M4".into()])
    );

    assert_eq!(result.summary.input_tables, 6);
    assert_eq!(result.summary.input_rows, 20);
    assert_eq!(result.summary.output_rows, 6);
    assert_eq!(result.summary.renamed_columns, 0);

    assert_eq!(result.steps.len(), 5);
    let first = &result.steps[0];
    assert_eq!(first.table, "salaries");
    assert_eq!(first.stats.policy, JoinPolicy::Outer);
    assert_eq!(first.stats.matched_keys, 2);
    assert_eq!(first.stats.left_only_keys, 1);
    assert_eq!(first.stats.right_only_keys, 1);
}

#[test]
fn mixed_fold_matches_step_policies() {
    let result = load_and_run(&fixture("staff-mixed.merge.toml"));
    let t = &result.table;

    use Value::Null;
    assert_eq!(
        t.rows(),
        &[
            row(&[Value::Int(1), "HR".into(), Value::Int(50), Value::Int(5), Null, "A".into(), "M1".into()]),
            row(&[Value::Int(2), "IT".into(), Value::Int(60), Null, "NY".into(), "B".into(), Null]),
            row(&[Value::Int(3), Null, Null, Null, "SF".into(), "C".into(), "M2".into()]),
        ]
    );

    let policies: Vec<JoinPolicy> = result.steps.iter().map(|s| s.stats.policy).collect();
    assert_eq!(
        policies,
        vec![
            JoinPolicy::Inner,
            JoinPolicy::Left,
            JoinPolicy::Outer,
            JoinPolicy::Inner,
            JoinPolicy::Left
        ]
    );
    // Inner step against grades drops id 5 that the outer step introduced.
    assert_eq!(result.steps[2].stats.output_rows, 4);
    assert_eq!(result.steps[3].stats.output_rows, 3);
}

#[test]
fn config_order_drives_fold_not_load_order() {
    let config = MergeConfig::from_toml(&fixture("staff-mixed.merge.toml")).unwrap();
    let mut input = load_input(&config);
    input.tables.reverse();
    let result = run(&config, &input).unwrap();
    assert_eq!(result.steps[0].table, "salaries");
    assert_eq!(result.table.row_count(), 3);
}

#[test]
fn summary_counts_only_folded_tables() {
    let config = MergeConfig::from_toml(&fixture("staff-mixed.merge.toml")).unwrap();
    let mut input = load_input(&config);
    let baseline = run(&config, &input).unwrap().summary;
    input
        .tables
        .push(("unused".to_string(), load_csv_table("unused", "id,z\n1,1\n2,2\n3,3\n").unwrap()));

    let result = run(&config, &input).unwrap();
    assert_eq!(result.summary.input_tables, 6);
    assert_eq!(result.summary.input_tables, baseline.input_tables);
    assert_eq!(result.summary.input_rows, baseline.input_rows);
    assert!(result.table.column_index("z").is_none());
}

#[test]
fn missing_table_data_is_invalid_input() {
    let config = MergeConfig::from_toml(&fixture("staff-outer.merge.toml")).unwrap();
    let mut input = load_input(&config);
    input.tables.retain(|(name, _)| name != "grades");
    let err = run(&config, &input).unwrap_err();
    assert!(err.is_invalid_input());
    assert!(err.to_string().contains("'grades'"));
}

// -------------------------------------------------------------------------
// Collisions
// -------------------------------------------------------------------------

const COLLIDING: &str = r#"
name = "Colliding"
key = ["id"]
policy = "inner"

[collisions]
mode = "MODE"

[[tables]]
name = "departments"
file = "departments.csv"

[[tables]]
name = "departments_again"
file = "departments.csv"
"#;

#[test]
fn reject_mode_fails_fast() {
    let config = MergeConfig::from_toml(&COLLIDING.replace("MODE", "reject")).unwrap();
    let input = load_input(&config);
    let err = run(&config, &input).unwrap_err();
    assert_eq!(
        err,
        MergeError::AmbiguousColumn {
            column: "dept".into(),
            step: 1
        }
    );
}

#[test]
fn suffix_mode_renames_both_sides() {
    let result = load_and_run(&COLLIDING.replace("MODE", "suffix"));
    assert_eq!(result.table.columns(), &["id", "dept_x", "dept_y"]);
    assert_eq!(result.summary.renamed_columns, 1);
    assert_eq!(result.steps[0].stats.renamed[0].column, "dept");
}

// -------------------------------------------------------------------------
// Output
// -------------------------------------------------------------------------

#[test]
fn result_serializes_table_and_steps() {
    let result = load_and_run(&fixture("staff-mixed.merge.toml"));
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["meta"]["config_name"], "Staff roll-up (mixed)");
    assert_eq!(json["meta"]["key"][0], "id");
    assert_eq!(json["steps"][0]["table"], "salaries");
    assert_eq!(json["steps"][0]["policy"], "inner");
    assert_eq!(json["table"]["rows"][2][1], serde_json::Value::Null);
}

#[test]
fn merged_csv_round_trips() {
    let result = load_and_run(&fixture("staff-mixed.merge.toml"));
    let csv = write_csv(&result.table).unwrap();
    assert!(csv.starts_with("id,dept,salary,bonus,location,grade,manager\n"));
    let reloaded = load_csv_table("merged", &csv).unwrap();
    assert_eq!(reloaded, result.table);
}
