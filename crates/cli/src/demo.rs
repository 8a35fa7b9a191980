//! Built-in sample data for `qekit merge demo`, `qekit drift` and
//! `qekit claims` when no files are given.

use qekit_merge::{MergeError, Table, Value};

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().copied().map(Value::Int).collect()
}

fn texts(values: &[&str]) -> Vec<Value> {
    values.iter().copied().map(Value::from).collect()
}

pub fn departments() -> Result<Table, MergeError> {
    Table::from_columns(vec![("id", ints(&[1, 2, 3])), ("dept", texts(&["HR", "IT", "FIN"]))])
}

pub fn salaries() -> Result<Table, MergeError> {
    Table::from_columns(vec![("id", ints(&[1, 2, 4])), ("salary", ints(&[50, 60, 80]))])
}

pub fn bonuses() -> Result<Table, MergeError> {
    Table::from_columns(vec![("id", ints(&[1, 3, 4])), ("bonus", ints(&[5, 7, 9]))])
}

pub fn locations() -> Result<Table, MergeError> {
    Table::from_columns(vec![("id", ints(&[2, 3, 5])), ("location", texts(&["NY", "SF", "CHI"]))])
}

pub fn grades() -> Result<Table, MergeError> {
    Table::from_columns(vec![("id", ints(&[1, 2, 3, 6])), ("grade", texts(&["A", "B", "C", "D"]))])
}

pub fn managers() -> Result<Table, MergeError> {
    Table::from_columns(vec![
        ("id", ints(&[1, 3, 5, 6])),
        ("manager", texts(&["M1", "M2", "M3", "M4"])),
    ])
}

/// The six staff tables, in fold order.
pub fn staff_tables() -> Result<Vec<Table>, MergeError> {
    Ok(vec![departments()?, salaries()?, bonuses()?, locations()?, grades()?, managers()?])
}

/// Two tables keyed on `(region, quarter)`; the second lists its key columns
/// in the opposite order.
pub fn regional_tables() -> Result<Vec<Table>, MergeError> {
    let sales = Table::from_columns(vec![
        ("region", texts(&["east", "east", "west"])),
        ("quarter", texts(&["Q1", "Q2", "Q1"])),
        ("revenue", ints(&[120, 135, 90])),
    ])?;
    let targets = Table::from_columns(vec![
        ("quarter", texts(&["Q1", "Q2", "Q2"])),
        ("region", texts(&["east", "east", "west"])),
        ("target", ints(&[100, 140, 95])),
    ])?;
    Ok(vec![sales, targets])
}

pub fn legacy_rules() -> Result<Table, MergeError> {
    Table::from_columns(vec![
        ("Drug", texts(&["Atorvastatin", "Metformin", "Lisinopril"])),
        (
            "RuleText",
            texts(&[
                "Requires prior authorization if quantity > 30",
                "Step therapy required if generic available",
                "Max allowed 90 units per 90 days",
            ]),
        ),
    ])
}

pub fn new_rules() -> Result<Table, MergeError> {
    Table::from_columns(vec![
        ("Drug", texts(&["Atorvastatin", "Metformin", "Lisinopril"])),
        (
            "RuleText",
            texts(&[
                "Requires prior authorization if quantity > 60",
                "No step therapy requirement",
                "Max allowed 90 units per 30 days",
            ]),
        ),
    ])
}

pub fn sample_claims() -> Result<Table, MergeError> {
    Table::from_columns(vec![
        ("ClaimID", ints(&[101, 102, 103])),
        ("BilledAmount", ints(&[500, 1200, 300])),
        ("PlanDeductible", ints(&[200, 500, 100])),
        ("PlanCopay", ints(&[50, 100, 25])),
        ("PlanOOPMax", ints(&[1000, 2000, 500])),
    ])
}
