use qekit_merge::{Table, Value};
use serde::Serialize;

use crate::error::RulesError;

/// Member cost-sharing terms of a plan, in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanTerms {
    pub deductible_cents: i64,
    pub copay_cents: i64,
    pub oop_max_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Adjudication {
    pub member_pays_cents: i64,
    pub plan_pays_cents: i64,
}

/// Illustrative split of a billed amount: the member owes deductible plus
/// copay, capped at the out-of-pocket maximum; the plan owes the rest.
///
/// `plan_pays_cents` goes negative when the member share exceeds the bill.
/// Fails when an intermediate sum leaves the `i64` range.
pub fn adjudicate(billed_cents: i64, terms: &PlanTerms) -> Result<Adjudication, RulesError> {
    let member = terms
        .copay_cents
        .checked_add(terms.deductible_cents)
        .ok_or_else(|| out_of_range("copay + deductible"))?
        .min(terms.oop_max_cents);
    let plan = billed_cents
        .checked_sub(member)
        .ok_or_else(|| out_of_range("billed - member share"))?;
    Ok(Adjudication {
        member_pays_cents: member,
        plan_pays_cents: plan,
    })
}

fn out_of_range(detail: &str) -> RulesError {
    RulesError::AmountOutOfRange { row: None, detail: detail.into() }
}

/// Column names of a claims table.
#[derive(Debug, Clone)]
pub struct ClaimColumns {
    /// Row position is used as the claim id when this column is absent.
    pub claim_id: String,
    pub billed: String,
    pub deductible: String,
    pub copay: String,
    pub oop_max: String,
    /// Billed amount (currency units) used for empty billed cells.
    pub billed_default: Option<f64>,
}

impl Default for ClaimColumns {
    fn default() -> Self {
        Self {
            claim_id: "ClaimID".into(),
            billed: "BilledAmount".into(),
            deductible: "PlanDeductible".into(),
            copay: "PlanCopay".into(),
            oop_max: "PlanOOPMax".into(),
            billed_default: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimOutcome {
    pub claim_id: Value,
    pub billed_cents: i64,
    #[serde(flatten)]
    pub adjudication: Adjudication,
}

/// Adjudicate every row of a claims table. Amount cells are in whole
/// currency units and are converted to cents.
pub fn adjudicate_claims(table: &Table, columns: &ClaimColumns) -> Result<Vec<ClaimOutcome>, RulesError> {
    let idx = |name: &str| {
        table.column_index(name).ok_or_else(|| RulesError::MissingColumn {
            table: "claims".into(),
            column: name.into(),
        })
    };
    let billed_idx = idx(&columns.billed)?;
    let deductible_idx = idx(&columns.deductible)?;
    let copay_idx = idx(&columns.copay)?;
    let oop_idx = idx(&columns.oop_max)?;
    let id_idx = table.column_index(&columns.claim_id);

    let mut outcomes = Vec::with_capacity(table.row_count());
    for (i, row) in table.rows().iter().enumerate() {
        let billed = match (&row[billed_idx], columns.billed_default) {
            (Value::Null, Some(default)) => to_cents(default).ok_or_else(|| RulesError::AmountOutOfRange {
                row: Some(i),
                detail: format!("default billed amount {default}"),
            })?,
            (v, _) => cents(v, i, &columns.billed)?,
        };
        let terms = PlanTerms {
            deductible_cents: cents(&row[deductible_idx], i, &columns.deductible)?,
            copay_cents: cents(&row[copay_idx], i, &columns.copay)?,
            oop_max_cents: cents(&row[oop_idx], i, &columns.oop_max)?,
        };
        let claim_id = match id_idx {
            Some(c) => row[c].clone(),
            None => Value::Int(i as i64),
        };

        outcomes.push(ClaimOutcome {
            claim_id,
            billed_cents: billed,
            adjudication: adjudicate(billed, &terms).map_err(|e| match e {
                RulesError::AmountOutOfRange { detail, .. } => RulesError::AmountOutOfRange { row: Some(i), detail },
                other => other,
            })?,
        });
    }
    log::debug!("adjudicated {} claim(s)", outcomes.len());
    Ok(outcomes)
}

/// Claims rendered in currency units: id, billed, member and plan share.
pub fn outcomes_table(outcomes: &[ClaimOutcome]) -> Result<Table, RulesError> {
    let rows = outcomes
        .iter()
        .map(|o| {
            vec![
                o.claim_id.clone(),
                units(o.billed_cents),
                units(o.adjudication.member_pays_cents),
                units(o.adjudication.plan_pays_cents),
            ]
        })
        .collect();
    let columns = ["ClaimID", "Billed", "ExpectedMemberPay", "ExpectedPlanPay"]
        .into_iter()
        .map(String::from)
        .collect();
    Ok(Table::new(columns, rows)?)
}

fn cents(v: &Value, row: usize, column: &str) -> Result<i64, RulesError> {
    let units = v.as_f64().ok_or_else(|| RulesError::NotNumeric {
        row,
        column: column.into(),
        value: v.to_string(),
    })?;
    to_cents(units).ok_or_else(|| RulesError::AmountOutOfRange {
        row: Some(row),
        detail: format!("column '{column}': {v}"),
    })
}

/// Whole currency units to cents; `None` when the result does not fit in `i64`.
fn to_cents(units: f64) -> Option<i64> {
    let cents = (units * 100.0).round();
    (cents.is_finite() && cents >= i64::MIN as f64 && cents < i64::MAX as f64).then_some(cents as i64)
}

fn units(cents: i64) -> Value {
    Value::from(cents as f64 / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> Table {
        Table::from_columns(vec![
            ("ClaimID", vec![101.into(), 102.into(), 103.into()]),
            ("BilledAmount", vec![500.into(), 1200.into(), 300.into()]),
            ("PlanDeductible", vec![200.into(), 500.into(), 100.into()]),
            ("PlanCopay", vec![50.into(), 100.into(), 25.into()]),
            ("PlanOOPMax", vec![1000.into(), 2000.into(), 500.into()]),
        ])
        .unwrap()
    }

    #[test]
    fn member_share_capped_by_oop_max() {
        let terms = PlanTerms {
            deductible_cents: 80_000,
            copay_cents: 10_000,
            oop_max_cents: 50_000,
        };
        let adj = adjudicate(120_000, &terms).unwrap();
        assert_eq!(adj.member_pays_cents, 50_000);
        assert_eq!(adj.plan_pays_cents, 70_000);
    }

    #[test]
    fn plan_share_can_go_negative() {
        let terms = PlanTerms {
            deductible_cents: 20_000,
            copay_cents: 5_000,
            oop_max_cents: 100_000,
        };
        assert_eq!(adjudicate(10_000, &terms).unwrap().plan_pays_cents, -15_000);
    }

    #[test]
    fn sample_claims_split() {
        let out = adjudicate_claims(&sample_claims(), &ClaimColumns::default()).unwrap();
        let split: Vec<(i64, i64)> = out
            .iter()
            .map(|o| (o.adjudication.member_pays_cents, o.adjudication.plan_pays_cents))
            .collect();
        assert_eq!(split, vec![(25_000, 25_000), (60_000, 60_000), (12_500, 17_500)]);
        assert_eq!(out[2].claim_id, Value::Int(103));
    }

    #[test]
    fn null_billed_uses_default() {
        let t = Table::from_columns(vec![
            ("BilledAmount", vec![Value::Null]),
            ("PlanDeductible", vec![200.into()]),
            ("PlanCopay", vec![50.into()]),
            ("PlanOOPMax", vec![1000.into()]),
        ])
        .unwrap();
        let columns = ClaimColumns {
            billed_default: Some(500.0),
            ..ClaimColumns::default()
        };
        let out = adjudicate_claims(&t, &columns).unwrap();
        assert_eq!(out[0].billed_cents, 50_000);
        // No ClaimID column: row position stands in.
        assert_eq!(out[0].claim_id, Value::Int(0));
    }

    #[test]
    fn null_billed_without_default_fails() {
        let t = Table::from_columns(vec![
            ("BilledAmount", vec![Value::Null]),
            ("PlanDeductible", vec![200.into()]),
            ("PlanCopay", vec![50.into()]),
            ("PlanOOPMax", vec![1000.into()]),
        ])
        .unwrap();
        let err = adjudicate_claims(&t, &ClaimColumns::default()).unwrap_err();
        assert!(matches!(err, RulesError::NotNumeric { row: 0, .. }));
    }

    #[test]
    fn overflowing_member_share_is_rejected() {
        let terms = PlanTerms {
            deductible_cents: i64::MAX - 10,
            copay_cents: 100,
            oop_max_cents: 100,
        };
        let err = adjudicate(0, &terms).unwrap_err();
        assert!(matches!(err, RulesError::AmountOutOfRange { row: None, .. }));

        let terms = PlanTerms {
            deductible_cents: 0,
            copay_cents: 1,
            oop_max_cents: 100,
        };
        assert!(adjudicate(i64::MIN, &terms).is_err());
    }

    fn claim_row(deductible: Value, copay: Value, oop_max: Value) -> Table {
        Table::from_columns(vec![
            ("BilledAmount", vec![100.into()]),
            ("PlanDeductible", vec![deductible]),
            ("PlanCopay", vec![copay]),
            ("PlanOOPMax", vec![oop_max]),
        ])
        .unwrap()
    }

    #[test]
    fn huge_amounts_fail_instead_of_saturating() {
        let big = Value::Int(90_000_000_000_000_000);

        let t = claim_row(big.clone(), big.clone(), Value::from(1e30));
        let err = adjudicate_claims(&t, &ClaimColumns::default()).unwrap_err();
        assert!(matches!(err, RulesError::AmountOutOfRange { row: Some(0), .. }));
        assert!(err.to_string().contains("column 'PlanOOPMax'"), "{err}");

        // Each term fits in cents, their sum does not.
        let t = claim_row(big.clone(), big, 1000.into());
        let err = adjudicate_claims(&t, &ClaimColumns::default()).unwrap_err();
        assert_eq!(
            err,
            RulesError::AmountOutOfRange {
                row: Some(0),
                detail: "copay + deductible".into(),
            }
        );
    }

    #[test]
    fn huge_billed_default_is_rejected() {
        let t = Table::from_columns(vec![
            ("BilledAmount", vec![Value::Null]),
            ("PlanDeductible", vec![200.into()]),
            ("PlanCopay", vec![50.into()]),
            ("PlanOOPMax", vec![1000.into()]),
        ])
        .unwrap();
        let columns = ClaimColumns {
            billed_default: Some(f64::INFINITY),
            ..ClaimColumns::default()
        };
        let err = adjudicate_claims(&t, &columns).unwrap_err();
        assert!(matches!(err, RulesError::AmountOutOfRange { row: Some(0), .. }));
    }

    #[test]
    fn missing_terms_column() {
        let t = Table::from_columns(vec![("BilledAmount", vec![Value::Int(1)])]).unwrap();
        let err = adjudicate_claims(&t, &ClaimColumns::default()).unwrap_err();
        assert!(err.to_string().contains("'PlanDeductible'"));
    }

    #[test]
    fn outcomes_render_in_units() {
        let out = adjudicate_claims(&sample_claims(), &ClaimColumns::default()).unwrap();
        let t = outcomes_table(&out).unwrap();
        assert_eq!(t.columns(), &["ClaimID", "Billed", "ExpectedMemberPay", "ExpectedPlanPay"]);
        assert_eq!(t.get(2, "ExpectedPlanPay"), Some(&Value::from(175.0)));
    }
}
