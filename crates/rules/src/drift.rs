use std::collections::HashMap;
use std::fmt;

use qekit_merge::{merge_pair, CollisionPolicy, JoinKey, JoinPolicy, Table, Value};
use serde::Serialize;

use crate::error::RulesError;
use crate::similarity::ratio;

/// Similarity at or above which a rule counts as unchanged.
pub const DEFAULT_THRESHOLD: f64 = 0.9;

const LEGACY_SUFFIX: &str = "_legacy";
const NEW_SUFFIX: &str = "_new";

#[derive(Debug, Clone)]
pub struct DriftOptions {
    /// Column identifying a rule in both tables.
    pub key_column: String,
    /// Column holding the rule text.
    pub text_column: String,
    pub threshold: f64,
}

impl Default for DriftOptions {
    fn default() -> Self {
        Self {
            key_column: "Drug".into(),
            text_column: "RuleText".into(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftStatus {
    Same,
    Changed,
    /// Present in the legacy rules only.
    Removed,
    /// Present in the new rules only.
    Added,
}

impl fmt::Display for DriftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Same => write!(f, "Same"),
            Self::Changed => write!(f, "Changed"),
            Self::Removed => write!(f, "Removed"),
            Self::Added => write!(f, "Added"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DriftRow {
    pub key: Value,
    pub legacy_rule: Option<String>,
    pub new_rule: Option<String>,
    /// Rounded to two decimals; absent when only one side has the rule.
    pub similarity: Option<f64>,
    pub status: DriftStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DriftSummary {
    pub total: usize,
    pub same: usize,
    pub changed: usize,
    pub removed: usize,
    pub added: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DriftReport {
    pub threshold: f64,
    pub rows: Vec<DriftRow>,
    pub summary: DriftSummary,
}

impl DriftReport {
    /// One row per rule: key, both texts, similarity, status.
    pub fn to_table(&self, key_column: &str) -> Result<Table, RulesError> {
        let rows = self
            .rows
            .iter()
            .map(|r| {
                vec![
                    r.key.clone(),
                    r.legacy_rule.clone().into(),
                    r.new_rule.clone().into(),
                    r.similarity.into(),
                    r.status.to_string().into(),
                ]
            })
            .collect();
        let columns = [key_column, "LegacyRule", "NewRule", "Similarity", "Status"]
            .into_iter()
            .map(String::from)
            .collect();
        Ok(Table::new(columns, rows)?)
    }
}

/// Pair legacy and new rules by key and score each pair's text similarity.
///
/// Rules are matched with an outer merge, so rules dropped from or added to
/// the new set are reported too. Status compares the unrounded similarity
/// against the threshold.
pub fn detect_drift(legacy: &Table, new: &Table, options: &DriftOptions) -> Result<DriftReport, RulesError> {
    if !(0.0..=1.0).contains(&options.threshold) {
        return Err(RulesError::InvalidThreshold(options.threshold));
    }

    let legacy = project(legacy, "legacy", options)?;
    let new = project(new, "new", options)?;
    let key_cols = [options.key_column.clone()];
    let legacy_keys = legacy.key_set(&key_cols)?;
    let new_keys = new.key_set(&key_cols)?;

    let merged = merge_pair(
        &legacy,
        &new,
        &JoinKey::single(options.key_column.as_str()),
        JoinPolicy::Outer,
        &CollisionPolicy::Suffix {
            left: LEGACY_SUFFIX.into(),
            right: NEW_SUFFIX.into(),
        },
    )?;

    let legacy_col = format!("{}{LEGACY_SUFFIX}", options.text_column);
    let new_col = format!("{}{NEW_SUFFIX}", options.text_column);

    let mut rows = Vec::with_capacity(merged.row_count());
    let mut summary = DriftSummary::default();
    for i in 0..merged.row_count() {
        let key = merged.get(i, &options.key_column).cloned().unwrap_or_default();
        let legacy_rule = merged.get(i, &legacy_col).and_then(rule_text);
        let new_rule = merged.get(i, &new_col).and_then(rule_text);

        let tuple = vec![key.join_key()];
        let (similarity, status) = match (legacy_keys.contains(&tuple), new_keys.contains(&tuple)) {
            (true, false) => (None, DriftStatus::Removed),
            (false, true) => (None, DriftStatus::Added),
            _ => {
                let score = ratio(
                    legacy_rule.as_deref().unwrap_or(""),
                    new_rule.as_deref().unwrap_or(""),
                );
                let status = if score < options.threshold {
                    DriftStatus::Changed
                } else {
                    DriftStatus::Same
                };
                (Some(round2(score)), status)
            }
        };

        match status {
            DriftStatus::Same => summary.same += 1,
            DriftStatus::Changed => summary.changed += 1,
            DriftStatus::Removed => summary.removed += 1,
            DriftStatus::Added => summary.added += 1,
        }
        log::debug!("rule {key}: {status}");

        rows.push(DriftRow {
            key,
            legacy_rule,
            new_rule,
            similarity,
            status,
        });
    }
    summary.total = rows.len();

    // Legacy order first, then rules only the new set has, in new order.
    let position = rule_positions(&legacy, &new, &options.key_column);
    rows.sort_by_key(|r| position.get(&r.key.join_key()).copied().unwrap_or(usize::MAX));

    Ok(DriftReport {
        threshold: options.threshold,
        rows,
        summary,
    })
}

/// First position of each key across the legacy rows followed by the new rows.
fn rule_positions(legacy: &Table, new: &Table, key_column: &str) -> HashMap<Value, usize> {
    let legacy_keys = legacy.column(key_column).into_iter().flatten();
    let new_keys = new.column(key_column).into_iter().flatten();
    let mut position = HashMap::new();
    for (i, key) in legacy_keys.chain(new_keys).enumerate() {
        position.entry(key.join_key()).or_insert(i);
    }
    position
}

/// Narrow a rules table to its key and text columns.
fn project(table: &Table, side: &str, options: &DriftOptions) -> Result<Table, RulesError> {
    let wanted = [&options.key_column, &options.text_column];
    let idx = wanted
        .iter()
        .map(|c| {
            table.column_index(c).ok_or_else(|| RulesError::MissingColumn {
                table: side.into(),
                column: (*c).clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let rows = table
        .rows()
        .iter()
        .map(|r| idx.iter().map(|&i| r[i].clone()).collect())
        .collect();
    Ok(Table::new(wanted.iter().map(|c| (*c).clone()).collect(), rows)?)
}

fn rule_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::Text(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
