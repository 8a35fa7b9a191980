use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MergeError;
use crate::model::{RenamedColumn, StepStats};
use crate::table::Table;
use crate::value::Value;

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// Which unmatched key tuples survive a pairwise merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPolicy {
    /// Keys present on both sides.
    Inner,
    /// Every key of the accumulating left side.
    Left,
    /// Every key from either side.
    Outer,
}

impl fmt::Display for JoinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner => write!(f, "inner"),
            Self::Left => write!(f, "left"),
            Self::Outer => write!(f, "outer"),
        }
    }
}

impl FromStr for JoinPolicy {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inner" => Ok(Self::Inner),
            "left" => Ok(Self::Left),
            "outer" | "full" => Ok(Self::Outer),
            other => Err(MergeError::InvalidInput(format!(
                "unknown join policy '{other}' (expected inner, left or outer)"
            ))),
        }
    }
}

/// What to do when a non-key column name exists on both sides of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Fail the merge with `AmbiguousColumn`.
    Reject,
    /// Rename both colliding columns by appending a suffix per side.
    Suffix { left: String, right: String },
}

impl Default for CollisionPolicy {
    fn default() -> Self {
        Self::Suffix {
            left: "_x".into(),
            right: "_y".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Join key
// ---------------------------------------------------------------------------

/// Ordered, non-empty, duplicate-free list of key column names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinKey(Vec<String>);

impl JoinKey {
    pub fn new<I, S>(columns: I) -> Result<Self, MergeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(MergeError::InvalidInput("join key needs at least one column".into()));
        }
        let mut seen = HashSet::new();
        for c in &columns {
            if !seen.insert(c.as_str()) {
                return Err(MergeError::InvalidInput(format!("join key repeats column '{c}'")));
            }
        }
        Ok(Self(columns))
    }

    pub fn single(column: impl Into<String>) -> Self {
        Self(vec![column.into()])
    }

    pub fn columns(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.iter().any(|c| c == column)
    }

    /// Positions of the key columns in `table`, in key order.
    pub(crate) fn indices(&self, table: &Table, label: &str) -> Result<Vec<usize>, MergeError> {
        self.0
            .iter()
            .map(|k| {
                table.column_index(k).ok_or_else(|| {
                    MergeError::InvalidInput(format!("table {label}: missing key column '{k}'"))
                })
            })
            .collect()
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Pairwise merge
// ---------------------------------------------------------------------------

/// Merge two tables on `key` with a single policy.
///
/// Under `inner` and `left`, output rows follow the left rows in order, each
/// followed by its matches in right order (duplicates on both sides produce
/// the cross product). Under `outer`, right rows whose key never appeared on
/// the left are added and the result is sorted by key; the sort is stable, so
/// rows sharing a key keep that order.
///
/// Whole floats match ints on the key (`1.0` joins `1`).
pub fn merge_pair(
    left: &Table,
    right: &Table,
    key: &JoinKey,
    policy: JoinPolicy,
    collisions: &CollisionPolicy,
) -> Result<Table, MergeError> {
    merge_step(left, right, key, policy, collisions, 1, ("left", "right")).map(|(t, _)| t)
}

pub(crate) fn merge_step(
    left: &Table,
    right: &Table,
    key: &JoinKey,
    policy: JoinPolicy,
    collisions: &CollisionPolicy,
    step: usize,
    labels: (&str, &str),
) -> Result<(Table, StepStats), MergeError> {
    let left_key = key.indices(left, labels.0)?;
    let right_key = key.indices(right, labels.1)?;

    let right_extra: Vec<usize> = (0..right.column_count())
        .filter(|&i| !key.contains(&right.columns()[i]))
        .collect();

    let (columns, renamed) = merged_schema(left, right, &right_extra, key, collisions, step)?;

    let mut index: HashMap<Vec<Value>, Vec<usize>> = HashMap::new();
    for (ri, row) in right.rows().iter().enumerate() {
        index.entry(key_tuple(row, &right_key)).or_default().push(ri);
    }

    let mut rows = Vec::new();
    let mut left_keys: HashSet<Vec<Value>> = HashSet::new();
    let mut matched_keys: HashSet<Vec<Value>> = HashSet::new();

    for lrow in left.rows() {
        let k = key_tuple(lrow, &left_key);
        match index.get(&k) {
            Some(matches) => {
                for &ri in matches {
                    let rrow = &right.rows()[ri];
                    let mut out = lrow.clone();
                    out.extend(right_extra.iter().map(|&i| rrow[i].clone()));
                    rows.push(out);
                }
                matched_keys.insert(k.clone());
            }
            None if policy != JoinPolicy::Inner => {
                let mut out = lrow.clone();
                out.resize(columns.len(), Value::Null);
                rows.push(out);
            }
            None => {}
        }
        left_keys.insert(k);
    }

    let right_only_keys = index.keys().filter(|k| !left_keys.contains(*k)).count();
    if policy == JoinPolicy::Outer && right_only_keys > 0 {
        for rrow in right.rows() {
            if !left_keys.contains(&key_tuple(rrow, &right_key)) {
                rows.push(right_only_row(rrow, left.column_count(), &left_key, &right_key, &right_extra));
            }
        }
    }

    if policy == JoinPolicy::Outer {
        rows.sort_by(|a, b| cmp_keys(a, b, &left_key));
    }

    let stats = StepStats {
        step,
        policy,
        left_rows: left.row_count(),
        right_rows: right.row_count(),
        output_rows: rows.len(),
        matched_keys: matched_keys.len(),
        left_only_keys: left_keys.len() - matched_keys.len(),
        right_only_keys,
        renamed,
    };

    log::debug!(
        "step {step} ({policy}): {} x {} rows -> {} rows, {} matched key(s)",
        stats.left_rows,
        stats.right_rows,
        stats.output_rows,
        stats.matched_keys
    );

    Ok((Table::new(columns, rows)?, stats))
}

fn key_tuple(row: &[Value], key: &[usize]) -> Vec<Value> {
    key.iter().map(|&i| row[i].join_key()).collect()
}

fn cmp_keys(a: &[Value], b: &[Value], key: &[usize]) -> Ordering {
    key.iter()
        .map(|&i| a[i].key_cmp(&b[i]))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// A right-only row laid out in the merged schema: key values copied into the
/// left key positions, every other left column `Null`.
fn right_only_row(
    rrow: &[Value],
    left_width: usize,
    left_key: &[usize],
    right_key: &[usize],
    right_extra: &[usize],
) -> Vec<Value> {
    let mut out = vec![Value::Null; left_width];
    for (&li, &ri) in left_key.iter().zip(right_key) {
        out[li] = rrow[ri].clone();
    }
    out.extend(right_extra.iter().map(|&i| rrow[i].clone()));
    out
}

/// Left schema followed by the right side's non-key columns, with collisions
/// resolved per `collisions`.
fn merged_schema(
    left: &Table,
    right: &Table,
    right_extra: &[usize],
    key: &JoinKey,
    collisions: &CollisionPolicy,
    step: usize,
) -> Result<(Vec<String>, Vec<RenamedColumn>), MergeError> {
    let mut left_cols = left.columns().to_vec();
    let mut right_cols: Vec<String> = right_extra.iter().map(|&i| right.columns()[i].clone()).collect();
    let mut renamed = Vec::new();

    let clashing: Vec<String> = right_cols
        .iter()
        .filter(|c| left.has_column(c) && !key.contains(c))
        .cloned()
        .collect();

    for column in clashing {
        match collisions {
            CollisionPolicy::Reject => return Err(MergeError::AmbiguousColumn { column, step }),
            CollisionPolicy::Suffix { left: ls, right: rs } => {
                let left_name = format!("{column}{ls}");
                let right_name = format!("{column}{rs}");
                if let Some(c) = left_cols.iter_mut().find(|c| **c == column) {
                    *c = left_name.clone();
                }
                if let Some(c) = right_cols.iter_mut().find(|c| **c == column) {
                    *c = right_name.clone();
                }
                renamed.push(RenamedColumn {
                    column,
                    left: left_name,
                    right: right_name,
                });
            }
        }
    }

    let mut seen = HashSet::new();
    for c in left_cols.iter().chain(&right_cols) {
        if !seen.insert(c.as_str()) {
            return Err(MergeError::AmbiguousColumn { column: c.clone(), step });
        }
    }

    left_cols.extend(right_cols);
    Ok((left_cols, renamed))
}
