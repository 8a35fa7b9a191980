use crate::config::MergeConfig;
use crate::error::MergeError;
use crate::join::{merge_step, CollisionPolicy, JoinKey, JoinPolicy};
use crate::model::{compute_summary, MergeInput, MergeMeta, MergeResult, StepReport};
use crate::table::Table;

/// Join policy for each pairwise step of a fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergePlan {
    /// Same policy at every step.
    Uniform(JoinPolicy),
    /// One policy per step; step `i` merges table `i + 1` into the accumulator.
    Steps(Vec<JoinPolicy>),
}

impl MergePlan {
    /// Policy for step `step` (0-based).
    pub fn policy_for(&self, step: usize) -> Option<JoinPolicy> {
        match self {
            Self::Uniform(p) => Some(*p),
            Self::Steps(steps) => steps.get(step).copied(),
        }
    }

    fn check_len(&self, tables: usize) -> Result<(), MergeError> {
        if let Self::Steps(steps) = self {
            let expected = tables.saturating_sub(1);
            if steps.len() != expected {
                return Err(MergeError::InvalidInput(format!(
                    "{tables} table(s) need {expected} step policy(ies), got {}",
                    steps.len()
                )));
            }
        }
        Ok(())
    }
}

impl From<JoinPolicy> for MergePlan {
    fn from(policy: JoinPolicy) -> Self {
        Self::Uniform(policy)
    }
}

/// Left-fold `tables` into one table on `key`.
///
/// The accumulator starts as the first table; step `i` merges table `i + 1`
/// into it with `plan.policy_for(i)`. A single table is returned unchanged
/// once its key columns are confirmed present.
pub fn merge_tables(
    tables: &[Table],
    key: &JoinKey,
    plan: &MergePlan,
    collisions: &CollisionPolicy,
) -> Result<Table, MergeError> {
    let named: Vec<(String, &Table)> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| (format!("#{}", i + 1), t))
        .collect();
    fold(&named, key, plan, collisions).map(|(table, _)| table)
}

fn fold(
    tables: &[(String, &Table)],
    key: &JoinKey,
    plan: &MergePlan,
    collisions: &CollisionPolicy,
) -> Result<(Table, Vec<StepReport>), MergeError> {
    let ((first_name, first), rest) = tables
        .split_first()
        .ok_or_else(|| MergeError::InvalidInput("need at least one table to merge".into()))?;
    plan.check_len(tables.len())?;

    // Validate every key up front so a bad last table fails before any work.
    for (name, table) in tables {
        key.indices(table, &format!("'{name}'"))?;
    }

    let mut acc = Table::clone(first);
    let mut acc_label = format!("'{first_name}'");
    let mut steps = Vec::with_capacity(rest.len());

    for (i, (name, table)) in rest.iter().enumerate() {
        let policy = plan
            .policy_for(i)
            .ok_or_else(|| MergeError::InvalidInput(format!("no policy for step {}", i + 1)))?;
        let label = format!("'{name}'");
        let (merged, stats) = merge_step(&acc, table, key, policy, collisions, i + 1, (acc_label.as_str(), label.as_str()))?;
        acc = merged;
        acc_label = format!("accumulator after step {}", i + 1);
        steps.push(StepReport {
            table: name.clone(),
            stats,
        });
    }

    Ok((acc, steps))
}

/// Run a configured merge. Returns the merged table, per-step statistics and
/// a summary.
pub fn run(config: &MergeConfig, input: &MergeInput) -> Result<MergeResult, MergeError> {
    let key = config.join_key()?;
    let plan = config.plan()?;
    let collisions = config.collisions.policy();

    // Fold order follows the config, not the order tables were loaded in.
    let ordered = config
        .tables
        .iter()
        .map(|spec| {
            input
                .tables
                .iter()
                .find(|(name, _)| *name == spec.name)
                .map(|(name, table)| (name.clone(), table))
                .ok_or_else(|| MergeError::InvalidInput(format!("table '{}' has no data", spec.name)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let (table, steps) = fold(&ordered, &key, &plan, &collisions)?;
    let summary = compute_summary(&ordered, &steps, &table);

    log::info!(
        "merged {} table(s) on [{key}]: {} row(s) x {} column(s)",
        summary.input_tables,
        summary.output_rows,
        summary.output_columns
    );

    Ok(MergeResult {
        meta: MergeMeta {
            config_name: config.name.clone(),
            key: key.columns().to_vec(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        steps,
        table,
    })
}
