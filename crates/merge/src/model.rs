use serde::Serialize;

use crate::join::JoinPolicy;
use crate::table::Table;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Pre-loaded tables in fold order, each with the name it is reported under.
pub struct MergeInput {
    pub tables: Vec<(String, Table)>,
}

// ---------------------------------------------------------------------------
// Per-step statistics
// ---------------------------------------------------------------------------

/// A non-key column that existed on both sides and was renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedColumn {
    pub column: String,
    pub left: String,
    pub right: String,
}

/// Counts for one pairwise merge. Key counts are over distinct key tuples.
#[derive(Debug, Clone, Serialize)]
pub struct StepStats {
    pub step: usize,
    pub policy: JoinPolicy,
    pub left_rows: usize,
    pub right_rows: usize,
    pub output_rows: usize,
    pub matched_keys: usize,
    pub left_only_keys: usize,
    pub right_only_keys: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub renamed: Vec<RenamedColumn>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    /// Name of the table merged into the accumulator at this step.
    pub table: String,
    #[serde(flatten)]
    pub stats: StepStats,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MergeSummary {
    pub input_tables: usize,
    pub input_rows: usize,
    pub output_rows: usize,
    pub output_columns: usize,
    pub renamed_columns: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeMeta {
    pub config_name: String,
    pub key: Vec<String>,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeResult {
    pub meta: MergeMeta,
    pub summary: MergeSummary,
    pub steps: Vec<StepReport>,
    pub table: Table,
}

/// Summary over a finished fold. `inputs` are the folded tables only.
pub fn compute_summary(inputs: &[(String, &Table)], steps: &[StepReport], output: &Table) -> MergeSummary {
    MergeSummary {
        input_tables: inputs.len(),
        input_rows: inputs.iter().map(|(_, t)| t.row_count()).sum(),
        output_rows: output.row_count(),
        output_columns: output.column_count(),
        renamed_columns: steps.iter().map(|s| s.stats.renamed.len()).sum(),
    }
}
