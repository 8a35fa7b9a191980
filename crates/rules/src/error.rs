use std::fmt;

use qekit_merge::MergeError;

#[derive(Debug, Clone, PartialEq)]
pub enum RulesError {
    /// Failure inside the underlying table merge.
    Merge(MergeError),
    /// A required column is absent from an input table.
    MissingColumn { table: String, column: String },
    /// A cell that must hold an amount holds something else.
    NotNumeric { row: usize, column: String, value: String },
    /// An amount, or a sum of amounts, does not fit in `i64` cents.
    AmountOutOfRange { row: Option<usize>, detail: String },
    /// Similarity threshold outside `0.0..=1.0`.
    InvalidThreshold(f64),
}

impl fmt::Display for RulesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge(e) => write!(f, "{e}"),
            Self::MissingColumn { table, column } => {
                write!(f, "{table} table: missing column '{column}'")
            }
            Self::NotNumeric { row, column, value } => {
                write!(f, "row {row}, column '{column}': cannot parse amount '{value}'")
            }
            Self::AmountOutOfRange { row: Some(row), detail } => {
                write!(f, "row {row}: amount out of range ({detail})")
            }
            Self::AmountOutOfRange { row: None, detail } => write!(f, "amount out of range ({detail})"),
            Self::InvalidThreshold(t) => write!(f, "threshold must be between 0 and 1, got {t}"),
        }
    }
}

impl std::error::Error for RulesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Merge(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MergeError> for RulesError {
    fn from(e: MergeError) -> Self {
        Self::Merge(e)
    }
}
