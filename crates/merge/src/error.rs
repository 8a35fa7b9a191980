use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum MergeError {
    /// Malformed merge input: no tables, missing key column, bad policy count.
    InvalidInput(String),
    /// A non-key column name collides across the two sides of a merge step.
    AmbiguousColumn { column: String, step: usize },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (duplicate table name, policy count, etc.).
    ConfigValidation(String),
    /// CSV read/write error for a named table.
    Csv { table: String, message: String },
}

impl MergeError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::AmbiguousColumn { column, step } => {
                write!(f, "step {step}: column '{column}' exists on both sides of the merge")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Csv { table, message } => write!(f, "table '{table}': {message}"),
        }
    }
}

impl std::error::Error for MergeError {}
