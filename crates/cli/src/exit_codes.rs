//! CLI Exit Code Registry
//!
//! Single source of truth for `qekit` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad args, bad threshold)              |
//! | 3    | Invalid merge config (TOML parse or validation)    |
//! | 4    | Invalid merge input (missing key column, no data)  |
//! | 5    | Ambiguous column under the reject collision mode   |
//! | 6    | I/O error (unreadable file, malformed CSV)         |

use qekit_merge::MergeError;
use qekit_rules::RulesError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments or option values.
pub const EXIT_USAGE: u8 = 2;

pub const EXIT_INVALID_CONFIG: u8 = 3;

pub const EXIT_MERGE_INPUT: u8 = 4;

pub const EXIT_AMBIGUOUS_COLUMN: u8 = 5;

pub const EXIT_IO: u8 = 6;

/// Map a merge error to its exit code.
pub fn merge_exit_code(err: &MergeError) -> u8 {
    match err {
        MergeError::InvalidInput(_) => EXIT_MERGE_INPUT,
        MergeError::AmbiguousColumn { .. } => EXIT_AMBIGUOUS_COLUMN,
        MergeError::ConfigParse(_) | MergeError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        MergeError::Csv { .. } => EXIT_IO,
    }
}

/// Map a rules error to its exit code.
pub fn rules_exit_code(err: &RulesError) -> u8 {
    match err {
        RulesError::Merge(inner) => merge_exit_code(inner),
        RulesError::MissingColumn { .. }
        | RulesError::NotNumeric { .. }
        | RulesError::AmountOutOfRange { .. } => EXIT_MERGE_INPUT,
        RulesError::InvalidThreshold(_) => EXIT_USAGE,
    }
}
