//! CLI Exit Code Registry
//!
//! Single source of truth for `zmatch` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success, at least one match written                  |
//! | 1    | General error (unspecified)                          |
//! | 2    | Usage error (bad args, missing DAILY / folder)       |
//! | 3    | Run completed with zero matches (nothing written)    |
//! | 4    | Config error (bad TOML, failed validation, missing input) |
//! | 5    | I/O error loading or saving a table                  |
//! | 6    | Unsupported file format                              |
//! | 7    | Worker pool could not be started                     |

use zmatcher_engine::MatchError;
use zmatcher_io::TableError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required inputs.
pub const EXIT_USAGE: u8 = 2;

/// The run finished but produced no matches. No output file is written.
pub const EXIT_NO_MATCHES: u8 = 3;

/// Config file unreadable or invalid, or an input path does not exist.
pub const EXIT_CONFIG: u8 = 4;

/// Load/save failure on a specific table.
pub const EXIT_IO: u8 = 5;

/// Daily file or output path has an unrecognised extension.
pub const EXIT_UNSUPPORTED_FORMAT: u8 = 6;

/// Worker pool could not be started.
pub const EXIT_WORKER_POOL: u8 = 7;

/// Map a MatchError to its exit code.
pub fn match_exit_code(err: &MatchError) -> u8 {
    match err {
        MatchError::ConfigParse(_) | MatchError::ConfigValidation(_) => EXIT_CONFIG,
        MatchError::WorkerPool(_) => EXIT_WORKER_POOL,
    }
}

/// Map a TableError to its exit code.
pub fn table_exit_code(err: &TableError) -> u8 {
    match err {
        TableError::UnsupportedFormat(_) => EXIT_UNSUPPORTED_FORMAT,
        TableError::NotFound(_)
        | TableError::Io { .. }
        | TableError::Decode { .. }
        | TableError::Encode { .. } => EXIT_IO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_NO_MATCHES,
            EXIT_CONFIG,
            EXIT_IO,
            EXIT_UNSUPPORTED_FORMAT,
            EXIT_WORKER_POOL,
        ];
        let mut sorted = codes.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), codes.len());
    }

    #[test]
    fn error_mapping() {
        assert_eq!(match_exit_code(&MatchError::ConfigValidation("x".into())), EXIT_CONFIG);
        assert_eq!(match_exit_code(&MatchError::WorkerPool("x".into())), EXIT_WORKER_POOL);
        assert_eq!(
            table_exit_code(&TableError::UnsupportedFormat(PathBuf::from("a.txt"))),
            EXIT_UNSUPPORTED_FORMAT
        );
        assert_eq!(table_exit_code(&TableError::NotFound(PathBuf::from("a.csv"))), EXIT_IO);
    }
}
