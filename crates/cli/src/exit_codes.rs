//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Description                                         |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 1    | General error (unspecified)                         |
//! | 2    | Usage error (bad args, unknown sheet, bad config)   |
//! | 3    | File access error (workbook or config unreadable)   |
//! | 4    | Workbook format error (not a workbook, sheet count) |
//! | 5    | Schema error (missing column, bad date or score)    |
//! | 6    | Output write error                                  |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown table name, invalid config.
pub const EXIT_USAGE: u8 = 2;

/// Workbook or config file missing or unreadable.
pub const EXIT_FILE_ACCESS: u8 = 3;

/// File is not a readable workbook, or has fewer sheets than the layout needs.
pub const EXIT_FORMAT: u8 = 4;

/// Expected column missing, or a date/score cell that cannot be read.
pub const EXIT_SCHEMA: u8 = 5;

/// Chart or summary output could not be written.
pub const EXIT_WRITE: u8 = 6;
