//! Process exit codes for patchsplit.
//!
//! Every failure class has its own code so scripts can tell a bad
//! invocation from a submission that is missing one of its parts.

/// Successful split.
pub const SUCCESS: u8 = 0;

/// Bad arguments or an invalid configuration. No file was touched.
pub const USAGE: u8 = 1;

/// The patch file or one of the output files could not be opened.
pub const OPEN_FAILURE: u8 = 2;

/// The split produced zero message lines.
pub const NO_MESSAGE: u8 = 3;

/// The split produced zero diff lines under the fatal missing-diff policy.
pub const NO_DIFF: u8 = 4;

/// Reading the patch or writing an output failed mid-run.
pub const IO_FAILURE: u8 = 5;
