//! Stable exit codes for engine CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed due to invalid document/config or other errors.
pub const INVALID: i32 = 1;
/// `engine exec` rejected the batch at a failing statement.
pub const REJECTED: i32 = 2;
