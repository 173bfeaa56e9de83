//! Stable exit codes for portal CLI commands.

/// Command succeeded.
pub const OK: i32 = 0;
/// Backend request, config, or I/O failure.
pub const FAILED: i32 = 1;
/// Form input was rejected before any request was sent.
pub const INVALID_INPUT: i32 = 2;
