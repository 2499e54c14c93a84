//! Exit codes returned by the `pokerfelt` binary.

/// Success exit code (standard Unix convention).
pub const SUCCESS: i32 = 0;

/// General error exit code.
pub const ERROR: i32 = 2;

/// Interrupted by user (Ctrl+C) exit code.
pub const INTERRUPTED: i32 = 130;
