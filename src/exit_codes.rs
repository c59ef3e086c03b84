//! Stable exit codes for duelbot CLI commands.

/// Command succeeded; for `replay`, the duel ended cleanly.
pub const OK: i32 = 0;
/// Invalid config/profile/trace or any other command failure.
pub const INVALID: i32 = 1;
