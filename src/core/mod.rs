//! Pure, deterministic logic for the control loop.
//!
//! Nothing in this module performs I/O or reads clocks on its own; time-aware
//! functions take an explicit `Instant` so they stay testable.

pub mod action;
pub mod cooldown;
pub mod fingerprint;
pub mod plan;
