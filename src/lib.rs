//! Turn-based duel client automation loop.
//!
//! This crate implements the interaction control loop for a remote card-game
//! client: it polls duel/turn/phase state, reacts to modal selection dialogs,
//! and issues planned actions with bounded retries. The architecture enforces
//! a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (fingerprints, plans, cooldowns).
//!   No I/O, fully testable in isolation.
//! - **Boundary traits** ([`client::Client`], [`planner::Planner`]): the two
//!   external collaborators. Every capability is a mandatory trait method;
//!   collaborators signal unsupported operations explicitly instead of being
//!   probed for existence.
//!
//! Orchestration modules ([`controller`], [`dialog`], [`executor`]) coordinate
//! core logic with the collaborators to keep a duel progressing. The loop is
//! single-threaded and cooperative: every external call blocks, and the only
//! exit is the duel-ended signal.

pub mod client;
pub mod config;
pub mod controller;
pub mod core;
pub mod dialog;
pub mod executor;
pub mod exit_codes;
pub mod logging;
pub mod planner;
pub mod profile;
pub mod replay;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
