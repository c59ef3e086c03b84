//! Bounded-retry dispatch of a single action against the client.
//!
//! The executor is the only place that maps [`ActionKind`] values onto client
//! capabilities. Failures never escape: an action either succeeds, is skipped
//! as unsupported, or exhausts its retry budget and reports `false`.

use std::thread::sleep;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::client::{CallError, CallResult, Client, Phase};
use crate::core::action::{Action, ActionKind};

/// Executes one action at a time with bounded retries and per-attempt delay.
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    post_action_delay: Duration,
    pass_delay: Duration,
}

enum Dispatch {
    Done,
    /// The kind is unknown or the client reported the operation unsupported.
    /// Treated as success so an unrecognized action never stalls the loop.
    Skipped,
}

impl ActionExecutor {
    pub fn new(post_action_delay: Duration, pass_delay: Duration) -> Self {
        Self {
            post_action_delay,
            pass_delay,
        }
    }

    /// Returns true when at least one attempt succeeded (or the action was a
    /// recognized no-op). Never panics and never propagates client failures.
    #[instrument(skip_all, fields(label = %action.label, max_attempts = action.max_attempts))]
    pub fn execute<C: Client>(&self, client: &mut C, action: &Action) -> bool {
        let attempts = action.max_attempts.max(1);
        for attempt in 1..=attempts {
            match self.dispatch(client, &action.kind) {
                Ok(Dispatch::Done) => {
                    info!(attempt, "action ok");
                    sleep(self.post_action_delay);
                    return true;
                }
                Ok(Dispatch::Skipped) => {
                    warn!("action not supported, skipping");
                    return true;
                }
                Err(err) => {
                    debug!(attempt, %err, "action attempt failed");
                    if attempt < attempts {
                        sleep(action.retry_delay);
                    }
                }
            }
        }
        warn!(attempts, "action failed after exhausting retries");
        sleep(self.post_action_delay);
        false
    }

    fn dispatch<C: Client>(&self, client: &mut C, kind: &ActionKind) -> CallResult<Dispatch> {
        match kind {
            ActionKind::NormalSummon {
                hand_index,
                position,
            } => to_dispatch(client.normal_summon(*hand_index, *position)),
            ActionKind::SpecialSummonFromHand {
                hand_index,
                position,
            } => to_dispatch(client.special_summon_from_hand(*hand_index, *position)),
            ActionKind::ActivateFromHand { hand_index } => {
                to_dispatch(client.activate_effect_from_hand(*hand_index))
            }
            ActionKind::ActivateFromField { position } => {
                to_dispatch(client.activate_effect_from_field(*position))
            }
            ActionKind::ActivateSpellFromHand {
                hand_index,
                position,
            } => to_dispatch(client.activate_spell_from_hand(*hand_index, *position)),
            ActionKind::SetSpellTrap {
                hand_index,
                position,
            } => to_dispatch(client.set_spell_or_trap(*hand_index, *position)),
            ActionKind::ExtraDeckSummon { name, positions } => {
                to_dispatch(client.extra_deck_summon(name, positions))
            }
            ActionKind::AdvancePhase { phase } => to_dispatch(client.advance_phase(*phase)),
            ActionKind::Pass => {
                // Push through battle into end phase, each best-effort.
                if let Err(err) = client.advance_phase(Phase::Battle) {
                    debug!(%err, "pass: battle advance failed");
                }
                sleep(self.pass_delay);
                if let Err(err) = client.advance_phase(Phase::End) {
                    debug!(%err, "pass: end advance failed");
                }
                Ok(Dispatch::Done)
            }
            ActionKind::Other { kind } => {
                debug!(kind, "unknown action kind");
                Ok(Dispatch::Skipped)
            }
        }
    }
}

fn to_dispatch(result: CallResult<()>) -> CallResult<Dispatch> {
    match result {
        Ok(()) => Ok(Dispatch::Done),
        Err(CallError::Unsupported(op)) => {
            debug!(op, "client reports operation unsupported");
            Ok(Dispatch::Skipped)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedClient;

    fn executor() -> ActionExecutor {
        ActionExecutor::new(Duration::ZERO, Duration::ZERO)
    }

    fn summon() -> Action {
        Action::new(
            ActionKind::NormalSummon {
                hand_index: 0,
                position: 0,
            },
            "normal summon",
        )
        .with_retries(3, Duration::ZERO)
    }

    #[test]
    fn success_returns_after_the_first_attempt() {
        let mut client = ScriptedClient::new();
        assert!(executor().execute(&mut client, &summon()));
        assert_eq!(client.calls, vec!["normal_summon(0, 0)".to_string()]);
    }

    #[test]
    fn always_failing_action_attempts_exactly_max_attempts() {
        let mut client = ScriptedClient::new();
        client.fail_ops.push("normal_summon");
        assert!(!executor().execute(&mut client, &summon()));
        assert_eq!(client.calls.len(), 3);
    }

    #[test]
    fn unsupported_dispatch_is_a_logged_no_op_success() {
        let mut client = ScriptedClient::new();
        client.unsupported_ops.push("extra_deck_summon");
        let action = Action::new(
            ActionKind::ExtraDeckSummon {
                name: "Chixiao".to_string(),
                positions: vec![0],
            },
            "extra deck summon Chixiao",
        )
        .with_retries(3, Duration::ZERO);
        assert!(executor().execute(&mut client, &action));
        assert_eq!(client.calls.len(), 1);
    }

    #[test]
    fn unknown_kind_skips_without_touching_the_client() {
        let mut client = ScriptedClient::new();
        let action = Action::new(
            ActionKind::Other {
                kind: "future_op".to_string(),
            },
            "future op",
        );
        assert!(executor().execute(&mut client, &action));
        assert!(client.calls.is_empty());
    }

    #[test]
    fn pass_advances_battle_then_end() {
        let mut client = ScriptedClient::new();
        assert!(executor().execute(&mut client, &Action::pass("test")));
        assert_eq!(
            client.calls,
            vec![
                "advance_phase(Battle)".to_string(),
                "advance_phase(End)".to_string(),
            ]
        );
    }

    #[test]
    fn pass_succeeds_even_when_phase_moves_fail() {
        let mut client = ScriptedClient::new();
        client.fail_ops.push("advance_phase");
        assert!(executor().execute(&mut client, &Action::pass("test")));
    }

    #[test]
    fn pass_delay_is_configurable_down_to_zero() {
        let mut client = ScriptedClient::new();
        let started = std::time::Instant::now();
        assert!(executor().execute(&mut client, &Action::pass("test")));
        assert!(started.elapsed() < Duration::from_millis(50));
    }
}
