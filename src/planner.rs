//! Planner boundary and the shipped profile-driven planner.
//!
//! The [`Planner`] trait decouples the turn controller from deck-specific
//! strategy. Both calls are best-effort: a failure or an absent result means
//! "no opinion", and the caller falls back (pass action for plans, profile
//! priority for dialogs). Tests use scripted planners that return
//! predetermined plans.

use std::time::Duration;

use anyhow::Result;

use crate::client::{BoardSnapshot, DialogButton, Phase};
use crate::core::action::{Action, ActionKind};
use crate::core::cooldown::TurnCooldowns;
use crate::profile::DeckProfile;

/// A dialog choice: which entry to highlight and with which button.
///
/// An absent index means "no card chosen, just confirm/cancel".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: Option<usize>,
    pub button: DialogButton,
}

impl Selection {
    pub fn card(index: usize) -> Self {
        Self {
            index: Some(index),
            button: DialogButton::Middle,
        }
    }

    pub fn confirm_only() -> Self {
        Self {
            index: None,
            button: DialogButton::Right,
        }
    }
}

/// Main-phase planning and dialog-preference boundary.
pub trait Planner {
    /// Produce the ordered actions for the current main phase.
    fn plan_main_phase(
        &mut self,
        snapshot: &BoardSnapshot,
        cooldowns: &TurnCooldowns,
    ) -> Result<Vec<Action>>;

    /// Optional preference for an open dialog. `Ok(None)` defers to the
    /// profile fallback.
    fn on_dialog(
        &mut self,
        dialog: &[String],
        snapshot: &BoardSnapshot,
    ) -> Result<Option<Selection>>;
}

/// The single-action plan used when planning fails or yields nothing.
pub fn fallback_pass_plan(reason: &str) -> Vec<Action> {
    vec![Action::pass(reason)]
}

/// Profile-driven planner: normal-summon the best available starter and
/// queue its effect, otherwise set backrow, otherwise advance phase.
///
/// Respects cooldowns so a re-invocation within the same turn does not
/// propose a just-attempted effect again.
#[derive(Debug, Clone)]
pub struct ProfilePlanner {
    profile: DeckProfile,
    max_attempts: u32,
    retry_delay: Duration,
}

impl ProfilePlanner {
    pub fn new(profile: DeckProfile) -> Self {
        Self {
            profile,
            max_attempts: 1,
            retry_delay: Duration::from_millis(120),
        }
    }

    /// Retry budget applied to every planned action.
    pub fn with_retry_defaults(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    fn action(&self, kind: ActionKind, label: String) -> Action {
        Action::new(kind, label).with_retries(self.max_attempts, self.retry_delay)
    }

    fn summon_candidate(
        &self,
        snapshot: &BoardSnapshot,
        cooldowns: &TurnCooldowns,
    ) -> Option<(usize, String)> {
        for wanted in self.profile.summon_priority() {
            for card in &snapshot.hand {
                let Some(name) = card.name.as_deref() else {
                    continue;
                };
                if name != wanted {
                    continue;
                }
                let kind = ActionKind::NormalSummon {
                    hand_index: card.index,
                    position: 0,
                };
                if !cooldowns.attempted(&kind.effect_key()) {
                    return Some((card.index, name.to_string()));
                }
            }
        }
        None
    }

    fn backrow_candidate(
        &self,
        snapshot: &BoardSnapshot,
        cooldowns: &TurnCooldowns,
    ) -> Option<(usize, String)> {
        for card in &snapshot.hand {
            let Some(name) = card.name.as_deref() else {
                continue;
            };
            if !self.profile.is_backrow(name) {
                continue;
            }
            let kind = ActionKind::SetSpellTrap {
                hand_index: card.index,
                position: 0,
            };
            if !cooldowns.attempted(&kind.effect_key()) {
                return Some((card.index, name.to_string()));
            }
        }
        None
    }

    fn extra_deck_follow_up(&self, cooldowns: &TurnCooldowns) -> Option<Action> {
        for name in &self.profile.extra_deck_priority {
            let kind = ActionKind::ExtraDeckSummon {
                name: name.clone(),
                positions: vec![0, 1],
            };
            if !cooldowns.attempted(&kind.effect_key()) {
                let label = format!("extra deck summon {name}");
                return Some(self.action(kind, label));
            }
        }
        None
    }
}

impl Planner for ProfilePlanner {
    fn plan_main_phase(
        &mut self,
        snapshot: &BoardSnapshot,
        cooldowns: &TurnCooldowns,
    ) -> Result<Vec<Action>> {
        if snapshot.can_normal_summon && snapshot.free_monster_zones > 0 {
            if let Some((hand_index, name)) = self.summon_candidate(snapshot, cooldowns) {
                let mut actions = vec![
                    self.action(
                        ActionKind::NormalSummon {
                            hand_index,
                            position: 0,
                        },
                        format!("normal summon {name}"),
                    ),
                    self.action(
                        ActionKind::ActivateFromField { position: 0 },
                        format!("activate {name}"),
                    ),
                ];
                if let Some(extra) = self.extra_deck_follow_up(cooldowns) {
                    actions.push(extra);
                }
                return Ok(actions);
            }
        }

        if snapshot.free_spell_trap_zones > 0 {
            if let Some((hand_index, name)) = self.backrow_candidate(snapshot, cooldowns) {
                return Ok(vec![self.action(
                    ActionKind::SetSpellTrap {
                        hand_index,
                        position: 0,
                    },
                    format!("set {name}"),
                )]);
            }
        }

        Ok(vec![self.action(
            ActionKind::AdvancePhase {
                phase: Phase::Battle,
            },
            "advance to battle phase".to_string(),
        )])
    }

    fn on_dialog(
        &mut self,
        _dialog: &[String],
        _snapshot: &BoardSnapshot,
    ) -> Result<Option<Selection>> {
        // Dialog priority lives in the profile; the resolver applies it as
        // the fallback, so this planner has no separate opinion.
        Ok(None)
    }
}
