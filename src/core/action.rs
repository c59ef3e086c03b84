//! Action data model: one intended game operation.

use std::time::Duration;

use crate::client::Phase;

/// What a single action does, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    NormalSummon { hand_index: usize, position: usize },
    SpecialSummonFromHand { hand_index: usize, position: usize },
    ActivateFromHand { hand_index: usize },
    ActivateFromField { position: usize },
    ActivateSpellFromHand { hand_index: usize, position: usize },
    SetSpellTrap { hand_index: usize, position: usize },
    ExtraDeckSummon { name: String, positions: Vec<usize> },
    AdvancePhase { phase: Phase },
    /// Push through battle into end phase, best-effort.
    Pass,
    /// Unrecognized kind from a newer planner; executed as a logged no-op so
    /// an old loop never stalls on it.
    Other { kind: String },
}

impl ActionKind {
    /// Stable key used for per-turn cooldown accounting.
    pub fn effect_key(&self) -> String {
        match self {
            ActionKind::NormalSummon { hand_index, .. } => format!("normal_summon:{hand_index}"),
            ActionKind::SpecialSummonFromHand { hand_index, .. } => {
                format!("special_summon_hand:{hand_index}")
            }
            ActionKind::ActivateFromHand { hand_index } => format!("activate_hand:{hand_index}"),
            ActionKind::ActivateFromField { position } => format!("activate_field:{position}"),
            ActionKind::ActivateSpellFromHand { hand_index, .. } => {
                format!("activate_spell_hand:{hand_index}")
            }
            ActionKind::SetSpellTrap { hand_index, .. } => format!("set_spell_trap:{hand_index}"),
            ActionKind::ExtraDeckSummon { name, .. } => format!("extra_deck_summon:{name}"),
            ActionKind::AdvancePhase { phase } => format!("advance_phase:{phase:?}"),
            ActionKind::Pass => "pass".to_string(),
            ActionKind::Other { kind } => format!("other:{kind}"),
        }
    }
}

/// Immutable description of one intended game operation: the kind with its
/// parameters, a human-readable label for logs, and the retry budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub label: String,
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Action {
    pub fn new(kind: ActionKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            max_attempts: 1,
            retry_delay: Duration::from_millis(120),
        }
    }

    /// Override the retry budget. `max_attempts` is clamped to at least one.
    pub fn with_retries(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    /// The action used whenever planning fails or yields nothing.
    pub fn pass(reason: &str) -> Self {
        Action::new(ActionKind::Pass, format!("pass ({reason})"))
    }
}
