//! Client capability boundary for the external duel process.
//!
//! The [`Client`] trait is the full set of operations the control loop
//! consumes. Every method is mandatory: a collaborator that cannot perform an
//! operation returns [`CallError::Unsupported`] instead of being probed for
//! existence, so signature drift is a build-time error rather than a runtime
//! retry loop. Every call may fail; callers treat failure as "no progress
//! this attempt" and never propagate it out of the loop.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned by any client capability call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    /// The client does not implement this operation.
    #[error("unsupported client operation: {0}")]
    Unsupported(&'static str),
    /// The operation was attempted and failed.
    #[error("client call failed: {0}")]
    Failed(String),
}

pub type CallResult<T> = Result<T, CallError>;

/// Mouse button used for dialog clicks.
///
/// Multi-select dialogs require a provisional Middle-button highlight before
/// they accept a Right-button confirmation; a single click is not enough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogButton {
    Left,
    Middle,
    Right,
}

/// Activation-prompt auto-confirmation mode exposed by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmMode {
    On,
    Off,
    Default,
}

/// Duel phase as reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Draw,
    Standby,
    Main1,
    Battle,
    Main2,
    End,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Draw
    }
}

impl Phase {
    /// Whether actions can be planned and issued in this phase.
    pub fn is_main(self) -> bool {
        matches!(self, Phase::Main1 | Phase::Main2)
    }
}

/// One card visible in hand. The name is best-effort; unreadable cards keep
/// their index so positional actions still work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    pub index: usize,
    pub name: Option<String>,
}

/// Best-effort view of the board used for planning.
///
/// An unreadable board degrades to the empty default; it never aborts a tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSnapshot {
    pub hand: Vec<CardInfo>,
    pub can_normal_summon: bool,
    pub free_monster_zones: u32,
    pub free_spell_trap_zones: u32,
}

/// Capability set the control loop consumes.
///
/// Observation methods are polled every tick; dispatch methods are issued by
/// the [`crate::executor::ActionExecutor`] and the dialog resolver.
pub trait Client {
    // Observations.
    fn is_dueling(&mut self) -> CallResult<bool>;
    fn is_duel_ended(&mut self) -> CallResult<bool>;
    fn is_my_turn(&mut self) -> CallResult<bool>;
    fn is_inputting(&mut self) -> CallResult<bool>;
    fn turn_number(&mut self) -> CallResult<u32>;
    fn current_phase(&mut self) -> CallResult<Phase>;
    fn board_snapshot(&mut self) -> CallResult<BoardSnapshot>;
    fn dialog_card_list(&mut self) -> CallResult<Vec<String>>;

    // Prompt handling.
    fn select_card_from_dialog(
        &mut self,
        index: Option<usize>,
        button: DialogButton,
    ) -> CallResult<()>;
    fn cancel_activation_prompts(&mut self) -> CallResult<()>;
    fn set_activation_confirmation(&mut self, mode: ConfirmMode) -> CallResult<()>;
    fn handle_unexpected_prompts(&mut self) -> CallResult<()>;

    // Lifecycle.
    fn exit_duel(&mut self) -> CallResult<()>;

    // Action dispatch.
    fn normal_summon(&mut self, hand_index: usize, position: usize) -> CallResult<()>;
    fn special_summon_from_hand(&mut self, hand_index: usize, position: usize) -> CallResult<()>;
    fn activate_effect_from_hand(&mut self, hand_index: usize) -> CallResult<()>;
    fn activate_effect_from_field(&mut self, position: usize) -> CallResult<()>;
    fn activate_spell_from_hand(&mut self, hand_index: usize, position: usize) -> CallResult<()>;
    fn set_spell_or_trap(&mut self, hand_index: usize, position: usize) -> CallResult<()>;
    fn extra_deck_summon(&mut self, name: &str, positions: &[usize]) -> CallResult<()>;
    fn advance_phase(&mut self, phase: Phase) -> CallResult<()>;
}
