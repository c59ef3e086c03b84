//! Scripted collaborators for tests.
//!
//! [`ScriptedClient`] records every call it receives as a readable string and
//! replays a queue of observations; [`ScriptedPlanner`] replays predetermined
//! plans and dialog choices. Both are deterministic so assertions can compare
//! whole call sequences.

use std::collections::VecDeque;

use anyhow::{Result, anyhow};

use crate::client::{
    BoardSnapshot, CallError, CallResult, Client, ConfirmMode, DialogButton, Phase,
};
use crate::core::action::Action;
use crate::core::cooldown::TurnCooldowns;
use crate::planner::{Planner, Selection};

/// One snapshot of everything the control loop observes about the client.
#[derive(Debug, Clone)]
pub struct ScriptedObservation {
    pub dueling: bool,
    pub duel_ended: bool,
    pub my_turn: bool,
    pub inputting: bool,
    pub turn: u32,
    pub phase: Phase,
    pub dialog: Vec<String>,
}

impl Default for ScriptedObservation {
    fn default() -> Self {
        Self {
            dueling: true,
            duel_ended: false,
            my_turn: true,
            inputting: false,
            turn: 1,
            phase: Phase::Main1,
            dialog: Vec::new(),
        }
    }
}

impl ScriptedObservation {
    /// No duel in progress.
    pub fn idle() -> Self {
        Self {
            dueling: false,
            ..Self::default()
        }
    }

    /// Opponent's turn.
    pub fn opponent_turn(turn: u32) -> Self {
        Self {
            my_turn: false,
            turn,
            ..Self::default()
        }
    }

    /// Own main phase 1.
    pub fn my_main(turn: u32) -> Self {
        Self {
            turn,
            ..Self::default()
        }
    }

    /// Own turn with an open dialog prompt.
    pub fn prompt(turn: u32, dialog: &[&str]) -> Self {
        Self {
            turn,
            inputting: true,
            dialog: dialog.iter().map(|entry| entry.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Duel over, result screen showing.
    pub fn ended() -> Self {
        Self {
            duel_ended: true,
            ..Self::default()
        }
    }
}

/// Fake client driven by a queue of observations.
///
/// `is_dueling` advances the queue (one observation per poll tick); the last
/// observation sticks once the queue is exhausted. Every capability call is
/// appended to `calls`, including failing ones, so tests can assert exact
/// sequences. Operations named in `fail_ops` fail; operations named in
/// `unsupported_ops` report [`CallError::Unsupported`].
#[derive(Debug, Default)]
pub struct ScriptedClient {
    pub current: ScriptedObservation,
    pub ticks: VecDeque<ScriptedObservation>,
    pub calls: Vec<String>,
    pub fail_ops: Vec<&'static str>,
    pub unsupported_ops: Vec<&'static str>,
    pub board: BoardSnapshot,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ticks(ticks: Vec<ScriptedObservation>) -> Self {
        Self {
            ticks: ticks.into(),
            ..Self::default()
        }
    }

    fn op(&mut self, name: &'static str, call: String) -> CallResult<()> {
        self.calls.push(call);
        if self.fail_ops.contains(&name) {
            return Err(CallError::Failed(format!("scripted failure in {name}")));
        }
        if self.unsupported_ops.contains(&name) {
            return Err(CallError::Unsupported(name));
        }
        Ok(())
    }

    fn observe<T>(&mut self, name: &'static str, value: T) -> CallResult<T> {
        if self.fail_ops.contains(&name) {
            return Err(CallError::Failed(format!("scripted failure in {name}")));
        }
        Ok(value)
    }
}

impl Client for ScriptedClient {
    fn is_dueling(&mut self) -> CallResult<bool> {
        if let Some(next) = self.ticks.pop_front() {
            self.current = next;
        }
        let value = self.current.dueling;
        self.observe("is_dueling", value)
    }

    fn is_duel_ended(&mut self) -> CallResult<bool> {
        let value = self.current.duel_ended;
        self.observe("is_duel_ended", value)
    }

    fn is_my_turn(&mut self) -> CallResult<bool> {
        let value = self.current.my_turn;
        self.observe("is_my_turn", value)
    }

    fn is_inputting(&mut self) -> CallResult<bool> {
        let value = self.current.inputting;
        self.observe("is_inputting", value)
    }

    fn turn_number(&mut self) -> CallResult<u32> {
        let value = self.current.turn;
        self.observe("turn_number", value)
    }

    fn current_phase(&mut self) -> CallResult<Phase> {
        let value = self.current.phase;
        self.observe("current_phase", value)
    }

    fn board_snapshot(&mut self) -> CallResult<BoardSnapshot> {
        let value = self.board.clone();
        self.observe("board_snapshot", value)
    }

    fn dialog_card_list(&mut self) -> CallResult<Vec<String>> {
        let value = self.current.dialog.clone();
        self.observe("dialog_card_list", value)
    }

    fn select_card_from_dialog(
        &mut self,
        index: Option<usize>,
        button: DialogButton,
    ) -> CallResult<()> {
        self.op("select_dialog", format!("select_dialog({index:?}, {button:?})"))
    }

    fn cancel_activation_prompts(&mut self) -> CallResult<()> {
        self.op(
            "cancel_activation_prompts",
            "cancel_activation_prompts".to_string(),
        )
    }

    fn set_activation_confirmation(&mut self, mode: ConfirmMode) -> CallResult<()> {
        self.op(
            "set_activation_confirmation",
            format!("set_activation_confirmation({mode:?})"),
        )
    }

    fn handle_unexpected_prompts(&mut self) -> CallResult<()> {
        self.op(
            "handle_unexpected_prompts",
            "handle_unexpected_prompts".to_string(),
        )
    }

    fn exit_duel(&mut self) -> CallResult<()> {
        self.op("exit_duel", "exit_duel".to_string())
    }

    fn normal_summon(&mut self, hand_index: usize, position: usize) -> CallResult<()> {
        self.op(
            "normal_summon",
            format!("normal_summon({hand_index}, {position})"),
        )
    }

    fn special_summon_from_hand(&mut self, hand_index: usize, position: usize) -> CallResult<()> {
        self.op(
            "special_summon_from_hand",
            format!("special_summon_from_hand({hand_index}, {position})"),
        )
    }

    fn activate_effect_from_hand(&mut self, hand_index: usize) -> CallResult<()> {
        self.op(
            "activate_effect_from_hand",
            format!("activate_effect_from_hand({hand_index})"),
        )
    }

    fn activate_effect_from_field(&mut self, position: usize) -> CallResult<()> {
        self.op(
            "activate_effect_from_field",
            format!("activate_effect_from_field({position})"),
        )
    }

    fn activate_spell_from_hand(&mut self, hand_index: usize, position: usize) -> CallResult<()> {
        self.op(
            "activate_spell_from_hand",
            format!("activate_spell_from_hand({hand_index}, {position})"),
        )
    }

    fn set_spell_or_trap(&mut self, hand_index: usize, position: usize) -> CallResult<()> {
        self.op(
            "set_spell_or_trap",
            format!("set_spell_or_trap({hand_index}, {position})"),
        )
    }

    fn extra_deck_summon(&mut self, name: &str, positions: &[usize]) -> CallResult<()> {
        self.op(
            "extra_deck_summon",
            format!("extra_deck_summon({name}, {positions:?})"),
        )
    }

    fn advance_phase(&mut self, phase: Phase) -> CallResult<()> {
        self.op("advance_phase", format!("advance_phase({phase:?})"))
    }
}

/// One scripted response to a `plan_main_phase` call.
#[derive(Debug, Clone)]
pub enum ScriptedPlan {
    Plan(Vec<Action>),
    Fail(String),
    Empty,
}

/// Fake planner replaying queued plans and dialog choices.
///
/// An exhausted plan queue yields empty plans; an exhausted dialog queue
/// yields "no opinion".
#[derive(Debug, Default)]
pub struct ScriptedPlanner {
    pub plans: VecDeque<ScriptedPlan>,
    pub dialog_choices: VecDeque<Option<Selection>>,
    pub fail_dialog: bool,
    pub plan_calls: u32,
    pub dialog_calls: u32,
}

impl Planner for ScriptedPlanner {
    fn plan_main_phase(
        &mut self,
        _snapshot: &BoardSnapshot,
        _cooldowns: &TurnCooldowns,
    ) -> Result<Vec<Action>> {
        self.plan_calls += 1;
        match self.plans.pop_front() {
            Some(ScriptedPlan::Plan(actions)) => Ok(actions),
            Some(ScriptedPlan::Fail(message)) => Err(anyhow!(message)),
            Some(ScriptedPlan::Empty) | None => Ok(Vec::new()),
        }
    }

    fn on_dialog(
        &mut self,
        _dialog: &[String],
        _snapshot: &BoardSnapshot,
    ) -> Result<Option<Selection>> {
        self.dialog_calls += 1;
        if self.fail_dialog {
            return Err(anyhow!("scripted dialog failure"));
        }
        Ok(self.dialog_choices.pop_front().unwrap_or(None))
    }
}
