//! Offline replay: drive the control loop from a recorded trace.
//!
//! A trace is a JSON array of per-tick observations. The replay client feeds
//! them to the controller one poll at a time and records every issued call,
//! so a whole duel's decision sequence can be inspected without a live
//! client process. Replays run with zero inter-click delays.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::client::{
    BoardSnapshot, CallResult, Client, ConfirmMode, DialogButton, Phase,
};
use crate::config::BotConfig;
use crate::controller::{ControllerConfig, TickOutcome, TurnController};
use crate::dialog::{DialogResolver, ResolverConfig};
use crate::executor::ActionExecutor;
use crate::planner::ProfilePlanner;
use crate::profile::DeckProfile;

fn default_true() -> bool {
    true
}

fn default_turn() -> u32 {
    1
}

fn default_phase() -> Phase {
    Phase::Main1
}

/// One recorded observation of the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayTick {
    #[serde(default = "default_true")]
    pub dueling: bool,
    pub duel_ended: bool,
    #[serde(default = "default_true")]
    pub my_turn: bool,
    pub inputting: bool,
    #[serde(default = "default_turn")]
    pub turn: u32,
    #[serde(default = "default_phase")]
    pub phase: Phase,
    pub dialog: Vec<String>,
    pub board: BoardSnapshot,
}

impl Default for ReplayTick {
    fn default() -> Self {
        Self {
            dueling: true,
            duel_ended: false,
            my_turn: true,
            inputting: false,
            turn: 1,
            phase: Phase::Main1,
            dialog: Vec::new(),
            board: BoardSnapshot::default(),
        }
    }
}

/// A whole recorded duel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayTrace {
    pub ticks: Vec<ReplayTick>,
}

/// Load a trace from a JSON file.
pub fn load_trace(path: &Path) -> Result<ReplayTrace> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let trace: ReplayTrace =
        serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    if trace.ticks.is_empty() {
        return Err(anyhow!("trace {} contains no ticks", path.display()));
    }
    Ok(trace)
}

/// Client replaying a recorded trace.
///
/// Each `is_dueling` poll consumes one tick; once the trace is exhausted the
/// client reports the duel as ended so the loop always terminates.
#[derive(Debug)]
pub struct ReplayClient {
    pending: VecDeque<ReplayTick>,
    current: ReplayTick,
    exhausted: bool,
    pub calls: Vec<String>,
}

impl ReplayClient {
    pub fn new(trace: ReplayTrace) -> Self {
        Self {
            pending: trace.ticks.into(),
            current: ReplayTick::default(),
            exhausted: false,
            calls: Vec::new(),
        }
    }

    /// True once every trace tick has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn record(&mut self, call: String) -> CallResult<()> {
        self.calls.push(call);
        Ok(())
    }
}

impl Client for ReplayClient {
    fn is_dueling(&mut self) -> CallResult<bool> {
        match self.pending.pop_front() {
            Some(next) => self.current = next,
            None => self.exhausted = true,
        }
        Ok(self.current.dueling)
    }

    fn is_duel_ended(&mut self) -> CallResult<bool> {
        Ok(self.current.duel_ended || self.exhausted)
    }

    fn is_my_turn(&mut self) -> CallResult<bool> {
        Ok(self.current.my_turn)
    }

    fn is_inputting(&mut self) -> CallResult<bool> {
        Ok(self.current.inputting)
    }

    fn turn_number(&mut self) -> CallResult<u32> {
        Ok(self.current.turn)
    }

    fn current_phase(&mut self) -> CallResult<Phase> {
        Ok(self.current.phase)
    }

    fn board_snapshot(&mut self) -> CallResult<BoardSnapshot> {
        Ok(self.current.board.clone())
    }

    fn dialog_card_list(&mut self) -> CallResult<Vec<String>> {
        Ok(self.current.dialog.clone())
    }

    fn select_card_from_dialog(
        &mut self,
        index: Option<usize>,
        button: DialogButton,
    ) -> CallResult<()> {
        self.record(format!("select_dialog({index:?}, {button:?})"))
    }

    fn cancel_activation_prompts(&mut self) -> CallResult<()> {
        self.record("cancel_activation_prompts".to_string())
    }

    fn set_activation_confirmation(&mut self, mode: ConfirmMode) -> CallResult<()> {
        self.record(format!("set_activation_confirmation({mode:?})"))
    }

    fn handle_unexpected_prompts(&mut self) -> CallResult<()> {
        self.record("handle_unexpected_prompts".to_string())
    }

    fn exit_duel(&mut self) -> CallResult<()> {
        self.record("exit_duel".to_string())
    }

    fn normal_summon(&mut self, hand_index: usize, position: usize) -> CallResult<()> {
        self.record(format!("normal_summon({hand_index}, {position})"))
    }

    fn special_summon_from_hand(&mut self, hand_index: usize, position: usize) -> CallResult<()> {
        self.record(format!("special_summon_from_hand({hand_index}, {position})"))
    }

    fn activate_effect_from_hand(&mut self, hand_index: usize) -> CallResult<()> {
        self.record(format!("activate_effect_from_hand({hand_index})"))
    }

    fn activate_effect_from_field(&mut self, position: usize) -> CallResult<()> {
        self.record(format!("activate_effect_from_field({position})"))
    }

    fn activate_spell_from_hand(&mut self, hand_index: usize, position: usize) -> CallResult<()> {
        self.record(format!("activate_spell_from_hand({hand_index}, {position})"))
    }

    fn set_spell_or_trap(&mut self, hand_index: usize, position: usize) -> CallResult<()> {
        self.record(format!("set_spell_or_trap({hand_index}, {position})"))
    }

    fn extra_deck_summon(&mut self, name: &str, positions: &[usize]) -> CallResult<()> {
        self.record(format!("extra_deck_summon({name}, {positions:?})"))
    }

    fn advance_phase(&mut self, phase: Phase) -> CallResult<()> {
        self.record(format!("advance_phase({phase:?})"))
    }
}

/// What a replay run did, for reporting.
#[derive(Debug)]
pub struct ReplayReport {
    pub ticks: u64,
    pub turns_seen: u32,
    pub calls: Vec<String>,
}

/// Run the control loop over a recorded trace.
///
/// Uses the configured thresholds and budgets but zero sleep delays, so a
/// long duel replays instantly. Each trace tick is one poll.
#[instrument(skip_all, fields(ticks = trace.ticks.len()))]
pub fn run_trace(
    config: &BotConfig,
    profile: DeckProfile,
    trace: ReplayTrace,
) -> Result<ReplayReport> {
    let resolver = ResolverConfig {
        click_delay: Duration::ZERO,
        ..config.resolver_config()
    };
    let controller_config = ControllerConfig {
        tick: Duration::ZERO,
        idle_delay: Duration::ZERO,
        ..config.controller_config()
    };
    let planner = ProfilePlanner::new(profile.clone())
        .with_retry_defaults(config.default_max_attempts, config.retry_delay());
    let mut controller = TurnController::new(
        ReplayClient::new(trace),
        planner,
        profile,
        DialogResolver::new(resolver),
        ActionExecutor::new(Duration::ZERO, Duration::ZERO),
        controller_config,
    );

    let mut ticks = 0u64;
    loop {
        ticks += 1;
        let outcome = controller.run_tick();
        if outcome == TickOutcome::DuelEnded {
            break;
        }
        // A trace that goes idle without ending has nothing left to replay.
        if outcome == TickOutcome::Idle && controller.client().is_exhausted() {
            break;
        }
    }
    let report = ReplayReport {
        ticks,
        turns_seen: controller.turns_seen(),
        calls: controller.client().calls.clone(),
    };
    info!(
        ticks = report.ticks,
        turns = report.turns_seen,
        calls = report.calls.len(),
        "replay finished"
    );
    Ok(report)
}
