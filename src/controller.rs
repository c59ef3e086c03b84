//! Top-level turn/phase polling loop.
//!
//! Single logical thread, cooperative polling: one control loop, no forked
//! tasks, every external call blocking. Dialog resolution always
//! happens-before phase/plan logic on a given tick; cooldown resets always
//! happen-before planning on a new turn. All mutable state (repeat tracking,
//! cooldowns, the pending plan) is owned here and lent to the collaborating
//! components.

use std::thread::sleep;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::client::{BoardSnapshot, Client, ConfirmMode};
use crate::core::cooldown::TurnCooldowns;
use crate::core::plan::Plan;
use crate::dialog::{DialogOutcome, DialogResolver};
use crate::executor::ActionExecutor;
use crate::planner::{Planner, fallback_pass_plan};
use crate::profile::DeckProfile;

/// Loop tunables. Durations are fixed delays, not deadlines; wire-level
/// timeouts belong to the transport behind the client.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Poll interval while a duel is in progress.
    pub tick: Duration,
    /// Poll interval while no duel is in progress.
    pub idle_delay: Duration,
    /// Actions issued per turn before the loop goes passive until the next
    /// turn change.
    pub max_actions_per_turn: u32,
    /// Activation confirmation mode applied when a duel is first observed.
    pub confirm_mode: ConfirmMode,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
            idle_delay: Duration::from_millis(500),
            max_actions_per_turn: 30,
            confirm_mode: ConfirmMode::On,
        }
    }
}

/// What a single tick of the control loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No duel in progress.
    Idle,
    /// Duel over; the exit cleanup call was issued.
    DuelEnded,
    /// A prompt was open and was routed to the dialog resolver.
    Dialog(DialogOutcome),
    /// Opponent's turn, unknown phase, or a non-main phase.
    Waiting,
    /// Per-turn action budget exhausted; polling continues passively.
    BudgetExhausted,
    /// A new plan was requested from the planner.
    Planned { actions: usize },
    /// One plan action was executed (cursor advanced either way).
    Executed { ok: bool },
    /// The pending plan ran out of actions and was discarded.
    PlanFinished,
}

/// Summary returned when the loop exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub turns_seen: u32,
}

/// The top-level state machine: polls the client, routes prompts to the
/// resolver, and feeds planner output to the executor one action per tick.
pub struct TurnController<C: Client, P: Planner> {
    client: C,
    planner: P,
    profile: DeckProfile,
    resolver: DialogResolver,
    executor: ActionExecutor,
    config: ControllerConfig,
    cooldowns: TurnCooldowns,
    plan: Option<Plan>,
    last_turn: Option<u32>,
    actions_used: u32,
    turns_seen: u32,
    confirm_mode_applied: bool,
}

impl<C: Client, P: Planner> TurnController<C, P> {
    pub fn new(
        client: C,
        planner: P,
        profile: DeckProfile,
        resolver: DialogResolver,
        executor: ActionExecutor,
        config: ControllerConfig,
    ) -> Self {
        Self {
            client,
            planner,
            profile,
            resolver,
            executor,
            config,
            cooldowns: TurnCooldowns::new(),
            plan: None,
            last_turn: None,
            actions_used: 0,
            turns_seen: 0,
            confirm_mode_applied: false,
        }
    }

    /// Run the polling loop until the duel-ended signal.
    ///
    /// Every failure below this point is absorbed: a crashed planner call
    /// becomes a fallback pass, a failed client call becomes a skipped tick.
    #[instrument(skip_all)]
    pub fn run_loop(&mut self) -> RunSummary {
        let mut ticks = 0u64;
        loop {
            ticks += 1;
            let outcome = self.run_tick();
            debug!(?outcome, ticks, "tick complete");
            match outcome {
                TickOutcome::DuelEnded => {
                    let summary = RunSummary {
                        ticks,
                        turns_seen: self.turns_seen,
                    };
                    info!(ticks = summary.ticks, turns = summary.turns_seen, "loop finished");
                    return summary;
                }
                TickOutcome::Idle => sleep(self.config.idle_delay),
                _ => sleep(self.config.tick),
            }
        }
    }

    /// One iteration of the polling loop.
    pub fn run_tick(&mut self) -> TickOutcome {
        match self.client.is_dueling() {
            Ok(true) => {}
            Ok(false) => return TickOutcome::Idle,
            Err(err) => {
                debug!(%err, "is_dueling failed");
                return TickOutcome::Idle;
            }
        }

        match self.client.is_duel_ended() {
            Ok(true) => {
                info!("duel ended, issuing exit cleanup");
                if let Err(err) = self.client.exit_duel() {
                    warn!(%err, "exit cleanup failed");
                }
                return TickOutcome::DuelEnded;
            }
            Ok(false) => {}
            Err(err) => debug!(%err, "is_duel_ended failed"),
        }

        if !self.confirm_mode_applied {
            if let Err(err) = self.client.set_activation_confirmation(self.config.confirm_mode) {
                debug!(%err, "setting confirmation mode failed");
            }
            self.confirm_mode_applied = true;
        }

        // Prompts preempt everything else this tick, including plan
        // execution suspended by a prompt the previous action opened.
        match self.client.is_inputting() {
            Ok(true) => {
                if let Err(err) = self.client.handle_unexpected_prompts() {
                    debug!(%err, "handle_unexpected_prompts failed");
                }
                let snapshot = self.snapshot();
                let outcome = self.resolver.resolve(
                    &mut self.client,
                    &mut self.planner,
                    &self.profile,
                    &snapshot,
                );
                return TickOutcome::Dialog(outcome);
            }
            Ok(false) => {}
            Err(err) => debug!(%err, "is_inputting failed"),
        }

        match self.client.turn_number() {
            Ok(turn) => {
                if self.last_turn != Some(turn) {
                    info!(turn, "new turn detected");
                    self.last_turn = Some(turn);
                    self.turns_seen += 1;
                    self.cooldowns.reset();
                    self.plan = None;
                    self.actions_used = 0;
                }
            }
            Err(err) => debug!(%err, "turn_number failed"),
        }

        match self.client.is_my_turn() {
            Ok(true) => {}
            Ok(false) => return TickOutcome::Waiting,
            Err(err) => {
                debug!(%err, "is_my_turn failed");
                return TickOutcome::Waiting;
            }
        }

        let phase = match self.client.current_phase() {
            Ok(phase) => phase,
            Err(err) => {
                debug!(%err, "current_phase failed");
                return TickOutcome::Waiting;
            }
        };
        if !phase.is_main() {
            return TickOutcome::Waiting;
        }

        if self.actions_used >= self.config.max_actions_per_turn {
            debug!(used = self.actions_used, "per-turn action budget exhausted");
            return TickOutcome::BudgetExhausted;
        }

        if self.plan.is_none() {
            let snapshot = self.snapshot();
            let actions = match self.planner.plan_main_phase(&snapshot, &self.cooldowns) {
                Ok(actions) if !actions.is_empty() => actions,
                Ok(_) => {
                    debug!("planner returned no actions, falling back to pass");
                    fallback_pass_plan("empty plan")
                }
                Err(err) => {
                    warn!(%err, "planner failed, falling back to pass");
                    fallback_pass_plan("planner error")
                }
            };
            let count = actions.len();
            info!(actions = count, ?phase, "main phase plan ready");
            self.plan = Some(Plan::new(actions));
            return TickOutcome::Planned { actions: count };
        }

        let action = {
            let Some(plan) = self.plan.as_mut() else {
                return TickOutcome::PlanFinished;
            };
            match plan.current().cloned() {
                Some(action) => {
                    plan.advance();
                    action
                }
                None => {
                    self.plan = None;
                    return TickOutcome::PlanFinished;
                }
            }
        };

        let ok = self.executor.execute(&mut self.client, &action);
        // Attempted either way: the planner must not re-propose this effect
        // within the turn whether it landed or exhausted its retries.
        self.cooldowns.record(&action.kind.effect_key());
        self.actions_used += 1;
        if !ok {
            warn!(label = %action.label, "action abandoned, continuing with the plan");
        }
        TickOutcome::Executed { ok }
    }

    pub fn turns_seen(&self) -> u32 {
        self.turns_seen
    }

    pub fn actions_used(&self) -> u32 {
        self.actions_used
    }

    pub fn cooldowns(&self) -> &TurnCooldowns {
        &self.cooldowns
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn planner(&self) -> &P {
        &self.planner
    }

    fn snapshot(&mut self) -> BoardSnapshot {
        match self.client.board_snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                debug!(%err, "board snapshot unreadable, using empty default");
                BoardSnapshot::default()
            }
        }
    }
}
