//! Loop-level harness tests for full duel lifecycle scenarios.
//!
//! These tests drive `run_tick` through multiple iterations to verify
//! end-to-end behavior: turn transitions, prompt interleaving, repeat
//! bailouts, action budgets, and loop termination.

use std::time::Duration;

use duelbot::client::{BoardSnapshot, CardInfo, ConfirmMode, Phase};
use duelbot::controller::{ControllerConfig, TickOutcome, TurnController};
use duelbot::core::action::{Action, ActionKind};
use duelbot::dialog::{DialogOutcome, DialogResolver, ResolverConfig};
use duelbot::executor::ActionExecutor;
use duelbot::planner::ProfilePlanner;
use duelbot::profile::DeckProfile;
use duelbot::test_support::{ScriptedClient, ScriptedObservation, ScriptedPlan, ScriptedPlanner};

fn fast_resolver() -> DialogResolver {
    DialogResolver::new(ResolverConfig {
        click_delay: Duration::ZERO,
        ..ResolverConfig::default()
    })
}

fn fast_config() -> ControllerConfig {
    ControllerConfig {
        tick: Duration::ZERO,
        idle_delay: Duration::ZERO,
        ..ControllerConfig::default()
    }
}

fn scripted_controller(
    client: ScriptedClient,
    planner: ScriptedPlanner,
    profile: DeckProfile,
) -> TurnController<ScriptedClient, ScriptedPlanner> {
    TurnController::new(
        client,
        planner,
        profile,
        fast_resolver(),
        ActionExecutor::new(Duration::ZERO, Duration::ZERO),
        fast_config(),
    )
}

fn action(label: &str, kind: ActionKind) -> Action {
    Action::new(kind, label.to_string()).with_retries(1, Duration::ZERO)
}

/// Full lifecycle: idle lobby, two played turns with a prompt in between,
/// opponent turn, duel end.
///
/// Tick sequence:
/// 1. Idle (no duel yet)
/// 2. Turn 1 plan requested
/// 3. Turn 1 first action (normal summon)
/// 4. Prompt opens, resolver selects an entry
/// 5. Turn 1 second action (effect activation)
/// 6. Opponent turn (waiting; turn counter advances)
/// 7. Turn 3 plan requested
/// 8. Duel ends, exit cleanup issued
#[test]
fn full_duel_interleaves_prompts_actions_and_turns() {
    let mut planner = ScriptedPlanner::default();
    planner.plans.push_back(ScriptedPlan::Plan(vec![
        action(
            "summon starter",
            ActionKind::NormalSummon {
                hand_index: 0,
                position: 0,
            },
        ),
        action(
            "activate starter",
            ActionKind::ActivateFromField { position: 0 },
        ),
    ]));
    planner.plans.push_back(ScriptedPlan::Plan(vec![action(
        "second turn summon",
        ActionKind::NormalSummon {
            hand_index: 1,
            position: 0,
        },
    )]));

    let client = ScriptedClient::with_ticks(vec![
        ScriptedObservation::idle(),
        ScriptedObservation::my_main(1),
        ScriptedObservation::my_main(1),
        ScriptedObservation::prompt(1, &["Card A", "Card B"]),
        ScriptedObservation::my_main(1),
        ScriptedObservation::opponent_turn(2),
        ScriptedObservation::my_main(3),
        ScriptedObservation::ended(),
    ]);

    let mut controller = scripted_controller(client, planner, DeckProfile::default());
    let outcomes: Vec<TickOutcome> = (0..8).map(|_| controller.run_tick()).collect();
    assert_eq!(
        outcomes,
        vec![
            TickOutcome::Idle,
            TickOutcome::Planned { actions: 2 },
            TickOutcome::Executed { ok: true },
            TickOutcome::Dialog(DialogOutcome::Selected),
            TickOutcome::Executed { ok: true },
            TickOutcome::Waiting,
            TickOutcome::Planned { actions: 1 },
            TickOutcome::DuelEnded,
        ],
    );
    assert_eq!(controller.turns_seen(), 3);

    let calls = &controller.client().calls;
    let summon_pos = calls
        .iter()
        .position(|call| call == "normal_summon(0, 0)")
        .expect("summon issued");
    let select_pos = calls
        .iter()
        .position(|call| call == "select_dialog(Some(0), Middle)")
        .expect("dialog selected");
    let activate_pos = calls
        .iter()
        .position(|call| call == "activate_effect_from_field(0)")
        .expect("activation issued");
    assert!(summon_pos < select_pos);
    assert!(select_pos < activate_pos);
    assert_eq!(calls.last(), Some(&"exit_duel".to_string()));
    assert!(
        calls
            .iter()
            .any(|call| call == "handle_unexpected_prompts")
    );
}

/// `run_loop` polls through idle waits and a played turn, then terminates on
/// the duel-ended signal with an accurate summary.
#[test]
fn run_loop_terminates_on_duel_end_with_summary() {
    let client = ScriptedClient::with_ticks(vec![
        ScriptedObservation::idle(),
        ScriptedObservation::idle(),
        ScriptedObservation::my_main(1),
        ScriptedObservation::my_main(1),
        ScriptedObservation::opponent_turn(2),
        ScriptedObservation::ended(),
    ]);
    let mut planner = ScriptedPlanner::default();
    planner.plans.push_back(ScriptedPlan::Plan(vec![action(
        "lone summon",
        ActionKind::NormalSummon {
            hand_index: 0,
            position: 0,
        },
    )]));
    let mut controller = scripted_controller(client, planner, DeckProfile::default());

    let summary = controller.run_loop();
    assert_eq!(summary.ticks, 6);
    assert_eq!(summary.turns_seen, 2);
    assert_eq!(
        controller.client().calls.last(),
        Some(&"exit_duel".to_string())
    );
    assert!(
        controller
            .client()
            .calls
            .iter()
            .any(|call| call == "normal_summon(0, 0)")
    );
}

/// A dialog that never clears triggers the bailout on the third identical
/// observation, and the counter reset lets resolution resume afterwards.
#[test]
fn wedged_dialog_bails_out_then_recovers() {
    let wedged = ScriptedObservation::prompt(1, &["Stuck Prompt"]);
    let client = ScriptedClient::with_ticks(vec![
        wedged.clone(),
        wedged.clone(),
        wedged.clone(),
        wedged,
        ScriptedObservation::ended(),
    ]);
    let mut controller =
        scripted_controller(client, ScriptedPlanner::default(), DeckProfile::default());

    let outcomes: Vec<TickOutcome> = (0..5).map(|_| controller.run_tick()).collect();
    assert_eq!(
        outcomes,
        vec![
            TickOutcome::Dialog(DialogOutcome::Selected),
            TickOutcome::Dialog(DialogOutcome::Selected),
            TickOutcome::Dialog(DialogOutcome::Bailout),
            TickOutcome::Dialog(DialogOutcome::Selected),
            TickOutcome::DuelEnded,
        ],
    );

    let calls = &controller.client().calls;
    let cancel_count = calls
        .iter()
        .filter(|call| *call == "cancel_activation_prompts")
        .count();
    assert_eq!(cancel_count, 1);
    // Bailout switches confirmation to Default and restores the configured
    // mode afterwards (plus the one applied at duel start).
    assert!(
        calls
            .iter()
            .any(|call| call == "set_activation_confirmation(Default)")
    );
    assert_eq!(
        calls
            .iter()
            .filter(|call| *call == "set_activation_confirmation(On)")
            .count(),
        2
    );
}

/// The profile planner drives a whole turn from board state alone.
#[test]
fn profile_planner_summons_and_follows_up_from_board_state() {
    let mut observation = ScriptedObservation::my_main(1);
    observation.phase = Phase::Main1;
    let mut client = ScriptedClient::new();
    client.current = observation;
    client.board = BoardSnapshot {
        hand: vec![
            CardInfo {
                index: 0,
                name: Some("Emergence".to_string()),
            },
            CardInfo {
                index: 1,
                name: Some("Mo Ye".to_string()),
            },
        ],
        can_normal_summon: true,
        free_monster_zones: 5,
        free_spell_trap_zones: 3,
    };
    let profile = DeckProfile {
        deck_name: "swordsoul".to_string(),
        starters: vec!["Mo Ye".to_string()],
        spells: vec!["Emergence".to_string()],
        extra_deck_priority: vec!["Chixiao".to_string()],
        ..DeckProfile::default()
    };
    let planner = ProfilePlanner::new(profile.clone());
    let mut controller = TurnController::new(
        client,
        planner,
        profile,
        fast_resolver(),
        ActionExecutor::new(Duration::ZERO, Duration::ZERO),
        fast_config(),
    );

    assert_eq!(controller.run_tick(), TickOutcome::Planned { actions: 3 });
    for _ in 0..3 {
        assert_eq!(controller.run_tick(), TickOutcome::Executed { ok: true });
    }
    assert_eq!(controller.run_tick(), TickOutcome::PlanFinished);

    let calls = &controller.client().calls;
    assert!(calls.iter().any(|call| call == "normal_summon(1, 0)"));
    assert!(
        calls
            .iter()
            .any(|call| call == "activate_effect_from_field(0)")
    );
    assert!(
        calls
            .iter()
            .any(|call| call == "extra_deck_summon(Chixiao, [0, 1])")
    );
}

/// Failed dispatches still consume the per-turn budget, so a misbehaving
/// client cannot trap the loop in an action storm.
#[test]
fn action_budget_caps_a_turn_even_when_everything_fails() {
    let mut planner = ScriptedPlanner::default();
    for _ in 0..4 {
        planner.plans.push_back(ScriptedPlan::Plan(vec![
            action(
                "doomed summon",
                ActionKind::NormalSummon {
                    hand_index: 0,
                    position: 0,
                },
            ),
            action(
                "doomed set",
                ActionKind::SetSpellTrap {
                    hand_index: 1,
                    position: 0,
                },
            ),
        ]));
    }
    let mut client = ScriptedClient::new();
    client.fail_ops.push("normal_summon");
    client.fail_ops.push("set_spell_or_trap");

    let config = ControllerConfig {
        max_actions_per_turn: 3,
        ..fast_config()
    };
    let mut controller = TurnController::new(
        client,
        planner,
        DeckProfile::default(),
        fast_resolver(),
        ActionExecutor::new(Duration::ZERO, Duration::ZERO),
        config,
    );

    assert_eq!(controller.run_tick(), TickOutcome::Planned { actions: 2 });
    assert_eq!(controller.run_tick(), TickOutcome::Executed { ok: false });
    assert_eq!(controller.run_tick(), TickOutcome::Executed { ok: false });
    assert_eq!(controller.run_tick(), TickOutcome::PlanFinished);
    assert_eq!(controller.run_tick(), TickOutcome::Planned { actions: 2 });
    assert_eq!(controller.run_tick(), TickOutcome::Executed { ok: false });
    assert_eq!(controller.run_tick(), TickOutcome::BudgetExhausted);
    assert_eq!(controller.run_tick(), TickOutcome::BudgetExhausted);

    // Next turn resets the budget.
    controller.client_mut().current = ScriptedObservation::my_main(2);
    assert_eq!(controller.run_tick(), TickOutcome::Planned { actions: 2 });
    assert_eq!(controller.actions_used(), 0);
}

/// The confirmation mode from configuration is applied once per run, on the
/// first dueling tick.
#[test]
fn confirmation_mode_is_applied_once_at_duel_start() {
    let config = ControllerConfig {
        confirm_mode: ConfirmMode::Off,
        ..fast_config()
    };
    let mut controller = TurnController::new(
        ScriptedClient::new(),
        ScriptedPlanner::default(),
        DeckProfile::default(),
        fast_resolver(),
        ActionExecutor::new(Duration::ZERO, Duration::ZERO),
        config,
    );
    controller.run_tick();
    controller.run_tick();
    controller.run_tick();
    let applied = controller
        .client()
        .calls
        .iter()
        .filter(|call| *call == "set_activation_confirmation(Off)")
        .count();
    assert_eq!(applied, 1);
}
