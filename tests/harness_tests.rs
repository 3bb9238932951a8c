//! Tests using the EffectStoreTestHarness
//!
//! These tests walk the whole session state machine the way the runtime
//! does: dispatch intents, simulate async completions, drain effects.

use tui_dispatch::testing::*;

use battlegen::{
    action::Action,
    effect::Effect,
    reducer::reducer,
    state::{
        AppState, BattleData, BattleState, Character, Fighter, MoveInfo, Screen,
        ATTACK_ANIM_TICKS, ENEMY_MOVE_DELAY_TICKS, MAX_HP, POLL_TIMEOUT_MS, VICTORY_DELAY_TICKS,
    },
};

fn mv(name: &str, damage: f32) -> MoveInfo {
    MoveInfo {
        name: name.into(),
        description: format!("{name} description"),
        damage,
    }
}

fn sample_data() -> BattleData {
    BattleData {
        fighters: [
            Character {
                name: "Mechazilla".into(),
                moves: [
                    mv("Laser Sweep", 120.0),
                    mv("Tail Whip", 80.0),
                    mv("Stomp", 60.0),
                    mv("Overcharge", 150.0),
                ],
            },
            Character {
                name: "Raptor Prime".into(),
                moves: [
                    mv("Claw Flurry", 90.0),
                    mv("Screech", 40.0),
                    mv("Pounce", 110.0),
                    mv("Pack Call", 70.0),
                ],
            },
        ],
        background: Some("A ruined city at dusk".into()),
    }
}

/// State parked on the battle screen with a deterministic rng.
fn battle_ready_state() -> AppState {
    let mut state = AppState::default();
    state.rng_seed = 42;
    state.screen = Screen::Battle;
    state.topic = "robots vs dinosaurs".into();
    state.battle = Some(BattleState::new(sample_data()));
    state
}

// ============================================================================
// Generation lifecycle
// ============================================================================

#[test]
fn test_generation_happy_path() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    // Submit - loading plus a create-battle call
    harness.dispatch_collect(Action::TopicSubmit("robots vs dinosaurs".into()));
    harness.assert_state(|s| s.screen == Screen::Loading);

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(
        |e| matches!(e, Effect::CreateBattle { topic } if topic == "robots vs dinosaurs"),
    );

    // The backend hands back an id; polling starts
    harness.complete_action(Action::GenerationDidStart {
        battle_id: "abc123".into(),
    });
    harness.process_emitted();
    let effects = harness.drain_effects();
    effects.effects_first_matches(
        |e| matches!(e, Effect::PollStatus { battle_id, .. } if battle_id == "abc123"),
    );

    // One processing answer, then completion
    harness.complete_action(Action::GenerationStillRunning);
    harness.complete_action(Action::GenerationDidComplete(Box::new(sample_data())));
    let (changed, total) = harness.process_emitted();
    assert_eq!(total, 2);
    assert_eq!(changed, 2);

    harness.assert_state(|s| s.screen == Screen::Battle);
    harness.assert_state(|s| s.battle.as_ref().unwrap().hp == [MAX_HP, MAX_HP]);
    harness.assert_state(|s| s.generation.is_none());

    // Battle entry kicks off both portraits and the backdrop
    let effects = harness.drain_effects();
    effects.effects_not_empty();
    effects.effects_none_match(|e| matches!(e, Effect::CreateBattle { .. }));
}

#[test]
fn test_generation_poll_backs_off() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::TopicSubmit("cats".into()));
    harness.dispatch_collect(Action::GenerationDidStart {
        battle_id: "id".into(),
    });
    harness.drain_effects();

    harness.dispatch_collect(Action::GenerationStillRunning);
    let effects = harness.drain_effects();
    effects.effects_first_matches(
        |e| matches!(e, Effect::PollStatus { delay_ms, .. } if *delay_ms == 3000),
    );

    harness.dispatch_collect(Action::GenerationStillRunning);
    let effects = harness.drain_effects();
    effects.effects_first_matches(
        |e| matches!(e, Effect::PollStatus { delay_ms, .. } if *delay_ms == 4500),
    );
}

#[test]
fn test_generation_times_out_to_start() {
    let mut state = AppState::default();
    state.screen = Screen::Loading;
    state.topic = "cats".into();
    state.generation = Some({
        let mut g = battlegen::state::GenerationState::new(2000);
        g.battle_id = Some("id".into());
        g.waited_ms = POLL_TIMEOUT_MS;
        g
    });
    let mut harness = EffectStoreTestHarness::new(state, reducer);

    harness.dispatch_collect(Action::GenerationStillRunning);

    harness.assert_state(|s| s.screen == Screen::Start);
    harness.assert_state(|s| s.last_error.as_deref().unwrap().contains("timed out"));
    let effects = harness.drain_effects();
    effects.effects_none_match(|e| matches!(e, Effect::PollStatus { .. }));
}

#[test]
fn test_generation_abort_cancels_poll() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    harness.dispatch_collect(Action::TopicSubmit("cats".into()));
    harness.drain_effects();
    harness.dispatch_collect(Action::GenerationAbort);

    harness.assert_state(|s| s.screen == Screen::Start);
    harness.assert_state(|s| s.last_error.is_none());
    let effects = harness.drain_effects();
    effects.effects_first_matches(|e| matches!(e, Effect::CancelPoll));
}

// ============================================================================
// Battle flow
// ============================================================================

#[test]
fn test_move_resolution_flow() {
    let mut harness = EffectStoreTestHarness::new(battle_ready_state(), reducer);

    // Overcharge (damage 150) takes 30 points
    harness.dispatch_collect(Action::MoveUse(3));
    harness.assert_state(|s| s.battle.as_ref().unwrap().hp_of(Fighter::Two) == 70.0);
    harness.assert_state(|s| {
        s.battle.as_ref().unwrap().narrative.as_deref() == Some("Mechazilla used Overcharge!")
    });

    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_first_matches(|e| {
        matches!(e, Effect::FetchNarrative { seq: 1, request }
            if request.move_name == "Overcharge" && request.defender == "Raptor Prime")
    });

    // The narrative response replaces the fallback line
    harness.complete_action(Action::NarrativeDidLoad {
        seq: 1,
        text: "A blinding arc splits the sky.".into(),
    });
    harness.process_emitted();
    harness.assert_state(|s| {
        s.battle.as_ref().unwrap().narrative.as_deref() == Some("A blinding arc splits the sky.")
    });
}

#[test]
fn test_stale_narrative_response_is_dropped() {
    let mut harness = EffectStoreTestHarness::new(battle_ready_state(), reducer);

    harness.dispatch_collect(Action::MoveUse(0));

    // A second move resolves before the first narrative lands
    let ticks = ATTACK_ANIM_TICKS + ENEMY_MOVE_DELAY_TICKS;
    for _ in 0..ticks {
        harness.dispatch_collect(Action::Tick);
    }
    harness.assert_state(|s| s.battle.as_ref().unwrap().narrative_seq == 2);

    harness.complete_action(Action::NarrativeDidLoad {
        seq: 1,
        text: "stale".into(),
    });
    harness.process_emitted();
    harness.assert_state(|s| s.battle.as_ref().unwrap().narrative.as_deref() != Some("stale"));
}

#[test]
fn test_counter_move_damages_player() {
    let mut harness = EffectStoreTestHarness::new(battle_ready_state(), reducer);

    harness.dispatch_collect(Action::MoveUse(2));
    harness.assert_state(|s| s.battle.as_ref().unwrap().hp_of(Fighter::One) == MAX_HP);

    let ticks = ATTACK_ANIM_TICKS + ENEMY_MOVE_DELAY_TICKS;
    for _ in 0..ticks {
        harness.dispatch_collect(Action::Tick);
    }

    harness.assert_state(|s| s.battle.as_ref().unwrap().hp_of(Fighter::One) < MAX_HP);
    harness.assert_state(|s| s.battle.as_ref().unwrap().hp_of(Fighter::One) >= MAX_HP - 30.0);
}

#[test]
fn test_killing_blow_reaches_victory_screen() {
    let mut state = battle_ready_state();
    state.battle.as_mut().unwrap().hp = [MAX_HP, 4.0];
    let mut harness = EffectStoreTestHarness::new(state, reducer);

    harness.dispatch_collect(Action::MoveUse(3));
    harness.assert_state(|s| s.battle.as_ref().unwrap().hp_of(Fighter::Two) == 0.0);
    harness.assert_state(|s| s.winner == Some(Fighter::One));
    harness.assert_state(|s| s.screen == Screen::Battle);

    for _ in 0..VICTORY_DELAY_TICKS {
        harness.dispatch_collect(Action::Tick);
    }

    harness.assert_state(|s| s.screen == Screen::Victory);
    // The scheduled counter-move never fires after the knockout.
    harness.assert_state(|s| s.battle.as_ref().unwrap().enemy_move_in.is_none());
    harness.assert_state(|s| s.battle.as_ref().unwrap().hp_of(Fighter::One) == MAX_HP);
}

#[test]
fn test_victory_rematch_restarts_generation() {
    let mut state = battle_ready_state();
    state.screen = Screen::Victory;
    state.winner = Some(Fighter::One);
    let mut harness = EffectStoreTestHarness::new(state, reducer);

    harness.dispatch_collect(Action::TopicSubmit("historical figures".into()));

    harness.assert_state(|s| s.screen == Screen::Loading);
    harness.assert_state(|s| s.topic == "historical figures");
    harness.assert_state(|s| s.battle.is_none() && s.winner.is_none());

    let effects = harness.drain_effects();
    effects.effects_first_matches(
        |e| matches!(e, Effect::CreateBattle { topic } if topic == "historical figures"),
    );
}

#[test]
fn test_victory_empty_submit_returns_to_start() {
    let mut state = battle_ready_state();
    state.screen = Screen::Victory;
    state.winner = Some(Fighter::Two);
    let mut harness = EffectStoreTestHarness::new(state, reducer);

    harness.dispatch_collect(Action::TopicSubmit("   ".into()));

    harness.assert_state(|s| s.screen == Screen::Start);
    harness.assert_state(|s| s.battle.is_none());
    let effects = harness.drain_effects();
    effects.effects_empty();
}

// ============================================================================
// Effect assertions
// ============================================================================

#[test]
fn test_no_effects_until_submit() {
    let mut harness = EffectStoreTestHarness::new(AppState::default(), reducer);

    let effects = harness.drain_effects();
    effects.effects_empty();

    harness.dispatch_collect(Action::TopicChange("rob".into()));
    let effects = harness.drain_effects();
    effects.effects_empty();

    harness.dispatch_collect(Action::TopicSubmit("rob".into()));
    let effects = harness.drain_effects();
    effects.effects_count(1);
    effects.effects_all_match(|e| matches!(e, Effect::CreateBattle { .. }));
}
