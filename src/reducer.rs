//! Reducer - pure function: (state, action) -> DispatchResult

use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::api;
use crate::effect::{Effect, NarrativeRequest};
use crate::portrait::Portrait;
use crate::state::{
    damage_percent, AppState, BattleState, Fighter, GenerationState, Screen, ATTACK_ANIM_TICKS,
    ENEMY_MOVE_DELAY_TICKS, POLL_DELAY_MAX_MS, POLL_TIMEOUT_MS, VICTORY_DELAY_TICKS,
    VICTORY_SLIDE_TICKS,
};

/// The reducer handles all state transitions
pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        // ===== Topic entry =====
        Action::TopicChange(text) => topic_change(state, text),
        Action::TopicSubmit(text) => topic_submit(state, text),

        // ===== Generation lifecycle =====
        Action::GenerationDidStart { battle_id } => generation_started(state, battle_id),
        Action::GenerationDidError(error) => {
            abort_to_start(state, Some(format!("Could not start generation: {error}")))
        }
        Action::GenerationStillRunning => poll_continue(state, None),
        Action::GenerationCheckFailed(error) => poll_continue(state, Some(error)),
        Action::GenerationDidComplete(data) => generation_completed(state, *data),
        Action::GenerationDidFail(error) => {
            abort_to_start(state, Some(format!("Generation failed: {error}")))
        }
        Action::GenerationAbort => {
            let mut result = abort_to_start(state, None);
            if result.changed {
                result.effects.push(Effect::CancelPoll);
            }
            result
        }

        // ===== Battle =====
        Action::MoveSelect(index) => move_select(state, index),
        Action::MoveConfirm => {
            let Some(index) = state.battle.as_ref().map(|battle| battle.selected_move) else {
                return DispatchResult::unchanged();
            };
            player_move(state, index)
        }
        Action::MoveUse(index) => player_move(state, index),
        Action::NarrativeDidLoad { seq, text } => narrative_loaded(state, seq, text),
        Action::PortraitDidLoad { fighter, portrait } => portrait_loaded(state, fighter, portrait),
        Action::PortraitDidError { fighter, error } => portrait_failed(state, fighter, error),
        Action::BackdropDidLoad(portrait) => backdrop_loaded(state, portrait),
        Action::BackdropDidError(error) => backdrop_failed(state, error),

        // ===== Victory =====
        Action::PlayAgain => play_again(state),

        // ===== Global =====
        Action::Tick => tick(state),
        Action::Render => DispatchResult::changed(),
        Action::Quit => DispatchResult::unchanged(),
    }
}

// ============================================================================
// Topic entry
// ============================================================================

fn topic_change(state: &mut AppState, text: String) -> DispatchResult<Effect> {
    if !matches!(state.screen, Screen::Start | Screen::Victory) {
        return DispatchResult::unchanged();
    }
    state.topic_input = text;
    DispatchResult::changed()
}

fn topic_submit(state: &mut AppState, text: String) -> DispatchResult<Effect> {
    if !matches!(state.screen, Screen::Start | Screen::Victory) {
        return DispatchResult::unchanged();
    }
    let topic = text.trim().to_string();
    if topic.is_empty() {
        // An empty submit on the victory screen falls back to a clean start.
        if state.screen == Screen::Victory {
            return play_again(state);
        }
        return DispatchResult::unchanged();
    }

    state.reset_session();
    state.topic = topic.clone();
    state.topic_input.clear();
    state.screen = Screen::Loading;
    state.generation = Some(GenerationState::new(state.poll_interval_ms));
    DispatchResult::changed_with(Effect::CreateBattle { topic })
}

// ============================================================================
// Generation lifecycle
// ============================================================================

fn generation_started(state: &mut AppState, battle_id: String) -> DispatchResult<Effect> {
    if state.screen != Screen::Loading {
        return DispatchResult::unchanged();
    }
    let Some(generation) = state.generation.as_mut() else {
        return DispatchResult::unchanged();
    };
    generation.battle_id = Some(battle_id.clone());
    let delay_ms = generation.next_delay_ms;
    DispatchResult::changed_with(Effect::PollStatus {
        battle_id,
        delay_ms,
    })
}

/// One status check yielded "still processing" (or a swallowed transport
/// error). Schedule the next check with backoff, unless the deadline passed.
fn poll_continue(state: &mut AppState, error: Option<String>) -> DispatchResult<Effect> {
    if state.screen != Screen::Loading {
        return DispatchResult::unchanged();
    }
    let Some(generation) = state.generation.as_mut() else {
        return DispatchResult::unchanged();
    };
    let Some(battle_id) = generation.battle_id.clone() else {
        return DispatchResult::unchanged();
    };

    generation.waited_ms = generation.waited_ms.saturating_add(generation.next_delay_ms);
    if error.is_some() {
        generation.poll_errors = generation.poll_errors.saturating_add(1);
    }
    if generation.waited_ms >= POLL_TIMEOUT_MS {
        return abort_to_start(
            state,
            Some("Generation timed out. Try another topic.".to_string()),
        );
    }

    generation.next_delay_ms = next_poll_delay(generation.next_delay_ms);
    let delay_ms = generation.next_delay_ms;
    DispatchResult::changed_with(Effect::PollStatus {
        battle_id,
        delay_ms,
    })
}

fn next_poll_delay(delay_ms: u64) -> u64 {
    (delay_ms.saturating_mul(3) / 2).min(POLL_DELAY_MAX_MS)
}

fn generation_completed(state: &mut AppState, data: crate::state::BattleData) -> DispatchResult<Effect> {
    if state.screen != Screen::Loading {
        return DispatchResult::unchanged();
    }
    state.generation = None;
    state.winner = None;
    state.last_error = None;

    let mut battle = BattleState::new(data);
    battle.portraits = [DataResource::Loading, DataResource::Loading];
    battle.backdrop = DataResource::Loading;
    state.battle = Some(battle);
    state.screen = Screen::Battle;

    let mut result = DispatchResult::changed_with(Effect::LoadPortrait {
        fighter: Fighter::One,
    });
    result.effects.push(Effect::LoadPortrait {
        fighter: Fighter::Two,
    });
    result.effects.push(Effect::LoadBackdrop);
    result
}

fn abort_to_start(state: &mut AppState, error: Option<String>) -> DispatchResult<Effect> {
    if state.screen != Screen::Loading {
        return DispatchResult::unchanged();
    }
    state.reset_session();
    state.screen = Screen::Start;
    state.last_error = error;
    DispatchResult::changed()
}

// ============================================================================
// Battle
// ============================================================================

fn move_select(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    if state.screen != Screen::Battle {
        return DispatchResult::unchanged();
    }
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };
    if index >= battle.data.fighter(Fighter::One).moves.len() || battle.selected_move == index {
        return DispatchResult::unchanged();
    }
    battle.selected_move = index;
    DispatchResult::changed()
}

fn player_move(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    if state.screen != Screen::Battle {
        return DispatchResult::unchanged();
    }
    let Some(battle) = state.battle.as_ref() else {
        return DispatchResult::unchanged();
    };
    if battle.input_locked() {
        return DispatchResult::unchanged();
    }
    resolve_move(state, Fighter::One, index)
}

/// Apply one move: damage the defender, start the swing animation, and
/// request narrative text. Schedules either the victory reveal or the
/// opponent's counter-move.
fn resolve_move(state: &mut AppState, attacker: Fighter, index: usize) -> DispatchResult<Effect> {
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };
    let defender = attacker.opponent();
    let Some(move_info) = battle.data.fighter(attacker).moves.get(index).cloned() else {
        return DispatchResult::unchanged();
    };
    let attacker_name = battle.data.fighter(attacker).name.clone();
    let defender_name = battle.data.fighter(defender).name.clone();

    let remaining = (battle.hp[defender.index()] - damage_percent(move_info.damage)).max(0.0);
    battle.hp[defender.index()] = remaining;

    battle.narrative_seq = battle.narrative_seq.wrapping_add(1);
    let seq = battle.narrative_seq;
    battle.narrative = Some(api::fallback_narrative(&attacker_name, &move_info.name));
    battle.attacker = Some(attacker);
    battle.anim_ticks_remaining = ATTACK_ANIM_TICKS;
    if attacker == Fighter::One {
        battle.selected_move = index;
    }

    if remaining <= 0.0 {
        // A scheduled counter-move must not fire after the killing blow.
        battle.enemy_move_in = None;
        battle.victory_in = Some(VICTORY_DELAY_TICKS);
        state.winner = Some(attacker);
    } else if attacker == Fighter::One {
        battle.enemy_move_in = Some(ATTACK_ANIM_TICKS + ENEMY_MOVE_DELAY_TICKS);
    }

    DispatchResult::changed_with(Effect::FetchNarrative {
        seq,
        request: NarrativeRequest {
            attacker: attacker_name,
            defender: defender_name,
            move_name: move_info.name,
            move_description: move_info.description,
        },
    })
}

fn narrative_loaded(state: &mut AppState, seq: u64, text: String) -> DispatchResult<Effect> {
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };
    if seq != battle.narrative_seq {
        // A newer move superseded this response.
        return DispatchResult::unchanged();
    }
    battle.narrative = Some(text);
    DispatchResult::changed()
}

fn portrait_loaded(
    state: &mut AppState,
    fighter: Fighter,
    portrait: Portrait,
) -> DispatchResult<Effect> {
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };
    battle.portraits[fighter.index()] = DataResource::Loaded(portrait);
    DispatchResult::changed()
}

fn portrait_failed(state: &mut AppState, fighter: Fighter, error: String) -> DispatchResult<Effect> {
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };
    battle.portraits[fighter.index()] = DataResource::Failed(error);
    DispatchResult::changed()
}

fn backdrop_loaded(state: &mut AppState, portrait: Portrait) -> DispatchResult<Effect> {
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };
    battle.backdrop = DataResource::Loaded(portrait);
    DispatchResult::changed()
}

fn backdrop_failed(state: &mut AppState, error: String) -> DispatchResult<Effect> {
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };
    battle.backdrop = DataResource::Failed(error);
    DispatchResult::changed()
}

// ============================================================================
// Victory
// ============================================================================

fn play_again(state: &mut AppState) -> DispatchResult<Effect> {
    if state.screen != Screen::Victory {
        return DispatchResult::unchanged();
    }
    state.reset_session();
    state.topic_input.clear();
    state.screen = Screen::Start;
    DispatchResult::changed()
}

// ============================================================================
// Heartbeat
// ============================================================================

fn tick(state: &mut AppState) -> DispatchResult<Effect> {
    state.tick = state.tick.wrapping_add(1);
    match state.screen {
        Screen::Start => DispatchResult::unchanged(),
        Screen::Loading => {
            if let Some(generation) = state.generation.as_mut() {
                generation.ticks = generation.ticks.wrapping_add(1);
            }
            // Spinner and gauge animate every beat.
            DispatchResult::changed()
        }
        Screen::Battle => battle_tick(state),
        Screen::Victory => {
            let Some(battle) = state.battle.as_mut() else {
                return DispatchResult::unchanged();
            };
            if battle.victory_ticks < VICTORY_SLIDE_TICKS {
                battle.victory_ticks += 1;
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
    }
}

fn battle_tick(state: &mut AppState) -> DispatchResult<Effect> {
    let Some(battle) = state.battle.as_mut() else {
        return DispatchResult::unchanged();
    };
    let mut changed = false;

    if battle.anim_ticks_remaining > 0 {
        battle.anim_ticks_remaining -= 1;
        if battle.anim_ticks_remaining == 0 {
            battle.attacker = None;
        }
        changed = true;
    }

    if let Some(remaining) = battle.victory_in {
        if remaining <= 1 {
            battle.victory_in = None;
            battle.victory_ticks = 0;
            state.screen = Screen::Victory;
        } else {
            battle.victory_in = Some(remaining - 1);
        }
        return DispatchResult::changed();
    }

    if let Some(remaining) = battle.enemy_move_in {
        if remaining <= 1 {
            battle.enemy_move_in = None;
            let index = (next_rand(&mut state.rng_seed) % 4) as usize;
            let mut result = resolve_move(state, Fighter::Two, index);
            result.changed = true;
            return result;
        }
        battle.enemy_move_in = Some(remaining - 1);
        changed = true;
    }

    if changed {
        DispatchResult::changed()
    } else {
        DispatchResult::unchanged()
    }
}

fn next_rand(seed: &mut u64) -> u32 {
    *seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1);
    (*seed >> 32) as u32
}
