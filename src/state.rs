//! Application state - single source of truth

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;

use crate::art;
use crate::portrait::Portrait;

/// Both fighters start each battle with a full 100-point pool.
pub const MAX_HP: f32 = 100.0;

/// Heartbeat period driving every timer and animation.
pub const TICK_MS: u64 = 100;

/// Attack swing animation; player input is blocked while it runs.
pub const ATTACK_ANIM_TICKS: u16 = 15;

/// Gap between the player's swing settling and the counter-move.
pub const ENEMY_MOVE_DELAY_TICKS: u16 = 10;

/// Pause between the killing blow and the victory screen.
pub const VICTORY_DELAY_TICKS: u16 = 10;

/// Loser slide-away animation on the victory screen.
pub const VICTORY_SLIDE_TICKS: u16 = 20;

/// Base delay between generation status checks.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

/// Status-check delay grows by 3/2 per processing response, capped here.
pub const POLL_DELAY_MAX_MS: u64 = 10_000;

/// Accumulated wait after which generation is declared timed out.
pub const POLL_TIMEOUT_MS: u64 = 180_000;

/// The backend usually finishes within a minute; the loading gauge
/// simulates linear progress against this and holds at 99%.
pub const GENERATION_EXPECTED_MS: u64 = 60_000;

/// Damage scaling: a 150-damage move takes 30% of the 100-point pool.
pub fn damage_percent(damage: f32) -> f32 {
    damage / 150.0 * 30.0
}

/// The four top-level screens of a battle session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Screen {
    #[default]
    Start,
    Loading,
    Battle,
    Victory,
}

/// One of the two generated combatants. `One` is the player's side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Fighter {
    One,
    Two,
}

impl Fighter {
    pub fn opponent(self) -> Self {
        match self {
            Fighter::One => Fighter::Two,
            Fighter::Two => Fighter::One,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Fighter::One => 0,
            Fighter::Two => 1,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Fighter::One => 1,
            Fighter::Two => 2,
        }
    }

    /// Payload key as the generation service spells it.
    pub fn key(self) -> &'static str {
        match self {
            Fighter::One => "Character 1",
            Fighter::Two => "Character 2",
        }
    }

    /// Short identifier for task keys and image paths.
    pub fn label(self) -> &'static str {
        match self {
            Fighter::One => "character1",
            Fighter::Two => "character2",
        }
    }
}

/// One of a character's four attacks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MoveInfo {
    pub name: String,
    pub description: String,
    pub damage: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Character {
    pub name: String,
    pub moves: [MoveInfo; 4],
}

/// The generated battle payload. Exactly two characters with four moves
/// each; immutable once generation completes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BattleData {
    pub fighters: [Character; 2],
    pub background: Option<String>,
}

impl BattleData {
    pub fn fighter(&self, who: Fighter) -> &Character {
        &self.fighters[who.index()]
    }
}

/// Bookkeeping for one generation wait, present only while loading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GenerationState {
    /// Set once the create request resolves; polling starts after that.
    pub battle_id: Option<String>,
    /// Total time spent waiting on status checks so far.
    pub waited_ms: u64,
    /// Delay before the next status check.
    pub next_delay_ms: u64,
    /// Transport errors swallowed during polling.
    pub poll_errors: u32,
    /// Heartbeats since the topic was submitted; drives the progress gauge.
    pub ticks: u64,
}

impl GenerationState {
    pub fn new(poll_interval_ms: u64) -> Self {
        Self {
            battle_id: None,
            waited_ms: 0,
            next_delay_ms: poll_interval_ms,
            poll_errors: 0,
            ticks: 0,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.ticks.saturating_mul(TICK_MS)
    }

    /// Simulated progress, capped at 99 until the backend answers.
    pub fn progress_percent(&self) -> u16 {
        let pct = self.elapsed_ms().saturating_mul(100) / GENERATION_EXPECTED_MS;
        pct.min(99) as u16
    }

    pub fn remaining_secs(&self) -> u64 {
        (GENERATION_EXPECTED_MS / 1000).saturating_sub(self.elapsed_ms() / 1000)
    }

    /// Rotating status line, advanced by simulated progress.
    pub fn message(&self) -> &'static str {
        let messages = art::LOADING_MESSAGES;
        let index = (self.progress_percent() as usize * messages.len() / 100)
            .min(messages.len() - 1);
        messages[index]
    }
}

/// Live battle state, created on generation completion and kept through
/// the victory screen so the winner's details stay on hand.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct BattleState {
    pub data: BattleData,
    /// Hit points, indexed by `Fighter::index`; clamped to [0, MAX_HP].
    pub hp: [f32; 2],
    /// Narrative line for the most recent move.
    pub narrative: Option<String>,
    /// Bumped per resolved move; stale narrative responses are dropped.
    pub narrative_seq: u64,
    /// Highlighted slot in the move grid.
    pub selected_move: usize,
    /// Who is mid-swing, for the attack offset animation.
    pub attacker: Option<Fighter>,
    pub anim_ticks_remaining: u16,
    /// Countdown to the opponent's automatic counter-move.
    pub enemy_move_in: Option<u16>,
    /// Countdown to the victory screen after a killing blow.
    pub victory_in: Option<u16>,
    /// Heartbeats spent on the victory screen, for the loser slide.
    pub victory_ticks: u16,
    pub portraits: [DataResource<Portrait>; 2],
    pub backdrop: DataResource<Portrait>,
}

impl BattleState {
    pub fn new(data: BattleData) -> Self {
        Self {
            data,
            hp: [MAX_HP, MAX_HP],
            narrative: None,
            narrative_seq: 0,
            selected_move: 0,
            attacker: None,
            anim_ticks_remaining: 0,
            enemy_move_in: None,
            victory_in: None,
            victory_ticks: 0,
            portraits: [DataResource::Empty, DataResource::Empty],
            backdrop: DataResource::Empty,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.anim_ticks_remaining > 0
    }

    /// Player input is locked while a swing, counter-move, or victory
    /// reveal is pending.
    pub fn input_locked(&self) -> bool {
        self.is_animating() || self.enemy_move_in.is_some() || self.victory_in.is_some()
    }

    pub fn hp_of(&self, who: Fighter) -> f32 {
        self.hp[who.index()]
    }

    pub fn name_of(&self, who: Fighter) -> &str {
        &self.data.fighter(who).name
    }
}

/// Application state - everything the UI needs to render
#[derive(Clone, Debug, tui_dispatch::DebugState, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    // --- Session (visible in debug) ---
    /// Which screen owns the terminal.
    #[debug(section = "Session", label = "Screen", debug_fmt)]
    pub screen: Screen,

    /// The submitted topic for the current session.
    #[debug(section = "Session", label = "Topic")]
    pub topic: String,

    /// Set when a killing blow lands; cleared on reset.
    #[debug(section = "Session", label = "Winner", debug_fmt)]
    pub winner: Option<Fighter>,

    /// Why the previous session aborted, shown on the start screen.
    #[debug(section = "Session", label = "Error", debug_fmt)]
    pub last_error: Option<String>,

    /// Generation wait bookkeeping.
    #[debug(section = "Generation", label = "Task", debug_fmt)]
    pub generation: Option<GenerationState>,

    // --- Internals (skipped) ---
    #[debug(skip)]
    pub battle: Option<BattleState>,

    /// Topic text being edited on the start/victory screens.
    #[debug(skip)]
    pub topic_input: String,

    /// Base delay between status checks (from the CLI).
    #[debug(skip)]
    pub poll_interval_ms: u64,

    /// LCG state for the opponent's uniform move choice.
    #[debug(skip)]
    pub rng_seed: u64,

    /// Global heartbeat counter.
    #[debug(skip)]
    pub tick: u64,
}

impl AppState {
    pub fn new(poll_interval_ms: u64) -> Self {
        Self {
            screen: Screen::Start,
            topic: String::new(),
            winner: None,
            last_error: None,
            generation: None,
            battle: None,
            topic_input: String::new(),
            poll_interval_ms,
            rng_seed: seed_from_time(),
            tick: 0,
        }
    }

    /// Discard everything tied to the current play-through.
    pub fn reset_session(&mut self) {
        self.topic.clear();
        self.winner = None;
        self.last_error = None;
        self.generation = None;
        self.battle = None;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL_MS)
    }
}

fn seed_from_time() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (now.as_secs() << 32) ^ now.subsec_nanos() as u64
}
