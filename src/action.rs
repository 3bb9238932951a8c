//! Actions - user intents and async results, with inferred categories

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::portrait::Portrait;
use crate::state::{BattleData, Fighter};

/// Application actions with automatic category inference
#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[action(infer_categories)]
pub enum Action {
    // ===== Topic category =====
    /// Topic input text changed (start and victory screens)
    TopicChange(String),

    /// Submit a topic and kick off battle generation
    TopicSubmit(String),

    // ===== Generation category =====
    /// Result: the backend accepted the topic and returned a battle id
    GenerationDidStart { battle_id: String },

    /// Result: the create-battle request failed outright
    GenerationDidError(String),

    /// Result: a status check came back still processing
    GenerationStillRunning,

    /// Result: a status check could not reach the backend (retried)
    GenerationCheckFailed(String),

    /// Result: generation finished with the full battle payload
    GenerationDidComplete(Box<BattleData>),

    /// Result: the backend reported generation failure
    GenerationDidFail(String),

    /// User cancelled the wait from the loading screen
    GenerationAbort,

    // ===== Move category =====
    /// Highlight a slot in the move grid
    MoveSelect(usize),

    /// Use the highlighted move
    MoveConfirm,

    /// Use a move slot directly (number keys)
    MoveUse(usize),

    // ===== Narrative category =====
    /// Result: narrative text for the seq-th resolved move
    NarrativeDidLoad { seq: u64, text: String },

    // ===== Portrait category =====
    /// Result: a character portrait was fetched and decoded
    PortraitDidLoad { fighter: Fighter, portrait: Portrait },

    /// Result: portrait fetch failed; the silhouette stands in
    PortraitDidError { fighter: Fighter, error: String },

    // ===== Backdrop category =====
    /// Result: the battle backdrop was fetched and decoded
    BackdropDidLoad(Portrait),

    /// Result: backdrop fetch failed; plain background stands in
    BackdropDidError(String),

    // ===== Victory category =====
    /// Return to a clean start screen
    PlayAgain,

    // ===== Uncategorized (global) =====
    /// Timer and animation heartbeat
    Tick,

    /// Force a re-render (for cursor movement, etc.)
    Render,

    /// Exit the application
    Quit,
}
