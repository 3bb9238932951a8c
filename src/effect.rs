//! Effects - side effects declared by the reducer

use crate::state::Fighter;

/// Body of a generate-narrative request.
#[derive(Clone, Debug, PartialEq)]
pub struct NarrativeRequest {
    pub attacker: String,
    pub defender: String,
    pub move_name: String,
    pub move_description: String,
}

/// Side effects that can be triggered by actions
#[derive(Debug, Clone)]
pub enum Effect {
    /// POST the topic to the generation service
    CreateBattle { topic: String },
    /// Wait `delay_ms`, then check generation status once
    PollStatus { battle_id: String, delay_ms: u64 },
    /// Cancel the in-flight create/status tasks
    CancelPoll,
    /// Fetch narrative text for a resolved move (display only)
    FetchNarrative { seq: u64, request: NarrativeRequest },
    /// Fetch and decode a character portrait
    LoadPortrait { fighter: Fighter },
    /// Fetch and decode the battle backdrop
    LoadBackdrop,
}
