//! Generation service API client

use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

use crate::effect::NarrativeRequest;
use crate::state::{BattleData, Character, Fighter, MoveInfo};

/// Failures from the generation service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection, timeout, body decode)
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The service answered with a non-success status
    #[error("server error: HTTP {0}")]
    Server(reqwest::StatusCode),
}

/// Outcome of one battle-status check.
#[derive(Debug, Clone, PartialEq)]
pub enum BattleStatus {
    Processing,
    Completed(BattleData),
    Failed(String),
}

// ============================================================================
// Battle lifecycle
// ============================================================================

#[derive(Debug, Deserialize)]
struct CreateBattleResponse {
    battle_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    data: Option<BattlePayload>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NarrativeResponse {
    narrative: String,
}

/// Submit a topic; returns the battle id to poll with.
pub async fn create_battle(base: &str, topic: &str) -> Result<String, ApiError> {
    let url = format!("{base}/generate-battle");
    let response = client()
        .post(&url)
        .json(&serde_json::json!({ "topic": topic }))
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(ApiError::Server(response.status()));
    }
    let data: CreateBattleResponse = response.json().await?;
    Ok(data.battle_id)
}

/// Check generation status for a battle id.
pub async fn check_battle_status(base: &str, battle_id: &str) -> Result<BattleStatus, ApiError> {
    let url = format!("{base}/battle-status/{battle_id}");
    let response = client().get(&url).send().await?;
    if !response.status().is_success() {
        return Err(ApiError::Server(response.status()));
    }
    let data: StatusResponse = response.json().await?;
    match data.status.as_str() {
        "completed" => match data.data {
            Some(payload) => Ok(BattleStatus::Completed(payload.into())),
            None => Ok(BattleStatus::Failed(
                "completed status without battle data".to_string(),
            )),
        },
        "failed" => Ok(BattleStatus::Failed(
            data.error.unwrap_or_else(|| "generation failed".to_string()),
        )),
        _ => Ok(BattleStatus::Processing),
    }
}

// ============================================================================
// Narrative
// ============================================================================

/// The canonical line shown when narrative generation is unavailable.
pub fn fallback_narrative(attacker: &str, move_name: &str) -> String {
    format!("{attacker} used {move_name}!")
}

/// Fetch narrative text for a move. Never fails: any error collapses into
/// the fallback line so the battle always proceeds.
pub async fn generate_narrative(base: &str, request: &NarrativeRequest) -> String {
    match try_generate_narrative(base, request).await {
        Ok(text) => text,
        Err(_) => fallback_narrative(&request.attacker, &request.move_name),
    }
}

async fn try_generate_narrative(
    base: &str,
    request: &NarrativeRequest,
) -> Result<String, ApiError> {
    let url = format!("{base}/generate-narrative");
    let body = serde_json::json!({
        "attacker": request.attacker,
        "defender": request.defender,
        "move": request.move_name,
        "moveDescription": request.move_description,
    });
    let response = client().post(&url).json(&body).send().await?;
    if !response.status().is_success() {
        return Err(ApiError::Server(response.status()));
    }
    let data: NarrativeResponse = response.json().await?;
    Ok(data.narrative)
}

// ============================================================================
// Images
// ============================================================================

pub async fn fetch_character_image(base: &str, fighter: Fighter) -> Result<Vec<u8>, ApiError> {
    fetch_image(&format!("{base}/images/character{}", fighter.number())).await
}

pub async fn fetch_background_image(base: &str) -> Result<Vec<u8>, ApiError> {
    fetch_image(&format!("{base}/images/background")).await
}

/// URL for a sized placeholder image.
pub fn placeholder_image_url(base: &str, width: u32, height: u32) -> String {
    format!("{base}/placeholder/{width}/{height}")
}

pub async fn fetch_image(url: &str) -> Result<Vec<u8>, ApiError> {
    let response = client().get(url).send().await?;
    if !response.status().is_success() {
        return Err(ApiError::Server(response.status()));
    }
    Ok(response.bytes().await?.to_vec())
}

fn client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
struct BattlePayload {
    #[serde(rename = "Character 1")]
    character1: CharacterPayload,
    #[serde(rename = "Character 2")]
    character2: CharacterPayload,
    #[serde(rename = "Background")]
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CharacterPayload {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Moves")]
    moves: MovesPayload,
}

#[derive(Debug, Deserialize)]
struct MovesPayload {
    #[serde(rename = "Move_1")]
    first: MovePayload,
    #[serde(rename = "Move_2")]
    second: MovePayload,
    #[serde(rename = "Move_3")]
    third: MovePayload,
    #[serde(rename = "Move_4")]
    fourth: MovePayload,
}

#[derive(Debug, Deserialize)]
struct MovePayload {
    #[serde(rename = "Move_name")]
    name: String,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "Damage")]
    damage: f32,
}

impl From<MovePayload> for MoveInfo {
    fn from(payload: MovePayload) -> Self {
        MoveInfo {
            name: payload.name,
            description: payload.description,
            damage: payload.damage,
        }
    }
}

impl From<CharacterPayload> for Character {
    fn from(payload: CharacterPayload) -> Self {
        let moves = payload.moves;
        Character {
            name: payload.name,
            moves: [
                moves.first.into(),
                moves.second.into(),
                moves.third.into(),
                moves.fourth.into(),
            ],
        }
    }
}

impl From<BattlePayload> for BattleData {
    fn from(payload: BattlePayload) -> Self {
        BattleData {
            fighters: [payload.character1.into(), payload.character2.into()],
            background: payload.background,
        }
    }
}
