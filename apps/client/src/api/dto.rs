//! Wire DTOs for the game server's JSON documents.
//!
//! Decoding is strict about the fields the client depends on and lenient
//! about the rest: everything descriptive is optional, and `null` arrays
//! decode as empty.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::OP_FETCH_STATE;
use crate::domain::{ActionId, AvailableActions, GameId, GameState, PlayerId, PlayerView};
use crate::error::ClientError;

/// Body of a successful game creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewGameResponse {
    pub id: GameId,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Body of the server's index document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerInfo {
    pub message: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub games_started: Option<u64>,
    #[serde(default)]
    pub new_game: Option<String>,
}

/// Error document returned alongside non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub status_code: Option<u16>,
}

#[derive(Debug, Deserialize)]
struct PlayerViewDto {
    #[serde(default)]
    actions: Option<BTreeMap<ActionId, String>>,
    #[serde(default)]
    wind: Option<String>,
    #[serde(default)]
    score: Option<i64>,
    #[serde(default)]
    received: Option<String>,
    #[serde(default)]
    concealed: Option<Vec<String>>,
    #[serde(default)]
    exposed: Option<Vec<String>>,
    #[serde(default)]
    discarded: Option<Vec<String>>,
}

impl From<PlayerViewDto> for PlayerView {
    fn from(dto: PlayerViewDto) -> Self {
        let actions: AvailableActions = dto.actions.unwrap_or_default();
        Self {
            actions,
            wind: dto.wind,
            score: dto.score,
            received: dto.received,
            concealed: dto.concealed.unwrap_or_default(),
            exposed: dto.exposed.unwrap_or_default(),
            discarded: dto.discarded.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GameStateDto {
    #[serde(default)]
    id: Option<GameId>,
    state_name: String,
    has_ended: bool,
    // The server emits `null` when nobody has to act.
    #[serde(default)]
    active_players: Option<Vec<PlayerId>>,
    players: BTreeMap<PlayerId, PlayerViewDto>,
    #[serde(default)]
    prevalent_wind: Option<String>,
    #[serde(default)]
    active_discard: Option<String>,
    #[serde(default)]
    wall: Option<Vec<String>>,
}

impl GameStateDto {
    fn into_domain(self) -> Result<GameState, String> {
        let state = GameState {
            id: self.id,
            state_name: self.state_name,
            active_players: self.active_players.unwrap_or_default().into_iter().collect(),
            has_ended: self.has_ended,
            players: self
                .players
                .into_iter()
                .map(|(player, view)| (player, PlayerView::from(view)))
                .collect(),
            prevalent_wind: self.prevalent_wind,
            active_discard: self.active_discard,
            wall: self.wall.unwrap_or_default(),
        };
        state.validate()?;
        Ok(state)
    }
}

/// Decode and validate a state document.
///
/// Malformed JSON, missing core fields, non-numeric ids, and active players
/// without actions all fail with `ClientError::Decode`.
pub fn decode_game_state(body: &[u8]) -> Result<GameState, ClientError> {
    let dto: GameStateDto = serde_json::from_slice(body)
        .map_err(|e| ClientError::decode(OP_FETCH_STATE, e.to_string()))?;
    dto.into_domain()
        .map_err(|detail| ClientError::decode(OP_FETCH_STATE, detail))
}
