//! Game server access.
//!
//! `GameApi` is the seam the action loop talks to; `HttpGameClient` is the
//! production implementation over JSON-over-HTTP.

pub mod dto;
mod http;

use async_trait::async_trait;

pub use dto::{decode_game_state, ServerInfo};
pub use http::HttpGameClient;

use crate::domain::{ActionSubmission, GameId, GameState};
use crate::error::ClientError;

pub const OP_CREATE_GAME: &str = "create_game";
pub const OP_FETCH_STATE: &str = "fetch_state";
pub const OP_SUBMIT_ACTIONS: &str = "submit_actions";
pub const OP_SERVER_INFO: &str = "server_info";

/// The three remote operations of a game instance.
///
/// Each call is exactly one round trip. Nothing is cached and nothing is
/// retried; failures go straight back to the caller.
#[async_trait]
pub trait GameApi: Send + Sync {
    /// Start a new game and return its id.
    async fn create_game(&self) -> Result<GameId, ClientError>;

    /// Fetch the current state of game `id`.
    async fn fetch_state(&self, id: GameId) -> Result<GameState, ClientError>;

    /// Submit chosen actions for game `id`.
    ///
    /// A rejected move comes back as `ClientError::Protocol`, never as a
    /// silent success.
    async fn submit_actions(
        &self,
        id: GameId,
        actions: &ActionSubmission,
    ) -> Result<(), ClientError>;
}
