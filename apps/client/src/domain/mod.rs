//! Typed records for the client side of the game protocol.
//!
//! This module provides:
//! - identifiers (`GameId`, `PlayerId`, `ActionId`)
//! - `GameState` and `PlayerView`, the validated snapshot returned by a poll
//! - `ActionSubmission`, the per-round mapping of player to chosen action

mod ids;
mod state;
mod submission;

pub use ids::{ActionId, GameId, PlayerId};
pub use state::{AvailableActions, GameState, PlayerView};
pub use submission::ActionSubmission;
