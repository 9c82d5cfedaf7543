//! Action strategy trait definition.

use std::fmt;

use crate::domain::{ActionId, AvailableActions, PlayerId};

/// Errors a strategy can report instead of a choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyError {
    /// The player was offered nothing to choose from
    NoActions,
    /// The strategy produced an id the player was not offered
    InvalidChoice(String),
    /// The strategy failed internally
    Internal(String),
}

impl fmt::Display for StrategyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyError::NoActions => write!(f, "no actions available"),
            StrategyError::InvalidChoice(msg) => write!(f, "invalid choice: {msg}"),
            StrategyError::Internal(msg) => write!(f, "strategy internal error: {msg}"),
        }
    }
}

impl std::error::Error for StrategyError {}

/// Chooses one action for one player.
///
/// Implementations receive the actions offered to `player` this round and
/// must return one of its keys. The action loop checks the returned id
/// against the mapping and aborts the game if it is not offered.
pub trait ActionStrategy: Send + Sync {
    /// Name shown in logs and accepted by the registry.
    fn name(&self) -> &'static str;

    fn choose_action(
        &self,
        player: PlayerId,
        actions: &AvailableActions,
    ) -> Result<ActionId, StrategyError>;
}
