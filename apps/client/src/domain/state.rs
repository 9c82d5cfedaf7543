use std::collections::{BTreeMap, BTreeSet};

use super::ids::{ActionId, GameId, PlayerId};

/// Actions a player may choose from this round, keyed by action id, with a
/// human-readable description.
pub type AvailableActions = BTreeMap<ActionId, String>;

/// What the server shows about one player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerView {
    pub actions: AvailableActions,
    pub wind: Option<String>,
    pub score: Option<i64>,
    pub received: Option<String>,
    pub concealed: Vec<String>,
    pub exposed: Vec<String>,
    pub discarded: Vec<String>,
}

impl PlayerView {
    pub fn with_actions(actions: AvailableActions) -> Self {
        Self {
            actions,
            ..Self::default()
        }
    }

    /// Description of `action`, if the player is offered it.
    pub fn describe(&self, action: ActionId) -> Option<&str> {
        self.actions.get(&action).map(String::as_str)
    }
}

/// Snapshot of a game as returned by a single poll.
///
/// A fresh value is produced on every fetch; nothing is carried across
/// polls. Values are only built through validated decoding, so every active
/// player of a running game has a non-empty action mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub id: Option<GameId>,
    pub state_name: String,
    pub active_players: BTreeSet<PlayerId>,
    pub has_ended: bool,
    pub players: BTreeMap<PlayerId, PlayerView>,
    pub prevalent_wind: Option<String>,
    pub active_discard: Option<String>,
    pub wall: Vec<String>,
}

impl GameState {
    /// Build a state from its core fields, checking the active-player
    /// invariant.
    pub fn new(
        state_name: impl Into<String>,
        active_players: BTreeSet<PlayerId>,
        has_ended: bool,
        players: BTreeMap<PlayerId, PlayerView>,
    ) -> Result<Self, String> {
        let state = Self {
            id: None,
            state_name: state_name.into(),
            active_players,
            has_ended,
            players,
            prevalent_wind: None,
            active_discard: None,
            wall: Vec::new(),
        };
        state.validate()?;
        Ok(state)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.has_ended {
            return Ok(());
        }
        for player in &self.active_players {
            match self.players.get(player) {
                None => {
                    return Err(format!(
                        "active player {player} is missing from `players`"
                    ))
                }
                Some(view) if view.actions.is_empty() => {
                    return Err(format!("active player {player} has no available actions"))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    /// Available actions for `player`, or `None` if the player is unknown.
    pub fn actions_for(&self, player: PlayerId) -> Option<&AvailableActions> {
        self.players.get(&player).map(|view| &view.actions)
    }

    /// Players that must act before the game can advance, in ascending order.
    /// Empty once the game has ended.
    pub fn players_to_act(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.active_players
            .iter()
            .copied()
            .filter(move |_| !self.has_ended)
    }
}
