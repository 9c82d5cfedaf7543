use std::collections::BTreeMap;

use super::ids::{ActionId, PlayerId};

/// Chosen action per player, sent to the server in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionSubmission {
    entries: BTreeMap<PlayerId, ActionId>,
}

impl ActionSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(player: PlayerId, action: ActionId) -> Self {
        let mut submission = Self::new();
        submission.insert(player, action);
        submission
    }

    /// Record `action` for `player`, replacing any earlier choice.
    pub fn insert(&mut self, player: PlayerId, action: ActionId) {
        self.entries.insert(player, action);
    }

    pub fn get(&self, player: PlayerId) -> Option<ActionId> {
        self.entries.get(&player).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, ActionId)> + '_ {
        self.entries.iter().map(|(p, a)| (*p, *a))
    }

    /// Form fields for the request body: player id to action id, both as
    /// decimal strings.
    pub fn form_pairs(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(player, action)| (player.to_string(), action.to_string()))
            .collect()
    }

    /// One single-entry submission per player, in ascending player order.
    pub fn split_per_player(&self) -> Vec<ActionSubmission> {
        self.iter()
            .map(|(player, action)| ActionSubmission::single(player, action))
            .collect()
    }
}

impl FromIterator<(PlayerId, ActionId)> for ActionSubmission {
    fn from_iter<I: IntoIterator<Item = (PlayerId, ActionId)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
