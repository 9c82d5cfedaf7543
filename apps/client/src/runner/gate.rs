use async_trait::async_trait;
use dialoguer::Confirm;

use crate::domain::{ActionId, ActionSubmission, GameId, PlayerId};
use crate::error::ClientError;

/// One player's decision, with the server's description of the action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAction {
    pub player: PlayerId,
    pub action: ActionId,
    pub description: String,
}

/// Decisions for one round, before they are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub game_id: GameId,
    pub state_name: String,
    pub choices: Vec<PlannedAction>,
}

impl PendingSubmission {
    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// "Player 1: check" per choice, in player order.
    pub fn summary_lines(&self) -> Vec<String> {
        self.choices
            .iter()
            .map(|c| format!("Player {}: {}", c.player, c.description))
            .collect()
    }

    pub fn to_submission(&self) -> ActionSubmission {
        self.choices.iter().map(|c| (c.player, c.action)).collect()
    }
}

/// Optional pause between deciding and submitting.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    /// Whether the loop should stop in `AwaitingConfirmation` at all.
    fn is_interactive(&self) -> bool {
        true
    }

    /// Resolve once the pending submission may go out; an error aborts the
    /// game.
    async fn confirm(&self, pending: &PendingSubmission) -> Result<(), ClientError>;
}

/// Gate for unattended runs: never waits.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

#[async_trait]
impl ConfirmationGate for AutoConfirm {
    fn is_interactive(&self) -> bool {
        false
    }

    async fn confirm(&self, _pending: &PendingSubmission) -> Result<(), ClientError> {
        Ok(())
    }
}

/// Asks the operator at the terminal before every submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptGate;

#[async_trait]
impl ConfirmationGate for PromptGate {
    async fn confirm(&self, pending: &PendingSubmission) -> Result<(), ClientError> {
        println!("Will be sending: {}", pending.summary_lines().join(", "));

        let accepted = tokio::task::spawn_blocking(|| {
            Confirm::new()
                .with_prompt("Execute these actions?")
                .default(true)
                .interact()
        })
        .await
        .map_err(|e| ClientError::interaction(format!("prompt task failed: {e}")))?
        .map_err(|e| ClientError::interaction(format!("prompt failed: {e}")))?;

        if accepted {
            Ok(())
        } else {
            Err(ClientError::interaction("submission declined by operator"))
        }
    }
}
