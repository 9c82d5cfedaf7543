use dialoguer::Select;
use tokio::runtime::{Handle, RuntimeFlavor};

use super::trait_def::{ActionStrategy, StrategyError};
use crate::domain::{ActionId, AvailableActions, PlayerId};

/// Lets a human pick each action at the terminal.
///
/// Blocks the calling thread until the operator answers. On a multi-thread
/// runtime the worker is handed off first, so other tasks keep running.
#[derive(Debug, Clone, Copy, Default)]
pub struct Interactive;

impl Interactive {
    pub const NAME: &'static str = "interactive";
    pub const VERSION: &'static str = "1.0.0";

    fn labels(actions: &AvailableActions) -> Vec<String> {
        actions
            .iter()
            .map(|(id, description)| format!("[{id}] {description}"))
            .collect()
    }
}

impl ActionStrategy for Interactive {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_action(
        &self,
        player: PlayerId,
        actions: &AvailableActions,
    ) -> Result<ActionId, StrategyError> {
        if actions.is_empty() {
            return Err(StrategyError::NoActions);
        }

        let labels = Self::labels(actions);
        let index = run_blocking(|| {
            Select::new()
                .with_prompt(format!("Player {player} to move"))
                .items(&labels)
                .default(0)
                .interact()
        })
        .map_err(|e| StrategyError::Internal(format!("prompt failed: {e}")))?;

        actions
            .keys()
            .nth(index)
            .copied()
            .ok_or_else(|| StrategyError::InvalidChoice(format!("no action at position {index}")))
    }
}

/// Run a blocking call from strategy code, which may sit inside an async
/// task.
///
/// `block_in_place` is only allowed on the multi-thread runtime. The
/// current-thread runtime has no other worker to hand tasks to, so the call
/// runs in place there and outside any runtime.
fn run_blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if matches!(handle.runtime_flavor(), RuntimeFlavor::MultiThread) => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}
