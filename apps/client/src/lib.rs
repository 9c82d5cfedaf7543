#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod runner;
pub mod strategy;
pub mod telemetry;

// Re-exports for public API
pub use api::{GameApi, HttpGameClient, ServerInfo};
pub use config::ClientConfig;
pub use domain::{
    ActionId, ActionSubmission, AvailableActions, GameId, GameState, PlayerId, PlayerView,
};
pub use error::ClientError;
pub use runner::{
    ActionLoop, AutoConfirm, ConfirmationGate, GameOutcome, LoopPhase, PromptGate, SubmissionMode,
};
pub use strategy::{ActionStrategy, PickFirst, RandomChoice, StrategyError};
