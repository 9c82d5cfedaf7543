//! Client test support utilities
//!
//! This crate provides utilities for testing the game client: unified
//! logging initialization and an in-process fake game server.

pub mod fake_server;
pub mod logging;

pub use fake_server::{FakeServer, FakeServerOptions, RecordedSubmission, ScriptedRound};
