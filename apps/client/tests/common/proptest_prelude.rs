// Shared proptest setup for the strategy properties.
//
// Env knobs:
// - PROPTEST_CASES: cases per property (default 64).
// - PROPTEST_MAX_ACTIONS: largest action menu generated per player (default 8).
// - PROPTEST_MAX_ACTION_ID: action ids are drawn from 0..this (default 64).
//
// Menus are built by construction: ids are unique map keys and every
// description is non-empty, matching what a decoded state can hold.

use client::{ActionId, AvailableActions, PlayerId};
use proptest::collection::btree_map;
use proptest::prelude::*;

fn env_knob(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(default)
        .max(1)
}

pub fn proptest_prelude_config() -> ProptestConfig {
    ProptestConfig {
        // No regression files for integration tests
        failure_persistence: None,
        cases: env_knob("PROPTEST_CASES", 64),
        ..ProptestConfig::default()
    }
}

/// A non-empty action menu as one player would be offered it.
pub fn available_actions() -> impl Strategy<Value = AvailableActions> {
    let max_id = env_knob("PROPTEST_MAX_ACTION_ID", 64);
    let max_len = env_knob("PROPTEST_MAX_ACTIONS", 8).min(max_id) as usize;
    btree_map(0..max_id, "[A-Za-z][a-z ]{0,15}", 1..=max_len).prop_map(|actions| {
        actions
            .into_iter()
            .map(|(id, text)| (ActionId(id), text))
            .collect()
    })
}

/// Seat numbers the real server hands out.
pub fn player_id() -> impl Strategy<Value = PlayerId> {
    (1u32..=4).prop_map(PlayerId)
}
