//! Action selection strategies.
//!
//! This module provides:
//! - `ActionStrategy`, the extension point the action loop calls per player
//! - `PickFirst`: the reference strategy, always the lowest action id
//! - `RandomChoice`: uniform random choice, seedable for tests
//! - `Interactive`: lets an operator choose at the terminal
//! - a static registry for looking strategies up by name

mod interactive;
mod pick_first;
mod random;
pub mod registry;
mod trait_def;

pub use interactive::Interactive;
pub use pick_first::PickFirst;
pub use random::RandomChoice;
pub use trait_def::{ActionStrategy, StrategyError};
