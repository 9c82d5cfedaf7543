//! How to register a strategy
//!
//! 1) Implement `ActionStrategy` for your type in its module.
//! 2) Add a `StrategyFactory` entry to the static list with a stable `name` and `version`.
//! 3) Keep ordering stable; the first entry is the default.
//! 4) Determinism: same seed ⇒ same choices (where applicable).

use super::{ActionStrategy, Interactive, PickFirst, RandomChoice};

/// Factory definition for constructing strategies.
pub struct StrategyFactory {
    pub name: &'static str,
    pub version: &'static str,
    pub make: fn(seed: Option<u64>) -> Box<dyn ActionStrategy>,
}

static STRATEGY_FACTORIES: &[StrategyFactory] = &[
    StrategyFactory {
        name: PickFirst::NAME,
        version: PickFirst::VERSION,
        make: make_pick_first,
    },
    StrategyFactory {
        name: RandomChoice::NAME,
        version: RandomChoice::VERSION,
        make: make_random,
    },
    StrategyFactory {
        name: Interactive::NAME,
        version: Interactive::VERSION,
        make: make_interactive,
    },
];

/// Returns the statically registered strategy factories.
pub fn registered_strategies() -> &'static [StrategyFactory] {
    STRATEGY_FACTORIES
}

/// Finds a registered strategy factory by its name.
pub fn by_name(name: &str) -> Option<&'static StrategyFactory> {
    registered_strategies()
        .iter()
        .find(|factory| factory.name == name)
}

fn make_pick_first(_seed: Option<u64>) -> Box<dyn ActionStrategy> {
    Box::new(PickFirst)
}

fn make_random(seed: Option<u64>) -> Box<dyn ActionStrategy> {
    Box::new(RandomChoice::new(seed))
}

fn make_interactive(_seed: Option<u64>) -> Box<dyn ActionStrategy> {
    Box::new(Interactive)
}
