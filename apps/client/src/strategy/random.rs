//! Random strategy - uniform choice among the offered actions.

use parking_lot::Mutex;
use rand::prelude::*;

use super::trait_def::{ActionStrategy, StrategyError};
use crate::domain::{ActionId, AvailableActions, PlayerId};

/// Strategy that picks uniformly at random.
///
/// The RNG sits behind a `Mutex` because `choose_action` takes `&self`.
/// With a seed the sequence of choices is reproducible.
pub struct RandomChoice {
    rng: Mutex<StdRng>,
}

impl RandomChoice {
    pub const NAME: &'static str = "random";
    pub const VERSION: &'static str = "1.0.0";

    /// `Some(seed)` for reproducible choices, `None` for OS entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl ActionStrategy for RandomChoice {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_action(
        &self,
        _player: PlayerId,
        actions: &AvailableActions,
    ) -> Result<ActionId, StrategyError> {
        if actions.is_empty() {
            return Err(StrategyError::NoActions);
        }

        let mut rng = self.rng.lock();
        actions
            .keys()
            .copied()
            .choose(&mut *rng)
            .ok_or_else(|| StrategyError::Internal("failed to choose random action".into()))
    }
}
