use super::trait_def::{ActionStrategy, StrategyError};
use crate::domain::{ActionId, AvailableActions, PlayerId};

/// Reference strategy: always the lowest available action id.
///
/// Deterministic and stateless. Stands in for real decision logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickFirst;

impl PickFirst {
    pub const NAME: &'static str = "pick-first";
    pub const VERSION: &'static str = "1.0.0";
}

impl ActionStrategy for PickFirst {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn choose_action(
        &self,
        _player: PlayerId,
        actions: &AvailableActions,
    ) -> Result<ActionId, StrategyError> {
        actions
            .keys()
            .next()
            .copied()
            .ok_or(StrategyError::NoActions)
    }
}
