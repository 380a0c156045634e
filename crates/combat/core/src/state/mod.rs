//! Combatant data consumed by the resolvers.
//!
//! Tokens and turn budgets are owned by the host (map owner and turn
//! scheduler). The engine reads them through [`SceneOracle`](crate::env::SceneOracle)
//! snapshots and only describes mutations; it never stores them across calls.
mod token;
mod turn;

pub use token::{Ability, AbilityModifiers, HitPoints, Speeds, Token};
pub use turn::{TurnFlags, TurnState};

use core::fmt;

/// Stable identifier for a token on the map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
