//! Read side of the host boundary.
//!
//! The host owns tokens, conditions, turn budgets and map geometry. The
//! engine reads a consistent snapshot of them through [`SceneOracle`] at the
//! start of each resolution and never caches anything across calls.
mod scene;

pub use scene::Scene;

use crate::conditions::ConditionSet;
use crate::geometry::Wall;
use crate::state::{EntityId, Token, TurnState};

/// Read-only view of the combat scene.
pub trait SceneOracle {
    fn token(&self, id: EntityId) -> Option<&Token>;

    fn tokens(&self) -> Vec<&Token>;

    /// Conditions currently on `id`.
    fn conditions_of(&self, id: EntityId) -> ConditionSet;

    fn walls(&self) -> &[Wall];

    /// Round budget of `id`; a fresh budget when the host tracks none.
    fn turn_state(&self, id: EntityId) -> TurnState;

    /// Feet per grid cell when the map defines its own scale. `None` uses
    /// the engine's configured cell size.
    fn cell_size_ft(&self) -> Option<f64> {
        None
    }

    fn round(&self) -> u32;

    /// Highest spell slot level `id` can still spend, 0 for none.
    fn highest_spell_slot(&self, id: EntityId) -> u8;

    /// Whether `id` is fully submerged.
    fn is_underwater(&self, _id: EntityId) -> bool {
        false
    }
}
