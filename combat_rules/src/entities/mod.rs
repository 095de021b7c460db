//! Entity definitions for combat participants.

mod combatant;
mod components;

pub use combatant::*;
pub use components::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, stable handle for anything that can take part in combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a nil/empty entity ID (useful for defaults).
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of actor a combatant is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatantKind {
    /// A player avatar.
    Player,
    /// A server-controlled creature.
    Creature,
    /// A summoned or tamed subordinate with a controller.
    Pet,
}
