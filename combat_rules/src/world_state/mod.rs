//! World state - the combatants taking part in fights and where they stand.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::{Combatant, EntityId};

/// Edge-to-edge distance within which a melee swing connects.
pub const MELEE_RANGE: f32 = 5.0;

/// All combatants known to the world.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorldState {
    pub combatants: HashMap<EntityId, Combatant>,
}

impl WorldState {
    /// Create a new empty world state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a combatant to the world.
    pub fn add_combatant(&mut self, combatant: Combatant) -> EntityId {
        let id = combatant.id;
        self.combatants.insert(id, combatant);
        id
    }

    /// Remove a combatant (despawn).
    pub fn remove_combatant(&mut self, id: EntityId) -> Option<Combatant> {
        self.combatants.remove(&id)
    }

    /// Get combatant by ID.
    pub fn get_combatant(&self, id: EntityId) -> Option<&Combatant> {
        self.combatants.get(&id)
    }

    /// Get mutable combatant by ID.
    pub fn get_combatant_mut(&mut self, id: EntityId) -> Option<&mut Combatant> {
        self.combatants.get_mut(&id)
    }

    /// Distance between the edges of two combatants' combat reach.
    pub fn combat_distance(&self, a: EntityId, b: EntityId) -> Option<f32> {
        let a = self.combatants.get(&a)?;
        let b = self.combatants.get(&b)?;
        let center = a.position.distance(&b.position);
        Some((center - a.combat_reach - b.combat_reach).max(0.0))
    }

    /// Check whether `attacker` can hit `target` with a melee attack.
    pub fn in_melee_range(&self, attacker: EntityId, target: EntityId) -> bool {
        self.combat_distance(attacker, target)
            .map(|distance| distance <= MELEE_RANGE)
            .unwrap_or(false)
    }

    /// Move a combatant to a new position.
    pub fn move_to(&mut self, id: EntityId, x: f32, y: f32, z: f32) {
        if let Some(combatant) = self.combatants.get_mut(&id) {
            combatant.position = crate::entities::Position::new(x, y, z);
        }
    }

    /// Kill a combatant outright.
    pub fn kill(&mut self, id: EntityId) {
        if let Some(combatant) = self.combatants.get_mut(&id) {
            combatant.current_hp = 0;
        }
    }
}
