//! Component definitions for combatants.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::EntityId;
use crate::mechanics::{ActiveAura, AuraKind, SchoolMask, SpellId, SpellSchool};

/// World position of a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Straight-line distance between two points.
    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Threat modifiers carried by a combatant, applied to the threat it generates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ThreatModifiers {
    /// Percent modifier per school (e.g. 30.0 = +30%).
    pub school_pct: HashMap<SpellSchool, f32>,
    /// Critical-hit threat auras, each restricted to a school mask.
    pub critical_pct: Vec<(SchoolMask, f32)>,
    /// Percent modifier per spell.
    pub spell_pct: HashMap<SpellId, f32>,
}

impl ThreatModifiers {
    /// Apply the percent modifier of the first school in `mask`.
    pub fn apply_total(&self, threat: f32, mask: SchoolMask) -> f32 {
        let pct = mask
            .first_school()
            .and_then(|school| self.school_pct.get(&school))
            .copied()
            .unwrap_or(0.0);
        threat * (100.0 + pct) / 100.0
    }

    /// Product of every critical threat aura touching `mask`.
    pub fn critical_multiplier(&self, mask: SchoolMask) -> f32 {
        self.critical_pct
            .iter()
            .filter(|(aura_mask, _)| aura_mask.intersects(mask))
            .map(|(_, pct)| (100.0 + pct) / 100.0)
            .product()
    }

    /// Apply the spell-specific percent modifier, if one is registered.
    pub fn apply_spell(&self, spell: SpellId, threat: f32) -> f32 {
        match self.spell_pct.get(&spell) {
            Some(pct) => threat + threat * pct / 100.0,
            None => threat,
        }
    }
}

/// Auras currently active on a combatant, in application order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuraComponent {
    pub active: Vec<ActiveAura>,
}

impl AuraComponent {
    /// Apply a new aura. Re-applying moves it to the back (most recent).
    pub fn apply(&mut self, kind: AuraKind, caster: EntityId) {
        self.remove(kind, caster);
        self.active.push(ActiveAura { kind, caster });
    }

    /// Remove an aura of `kind` cast by `caster`.
    pub fn remove(&mut self, kind: AuraKind, caster: EntityId) {
        self.active
            .retain(|aura| !(aura.kind == kind && aura.caster == caster));
    }

    /// Casters of every aura of `kind`, oldest first.
    pub fn casters(&self, kind: AuraKind) -> impl Iterator<Item = EntityId> + '_ {
        self.active
            .iter()
            .filter(move |aura| aura.kind == kind)
            .map(|aura| aura.caster)
    }

    pub fn has_with_caster(&self, kind: AuraKind, caster: EntityId) -> bool {
        self.active
            .iter()
            .any(|aura| aura.kind == kind && aura.caster == caster)
    }
}
